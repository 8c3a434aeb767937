//! Processor state: the register file and the cycle state machine.

/// Named register bank backed by one contiguous buffer.
pub mod registers;
/// Host-observable fetch-execute state.
pub mod run_state;

pub use registers::{RegisterFile, RegisterObserver, RegisterRef, IP_REGISTER};
pub use run_state::CycleState;

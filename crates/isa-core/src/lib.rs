//! Introspectable instruction-set emulator core.
//!
//! A [`Processor`] couples a [`RegisterFile`] and a [`MemoryUnit`] that share
//! one [`NumericType`] word encoding, and runs fetch-execute cycles through a
//! [`ProcessorVariant`]. Every cycle fills an [`ExecutionRecord`] with the
//! operands, optional commentary and per-argument detail of the executed
//! instruction.
#![cfg_attr(test, allow(clippy::float_cmp))]

/// Error taxonomy for encoding, register, memory and dispatch failures.
pub mod fault;
pub use fault::{format_word, CycleError, CycleStage, ErrorClass, IsaError};

/// Configurable word encodings.
pub mod numeric;
pub use numeric::{describe, range_of, NumericKind, NumericType, HEX_GROUP_WIDTH};

/// Register file and cycle state machine.
pub mod state;
pub use state::{CycleState, RegisterFile, RegisterObserver, RegisterRef, IP_REGISTER};

/// Word-addressed memory and address validation.
pub mod memory;
pub use memory::{
    is_valid_address, out_of_bounds, span_end, validate_address, validate_word_address,
    MemoryObserver, MemoryUnit, DEFAULT_MEMORY_WORDS,
};

/// Instruction metadata tables of the built-in models.
pub mod isa;
pub use isa::{
    opcode_byte, ArgumentType, BaseOpcode, ExtendedOpcode, InstructionMetadata, InstructionSet,
    ProcessorModel, BASE_INSTRUCTIONS, EXTENDED_INSTRUCTIONS,
};

/// Host-facing configuration, execution records and tracing.
pub mod api;
pub use api::{
    ExecutionConfig, ExecutionRecord, ProcessorConfig, RunOutcome, StopReason, TraceEvent,
    TraceSink,
};

/// Fetch-execute pipeline and the built-in processor variants.
pub mod execute;
pub use execute::{
    builtin_variant, from_integer, to_integer, ArithmeticOp, BaseModel, BitwiseOp, CompareFlag,
    ExecuteContext, ExtendedModel, Processor, ProcessorVariant, ACCUMULATOR, COMPARE_REGISTER,
    STACK_POINTER,
};

#[cfg(test)]
use proptest as _;

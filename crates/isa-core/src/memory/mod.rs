//! Linear word-addressed memory and its access policy helpers.

/// Address validation helpers.
pub mod access;
/// Word-addressed memory backed by one contiguous byte buffer.
pub mod unit;

pub use access::{
    is_valid_address, out_of_bounds, span_end, validate_address, validate_word_address,
};
pub use unit::{MemoryObserver, MemoryUnit};

/// Default memory capacity in words.
pub const DEFAULT_MEMORY_WORDS: usize = 0xFFF;

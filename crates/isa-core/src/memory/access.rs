//! Address validation shared by the memory unit and instruction handlers.

use crate::IsaError;

/// Returns `true` when `address` lies in `[0, capacity)`.
#[must_use]
pub const fn is_valid_address(address: usize, capacity: usize) -> bool {
    address < capacity
}

/// Converts a word to a word address, flooring fractional values.
///
/// # Errors
///
/// Returns [`IsaError::MemoryAccess`] for negative, non-finite or
/// out-of-range words.
pub fn validate_word_address(word: f64, capacity: usize) -> Result<usize, IsaError> {
    let floored = word.floor();
    #[allow(clippy::cast_precision_loss)]
    let in_range = floored >= 0.0 && floored < capacity as f64;
    if in_range {
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let address = floored as usize;
        Ok(address)
    } else {
        Err(IsaError::MemoryAccess {
            address: word,
            capacity,
        })
    }
}

/// Validates a single word address.
///
/// # Errors
///
/// Returns [`IsaError::MemoryAccess`] when `address >= capacity`.
pub fn validate_address(address: usize, capacity: usize) -> Result<usize, IsaError> {
    if is_valid_address(address, capacity) {
        Ok(address)
    } else {
        Err(out_of_bounds(address, capacity))
    }
}

/// Exclusive word address reached by `byte_len` bytes loaded at `start`,
/// or `None` when it does not fit in `usize`.
#[must_use]
pub const fn span_end(start: usize, byte_len: usize, byte_width: usize) -> Option<usize> {
    start.checked_add(byte_len.div_ceil(byte_width))
}

/// Builds the out-of-bounds error for a `usize` address.
#[must_use]
pub fn out_of_bounds(address: usize, capacity: usize) -> IsaError {
    #[allow(clippy::cast_precision_loss)]
    let address = address as f64;
    IsaError::MemoryAccess { address, capacity }
}

use std::fmt;

use crate::memory::access::{out_of_bounds, span_end, validate_address, validate_word_address};
use crate::{IsaError, NumericType};

/// Observer invoked after memory writes with `(start, end, memory)`.
///
/// Single-word writes report `(a, a)`; bulk operations report the half-open
/// span they touched.
pub type MemoryObserver = Box<dyn FnMut(usize, usize, &MemoryUnit)>;

/// Linear array of words backed by one contiguous byte buffer.
///
/// Word `a` occupies `byte_width` bytes at offset `a * byte_width`.
pub struct MemoryUnit {
    numeric: NumericType,
    capacity: usize,
    storage: Box<[u8]>,
    observer: Option<MemoryObserver>,
}

impl fmt::Debug for MemoryUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryUnit")
            .field("numeric", &self.numeric.kind)
            .field("capacity", &self.capacity)
            .field("observed", &self.observer.is_some())
            .finish_non_exhaustive()
    }
}

impl MemoryUnit {
    /// Allocates `capacity` zeroed words.
    #[must_use]
    pub fn new(numeric: NumericType, capacity: usize) -> Self {
        Self {
            numeric,
            capacity,
            storage: vec![0; capacity * numeric.byte_width].into_boxed_slice(),
            observer: None,
        }
    }

    /// Numeric type of every word.
    #[must_use]
    pub const fn numeric(&self) -> NumericType {
        self.numeric
    }

    /// Capacity in words.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Raw memory image.
    #[must_use]
    pub fn bytes(&self) -> &[u8] {
        &self.storage
    }

    /// `true` when `address` lies in `[0, capacity)`.
    #[must_use]
    pub const fn is_valid_address(&self, address: usize) -> bool {
        address < self.capacity
    }

    /// Resolves a word read from a register or the instruction stream to an
    /// address.
    ///
    /// # Errors
    ///
    /// Returns [`IsaError::MemoryAccess`] when the word is not a valid
    /// address.
    pub fn address_of(&self, word: f64) -> Result<usize, IsaError> {
        validate_word_address(word, self.capacity)
    }

    /// Reads one word.
    ///
    /// # Errors
    ///
    /// Returns [`IsaError::MemoryAccess`] when `address` is out of bounds.
    pub fn read(&self, address: usize) -> Result<f64, IsaError> {
        let address = validate_address(address, self.capacity)?;
        self.numeric.decode(self.word(address))
    }

    /// Decoded words in `[start, end)`.
    ///
    /// # Errors
    ///
    /// Returns [`IsaError::MemoryAccess`] when the range leaves memory.
    pub fn words(&self, start: usize, end: usize) -> Result<Vec<f64>, IsaError> {
        if end > self.capacity {
            return Err(out_of_bounds(end, self.capacity));
        }
        (start..end).map(|address| self.read(address)).collect()
    }

    /// Stores `value` re-encoded as the configured numeric type.
    ///
    /// # Errors
    ///
    /// Returns [`IsaError::MemoryAccess`] when `address` is out of bounds.
    pub fn write(&mut self, address: usize, value: f64) -> Result<(), IsaError> {
        let address = validate_address(address, self.capacity)?;
        let numeric = self.numeric;
        numeric.encode_into(value, self.word_mut(address))?;
        self.notify(address, address);
        Ok(())
    }

    /// Copies one word byte-for-byte and returns the value now stored.
    ///
    /// # Errors
    ///
    /// Returns [`IsaError::SizeMismatch`] when `bytes` is not exactly one
    /// word, or [`IsaError::MemoryAccess`] when `address` is out of bounds.
    pub fn write_raw_word(&mut self, address: usize, bytes: &[u8]) -> Result<f64, IsaError> {
        if bytes.len() != self.numeric.byte_width {
            return Err(IsaError::SizeMismatch {
                expected: self.numeric.byte_width,
                actual: bytes.len(),
            });
        }
        let address = validate_address(address, self.capacity)?;
        self.word_mut(address).copy_from_slice(bytes);
        self.notify(address, address);
        self.read(address)
    }

    /// Copies an arbitrary byte sequence starting at word `start` and returns
    /// the exclusive end address `start + ceil(len / byte_width)`.
    ///
    /// # Errors
    ///
    /// Returns [`IsaError::MemoryAccess`] when the bytes do not fit; nothing
    /// is written in that case.
    pub fn load_bytes(&mut self, start: usize, bytes: &[u8]) -> Result<usize, IsaError> {
        let width = self.numeric.byte_width;
        if start > self.capacity {
            return Err(out_of_bounds(start, self.capacity));
        }
        let end = span_end(start, bytes.len(), width)
            .filter(|end| *end <= self.capacity)
            .ok_or_else(|| out_of_bounds(start, self.capacity))?;
        let offset = start * width;
        self.storage[offset..offset + bytes.len()].copy_from_slice(bytes);
        self.notify(start, end);
        Ok(end)
    }

    /// Writes `value` to every address in `[start, end)`, notifying once.
    ///
    /// `start >= end` is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`IsaError::MemoryAccess`] when `end > capacity`; nothing is
    /// written in that case.
    pub fn fill_range(&mut self, start: usize, end: usize, value: f64) -> Result<(), IsaError> {
        if start >= end {
            return Ok(());
        }
        if end > self.capacity {
            return Err(out_of_bounds(end, self.capacity));
        }

        let width = self.numeric.byte_width;
        let encoded = self.numeric.encode(value);
        for word in self.storage[start * width..end * width].chunks_exact_mut(width) {
            word.copy_from_slice(&encoded);
        }
        self.notify(start, end);
        Ok(())
    }

    /// Zeroes the whole image without notifying the observer.
    pub fn clear(&mut self) {
        self.storage.fill(0);
    }

    /// Installs the write observer, replacing any previous one.
    pub fn set_observer(&mut self, observer: MemoryObserver) {
        self.observer = Some(observer);
    }

    fn word(&self, address: usize) -> &[u8] {
        let width = self.numeric.byte_width;
        &self.storage[address * width..(address + 1) * width]
    }

    fn word_mut(&mut self, address: usize) -> &mut [u8] {
        let width = self.numeric.byte_width;
        &mut self.storage[address * width..(address + 1) * width]
    }

    fn notify(&mut self, start: usize, end: usize) {
        if let Some(mut observer) = self.observer.take() {
            observer(start, end, self);
            self.observer = Some(observer);
        }
    }
}

//! Comparison flag stored in the `cmp` register.

use std::cmp::Ordering;

/// Result of `CMP`, encoded as a small word in the `cmp` register.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum CompareFlag {
    /// Operands are equal.
    #[default]
    Equal = 0,
    /// Left operand is smaller.
    Less = 1,
    /// Left operand is larger.
    Greater = 2,
    /// At least one operand is NaN.
    Unordered = 3,
}

impl CompareFlag {
    /// Compares two words.
    #[must_use]
    pub fn compare(left: f64, right: f64) -> Self {
        match left.partial_cmp(&right) {
            Some(Ordering::Equal) => Self::Equal,
            Some(Ordering::Less) => Self::Less,
            Some(Ordering::Greater) => Self::Greater,
            None => Self::Unordered,
        }
    }

    /// Word stored in the `cmp` register.
    #[must_use]
    pub fn as_word(self) -> f64 {
        f64::from(self as u8)
    }

    /// Decodes a `cmp` register value; anything but `0..=3` is `None`.
    #[must_use]
    pub fn from_word(word: f64) -> Option<Self> {
        match word {
            w if w == 0.0 => Some(Self::Equal),
            w if w == 1.0 => Some(Self::Less),
            w if w == 2.0 => Some(Self::Greater),
            w if w == 3.0 => Some(Self::Unordered),
            _ => None,
        }
    }
}

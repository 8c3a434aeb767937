use std::fmt;

use thiserror::Error;

/// Error classes used for host-side aggregation and reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum ErrorClass {
    /// Numeric type lookup failed.
    Numeric,
    /// Register name or index was rejected.
    Register,
    /// Memory address or raw-word size was rejected.
    Memory,
    /// Hex dump could not be decoded.
    Encoding,
    /// Opcode is not part of the active instruction set.
    Dispatch,
    /// Processor construction parameters were rejected.
    Configuration,
}

/// Component-level failure taxonomy.
///
/// Every variant carries the offending value so that hosts can report it
/// without parsing the message text.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum IsaError {
    /// Numeric type name is not one of the eight supported kinds.
    #[error("unknown numeric type '{name}'")]
    UnknownNumericType {
        /// Name that failed to resolve.
        name: String,
    },
    /// Register name is unknown or its index is outside the register file.
    #[error("invalid register '{register}'")]
    InvalidRegister {
        /// Name or index as supplied by the caller.
        register: String,
    },
    /// Address lies outside `[0, capacity)`.
    #[error("memory access out of bounds at address {} (capacity {capacity} words)", word_ref(.address))]
    MemoryAccess {
        /// Offending word address.
        address: f64,
        /// Memory capacity in words.
        capacity: usize,
    },
    /// Raw word write supplied the wrong number of bytes.
    #[error("raw word requires {expected} bytes, got {actual}")]
    SizeMismatch {
        /// Byte width of the configured numeric type.
        expected: usize,
        /// Number of bytes supplied.
        actual: usize,
    },
    /// Hex byte dump has the wrong length or contains non-hex digits.
    #[error("malformed encoding '{input}': {reason}")]
    MalformedEncoding {
        /// Input string as supplied.
        input: String,
        /// Which shape rule the input broke.
        reason: &'static str,
    },
    /// Opcode is absent from the active variant's instruction set.
    #[error("unknown opcode {}", word_ref(.opcode))]
    UnknownOpcode {
        /// Raw opcode word as fetched.
        opcode: f64,
    },
    /// Processor construction parameters are inconsistent.
    #[error("invalid processor configuration: {reason}")]
    InvalidConfiguration {
        /// Human-readable description of the rejected parameter.
        reason: String,
    },
}

impl IsaError {
    /// Returns the aggregation class for this error.
    #[must_use]
    pub const fn class(&self) -> ErrorClass {
        match self {
            Self::UnknownNumericType { .. } => ErrorClass::Numeric,
            Self::InvalidRegister { .. } => ErrorClass::Register,
            Self::MemoryAccess { .. } | Self::SizeMismatch { .. } => ErrorClass::Memory,
            Self::MalformedEncoding { .. } => ErrorClass::Encoding,
            Self::UnknownOpcode { .. } => ErrorClass::Dispatch,
            Self::InvalidConfiguration { .. } => ErrorClass::Configuration,
        }
    }
}

/// Cycle phase in which a failure occurred.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum CycleStage {
    /// The opcode word could not be fetched.
    Fetch,
    /// The fetched opcode failed during execution.
    Execute {
        /// Opcode word being executed.
        opcode: f64,
    },
}

impl fmt::Display for CycleStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fetch => f.write_str("cannot fetch next word"),
            Self::Execute { opcode } => {
                write!(f, "failed to execute opcode {}", format_word(*opcode))
            }
        }
    }
}

/// Cycle-level failure annotated with the instruction pointer at cycle start.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("cycle: failed to complete cycle where ip = {}: {stage}", word_ref(.ip))]
pub struct CycleError {
    /// Instruction pointer value when the cycle started.
    pub ip: f64,
    /// Phase in which the failure surfaced.
    pub stage: CycleStage,
    /// Underlying component failure.
    #[source]
    pub cause: IsaError,
}

impl CycleError {
    /// Wraps a fetch failure.
    #[must_use]
    pub const fn fetch(ip: f64, cause: IsaError) -> Self {
        Self {
            ip,
            stage: CycleStage::Fetch,
            cause,
        }
    }

    /// Wraps an execute failure for `opcode`.
    #[must_use]
    pub const fn execute(ip: f64, opcode: f64, cause: IsaError) -> Self {
        Self {
            ip,
            stage: CycleStage::Execute { opcode },
            cause,
        }
    }

    /// Innermost component error.
    #[must_use]
    pub const fn root_cause(&self) -> &IsaError {
        &self.cause
    }
}

#[allow(clippy::trivially_copy_pass_by_ref)]
fn word_ref(value: &f64) -> String {
    format_word(*value)
}

/// Formats a word for messages: integral values as hex, anything else as-is.
#[must_use]
pub fn format_word(value: f64) -> String {
    // 2^53: largest range in which every integer is exactly representable.
    const EXACT_LIMIT: f64 = 9_007_199_254_740_992.0;

    if value.is_finite() && value.fract() == 0.0 && value.abs() < EXACT_LIMIT {
        #[allow(clippy::cast_possible_truncation)]
        let integer = value as i64;
        if integer < 0 {
            format!("-{:#x}", integer.unsigned_abs())
        } else {
            format!("{integer:#x}")
        }
    } else {
        format!("{value}")
    }
}

#[cfg(test)]
mod tests {
    use std::error::Error as _;

    use super::{format_word, CycleError, CycleStage, ErrorClass, IsaError};

    #[test]
    fn class_mapping_matches_taxonomy() {
        assert_eq!(
            IsaError::UnknownNumericType {
                name: "int128".into()
            }
            .class(),
            ErrorClass::Numeric
        );
        assert_eq!(
            IsaError::InvalidRegister {
                register: "r99".into()
            }
            .class(),
            ErrorClass::Register
        );
        assert_eq!(
            IsaError::MemoryAccess {
                address: 16.0,
                capacity: 16
            }
            .class(),
            ErrorClass::Memory
        );
        assert_eq!(
            IsaError::SizeMismatch {
                expected: 4,
                actual: 3
            }
            .class(),
            ErrorClass::Memory
        );
        assert_eq!(
            IsaError::UnknownOpcode { opcode: 255.0 }.class(),
            ErrorClass::Dispatch
        );
    }

    #[test]
    fn words_format_as_hex_when_integral() {
        assert_eq!(format_word(255.0), "0xff");
        assert_eq!(format_word(0.0), "0x0");
        assert_eq!(format_word(-16.0), "-0x10");
        assert_eq!(format_word(1.5), "1.5");
        assert_eq!(format_word(f64::INFINITY), "inf");
    }

    #[test]
    fn cycle_error_message_keeps_cause_chain() {
        let error = CycleError::execute(4.0, 200.0, IsaError::UnknownOpcode { opcode: 200.0 });

        assert_eq!(
            error.to_string(),
            "cycle: failed to complete cycle where ip = 0x4: failed to execute opcode 0xc8"
        );
        let source = error.source().expect("cycle errors expose their cause");
        assert_eq!(source.to_string(), "unknown opcode 0xc8");
        assert_eq!(
            error.root_cause(),
            &IsaError::UnknownOpcode { opcode: 200.0 }
        );
    }

    #[test]
    fn fetch_stage_describes_missing_word() {
        let error = CycleError::fetch(
            16.0,
            IsaError::MemoryAccess {
                address: 16.0,
                capacity: 16,
            },
        );
        assert_eq!(error.stage, CycleStage::Fetch);
        assert!(error.to_string().ends_with("cannot fetch next word"));
    }
}

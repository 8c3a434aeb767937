//! Word encodings: byte width, signedness, conversion and hex dumps.
//!
//! Every register and memory word of one processor shares a single
//! [`NumericType`]. Values cross the API as `f64`, which represents every
//! supported integer exactly, and are converted to the configured encoding
//! only when stored.

use std::fmt;
use std::str::FromStr;

use crate::IsaError;

/// Hex digits per encoded byte.
pub const HEX_GROUP_WIDTH: usize = 2;

/// The eight supported word encodings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
#[allow(missing_docs)]
pub enum NumericKind {
    Int8,
    Uint8,
    Int16,
    Uint16,
    Int32,
    Uint32,
    Float32,
    Float64,
}

impl NumericKind {
    /// All kinds in canonical order.
    pub const ALL: [Self; 8] = [
        Self::Int8,
        Self::Uint8,
        Self::Int16,
        Self::Uint16,
        Self::Int32,
        Self::Uint32,
        Self::Float32,
        Self::Float64,
    ];

    /// Canonical lowercase name (`int8`, `float64`, ...).
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Int8 => "int8",
            Self::Uint8 => "uint8",
            Self::Int16 => "int16",
            Self::Uint16 => "uint16",
            Self::Int32 => "int32",
            Self::Uint32 => "uint32",
            Self::Float32 => "float32",
            Self::Float64 => "float64",
        }
    }

    /// Number of bytes one word occupies.
    #[must_use]
    pub const fn byte_width(self) -> usize {
        match self {
            Self::Int8 | Self::Uint8 => 1,
            Self::Int16 | Self::Uint16 => 2,
            Self::Int32 | Self::Uint32 | Self::Float32 => 4,
            Self::Float64 => 8,
        }
    }

    /// `true` for the six integer kinds.
    #[must_use]
    pub const fn is_integer(self) -> bool {
        !matches!(self, Self::Float32 | Self::Float64)
    }

    /// `[min, max]` for the kind.
    ///
    /// Float kinds report the smallest positive magnitude and the largest
    /// finite value.
    #[must_use]
    pub fn range(self) -> (f64, f64) {
        match self {
            Self::Int8 => (f64::from(i8::MIN), f64::from(i8::MAX)),
            Self::Uint8 => (0.0, f64::from(u8::MAX)),
            Self::Int16 => (f64::from(i16::MIN), f64::from(i16::MAX)),
            Self::Uint16 => (0.0, f64::from(u16::MAX)),
            Self::Int32 => (f64::from(i32::MIN), f64::from(i32::MAX)),
            Self::Uint32 => (0.0, f64::from(u32::MAX)),
            Self::Float32 => (f64::from(f32::MIN_POSITIVE), f64::from(f32::MAX)),
            Self::Float64 => (f64::from_bits(1), f64::MAX),
        }
    }
}

impl fmt::Display for NumericKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for NumericKind {
    type Err = IsaError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.name() == name)
            .ok_or_else(|| IsaError::UnknownNumericType {
                name: name.to_owned(),
            })
    }
}

/// Immutable descriptor for one word encoding.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct NumericType {
    /// Encoding kind.
    pub kind: NumericKind,
    /// Bytes per word.
    pub byte_width: usize,
    /// Integer (wrapping) or IEEE 754 semantics.
    pub is_integer: bool,
    /// Lower bound reported by [`NumericKind::range`].
    pub min_value: f64,
    /// Upper bound reported by [`NumericKind::range`].
    pub max_value: f64,
}

/// Resolves a numeric type by name.
///
/// # Errors
///
/// Returns [`IsaError::UnknownNumericType`] for names outside the eight
/// supported kinds.
pub fn describe(name: &str) -> Result<NumericType, IsaError> {
    name.parse().map(NumericType::new)
}

/// `[min, max]` for a kind name; `(NaN, NaN)` when the name is unsupported.
#[must_use]
pub fn range_of(name: &str) -> (f64, f64) {
    name.parse::<NumericKind>()
        .map_or((f64::NAN, f64::NAN), NumericKind::range)
}

impl NumericType {
    /// Builds the descriptor for `kind`.
    #[must_use]
    pub fn new(kind: NumericKind) -> Self {
        let (min_value, max_value) = kind.range();
        Self {
            kind,
            byte_width: kind.byte_width(),
            is_integer: kind.is_integer(),
            min_value,
            max_value,
        }
    }

    /// `[min_value, max_value]`.
    #[must_use]
    pub const fn range(&self) -> (f64, f64) {
        (self.min_value, self.max_value)
    }

    /// Encodes `value` into `out`, which must be exactly one word long.
    ///
    /// Integer kinds keep the low `byte_width` bytes of the truncated value;
    /// non-finite values store zero. `float32` rounds to nearest.
    ///
    /// # Errors
    ///
    /// Returns [`IsaError::SizeMismatch`] when `out` is not one word long.
    pub fn encode_into(&self, value: f64, out: &mut [u8]) -> Result<(), IsaError> {
        if out.len() != self.byte_width {
            return Err(IsaError::SizeMismatch {
                expected: self.byte_width,
                actual: out.len(),
            });
        }

        #[allow(clippy::cast_possible_truncation)]
        match self.kind {
            NumericKind::Int8 | NumericKind::Uint8 => {
                out.copy_from_slice(&(wrap_to_width(value, 8) as u8).to_be_bytes());
            }
            NumericKind::Int16 | NumericKind::Uint16 => {
                out.copy_from_slice(&(wrap_to_width(value, 16) as u16).to_be_bytes());
            }
            NumericKind::Int32 | NumericKind::Uint32 => {
                out.copy_from_slice(&(wrap_to_width(value, 32) as u32).to_be_bytes());
            }
            NumericKind::Float32 => out.copy_from_slice(&(value as f32).to_be_bytes()),
            NumericKind::Float64 => out.copy_from_slice(&value.to_be_bytes()),
        }
        Ok(())
    }

    /// Encodes `value` into a fresh word.
    #[must_use]
    pub fn encode(&self, value: f64) -> Vec<u8> {
        let mut bytes = vec![0; self.byte_width];
        // The buffer is sized from byte_width, so the width check cannot fail.
        let _ = self.encode_into(value, &mut bytes);
        bytes
    }

    /// Decodes one word.
    ///
    /// # Errors
    ///
    /// Returns [`IsaError::SizeMismatch`] when `bytes` is not one word long.
    pub fn decode(&self, bytes: &[u8]) -> Result<f64, IsaError> {
        if bytes.len() != self.byte_width {
            return Err(IsaError::SizeMismatch {
                expected: self.byte_width,
                actual: bytes.len(),
            });
        }

        let value = match self.kind {
            NumericKind::Int8 => f64::from(i8::from_be_bytes([bytes[0]])),
            NumericKind::Uint8 => f64::from(bytes[0]),
            NumericKind::Int16 => f64::from(i16::from_be_bytes([bytes[0], bytes[1]])),
            NumericKind::Uint16 => f64::from(u16::from_be_bytes([bytes[0], bytes[1]])),
            NumericKind::Int32 => f64::from(i32::from_be_bytes(word4(bytes))),
            NumericKind::Uint32 => f64::from(u32::from_be_bytes(word4(bytes))),
            NumericKind::Float32 => f64::from(f32::from_be_bytes(word4(bytes))),
            NumericKind::Float64 => {
                let mut raw = [0; 8];
                raw.copy_from_slice(bytes);
                f64::from_be_bytes(raw)
            }
        };
        Ok(value)
    }

    /// Value actually stored when `value` is written as one word.
    #[must_use]
    pub fn coerce(&self, value: f64) -> f64 {
        self.decode(&self.encode(value)).unwrap_or(f64::NAN)
    }

    /// Encodes a sequence of words back to back (program images).
    #[must_use]
    pub fn encode_words(&self, values: &[f64]) -> Vec<u8> {
        let mut bytes = vec![0; values.len() * self.byte_width];
        for (chunk, value) in bytes.chunks_exact_mut(self.byte_width).zip(values) {
            let _ = self.encode_into(*value, chunk);
        }
        bytes
    }

    /// Lowercase hex dump of the encoded word, two digits per byte.
    #[must_use]
    pub fn to_hex_string(&self, value: f64) -> String {
        self.encode(value)
            .iter()
            .map(|byte| format!("{byte:02x}"))
            .collect()
    }

    /// Parses a hex dump produced by [`Self::to_hex_string`].
    ///
    /// # Errors
    ///
    /// Returns [`IsaError::MalformedEncoding`] when the length is not a
    /// multiple of [`HEX_GROUP_WIDTH`], the group count differs from the byte
    /// width, or a group is not valid hex.
    pub fn from_hex_string(&self, input: &str) -> Result<f64, IsaError> {
        let malformed = |reason| IsaError::MalformedEncoding {
            input: input.to_owned(),
            reason,
        };

        if !input.is_ascii() || input.len() % HEX_GROUP_WIDTH != 0 {
            return Err(malformed("length is not a multiple of the byte group width"));
        }
        if input.len() / HEX_GROUP_WIDTH != self.byte_width {
            return Err(malformed("byte count does not match the numeric type"));
        }

        let bytes = input
            .as_bytes()
            .chunks_exact(HEX_GROUP_WIDTH)
            .map(|group| {
                group
                    .iter()
                    .all(u8::is_ascii_hexdigit)
                    .then(|| std::str::from_utf8(group).ok())
                    .flatten()
                    .and_then(|digits| u8::from_str_radix(digits, 16).ok())
                    .ok_or_else(|| malformed("group is not a hex byte"))
            })
            .collect::<Result<Vec<u8>, _>>()?;

        self.decode(&bytes)
    }
}

/// Truncates toward zero and keeps the low `bits` bits (two's complement).
fn wrap_to_width(value: f64, bits: i32) -> u64 {
    if !value.is_finite() {
        return 0;
    }
    let modulus = 2_f64.powi(bits);
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let wrapped = value.trunc().rem_euclid(modulus) as u64;
    wrapped
}

fn word4(bytes: &[u8]) -> [u8; 4] {
    [bytes[0], bytes[1], bytes[2], bytes[3]]
}

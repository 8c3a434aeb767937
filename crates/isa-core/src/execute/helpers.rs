//! Arithmetic and bitwise operators of the accumulator model.
//!
//! Arithmetic runs in `f64`; the result is narrowed to the configured word
//! only when it is written back. Bitwise operators work on 64-bit integers.

/// Binary arithmetic operators writing to `acc`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(missing_docs)]
pub enum ArithmeticOp {
    Add,
    Sub,
    Mul,
    Div,
    /// Division truncated toward zero.
    Idiv,
    Pow,
}

impl ArithmeticOp {
    /// Applies the operator in wide precision.
    #[must_use]
    pub fn apply(self, left: f64, right: f64) -> f64 {
        match self {
            Self::Add => left + right,
            Self::Sub => left - right,
            Self::Mul => left * right,
            Self::Div => left / right,
            Self::Idiv => (left / right).trunc(),
            Self::Pow => left.powf(right),
        }
    }

    /// Operator text used in commentary.
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::Div => "/",
            Self::Idiv => "//",
            Self::Pow => "**",
        }
    }
}

/// Binary bitwise operators writing to `acc`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(missing_docs)]
pub enum BitwiseOp {
    And,
    Or,
    Xor,
    Shl,
    /// Arithmetic (sign-propagating) right shift.
    Shr,
}

impl BitwiseOp {
    /// Applies the operator; shift amounts are clamped to `0..=63`.
    #[must_use]
    pub fn apply(self, left: i64, right: i64) -> i64 {
        match self {
            Self::And => left & right,
            Self::Or => left | right,
            Self::Xor => left ^ right,
            Self::Shl => left << shift_amount(right),
            Self::Shr => left >> shift_amount(right),
        }
    }

    /// Operator text used in commentary.
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::And => "&",
            Self::Or => "|",
            Self::Xor => "^",
            Self::Shl => "<<",
            Self::Shr => ">>",
        }
    }
}

/// Truncates a word toward zero; non-finite words become 0, out-of-range
/// words saturate.
#[must_use]
pub fn to_integer(word: f64) -> i64 {
    if !word.is_finite() {
        return 0;
    }
    #[allow(clippy::cast_possible_truncation)]
    let integer = word.trunc() as i64;
    integer
}

/// Converts an integer result back to a word.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn from_integer(integer: i64) -> f64 {
    integer as f64
}

fn shift_amount(amount: i64) -> u32 {
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let amount = amount.clamp(0, 63) as u32;
    amount
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::{from_integer, to_integer, ArithmeticOp, BitwiseOp};

    #[rstest]
    #[case(ArithmeticOp::Add, 5.0, 3.0, 8.0)]
    #[case(ArithmeticOp::Sub, 5.0, 8.0, -3.0)]
    #[case(ArithmeticOp::Mul, -4.0, 2.5, -10.0)]
    #[case(ArithmeticOp::Div, 7.0, 2.0, 3.5)]
    #[case(ArithmeticOp::Idiv, 7.0, 2.0, 3.0)]
    #[case(ArithmeticOp::Idiv, -7.0, 2.0, -3.0)]
    #[case(ArithmeticOp::Pow, 2.0, 10.0, 1024.0)]
    fn arithmetic_runs_in_wide_precision(
        #[case] op: ArithmeticOp,
        #[case] left: f64,
        #[case] right: f64,
        #[case] expected: f64,
    ) {
        assert_eq!(op.apply(left, right), expected);
    }

    #[test]
    fn division_by_zero_follows_ieee() {
        assert_eq!(ArithmeticOp::Div.apply(1.0, 0.0), f64::INFINITY);
        assert!(ArithmeticOp::Idiv.apply(0.0, 0.0).is_nan());
    }

    #[rstest]
    #[case(BitwiseOp::And, 0b1100, 0b1010, 0b1000)]
    #[case(BitwiseOp::Or, 0b1100, 0b1010, 0b1110)]
    #[case(BitwiseOp::Xor, 0b1100, 0b1010, 0b0110)]
    #[case(BitwiseOp::Shl, 1, 4, 16)]
    #[case(BitwiseOp::Shr, -16, 2, -4)]
    #[case(BitwiseOp::Shl, 1, 100, i64::MIN)]
    #[case(BitwiseOp::Shr, 64, -3, 64)]
    fn bitwise_ops_clamp_shift_amounts(
        #[case] op: BitwiseOp,
        #[case] left: i64,
        #[case] right: i64,
        #[case] expected: i64,
    ) {
        assert_eq!(op.apply(left, right), expected);
    }

    #[test]
    fn integer_conversion_truncates_toward_zero() {
        assert_eq!(to_integer(3.9), 3);
        assert_eq!(to_integer(-3.9), -3);
        assert_eq!(to_integer(f64::NAN), 0);
        assert_eq!(to_integer(f64::NEG_INFINITY), 0);
        assert_eq!(from_integer(-12), -12.0);
    }
}

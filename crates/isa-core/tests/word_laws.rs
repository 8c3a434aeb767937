//! Property laws for word encodings, memory round trips and the fetch primitive.

#![allow(
    clippy::pedantic,
    clippy::nursery,
    clippy::float_cmp,
    clippy::cast_possible_truncation,
    clippy::cast_precision_loss
)]

use isa_core::{
    MemoryUnit, NumericKind, NumericType, Processor, ProcessorConfig, ProcessorModel,
};
use proptest::prelude::*;
use rstest as _;
#[cfg(feature = "serde")]
use serde as _;
use thiserror as _;

fn integer_kind() -> impl Strategy<Value = NumericKind> {
    prop::sample::select(vec![
        NumericKind::Int8,
        NumericKind::Uint8,
        NumericKind::Int16,
        NumericKind::Uint16,
        NumericKind::Int32,
        NumericKind::Uint32,
    ])
}

fn any_kind() -> impl Strategy<Value = NumericKind> {
    prop::sample::select(NumericKind::ALL.to_vec())
}

/// Reference wraparound: keep the low `bits` bits, reinterpret in the
/// kind's signedness.
fn wrapped(kind: NumericKind, value: i64) -> f64 {
    let bits = kind.byte_width() as u32 * 8;
    let modulus = 1_i128 << bits;
    let low = i128::from(value).rem_euclid(modulus);
    let (min, _) = kind.range();
    if min < 0.0 && low >= modulus / 2 {
        (low - modulus) as f64
    } else {
        low as f64
    }
}

proptest! {
    #[test]
    fn in_range_integers_round_trip(kind in integer_kind(), seed in any::<i64>()) {
        let numeric = NumericType::new(kind);
        let (min, max) = numeric.range();
        let span = (max - min) as i64 + 1;
        let value = min + seed.rem_euclid(span) as f64;

        prop_assert_eq!(numeric.decode(&numeric.encode(value)), Ok(value));
    }

    #[test]
    fn out_of_range_integers_wrap(kind in integer_kind(), value in any::<i32>(), scale in -3_i64..4) {
        let numeric = NumericType::new(kind);
        let wide = i64::from(value) * (1_i64 << 20) * scale + i64::from(value);

        prop_assert_eq!(numeric.coerce(wide as f64), wrapped(kind, wide));
    }

    #[test]
    fn fractional_integers_truncate_toward_zero(kind in integer_kind(), whole in -100_i64..100, frac in 0.01_f64..0.99) {
        let numeric = NumericType::new(kind);
        let value = whole as f64 + frac.copysign(whole as f64);

        prop_assert_eq!(numeric.coerce(value), wrapped(kind, whole));
    }

    #[test]
    fn float64_round_trips_bit_exactly(value in any::<f64>()) {
        let numeric = NumericType::new(NumericKind::Float64);
        let decoded = numeric.decode(&numeric.encode(value)).expect("one word");

        prop_assert_eq!(decoded.to_bits(), value.to_bits());
    }

    #[test]
    fn float32_stores_nearest_single(value in any::<f32>().prop_filter("NaN has no identity", |v| !v.is_nan())) {
        let numeric = NumericType::new(NumericKind::Float32);

        prop_assert_eq!(numeric.coerce(f64::from(value)), f64::from(value));
    }

    #[test]
    fn hex_string_round_trips(kind in any_kind(), seed in any::<i32>()) {
        let numeric = NumericType::new(kind);
        let stored = numeric.coerce(f64::from(seed));
        let hex = numeric.to_hex_string(stored);

        prop_assert_eq!(hex.len(), numeric.byte_width * 2);
        prop_assert!(hex.chars().all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c)));
        prop_assert_eq!(numeric.from_hex_string(&hex), Ok(stored));
    }

    #[test]
    fn memory_write_then_read_returns_stored_value(
        kind in any_kind(),
        capacity in 1_usize..64,
        address_seed in any::<usize>(),
        value in -1.0e6_f64..1.0e6,
    ) {
        let numeric = NumericType::new(kind);
        let mut memory = MemoryUnit::new(numeric, capacity);
        let address = address_seed % capacity;

        prop_assert_eq!(memory.write(address, value), Ok(()));
        prop_assert_eq!(memory.read(address), Ok(numeric.coerce(value)));
        prop_assert!(memory.read(capacity).is_err());
    }

    #[test]
    fn fetch_n_times_walks_the_image(
        words in prop::collection::vec(-100_i32..100, 1..32),
        start_seed in 0_usize..8,
    ) {
        let capacity = 48;
        let mut processor = Processor::new(
            ProcessorModel::Base,
            ProcessorConfig::with_numeric(NumericKind::Int16).memory_words(capacity),
        )
        .expect("valid configuration");
        let image: Vec<f64> = words.iter().map(|word| f64::from(*word)).collect();
        processor.load_words(start_seed, &image).expect("image fits");
        processor.registers_mut().set_ip(start_seed as f64).expect("ip exists");

        let fetched: Vec<f64> = (0..image.len())
            .map(|_| processor.fetch().expect("inside image"))
            .collect();

        prop_assert_eq!(fetched, image.clone());
        prop_assert_eq!(processor.registers().ip(), (start_seed + image.len()) as f64);
    }
}

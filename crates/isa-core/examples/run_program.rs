//! Runs a small countdown program on the extended model and prints the
//! commentary of every cycle, followed by a fingerprint of the final state.
//!
//! ```sh
//! cargo run -p isa-core --example run_program
//! ```

use isa_core::{
    ExecutionRecord, NumericKind, Processor, ProcessorConfig, ProcessorModel, TraceEvent,
    ACCUMULATOR,
};
use proptest as _;
use rstest as _;
#[cfg(feature = "serde")]
use serde as _;
use thiserror as _;

// r1 = 0, acc = 13.
const PROGRAM: &[f64] = &[
    19.0, 0.0, 4.0, // 0: MOV r1, 4
    49.0, 13.0, 2.0, // 3: ADD acc, 2
    63.0, 0.0, // 6: DEC r1
    81.0, 0.0, 0.0, // 8: CMP r1, 0
    86.0, 3.0, // 11: JNE 3
    127.0, // 13: HLT
];

fn hash_bytes(hash: &mut u64, bytes: &[u8]) {
    for byte in bytes {
        *hash ^= u64::from(*byte);
        *hash = hash.wrapping_mul(0x1000_0000_01B3);
    }
}

fn fingerprint(processor: &Processor) -> String {
    let mut hash = 0xcbf2_9ce4_8422_2325_u64;
    for value in processor.registers().snapshot() {
        hash_bytes(&mut hash, &value.to_be_bytes());
    }
    hash_bytes(&mut hash, processor.memory().bytes());
    format!("{hash:016x}")
}

fn main() {
    let config = ProcessorConfig::with_numeric(NumericKind::Int16).memory_words(64);
    let mut processor =
        Processor::new(ProcessorModel::Extended, config).expect("configuration is valid");
    processor
        .load_words(0, PROGRAM)
        .expect("program fits in memory");

    let mut trace: Vec<TraceEvent> = Vec::new();
    loop {
        let mut record = ExecutionRecord::new();
        match processor.cycle_traced(&mut record, &mut trace) {
            Ok(continue_execution) => {
                println!(
                    "{:>4} {:<5} {}",
                    record.ip,
                    record.mnemonic.unwrap_or("?"),
                    record.text.as_deref().unwrap_or_default().replace('\n', " | ")
                );
                if !continue_execution {
                    break;
                }
            }
            Err(error) => {
                eprintln!("{error}");
                break;
            }
        }
    }

    println!(
        "acc = {} after {} events",
        processor
            .registers()
            .read(ACCUMULATOR)
            .expect("acc is a required register"),
        trace.len()
    );
    println!("{}", fingerprint(&processor));
}

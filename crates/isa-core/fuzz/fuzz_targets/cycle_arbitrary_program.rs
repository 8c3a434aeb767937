#![no_main]

use isa_core::{NumericKind, Processor, ProcessorConfig, ProcessorModel};
use libfuzzer_sys::fuzz_target;

const MEMORY_WORDS: usize = 64;
const CYCLE_LIMIT: u64 = 256;

fuzz_target!(|data: &[u8]| {
    let Some((&selector, image)) = data.split_first() else {
        return;
    };

    let model = if selector & 0x80 == 0 {
        ProcessorModel::Base
    } else {
        ProcessorModel::Extended
    };
    let kind = NumericKind::ALL[usize::from(selector) % NumericKind::ALL.len()];
    let config = ProcessorConfig::with_numeric(kind).memory_words(MEMORY_WORDS);
    let Ok(mut processor) = Processor::new(model, config) else {
        return;
    };
    processor.execution_config_mut().halt_on_no_op = selector & 0x40 != 0;

    let _ = processor.load_program(0, image);
    let mut trace = Vec::new();
    let _ = processor.run(CYCLE_LIMIT, &mut trace);

    let hex = processor.to_hex(processor.registers().ip());
    let _ = processor.numeric().from_hex_string(&hex);
});

//! Reference model: `NULL`, `LDR`, `HALT`.

use super::{dispatch_byte, ExecuteContext, ProcessorVariant};
use crate::isa::{BaseOpcode, InstructionSet, ProcessorModel};
use crate::{ExecutionRecord, IsaError, NumericKind, IP_REGISTER};

/// Variant implementing the reference instruction set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BaseModel;

impl ProcessorVariant for BaseModel {
    fn model(&self) -> ProcessorModel {
        ProcessorModel::Base
    }

    fn instruction_set(&self) -> InstructionSet {
        ProcessorModel::Base.instruction_set()
    }

    fn default_registers(&self) -> &'static [&'static str] {
        &["r1", "r2", "r3", "r4", "r5", "r6", "r7", "r8"]
    }

    fn required_registers(&self) -> &'static [&'static str] {
        &[IP_REGISTER]
    }

    fn default_numeric(&self) -> NumericKind {
        NumericKind::Float64
    }

    fn execute(
        &self,
        opcode: f64,
        record: &mut ExecutionRecord,
        ctx: &mut ExecuteContext<'_>,
    ) -> Result<bool, IsaError> {
        let byte = dispatch_byte(record, opcode)?;
        let Some(instruction) = BaseOpcode::from_u8(byte) else {
            return Err(ExecuteContext::unknown_opcode(record, opcode));
        };

        let continue_execution = match instruction {
            BaseOpcode::Null => {
                let halt = ctx.config.halt_on_no_op;
                ctx.comment(record, || {
                    if halt {
                        "NULL: halted programme execution".to_owned()
                    } else {
                        "Skip NULL instruction".to_owned()
                    }
                });
                !halt
            }
            BaseOpcode::Halt => {
                ctx.comment(record, || "Halt programme execution".to_owned());
                false
            }
            BaseOpcode::Ldr => {
                let register = ctx.fetch()?;
                let address = ctx.fetch()?;
                record.arguments = vec![register, address];
                let value = ctx.read_memory(address)?;
                ctx.write_register(register, value)?;
                ctx.comment(record, || {
                    format!(
                        "Load memory address {} ({}) to register {}",
                        ctx.hex(address),
                        ctx.hex(value),
                        ctx.register_label(register)
                    )
                });
                true
            }
        };

        Ok(ctx.finish(record, opcode, continue_execution))
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use crate::isa::ProcessorModel;
    use crate::{ExecutionRecord, IsaError, NumericKind, Processor, ProcessorConfig};

    fn processor(program: &[f64]) -> Processor {
        let mut processor = Processor::new(
            ProcessorModel::Base,
            ProcessorConfig::with_numeric(NumericKind::Int32).memory_words(16),
        )
        .expect("valid configuration");
        processor.load_words(0, program).expect("program fits");
        processor
    }

    #[test]
    fn ldr_loads_memory_into_register() {
        let mut processor = processor(&[16.0, 1.0, 10.0]);
        processor.memory_mut().write(10, -7.0).expect("in bounds");
        let mut record = ExecutionRecord::new();

        assert_eq!(processor.cycle(&mut record), Ok(true));

        assert_eq!(processor.registers().read("r2"), Ok(-7.0));
        assert_eq!(processor.registers().ip(), 3.0);
        assert_eq!(record.arguments, vec![1.0, 10.0]);
        assert_eq!(record.mnemonic, Some("LDR"));
        assert_eq!(
            record.argument_details,
            vec!["register: r2".to_owned(), "address: 0x0000000a".to_owned()]
        );
        assert_eq!(
            record.text.as_deref(),
            Some("Load memory address 0x0000000a (0xfffffff9) to register r2")
        );
        assert!(!record.terminate);
    }

    #[test]
    fn halt_stops_execution() {
        let mut processor = processor(&[127.0]);
        let mut record = ExecutionRecord::new();

        assert_eq!(processor.cycle(&mut record), Ok(false));
        assert!(record.terminate);
        assert_eq!(record.mnemonic, Some("HALT"));
        assert_eq!(processor.registers().ip(), 1.0);
    }

    #[rstest]
    #[case(true, false)]
    #[case(false, true)]
    fn null_follows_halt_on_no_op(#[case] halt_on_no_op: bool, #[case] continues: bool) {
        let mut processor = processor(&[]);
        processor.execution_config_mut().halt_on_no_op = halt_on_no_op;
        let mut record = ExecutionRecord::new();

        assert_eq!(processor.cycle(&mut record), Ok(continues));
        assert_eq!(record.terminate, !continues);
        assert_eq!(processor.registers().ip(), 1.0);
    }

    #[test]
    fn disabled_commentary_and_detail_leave_record_bare() {
        let mut processor = processor(&[16.0, 0.0, 5.0]);
        let config = processor.execution_config_mut();
        config.emit_commentary = false;
        config.emit_detail = false;
        let mut record = ExecutionRecord::new();

        processor.cycle(&mut record).expect("LDR succeeds");

        assert_eq!(record.text, None);
        assert_eq!(record.mnemonic, None);
        assert!(record.argument_details.is_empty());
        assert_eq!(record.arguments, vec![0.0, 5.0]);
    }

    #[test]
    fn ldr_with_invalid_register_fails_the_cycle() {
        let mut processor = processor(&[16.0, 9.0, 5.0]);
        let mut record = ExecutionRecord::new();

        let error = processor.cycle(&mut record).expect_err("index 9 is past ip");

        assert!(matches!(error.cause, IsaError::InvalidRegister { .. }));
        assert!(record.terminate);
    }

    #[test]
    fn extended_opcodes_are_unknown_to_the_base_model() {
        let mut processor = processor(&[19.0, 0.0, 5.0]);
        let mut record = ExecutionRecord::new();

        let error = processor.cycle(&mut record).expect_err("0x13 is extended only");

        assert_eq!(error.cause, IsaError::UnknownOpcode { opcode: 19.0 });
        assert_eq!(
            error.to_string(),
            "cycle: failed to complete cycle where ip = 0x0: failed to execute opcode 0x13"
        );
    }
}

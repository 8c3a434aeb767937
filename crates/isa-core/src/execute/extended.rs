//! Accumulator model: data movement, arithmetic, bitwise, compare/jump and
//! stack families.
//!
//! Operands follow the opcode inline in mnemonic order. Register operands
//! are register indices; arithmetic and bitwise results land in `acc`.
//! The stack is full-descending: `sp` starts at the memory capacity and
//! `PUSH` pre-decrements.

use super::{
    dispatch_byte, from_integer, to_integer, ArithmeticOp, BitwiseOp, CompareFlag,
    ExecuteContext, ProcessorVariant,
};
use crate::isa::{ExtendedOpcode, InstructionSet, ProcessorModel};
use crate::{ExecutionRecord, IsaError, NumericKind, IP_REGISTER};

/// Implicit destination of arithmetic and bitwise instructions.
pub const ACCUMULATOR: &str = "acc";
/// Stack pointer register.
pub const STACK_POINTER: &str = "sp";
/// Register holding the last [`CompareFlag`].
pub const COMPARE_REGISTER: &str = "cmp";

/// Variant implementing the extended instruction set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExtendedModel;

/// Second operand of a two-operand instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Operand {
    Register,
    Constant,
}

/// Condition attached to a jump.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Condition {
    Always,
    Equal,
    NotEqual,
    Less,
    Greater,
}

impl Condition {
    fn holds(self, flag: Option<CompareFlag>) -> bool {
        match self {
            Self::Always => true,
            Self::Equal => flag == Some(CompareFlag::Equal),
            Self::NotEqual => flag != Some(CompareFlag::Equal),
            Self::Less => flag == Some(CompareFlag::Less),
            Self::Greater => flag == Some(CompareFlag::Greater),
        }
    }

    const fn describe(self) -> &'static str {
        match self {
            Self::Always => "",
            Self::Equal => " if comparison is 'Equal To'",
            Self::NotEqual => " if comparison is 'Not Equal To'",
            Self::Less => " if comparison is 'Less Than'",
            Self::Greater => " if comparison is 'Greater Than'",
        }
    }
}

impl ProcessorVariant for ExtendedModel {
    fn model(&self) -> ProcessorModel {
        ProcessorModel::Extended
    }

    fn instruction_set(&self) -> InstructionSet {
        ProcessorModel::Extended.instruction_set()
    }

    fn default_registers(&self) -> &'static [&'static str] {
        &[
            "r1", "r2", "r3", "r4", "r5", "r6", "r7", "r8", "r9", "r10", "r11", "r12",
        ]
    }

    fn required_registers(&self) -> &'static [&'static str] {
        &[IP_REGISTER, ACCUMULATOR, STACK_POINTER, COMPARE_REGISTER]
    }

    fn default_numeric(&self) -> NumericKind {
        NumericKind::Float32
    }

    #[allow(clippy::cast_precision_loss)]
    fn initialise(&self, ctx: &mut ExecuteContext<'_>) -> Result<(), IsaError> {
        let top = ctx.memory.capacity() as f64;
        ctx.write_register(STACK_POINTER, top)?;
        Ok(())
    }

    fn execute(
        &self,
        opcode: f64,
        record: &mut ExecutionRecord,
        ctx: &mut ExecuteContext<'_>,
    ) -> Result<bool, IsaError> {
        let byte = dispatch_byte(record, opcode)?;
        let Some(instruction) = ExtendedOpcode::from_u8(byte) else {
            return Err(ExecuteContext::unknown_opcode(record, opcode));
        };

        let continue_execution = match instruction {
            ExtendedOpcode::Nop => {
                let halt = ctx.config.halt_on_no_op;
                ctx.comment(record, || {
                    if halt {
                        "NOP: halted programme execution".to_owned()
                    } else {
                        "Skip NOP instruction".to_owned()
                    }
                });
                !halt
            }
            ExtendedOpcode::Brk => {
                ctx.comment(record, || "Pause execution".to_owned());
                false
            }
            ExtendedOpcode::Halt => {
                ctx.comment(record, || "Halt execution".to_owned());
                false
            }
            other => {
                execute_operation(other, record, ctx)?;
                true
            }
        };

        Ok(ctx.finish(record, opcode, continue_execution))
    }
}

fn execute_operation(
    instruction: ExtendedOpcode,
    record: &mut ExecutionRecord,
    ctx: &mut ExecuteContext<'_>,
) -> Result<(), IsaError> {
    use ExtendedOpcode as Op;

    match instruction {
        Op::MovRegReg => move_register(record, ctx),
        Op::MovRegPtrReg => store_through_pointer(record, ctx),
        Op::MovRegRegPtr => load_through_pointer(record, ctx),
        Op::MovConstReg => move_constant(record, ctx),
        Op::MovAddrReg => load_address(record, ctx),
        Op::MovRegAddr => store_address(record, ctx),

        Op::AddRegReg => arithmetic(ArithmeticOp::Add, Operand::Register, record, ctx),
        Op::AddRegConst => arithmetic(ArithmeticOp::Add, Operand::Constant, record, ctx),
        Op::SubRegReg => arithmetic(ArithmeticOp::Sub, Operand::Register, record, ctx),
        Op::SubRegConst => arithmetic(ArithmeticOp::Sub, Operand::Constant, record, ctx),
        Op::MulRegReg => arithmetic(ArithmeticOp::Mul, Operand::Register, record, ctx),
        Op::MulRegConst => arithmetic(ArithmeticOp::Mul, Operand::Constant, record, ctx),
        Op::DivRegReg => arithmetic(ArithmeticOp::Div, Operand::Register, record, ctx),
        Op::DivRegConst => arithmetic(ArithmeticOp::Div, Operand::Constant, record, ctx),
        Op::IdivRegReg => arithmetic(ArithmeticOp::Idiv, Operand::Register, record, ctx),
        Op::IdivRegConst => arithmetic(ArithmeticOp::Idiv, Operand::Constant, record, ctx),
        Op::PowRegReg => arithmetic(ArithmeticOp::Pow, Operand::Register, record, ctx),
        Op::PowRegConst => arithmetic(ArithmeticOp::Pow, Operand::Constant, record, ctx),
        Op::SqrtReg => square_root(Operand::Register, record, ctx),
        Op::SqrtConst => square_root(Operand::Constant, record, ctx),
        Op::Inc => step_register(1.0, record, ctx),
        Op::Dec => step_register(-1.0, record, ctx),

        Op::AndRegReg => bitwise(BitwiseOp::And, Operand::Register, record, ctx),
        Op::AndRegConst => bitwise(BitwiseOp::And, Operand::Constant, record, ctx),
        Op::OrRegReg => bitwise(BitwiseOp::Or, Operand::Register, record, ctx),
        Op::OrRegConst => bitwise(BitwiseOp::Or, Operand::Constant, record, ctx),
        Op::XorRegReg => bitwise(BitwiseOp::Xor, Operand::Register, record, ctx),
        Op::XorRegConst => bitwise(BitwiseOp::Xor, Operand::Constant, record, ctx),
        Op::Not => bitwise_not(record, ctx),
        Op::ShlRegReg => bitwise(BitwiseOp::Shl, Operand::Register, record, ctx),
        Op::ShlRegConst => bitwise(BitwiseOp::Shl, Operand::Constant, record, ctx),
        Op::ShrRegReg => bitwise(BitwiseOp::Shr, Operand::Register, record, ctx),
        Op::ShrRegConst => bitwise(BitwiseOp::Shr, Operand::Constant, record, ctx),

        Op::CmpRegReg => compare(Operand::Register, record, ctx),
        Op::CmpRegConst => compare(Operand::Constant, record, ctx),
        Op::JmpConst => jump(Condition::Always, Operand::Constant, record, ctx),
        Op::JmpReg => jump(Condition::Always, Operand::Register, record, ctx),
        Op::JeqConst => jump(Condition::Equal, Operand::Constant, record, ctx),
        Op::JeqReg => jump(Condition::Equal, Operand::Register, record, ctx),
        Op::JneConst => jump(Condition::NotEqual, Operand::Constant, record, ctx),
        Op::JneReg => jump(Condition::NotEqual, Operand::Register, record, ctx),
        Op::JltConst => jump(Condition::Less, Operand::Constant, record, ctx),
        Op::JltReg => jump(Condition::Less, Operand::Register, record, ctx),
        Op::JgtConst => jump(Condition::Greater, Operand::Constant, record, ctx),
        Op::JgtReg => jump(Condition::Greater, Operand::Register, record, ctx),

        Op::PushConst => push(Operand::Constant, record, ctx),
        Op::PushReg => push(Operand::Register, record, ctx),
        Op::Pop => pop(record, ctx),
        Op::CallConst => call(Operand::Constant, record, ctx),
        Op::CallReg => call(Operand::Register, record, ctx),
        Op::Ret => ret(record, ctx),

        Op::Nop | Op::Brk | Op::Halt => Ok(()),
    }
}

/// Value of an operand word: the word itself or the register it selects.
fn operand_value(
    ctx: &ExecuteContext<'_>,
    operand: Operand,
    word: f64,
) -> Result<f64, IsaError> {
    match operand {
        Operand::Register => ctx.read_register(word),
        Operand::Constant => Ok(word),
    }
}

/// Commentary label of an operand word.
fn operand_label(ctx: &ExecuteContext<'_>, operand: Operand, word: f64) -> String {
    match operand {
        Operand::Register => ctx.register_label(word),
        Operand::Constant => ctx.hex(word),
    }
}

fn fetch_two(
    record: &mut ExecutionRecord,
    ctx: &mut ExecuteContext<'_>,
) -> Result<(f64, f64), IsaError> {
    let first = ctx.fetch()?;
    let second = ctx.fetch()?;
    record.arguments = vec![first, second];
    Ok((first, second))
}

fn fetch_one(record: &mut ExecutionRecord, ctx: &mut ExecuteContext<'_>) -> Result<f64, IsaError> {
    let word = ctx.fetch()?;
    record.arguments = vec![word];
    Ok(word)
}

fn move_register(
    record: &mut ExecutionRecord,
    ctx: &mut ExecuteContext<'_>,
) -> Result<(), IsaError> {
    let (destination, source) = fetch_two(record, ctx)?;
    let value = ctx.read_register(source)?;
    ctx.write_register(destination, value)?;
    ctx.comment(record, || {
        format!(
            "Copy value in register {} ({}) to register {}",
            ctx.register_label(source),
            ctx.hex(value),
            ctx.register_label(destination)
        )
    });
    Ok(())
}

fn store_through_pointer(
    record: &mut ExecutionRecord,
    ctx: &mut ExecuteContext<'_>,
) -> Result<(), IsaError> {
    let (pointer, source) = fetch_two(record, ctx)?;
    let address = ctx.read_register(pointer)?;
    let value = ctx.read_register(source)?;
    ctx.write_memory(address, value)?;
    ctx.comment(record, || {
        format!(
            "Copy value in register {} ({}) to address in register {} (address {})",
            ctx.register_label(source),
            ctx.hex(value),
            ctx.register_label(pointer),
            ctx.hex(address)
        )
    });
    Ok(())
}

fn load_through_pointer(
    record: &mut ExecutionRecord,
    ctx: &mut ExecuteContext<'_>,
) -> Result<(), IsaError> {
    let (destination, pointer) = fetch_two(record, ctx)?;
    let address = ctx.read_register(pointer)?;
    let value = ctx.read_memory(address)?;
    ctx.write_register(destination, value)?;
    ctx.comment(record, || {
        format!(
            "Copy value stored at address in register {} (address {} : {}) to register {}",
            ctx.register_label(pointer),
            ctx.hex(address),
            ctx.hex(value),
            ctx.register_label(destination)
        )
    });
    Ok(())
}

fn move_constant(
    record: &mut ExecutionRecord,
    ctx: &mut ExecuteContext<'_>,
) -> Result<(), IsaError> {
    let (destination, constant) = fetch_two(record, ctx)?;
    ctx.write_register(destination, constant)?;
    ctx.comment(record, || {
        format!(
            "Move {} to register {}",
            ctx.hex(constant),
            ctx.register_label(destination)
        )
    });
    Ok(())
}

fn load_address(
    record: &mut ExecutionRecord,
    ctx: &mut ExecuteContext<'_>,
) -> Result<(), IsaError> {
    let (destination, address) = fetch_two(record, ctx)?;
    let value = ctx.read_memory(address)?;
    ctx.write_register(destination, value)?;
    ctx.comment(record, || {
        format!(
            "Copy value at address {} ({}) to register {}",
            ctx.hex(address),
            ctx.hex(value),
            ctx.register_label(destination)
        )
    });
    Ok(())
}

fn store_address(
    record: &mut ExecutionRecord,
    ctx: &mut ExecuteContext<'_>,
) -> Result<(), IsaError> {
    let (address, source) = fetch_two(record, ctx)?;
    let value = ctx.read_register(source)?;
    ctx.write_memory(address, value)?;
    ctx.comment(record, || {
        format!(
            "Copy value in register {} ({}) to address {}",
            ctx.register_label(source),
            ctx.hex(value),
            ctx.hex(address)
        )
    });
    Ok(())
}

fn arithmetic(
    op: ArithmeticOp,
    operand: Operand,
    record: &mut ExecutionRecord,
    ctx: &mut ExecuteContext<'_>,
) -> Result<(), IsaError> {
    let (register, word) = fetch_two(record, ctx)?;
    let left = ctx.read_register(register)?;
    let right = operand_value(ctx, operand, word)?;
    let result = op.apply(left, right);
    let stored = ctx.write_register(ACCUMULATOR, result)?;
    ctx.comment(record, || {
        format!(
            "{ACCUMULATOR} = {} {symbol} {}\n{} {symbol} {} = {}",
            ctx.register_label(register),
            operand_label(ctx, operand, word),
            ctx.hex(left),
            ctx.hex(right),
            ctx.hex(stored),
            symbol = op.symbol()
        )
    });
    Ok(())
}

fn square_root(
    operand: Operand,
    record: &mut ExecutionRecord,
    ctx: &mut ExecuteContext<'_>,
) -> Result<(), IsaError> {
    let word = fetch_one(record, ctx)?;
    let value = operand_value(ctx, operand, word)?;
    let stored = ctx.write_register(ACCUMULATOR, value.sqrt())?;
    ctx.comment(record, || {
        format!(
            "{ACCUMULATOR} = sqrt({})\nsqrt({}) = {}",
            operand_label(ctx, operand, word),
            ctx.hex(value),
            ctx.hex(stored)
        )
    });
    Ok(())
}

fn step_register(
    delta: f64,
    record: &mut ExecutionRecord,
    ctx: &mut ExecuteContext<'_>,
) -> Result<(), IsaError> {
    let register = fetch_one(record, ctx)?;
    let value = ctx.read_register(register)?;
    let stored = ctx.write_register(register, value + delta)?;
    ctx.comment(record, || {
        let name = ctx.register_label(register);
        let sign = if delta < 0.0 { '-' } else { '+' };
        format!(
            "{name} = {name} {sign} 1\n{} {sign} {} = {}",
            ctx.hex(value),
            ctx.hex(1.0),
            ctx.hex(stored)
        )
    });
    Ok(())
}

fn bitwise(
    op: BitwiseOp,
    operand: Operand,
    record: &mut ExecutionRecord,
    ctx: &mut ExecuteContext<'_>,
) -> Result<(), IsaError> {
    let (register, word) = fetch_two(record, ctx)?;
    let left = ctx.read_register(register)?;
    let right = operand_value(ctx, operand, word)?;
    let result = from_integer(op.apply(to_integer(left), to_integer(right)));
    let stored = ctx.write_register(ACCUMULATOR, result)?;
    ctx.comment(record, || {
        format!(
            "{ACCUMULATOR} = {} {symbol} {}\n{} {symbol} {} = {}",
            ctx.register_label(register),
            operand_label(ctx, operand, word),
            ctx.hex(left),
            ctx.hex(right),
            ctx.hex(stored),
            symbol = op.symbol()
        )
    });
    Ok(())
}

fn bitwise_not(record: &mut ExecutionRecord, ctx: &mut ExecuteContext<'_>) -> Result<(), IsaError> {
    let register = fetch_one(record, ctx)?;
    let value = ctx.read_register(register)?;
    let stored = ctx.write_register(ACCUMULATOR, from_integer(!to_integer(value)))?;
    ctx.comment(record, || {
        format!(
            "{ACCUMULATOR} = ~{}\n~{} = {}",
            ctx.register_label(register),
            ctx.hex(value),
            ctx.hex(stored)
        )
    });
    Ok(())
}

fn compare(
    operand: Operand,
    record: &mut ExecutionRecord,
    ctx: &mut ExecuteContext<'_>,
) -> Result<(), IsaError> {
    let (register, word) = fetch_two(record, ctx)?;
    let left = ctx.read_register(register)?;
    let right = operand_value(ctx, operand, word)?;
    let flag = CompareFlag::compare(left, right);
    ctx.write_register(COMPARE_REGISTER, flag.as_word())?;
    ctx.comment(record, || {
        format!(
            "Compare {} ({}) to {} ({}): {flag:?}",
            ctx.register_label(register),
            ctx.hex(left),
            operand_label(ctx, operand, word),
            ctx.hex(right)
        )
    });
    Ok(())
}

fn jump(
    condition: Condition,
    operand: Operand,
    record: &mut ExecutionRecord,
    ctx: &mut ExecuteContext<'_>,
) -> Result<(), IsaError> {
    let word = fetch_one(record, ctx)?;
    let target = operand_value(ctx, operand, word)?;
    let flag = CompareFlag::from_word(ctx.registers.read(COMPARE_REGISTER)?);
    let taken = condition.holds(flag);
    if taken {
        ctx.registers.set_ip(target)?;
    }
    ctx.comment(record, || {
        let outcome = if taken { "" } else { " (not taken)" };
        format!(
            "Set instruction pointer to {}{}{outcome}",
            ctx.hex(target),
            condition.describe()
        )
    });
    Ok(())
}

/// Pre-decrements `sp` and stores `value` at the new top.
///
/// `sp` is only updated once the memory write succeeded.
fn push_word(ctx: &mut ExecuteContext<'_>, value: f64) -> Result<f64, IsaError> {
    let top = ctx.registers.read(STACK_POINTER)? - 1.0;
    ctx.write_memory(top, value)?;
    ctx.write_register(STACK_POINTER, top)
}

/// Reads the top of the stack and post-increments `sp`.
fn pop_word(ctx: &mut ExecuteContext<'_>) -> Result<f64, IsaError> {
    let top = ctx.registers.read(STACK_POINTER)?;
    let value = ctx.read_memory(top)?;
    ctx.write_register(STACK_POINTER, top + 1.0)?;
    Ok(value)
}

fn push(
    operand: Operand,
    record: &mut ExecutionRecord,
    ctx: &mut ExecuteContext<'_>,
) -> Result<(), IsaError> {
    let word = fetch_one(record, ctx)?;
    let value = operand_value(ctx, operand, word)?;
    let top = push_word(ctx, value)?;
    ctx.comment(record, || {
        format!(
            "Push {} ({}) to stack (sp = {})",
            operand_label(ctx, operand, word),
            ctx.hex(value),
            ctx.hex(top)
        )
    });
    Ok(())
}

fn pop(record: &mut ExecutionRecord, ctx: &mut ExecuteContext<'_>) -> Result<(), IsaError> {
    let register = fetch_one(record, ctx)?;
    ctx.registers.resolve(register)?;
    let value = pop_word(ctx)?;
    ctx.write_register(register, value)?;
    ctx.comment(record, || {
        format!(
            "Pop {} from stack to register {}",
            ctx.hex(value),
            ctx.register_label(register)
        )
    });
    Ok(())
}

fn call(
    operand: Operand,
    record: &mut ExecutionRecord,
    ctx: &mut ExecuteContext<'_>,
) -> Result<(), IsaError> {
    let word = fetch_one(record, ctx)?;
    let target = operand_value(ctx, operand, word)?;
    let return_ip = ctx.registers.ip();
    push_word(ctx, return_ip)?;
    ctx.registers.set_ip(target)?;
    ctx.comment(record, || {
        format!(
            "Call subroutine at {} (return to {})",
            ctx.hex(target),
            ctx.hex(return_ip)
        )
    });
    Ok(())
}

fn ret(record: &mut ExecutionRecord, ctx: &mut ExecuteContext<'_>) -> Result<(), IsaError> {
    record.arguments.clear();
    let return_ip = pop_word(ctx)?;
    let argument_count = pop_word(ctx)?;
    let dropped = argument_count.trunc().max(0.0);
    let top = ctx.registers.read(STACK_POINTER)?;
    ctx.write_register(STACK_POINTER, top + dropped)?;
    ctx.registers.set_ip(return_ip)?;
    ctx.comment(record, || {
        format!(
            "Return from subroutine to {} (dropped {} argument words)",
            ctx.hex(return_ip),
            ctx.hex(dropped)
        )
    });
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use rstest::rstest;

    use super::{ACCUMULATOR, COMPARE_REGISTER, STACK_POINTER};
    use crate::isa::ProcessorModel;
    use crate::{ExecutionRecord, IsaError, NumericKind, Processor, ProcessorConfig, StopReason};

    // Register indices of the default extended map.
    const R1: f64 = 0.0;
    const R2: f64 = 1.0;
    const R3: f64 = 2.0;
    const ACC: f64 = 13.0;

    fn extended(kind: NumericKind, capacity: usize, program: &[f64]) -> Processor {
        let mut processor = Processor::new(
            ProcessorModel::Extended,
            ProcessorConfig::with_numeric(kind).memory_words(capacity),
        )
        .expect("valid configuration");
        processor.load_words(0, program).expect("program fits");
        processor
    }

    fn run(processor: &mut Processor) {
        let mut trace = Vec::new();
        let outcome = processor.run(1_000, &mut trace).expect("program runs");
        assert_eq!(outcome.stop, StopReason::Terminated);
    }

    fn reg(processor: &Processor, name: &str) -> f64 {
        processor.registers().read(name).expect("register exists")
    }

    #[test]
    fn register_map_appends_required_registers() {
        let processor = extended(NumericKind::Float32, 16, &[]);
        let names = processor.registers().names();
        assert_eq!(names.len(), 16);
        assert_eq!(&names[12..], ["ip", "acc", "sp", "cmp"]);
        assert_eq!(reg(&processor, STACK_POINTER), 16.0);
    }

    #[test]
    fn accumulator_program_computes_eight() {
        let mut processor = extended(
            NumericKind::Int32,
            16,
            &[19.0, R1, 5.0, 19.0, R2, 3.0, 48.0, ACC, R1, 49.0, ACC, 3.0, 127.0],
        );

        run(&mut processor);

        assert_eq!(reg(&processor, ACCUMULATOR), 8.0);
        assert_eq!(processor.registers().ip(), 13.0);
    }

    #[rstest]
    #[case(0x30, 7.0, 2.0, 9.0)]
    #[case(0x32, 7.0, 2.0, 5.0)]
    #[case(0x34, 7.0, 2.0, 14.0)]
    #[case(0x36, 7.0, 2.0, 3.5)]
    #[case(0x38, 7.0, 2.0, 3.0)]
    #[case(0x3A, 3.0, 4.0, 81.0)]
    #[case(0x40, 12.0, 10.0, 8.0)]
    #[case(0x42, 12.0, 10.0, 14.0)]
    #[case(0x44, 12.0, 10.0, 6.0)]
    #[case(0x47, 3.0, 2.0, 12.0)]
    #[case(0x49, -16.0, 2.0, -4.0)]
    fn register_register_forms_write_acc(
        #[case] opcode: u8,
        #[case] left: f64,
        #[case] right: f64,
        #[case] expected: f64,
    ) {
        let mut processor = extended(NumericKind::Float64, 32, &[f64::from(opcode), R1, R2, 127.0]);
        processor.registers_mut().write("r1", left).expect("r1 exists");
        processor.registers_mut().write("r2", right).expect("r2 exists");

        run(&mut processor);

        assert_eq!(reg(&processor, ACCUMULATOR), expected);
        assert_eq!(reg(&processor, "r1"), left);
    }

    #[rstest]
    #[case(0x31, 7.0, 2.0, 9.0)]
    #[case(0x33, 7.0, 2.0, 5.0)]
    #[case(0x35, 7.0, 2.0, 14.0)]
    #[case(0x37, 7.0, 2.0, 3.5)]
    #[case(0x39, -7.0, 2.0, -3.0)]
    #[case(0x3B, 2.0, 10.0, 1024.0)]
    #[case(0x41, 12.0, 10.0, 8.0)]
    #[case(0x43, 12.0, 10.0, 14.0)]
    #[case(0x45, 12.0, 10.0, 6.0)]
    #[case(0x48, 1.0, 70.0, -(2.0_f64.powi(63)))]
    #[case(0x4A, 9.0, 1.0, 4.0)]
    fn register_constant_forms_write_acc(
        #[case] opcode: u8,
        #[case] left: f64,
        #[case] constant: f64,
        #[case] expected: f64,
    ) {
        let mut processor =
            extended(NumericKind::Float64, 32, &[f64::from(opcode), R1, constant, 127.0]);
        processor.registers_mut().write("r1", left).expect("r1 exists");

        run(&mut processor);

        assert_eq!(reg(&processor, ACCUMULATOR), expected);
    }

    #[test]
    fn square_root_and_not_write_acc() {
        let mut processor = extended(NumericKind::Float64, 32, &[61.0, 81.0, 127.0]);
        run(&mut processor);
        assert_eq!(reg(&processor, ACCUMULATOR), 9.0);

        let mut processor = extended(NumericKind::Int32, 32, &[60.0, R1, 70.0, R1, 127.0]);
        processor.registers_mut().write("r1", 16.0).expect("r1 exists");
        run(&mut processor);
        assert_eq!(reg(&processor, ACCUMULATOR), -17.0);
    }

    #[test]
    fn inc_and_dec_modify_register_in_place() {
        let mut processor = extended(NumericKind::Int8, 32, &[62.0, R3, 62.0, R3, 63.0, R1, 127.0]);
        processor.registers_mut().write("r3", 127.0).expect("r3 exists");

        run(&mut processor);

        assert_eq!(reg(&processor, "r3"), -127.0);
        assert_eq!(reg(&processor, "r1"), -1.0);
        assert_eq!(reg(&processor, ACCUMULATOR), 0.0);
    }

    #[test]
    fn narrow_types_truncate_only_on_write_back() {
        // (100 * 3) / 2 in int8: 300 wraps to 44 before the division.
        let mut processor = extended(
            NumericKind::Int8,
            32,
            &[19.0, R1, 100.0, 53.0, R1, 3.0, 55.0, ACC, 2.0, 127.0],
        );

        run(&mut processor);

        assert_eq!(reg(&processor, ACCUMULATOR), 22.0);
    }

    #[test]
    fn mov_family_moves_between_registers_and_memory() {
        let mut processor = extended(
            NumericKind::Int16,
            32,
            &[
                19.0, R1, 28.0, // r1 = 28 (pointer)
                19.0, R2, 1234.0, // r2 = 1234
                17.0, R1, R2, // [r1] = r2
                18.0, R3, R1, // r3 = [r1]
                21.0, 29.0, R3, // [29] = r3
                20.0, R1, 29.0, // r1 = [29]
                16.0, ACC, R1, // acc = r1
                127.0,
            ],
        );

        run(&mut processor);

        assert_eq!(processor.memory().read(28), Ok(1234.0));
        assert_eq!(processor.memory().read(29), Ok(1234.0));
        assert_eq!(reg(&processor, "r3"), 1234.0);
        assert_eq!(reg(&processor, ACCUMULATOR), 1234.0);
    }

    #[rstest]
    #[case(5.0, 0.0)]
    #[case(3.0, 1.0)]
    #[case(8.0, 2.0)]
    fn compare_sets_flag_register(#[case] value: f64, #[case] flag: f64) {
        let mut processor = extended(NumericKind::Int32, 32, &[81.0, R1, 5.0, 127.0]);
        processor.registers_mut().write("r1", value).expect("r1 exists");

        run(&mut processor);

        assert_eq!(reg(&processor, COMPARE_REGISTER), flag);
    }

    #[test]
    fn conditional_jumps_build_a_counting_loop() {
        // r1 = 0; loop: inc r1; cmp r1, 5; jlt loop; halt
        let mut processor = extended(
            NumericKind::Int32,
            32,
            &[19.0, R1, 0.0, 62.0, R1, 81.0, R1, 5.0, 89.0, 3.0, 127.0],
        );

        run(&mut processor);

        assert_eq!(reg(&processor, "r1"), 5.0);
        assert_eq!(reg(&processor, COMPARE_REGISTER), 0.0);
        assert_eq!(processor.registers().ip(), 11.0);
    }

    #[rstest]
    #[case(0x54, 0.0, true)]
    #[case(0x54, 1.0, false)]
    #[case(0x56, 1.0, true)]
    #[case(0x56, 0.0, false)]
    #[case(0x5B, 2.0, true)]
    #[case(0x5B, 3.0, false)]
    fn jump_taken_only_when_condition_holds(
        #[case] opcode: u8,
        #[case] flag: f64,
        #[case] taken: bool,
    ) {
        let mut processor = extended(NumericKind::Int32, 32, &[f64::from(opcode), 20.0]);
        processor.registers_mut().write("cmp", flag).expect("cmp exists");
        let mut record = ExecutionRecord::new();

        assert_eq!(processor.cycle(&mut record), Ok(true));

        let expected_ip = if taken { 20.0 } else { 2.0 };
        assert_eq!(processor.registers().ip(), expected_ip);
    }

    #[test]
    fn push_and_pop_use_a_descending_stack() {
        let mut processor = extended(
            NumericKind::Int32,
            16,
            &[96.0, 7.0, 19.0, R1, 9.0, 97.0, R1, 98.0, R2, 98.0, R3, 127.0],
        );

        run(&mut processor);

        assert_eq!(reg(&processor, "r2"), 9.0);
        assert_eq!(reg(&processor, "r3"), 7.0);
        assert_eq!(reg(&processor, STACK_POINTER), 16.0);
        assert_eq!(processor.memory().read(15), Ok(7.0));
        assert_eq!(processor.memory().read(14), Ok(9.0));
    }

    #[test]
    fn call_and_ret_drop_pushed_arguments() {
        // push 11; push 1 (argc); call 20; halt
        // 20: r1 = 99; ret
        let mut program = vec![0.0; 24];
        program[..7].copy_from_slice(&[96.0, 11.0, 96.0, 1.0, 99.0, 20.0, 127.0]);
        program[20..24].copy_from_slice(&[19.0, R1, 99.0, 101.0]);
        let mut processor = extended(NumericKind::Int32, 32, &program);

        run(&mut processor);

        assert_eq!(reg(&processor, "r1"), 99.0);
        assert_eq!(reg(&processor, STACK_POINTER), 32.0);
        assert_eq!(processor.registers().ip(), 7.0);
    }

    #[test]
    fn pop_from_empty_stack_faults() {
        let mut processor = extended(NumericKind::Int32, 8, &[98.0, R1]);
        let mut record = ExecutionRecord::new();

        let error = processor.cycle(&mut record).expect_err("stack is empty");

        assert!(matches!(error.cause, IsaError::MemoryAccess { .. }));
        assert_eq!(reg(&processor, STACK_POINTER), 8.0);
    }

    #[test]
    fn brk_pauses_and_cycle_resumes() {
        let mut processor = extended(NumericKind::Int32, 8, &[126.0, 62.0, R1, 127.0]);
        let mut record = ExecutionRecord::new();

        assert_eq!(processor.cycle(&mut record), Ok(false));
        assert!(record.terminate);
        assert_eq!(record.mnemonic, Some("BRK"));

        run(&mut processor);
        assert_eq!(reg(&processor, "r1"), 1.0);
    }

    #[test]
    fn commentary_describes_accumulator_arithmetic() {
        let mut processor = extended(NumericKind::Int16, 8, &[49.0, R1, 3.0]);
        processor.registers_mut().write("r1", 5.0).expect("r1 exists");
        let mut record = ExecutionRecord::new();

        processor.cycle(&mut record).expect("ADD succeeds");

        assert_eq!(
            record.text.as_deref(),
            Some("acc = r1 + 0x0003\n0x0005 + 0x0003 = 0x0008")
        );
        assert_eq!(record.mnemonic, Some("ADD"));
        assert_eq!(
            record.argument_details,
            vec!["register: r1".to_owned(), "constant: 0x0003".to_owned()]
        );
    }

    #[test]
    fn register_observer_sees_every_write_of_a_cycle() {
        let mut processor = extended(NumericKind::Int32, 8, &[19.0, R1, 5.0]);
        let writes = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&writes);
        processor.on_register_write(move |index, value, _| sink.borrow_mut().push((index, value)));
        let mut record = ExecutionRecord::new();

        processor.cycle(&mut record).expect("MOV succeeds");

        assert_eq!(*writes.borrow(), vec![(12, 1.0), (12, 2.0), (12, 3.0), (0, 5.0)]);
    }

    #[test]
    fn reset_restores_stack_pointer() {
        let mut processor = extended(NumericKind::Int32, 8, &[96.0, 1.0, 127.0]);
        run(&mut processor);
        assert_eq!(reg(&processor, STACK_POINTER), 7.0);

        processor.reset().expect("reset succeeds");

        assert_eq!(reg(&processor, STACK_POINTER), 8.0);
        assert_eq!(processor.registers().ip(), 0.0);
    }
}

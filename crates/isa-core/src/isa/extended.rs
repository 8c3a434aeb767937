//! Accumulator instruction set of the extended model.
//!
//! Opcodes are grouped by high nibble: `0x1-` data movement, `0x3-`
//! arithmetic, `0x4-` bitwise, `0x5-` compare and jump, `0x6-` stack and
//! subroutines, `0x7E`/`0x7F` break and halt.

use super::ArgumentType::{self, Address, Constant, Register, RegisterPointer};
use super::InstructionMetadata;

/// Opcodes of the extended model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
#[allow(missing_docs)]
pub enum ExtendedOpcode {
    Nop = 0x00,

    MovRegReg = 0x10,
    MovRegPtrReg = 0x11,
    MovRegRegPtr = 0x12,
    MovConstReg = 0x13,
    MovAddrReg = 0x14,
    MovRegAddr = 0x15,

    AddRegReg = 0x30,
    AddRegConst = 0x31,
    SubRegReg = 0x32,
    SubRegConst = 0x33,
    MulRegReg = 0x34,
    MulRegConst = 0x35,
    DivRegReg = 0x36,
    DivRegConst = 0x37,
    IdivRegReg = 0x38,
    IdivRegConst = 0x39,
    PowRegReg = 0x3A,
    PowRegConst = 0x3B,
    SqrtReg = 0x3C,
    SqrtConst = 0x3D,
    Inc = 0x3E,
    Dec = 0x3F,

    AndRegReg = 0x40,
    AndRegConst = 0x41,
    OrRegReg = 0x42,
    OrRegConst = 0x43,
    XorRegReg = 0x44,
    XorRegConst = 0x45,
    Not = 0x46,
    ShlRegReg = 0x47,
    ShlRegConst = 0x48,
    ShrRegReg = 0x49,
    ShrRegConst = 0x4A,

    CmpRegReg = 0x50,
    CmpRegConst = 0x51,
    JmpConst = 0x52,
    JmpReg = 0x53,
    JeqConst = 0x54,
    JeqReg = 0x55,
    JneConst = 0x56,
    JneReg = 0x57,
    JltReg = 0x58,
    JltConst = 0x59,
    JgtReg = 0x5A,
    JgtConst = 0x5B,

    PushConst = 0x60,
    PushReg = 0x61,
    Pop = 0x62,
    CallConst = 0x63,
    CallReg = 0x64,
    Ret = 0x65,

    Brk = 0x7E,
    Halt = 0x7F,
}

impl ExtendedOpcode {
    /// Converts an opcode byte into an assigned extended opcode.
    #[must_use]
    pub const fn from_u8(opcode: u8) -> Option<Self> {
        let decoded = match opcode {
            0x00 => Self::Nop,
            0x10 => Self::MovRegReg,
            0x11 => Self::MovRegPtrReg,
            0x12 => Self::MovRegRegPtr,
            0x13 => Self::MovConstReg,
            0x14 => Self::MovAddrReg,
            0x15 => Self::MovRegAddr,
            0x30 => Self::AddRegReg,
            0x31 => Self::AddRegConst,
            0x32 => Self::SubRegReg,
            0x33 => Self::SubRegConst,
            0x34 => Self::MulRegReg,
            0x35 => Self::MulRegConst,
            0x36 => Self::DivRegReg,
            0x37 => Self::DivRegConst,
            0x38 => Self::IdivRegReg,
            0x39 => Self::IdivRegConst,
            0x3A => Self::PowRegReg,
            0x3B => Self::PowRegConst,
            0x3C => Self::SqrtReg,
            0x3D => Self::SqrtConst,
            0x3E => Self::Inc,
            0x3F => Self::Dec,
            0x40 => Self::AndRegReg,
            0x41 => Self::AndRegConst,
            0x42 => Self::OrRegReg,
            0x43 => Self::OrRegConst,
            0x44 => Self::XorRegReg,
            0x45 => Self::XorRegConst,
            0x46 => Self::Not,
            0x47 => Self::ShlRegReg,
            0x48 => Self::ShlRegConst,
            0x49 => Self::ShrRegReg,
            0x4A => Self::ShrRegConst,
            0x50 => Self::CmpRegReg,
            0x51 => Self::CmpRegConst,
            0x52 => Self::JmpConst,
            0x53 => Self::JmpReg,
            0x54 => Self::JeqConst,
            0x55 => Self::JeqReg,
            0x56 => Self::JneConst,
            0x57 => Self::JneReg,
            0x58 => Self::JltReg,
            0x59 => Self::JltConst,
            0x5A => Self::JgtReg,
            0x5B => Self::JgtConst,
            0x60 => Self::PushConst,
            0x61 => Self::PushReg,
            0x62 => Self::Pop,
            0x63 => Self::CallConst,
            0x64 => Self::CallReg,
            0x65 => Self::Ret,
            0x7E => Self::Brk,
            0x7F => Self::Halt,
            _ => return None,
        };
        Some(decoded)
    }
}

const fn row(
    name: &'static str,
    mnemonic: &'static str,
    opcode: ExtendedOpcode,
    arguments: &'static [ArgumentType],
    description: &'static str,
    accepts_type_suffix: bool,
) -> InstructionMetadata {
    InstructionMetadata {
        name,
        mnemonic,
        opcode: opcode as u8,
        arguments,
        description,
        accepts_type_suffix,
        in_reference_set: false,
    }
}

/// Metadata rows of the extended model.
pub const EXTENDED_INSTRUCTIONS: &[InstructionMetadata] = &[
    row("NOP", "NOP", ExtendedOpcode::Nop, &[], "No operation - skip or halt", false),
    // Data movement.
    row(
        "MOV_REG_REG",
        "MOV",
        ExtendedOpcode::MovRegReg,
        &[Register, Register],
        "Copy contents of [register2] to [register1]",
        false,
    ),
    row(
        "MOV_REGPTR_REG",
        "MOV",
        ExtendedOpcode::MovRegPtrReg,
        &[RegisterPointer, Register],
        "Move value stored in register [register] to the address stored in [registerPtr]",
        false,
    ),
    row(
        "MOV_REG_REGPTR",
        "MOV",
        ExtendedOpcode::MovRegRegPtr,
        &[Register, RegisterPointer],
        "Move value stored at address in register [registerPtr] to register [register]",
        true,
    ),
    row(
        "MOV_CONST_REG",
        "MOV",
        ExtendedOpcode::MovConstReg,
        &[Register, Constant],
        "Move constant [constant] to [register]",
        true,
    ),
    row(
        "MOV_ADDR_REG",
        "MOV",
        ExtendedOpcode::MovAddrReg,
        &[Register, Address],
        "Move value at address [address] to [register]",
        true,
    ),
    row(
        "MOV_REG_ADDR",
        "MOV",
        ExtendedOpcode::MovRegAddr,
        &[Address, Register],
        "Move value in register [register] to [address]",
        false,
    ),
    // Arithmetic.
    row(
        "ADD_REG_REG",
        "ADD",
        ExtendedOpcode::AddRegReg,
        &[Register, Register],
        "Store register1 + register2 in acc",
        false,
    ),
    row(
        "ADD_REG_CONST",
        "ADD",
        ExtendedOpcode::AddRegConst,
        &[Register, Constant],
        "Store register + constant in acc",
        true,
    ),
    row(
        "SUB_REG_REG",
        "SUB",
        ExtendedOpcode::SubRegReg,
        &[Register, Register],
        "Store register1 - register2 in acc",
        false,
    ),
    row(
        "SUB_REG_CONST",
        "SUB",
        ExtendedOpcode::SubRegConst,
        &[Register, Constant],
        "Store register - constant in acc",
        true,
    ),
    row(
        "MUL_REG_REG",
        "MUL",
        ExtendedOpcode::MulRegReg,
        &[Register, Register],
        "Store register1 * register2 in acc",
        false,
    ),
    row(
        "MUL_REG_CONST",
        "MUL",
        ExtendedOpcode::MulRegConst,
        &[Register, Constant],
        "Store register * constant in acc",
        true,
    ),
    row(
        "DIV_REG_REG",
        "DIV",
        ExtendedOpcode::DivRegReg,
        &[Register, Register],
        "Store register1 / register2 in acc",
        false,
    ),
    row(
        "DIV_REG_CONST",
        "DIV",
        ExtendedOpcode::DivRegConst,
        &[Register, Constant],
        "Store register1 / constant in acc",
        true,
    ),
    row(
        "IDIV_REG_REG",
        "IDIV",
        ExtendedOpcode::IdivRegReg,
        &[Register, Register],
        "Store integer (register1 / register2) in acc",
        false,
    ),
    row(
        "IDIV_REG_CONST",
        "IDIV",
        ExtendedOpcode::IdivRegConst,
        &[Register, Constant],
        "Store integer (register1 / constant) in acc",
        true,
    ),
    row(
        "POW_REG_REG",
        "POW",
        ExtendedOpcode::PowRegReg,
        &[Register, Register],
        "Store pow(register1, register2) in acc",
        false,
    ),
    row(
        "POW_REG_CONST",
        "POW",
        ExtendedOpcode::PowRegConst,
        &[Register, Constant],
        "Store pow(register, constant) in acc",
        true,
    ),
    row(
        "SQRT_REG",
        "SQRT",
        ExtendedOpcode::SqrtReg,
        &[Register],
        "Calculate square root of contents of [register]",
        false,
    ),
    row(
        "SQRT_CONST",
        "SQRT",
        ExtendedOpcode::SqrtConst,
        &[Constant],
        "Calculate square root of contents of [constant]",
        true,
    ),
    row(
        "INC",
        "INC",
        ExtendedOpcode::Inc,
        &[Register],
        "Increment (+1) register [register]",
        false,
    ),
    row(
        "DEC",
        "DEC",
        ExtendedOpcode::Dec,
        &[Register],
        "Decrement (-1) register [register]",
        false,
    ),
    // Bitwise.
    row(
        "AND_REG_REG",
        "AND",
        ExtendedOpcode::AndRegReg,
        &[Register, Register],
        "Bitwise and between two registers and move to acc",
        false,
    ),
    row(
        "AND_REG_CONST",
        "AND",
        ExtendedOpcode::AndRegConst,
        &[Register, Constant],
        "Bitwise and [register] and [constant] and move to acc",
        true,
    ),
    row(
        "OR_REG_REG",
        "OR",
        ExtendedOpcode::OrRegReg,
        &[Register, Register],
        "Bitwise or between two registers and move to acc",
        false,
    ),
    row(
        "OR_REG_CONST",
        "OR",
        ExtendedOpcode::OrRegConst,
        &[Register, Constant],
        "Bitwise or [register] and [constant] and move to acc",
        true,
    ),
    row(
        "XOR_REG_REG",
        "XOR",
        ExtendedOpcode::XorRegReg,
        &[Register, Register],
        "Bitwise xor between two registers and move to acc",
        false,
    ),
    row(
        "XOR_REG_CONST",
        "XOR",
        ExtendedOpcode::XorRegConst,
        &[Register, Constant],
        "Bitwise xor [register] and [constant] and move to acc",
        true,
    ),
    row(
        "NOT",
        "NOT",
        ExtendedOpcode::Not,
        &[Register],
        "Bitwise not register [register] and move to acc",
        false,
    ),
    row(
        "SHL_REG_REG",
        "SHL",
        ExtendedOpcode::ShlRegReg,
        &[Register, Register],
        "Left shift [register1] by [register2]",
        false,
    ),
    row(
        "SHL_REG_CONST",
        "SHL",
        ExtendedOpcode::ShlRegConst,
        &[Register, Constant],
        "Left shift [register1] by [constant]",
        true,
    ),
    row(
        "SHR_REG_REG",
        "SHR",
        ExtendedOpcode::ShrRegReg,
        &[Register, Register],
        "Right shift [register1] by [register2]",
        false,
    ),
    row(
        "SHR_REG_CONST",
        "SHR",
        ExtendedOpcode::ShrRegConst,
        &[Register, Constant],
        "Right shift [register1] by [constant]",
        true,
    ),
    // Compare and jump.
    row(
        "CMP_REG_REG",
        "CMP",
        ExtendedOpcode::CmpRegReg,
        &[Register, Register],
        "Compare register [register1] to [register2]. Set flag in cmp register.",
        true,
    ),
    row(
        "CMP_REG_CONST",
        "CMP",
        ExtendedOpcode::CmpRegConst,
        &[Register, Constant],
        "Compare register [register1] to [constant]. Set flag in cmp register.",
        true,
    ),
    row(
        "JMP_CONST",
        "JMP",
        ExtendedOpcode::JmpConst,
        &[Constant],
        "Set instruction pointer to constant [constant]",
        true,
    ),
    row(
        "JMP_REG",
        "JMP",
        ExtendedOpcode::JmpReg,
        &[Register],
        "Set instruction pointer to register [register]",
        true,
    ),
    row(
        "JEQ_CONST",
        "JEQ",
        ExtendedOpcode::JeqConst,
        &[Constant],
        "Set instruction pointer to constant [constant] if comparison is 'Equal To'",
        true,
    ),
    row(
        "JEQ_REG",
        "JEQ",
        ExtendedOpcode::JeqReg,
        &[Register],
        "Set instruction pointer to register [register] if comparison is 'Equal To'",
        true,
    ),
    row(
        "JNE_CONST",
        "JNE",
        ExtendedOpcode::JneConst,
        &[Constant],
        "Set instruction pointer to constant [constant] if comparison is 'Not Equal To'",
        true,
    ),
    row(
        "JNE_REG",
        "JNE",
        ExtendedOpcode::JneReg,
        &[Register],
        "Set instruction pointer to register [register] if comparison is 'Not Equal To'",
        true,
    ),
    row(
        "JLT_REG",
        "JLT",
        ExtendedOpcode::JltReg,
        &[Register],
        "Set instruction pointer to register [register] if comparison is 'Less Than'",
        true,
    ),
    row(
        "JLT_CONST",
        "JLT",
        ExtendedOpcode::JltConst,
        &[Constant],
        "Set instruction pointer to constant [constant] if comparison is 'Less Than'",
        true,
    ),
    row(
        "JGT_REG",
        "JGT",
        ExtendedOpcode::JgtReg,
        &[Register],
        "Set instruction pointer to register [register] if comparison is 'Greater Than'",
        true,
    ),
    row(
        "JGT_CONST",
        "JGT",
        ExtendedOpcode::JgtConst,
        &[Constant],
        "Set instruction pointer to constant [constant] if comparison is 'Greater Than'",
        true,
    ),
    // Stack and subroutines.
    row(
        "PUSH_CONST",
        "PUSH",
        ExtendedOpcode::PushConst,
        &[Constant],
        "Push [constant] to stack",
        true,
    ),
    row(
        "PUSH_REG",
        "PUSH",
        ExtendedOpcode::PushReg,
        &[Register],
        "Push register [register] to stack",
        true,
    ),
    row(
        "POP",
        "POP",
        ExtendedOpcode::Pop,
        &[Register],
        "Pop value from stack and store in [register]",
        true,
    ),
    row(
        "CALL_CONST",
        "CALL",
        ExtendedOpcode::CallConst,
        &[Constant],
        "Call subroutine at memory address [constant] (NB number of arguments MUST be pushed before CALL)",
        true,
    ),
    row(
        "CALL_REG",
        "CALL",
        ExtendedOpcode::CallReg,
        &[Register],
        "Call subroutine at register [register] (NB number of arguments MUST be pushed before CALL)",
        true,
    ),
    row(
        "RET",
        "RET",
        ExtendedOpcode::Ret,
        &[],
        "Return from subroutine (used after CALL)",
        false,
    ),
    row("BRK", "BRK", ExtendedOpcode::Brk, &[], "Pause execution", false),
    row("HALT", "HLT", ExtendedOpcode::Halt, &[], "Stop execution", false),
];

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::{ExtendedOpcode, EXTENDED_INSTRUCTIONS};
    use crate::isa::ArgumentType;

    #[test]
    fn every_row_maps_to_an_assigned_opcode() {
        for row in EXTENDED_INSTRUCTIONS {
            let opcode = ExtendedOpcode::from_u8(row.opcode).expect("row opcode is assigned");
            assert_eq!(opcode as u8, row.opcode, "{}", row.name);
        }
    }

    #[test]
    fn every_assigned_opcode_has_a_row() {
        let assigned = (0..=u8::MAX)
            .filter(|byte| ExtendedOpcode::from_u8(*byte).is_some())
            .count();
        assert_eq!(assigned, EXTENDED_INSTRUCTIONS.len());
    }

    #[rstest]
    #[case(0x13, "MOV_CONST_REG", &[ArgumentType::Register, ArgumentType::Constant])]
    #[case(0x11, "MOV_REGPTR_REG", &[ArgumentType::RegisterPointer, ArgumentType::Register])]
    #[case(0x3D, "SQRT_CONST", &[ArgumentType::Constant])]
    #[case(0x65, "RET", &[])]
    fn selected_rows_have_expected_shape(
        #[case] opcode: u8,
        #[case] name: &str,
        #[case] arguments: &[ArgumentType],
    ) {
        let row = EXTENDED_INSTRUCTIONS
            .iter()
            .find(|row| row.opcode == opcode)
            .expect("row exists");
        assert_eq!(row.name, name);
        assert_eq!(row.arguments, arguments);
    }

    #[test]
    fn extended_rows_are_outside_the_reference_set() {
        assert!(EXTENDED_INSTRUCTIONS.iter().all(|row| !row.in_reference_set));
    }

    #[test]
    fn halt_uses_short_mnemonic() {
        let halt = EXTENDED_INSTRUCTIONS
            .iter()
            .find(|row| row.name == "HALT")
            .expect("halt row exists");
        assert_eq!(halt.mnemonic, "HLT");
        assert_eq!(halt.opcode, 0x7F);
    }
}

//! Reference instruction set: `NULL`, `LDR`, `HALT`.

use super::{ArgumentType, InstructionMetadata};

/// Opcodes of the base model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
#[allow(missing_docs)]
pub enum BaseOpcode {
    Null = 0x00,
    Ldr = 0x10,
    Halt = 0x7F,
}

impl BaseOpcode {
    /// Converts an opcode byte into an assigned base opcode.
    #[must_use]
    pub const fn from_u8(opcode: u8) -> Option<Self> {
        match opcode {
            0x00 => Some(Self::Null),
            0x10 => Some(Self::Ldr),
            0x7F => Some(Self::Halt),
            _ => None,
        }
    }
}

/// Metadata rows of the base model.
pub const BASE_INSTRUCTIONS: &[InstructionMetadata] = &[
    InstructionMetadata {
        name: "NULL",
        mnemonic: "NULL",
        opcode: BaseOpcode::Null as u8,
        arguments: &[],
        description: "No operation - skip or halt",
        accepts_type_suffix: false,
        in_reference_set: true,
    },
    InstructionMetadata {
        name: "LDR",
        mnemonic: "LDR",
        opcode: BaseOpcode::Ldr as u8,
        arguments: &[ArgumentType::Register, ArgumentType::Address],
        description: "Load the value stored at memory address [address] into register [register]",
        accepts_type_suffix: false,
        in_reference_set: true,
    },
    InstructionMetadata {
        name: "HALT",
        mnemonic: "HALT",
        opcode: BaseOpcode::Halt as u8,
        arguments: &[],
        description: "Stop execution",
        accepts_type_suffix: false,
        in_reference_set: true,
    },
];

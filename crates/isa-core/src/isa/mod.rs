//! Instruction-set tables shared by the processor core and external tooling.
//!
//! Each processor model publishes one static list of
//! [`InstructionMetadata`] rows. The opcode table used for dispatch is
//! derived from the same rows, so table and metadata always agree.

use std::fmt;

pub mod base;
pub mod extended;

pub use base::{BaseOpcode, BASE_INSTRUCTIONS};
pub use extended::{ExtendedOpcode, EXTENDED_INSTRUCTIONS};

/// Operand kinds encoded inline after an opcode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum ArgumentType {
    /// Register index.
    Register,
    /// Register index whose value is used as a memory address.
    RegisterPointer,
    /// Memory address.
    Address,
    /// Literal word.
    Constant,
    /// Assembler label or variable, resolved before loading.
    Symbol,
}

impl ArgumentType {
    /// Lowercase label used in detail strings.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Register => "register",
            Self::RegisterPointer => "registerPtr",
            Self::Address => "address",
            Self::Constant => "constant",
            Self::Symbol => "symbol",
        }
    }
}

impl fmt::Display for ArgumentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Assembler- and documentation-facing description of one instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct InstructionMetadata {
    /// Unique symbolic name, e.g. `MOV_CONST_REG`.
    pub name: &'static str,
    /// Assembly mnemonic; several rows may share one.
    pub mnemonic: &'static str,
    /// Opcode word value.
    pub opcode: u8,
    /// Operand kinds in encoding order.
    pub arguments: &'static [ArgumentType],
    /// Human-readable description.
    pub description: &'static str,
    /// Whether the assembler accepts a numeric-type suffix on this form.
    pub accepts_type_suffix: bool,
    /// Whether the row belongs to the published reference instruction set.
    pub in_reference_set: bool,
}

/// Built-in processor models.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum ProcessorModel {
    /// Minimal reference model: `NULL`, `LDR`, `HALT`.
    Base,
    /// Accumulator model with arithmetic, bitwise, jump and stack families.
    Extended,
}

impl ProcessorModel {
    /// Display name of the model.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Base => "AQA ARM",
            Self::Extended => "RS",
        }
    }

    /// Instruction set bound to the model.
    #[must_use]
    pub const fn instruction_set(self) -> InstructionSet {
        match self {
            Self::Base => InstructionSet::new(BASE_INSTRUCTIONS),
            Self::Extended => InstructionSet::new(EXTENDED_INSTRUCTIONS),
        }
    }
}

impl fmt::Display for ProcessorModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Read-only view over a static instruction table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InstructionSet {
    rows: &'static [InstructionMetadata],
}

impl InstructionSet {
    /// Wraps a static row list.
    #[must_use]
    pub const fn new(rows: &'static [InstructionMetadata]) -> Self {
        Self { rows }
    }

    /// All rows in declaration order.
    #[must_use]
    pub const fn rows(&self) -> &'static [InstructionMetadata] {
        self.rows
    }

    /// Number of instructions.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.rows.len()
    }

    /// `true` when the table holds no instructions.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Iterates rows in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &'static InstructionMetadata> {
        self.rows.iter()
    }

    /// Opcode for a symbolic name.
    #[must_use]
    pub fn opcode(&self, name: &str) -> Option<u8> {
        self.rows
            .iter()
            .find(|row| row.name == name)
            .map(|row| row.opcode)
    }

    /// Row for a fetched opcode word.
    ///
    /// Fractional, negative and out-of-range words never match.
    #[must_use]
    pub fn lookup(&self, opcode: f64) -> Option<&'static InstructionMetadata> {
        let opcode = opcode_byte(opcode)?;
        self.rows.iter().find(|row| row.opcode == opcode)
    }

    /// Rows sharing an assembly mnemonic, in declaration order.
    pub fn with_mnemonic<'a>(
        &self,
        mnemonic: &'a str,
    ) -> impl Iterator<Item = &'static InstructionMetadata> + 'a {
        self.rows
            .iter()
            .filter(move |row| row.mnemonic == mnemonic)
    }

    /// `(name, opcode)` pairs: the dispatch table view of the rows.
    #[must_use]
    pub fn opcode_table(&self) -> Vec<(&'static str, u8)> {
        self.rows.iter().map(|row| (row.name, row.opcode)).collect()
    }
}

/// Converts a fetched word to an opcode byte when it is an exact `u8`.
#[must_use]
pub fn opcode_byte(word: f64) -> Option<u8> {
    let in_range = word.fract() == 0.0 && (0.0..=f64::from(u8::MAX)).contains(&word);
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let byte = in_range.then(|| word as u8);
    byte
}

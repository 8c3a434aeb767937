//! Fetch-execute pipeline shared by every processor variant.
//!
//! A [`Processor`] owns the register file, the memory unit and the
//! execution switches. Opcode handling is delegated to a
//! [`ProcessorVariant`], which receives an [`ExecuteContext`] exposing the
//! shared `fetch` primitive. Each handler follows the same sequence:
//! 1. Fetch operand words from the instruction stream
//! 2. Read registers and memory
//! 3. Write the result
//! 4. Describe the operation (commentary and detail)
//! 5. Report whether execution continues

mod base;
mod extended;
mod flags;
mod helpers;

pub use base::BaseModel;
pub use extended::{ExtendedModel, ACCUMULATOR, COMPARE_REGISTER, STACK_POINTER};
pub use flags::CompareFlag;
pub use helpers::{from_integer, to_integer, ArithmeticOp, BitwiseOp};

use crate::isa::{opcode_byte, ArgumentType, InstructionSet, ProcessorModel};
use crate::{
    format_word, CycleError, CycleState, ExecutionConfig, ExecutionRecord, IsaError,
    MemoryUnit, NumericKind, NumericType, ProcessorConfig, RegisterFile, RegisterRef, RunOutcome,
    StopReason, TraceEvent, TraceSink,
};

/// Opcode handling for one processor model.
///
/// Variants share the fetch/cycle skeleton of [`Processor`] and only decide
/// what each opcode does.
pub trait ProcessorVariant {
    /// Model implemented by this variant.
    fn model(&self) -> ProcessorModel;

    /// Instruction table dispatched by [`Self::execute`].
    fn instruction_set(&self) -> InstructionSet;

    /// Register names used when the configuration supplies none.
    fn default_registers(&self) -> &'static [&'static str];

    /// Registers appended to any configured list that lacks them.
    fn required_registers(&self) -> &'static [&'static str];

    /// Word encoding used when the configuration supplies none.
    fn default_numeric(&self) -> NumericKind;

    /// Register setup run after construction and after every reset.
    ///
    /// # Errors
    ///
    /// Propagates register or memory failures.
    fn initialise(&self, ctx: &mut ExecuteContext<'_>) -> Result<(), IsaError> {
        let _ = ctx;
        Ok(())
    }

    /// Executes `opcode`, returning whether execution continues.
    ///
    /// # Errors
    ///
    /// Returns [`IsaError::UnknownOpcode`] for opcodes outside the table and
    /// propagates operand fetch, register and memory failures.
    fn execute(
        &self,
        opcode: f64,
        record: &mut ExecutionRecord,
        ctx: &mut ExecuteContext<'_>,
    ) -> Result<bool, IsaError>;
}

/// Returns the built-in variant for `model`.
#[must_use]
pub fn builtin_variant(model: ProcessorModel) -> Box<dyn ProcessorVariant> {
    match model {
        ProcessorModel::Base => Box::new(BaseModel),
        ProcessorModel::Extended => Box::new(ExtendedModel),
    }
}

/// Mutable view of processor state handed to a variant for one operation.
pub struct ExecuteContext<'a> {
    /// Register file.
    pub registers: &'a mut RegisterFile,
    /// Memory unit.
    pub memory: &'a mut MemoryUnit,
    /// Execution switches for this cycle.
    pub config: &'a ExecutionConfig,
    /// Table of the running variant.
    pub instruction_set: InstructionSet,
}

impl<'a> ExecuteContext<'a> {
    /// Bundles the pieces of one processor.
    #[must_use]
    pub fn new(
        registers: &'a mut RegisterFile,
        memory: &'a mut MemoryUnit,
        config: &'a ExecutionConfig,
        instruction_set: InstructionSet,
    ) -> Self {
        Self {
            registers,
            memory,
            config,
            instruction_set,
        }
    }

    /// Reads the word at `ip`, then advances `ip` by one.
    ///
    /// # Errors
    ///
    /// Returns [`IsaError::MemoryAccess`] when `ip` is not a valid address;
    /// `ip` is left unchanged in that case.
    pub fn fetch(&mut self) -> Result<f64, IsaError> {
        let ip = self.registers.ip();
        let address = self.memory.address_of(ip)?;
        let word = self.memory.read(address)?;
        self.registers.set_ip(ip + 1.0)?;
        Ok(word)
    }

    /// Hex dump of `value` in the configured encoding, `0x`-prefixed.
    #[must_use]
    pub fn hex(&self, value: f64) -> String {
        format!("0x{}", self.registers.numeric().to_hex_string(value))
    }

    /// Register name for an operand word, or the word itself when it names
    /// no register.
    #[must_use]
    pub fn register_label(&self, word: f64) -> String {
        self.registers
            .resolve(word)
            .ok()
            .and_then(|index| self.registers.name_of(index))
            .map_or_else(|| format_word(word), str::to_owned)
    }

    /// Reads the register selected by an operand word.
    ///
    /// # Errors
    ///
    /// Returns [`IsaError::InvalidRegister`] when the word selects no
    /// register.
    pub fn read_register(&self, word: f64) -> Result<f64, IsaError> {
        self.registers.read(word)
    }

    /// Writes a register and returns the stored value.
    ///
    /// # Errors
    ///
    /// Returns [`IsaError::InvalidRegister`] when the selector does not
    /// resolve.
    pub fn write_register<'r>(
        &mut self,
        register: impl Into<RegisterRef<'r>>,
        value: f64,
    ) -> Result<f64, IsaError> {
        self.registers.write(register, value)
    }

    /// Reads memory at the address held in `word`.
    ///
    /// # Errors
    ///
    /// Returns [`IsaError::MemoryAccess`] for invalid addresses.
    pub fn read_memory(&self, word: f64) -> Result<f64, IsaError> {
        let address = self.memory.address_of(word)?;
        self.memory.read(address)
    }

    /// Writes memory at the address held in `word`.
    ///
    /// # Errors
    ///
    /// Returns [`IsaError::MemoryAccess`] for invalid addresses.
    pub fn write_memory(&mut self, word: f64, value: f64) -> Result<(), IsaError> {
        let address = self.memory.address_of(word)?;
        self.memory.write(address, value)
    }

    /// Sets the record text when commentary is enabled.
    pub fn comment(&self, record: &mut ExecutionRecord, text: impl FnOnce() -> String) {
        if self.config.emit_commentary {
            record.text = Some(text());
        }
    }

    /// Completes a successful execute: fills detail when enabled, sets
    /// `terminate` and returns `continue_execution`.
    pub fn finish(
        &self,
        record: &mut ExecutionRecord,
        opcode: f64,
        continue_execution: bool,
    ) -> bool {
        if self.config.emit_detail {
            if let Some(row) = self.instruction_set.lookup(opcode) {
                record.mnemonic = Some(row.mnemonic);
                record.argument_details = row
                    .arguments
                    .iter()
                    .zip(&record.arguments)
                    .map(|(kind, word)| self.argument_detail(*kind, *word))
                    .collect();
            }
        }
        record.terminate = !continue_execution;
        continue_execution
    }

    /// Marks the record terminated and builds the dispatch error.
    pub fn unknown_opcode(record: &mut ExecutionRecord, opcode: f64) -> IsaError {
        record.terminate = true;
        IsaError::UnknownOpcode { opcode }
    }

    fn argument_detail(&self, kind: ArgumentType, word: f64) -> String {
        match kind {
            ArgumentType::Register | ArgumentType::RegisterPointer => {
                format!("{kind}: {}", self.register_label(word))
            }
            ArgumentType::Address | ArgumentType::Constant | ArgumentType::Symbol => {
                format!("{kind}: {}", self.hex(word))
            }
        }
    }
}

/// Virtual processor: one register file, one memory unit, one variant.
pub struct Processor {
    variant: Box<dyn ProcessorVariant>,
    instruction_set: InstructionSet,
    registers: RegisterFile,
    memory: MemoryUnit,
    execution: ExecutionConfig,
    state: CycleState,
}

impl std::fmt::Debug for Processor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Processor")
            .field("model", &self.variant.model())
            .field("registers", &self.registers)
            .field("memory", &self.memory)
            .field("execution", &self.execution)
            .field("state", &self.state)
            .finish()
    }
}

impl Processor {
    /// Builds a processor running one of the built-in models.
    ///
    /// # Errors
    ///
    /// Returns [`IsaError::InvalidConfiguration`] for a zero memory capacity
    /// or an inconsistent register list.
    pub fn new(model: ProcessorModel, config: ProcessorConfig) -> Result<Self, IsaError> {
        Self::with_variant(builtin_variant(model), config)
    }

    /// Builds a processor around any variant.
    ///
    /// # Errors
    ///
    /// Returns [`IsaError::InvalidConfiguration`] for a zero memory capacity
    /// or an inconsistent register list, and propagates failures of the
    /// variant's initialisation.
    pub fn with_variant(
        variant: Box<dyn ProcessorVariant>,
        config: ProcessorConfig,
    ) -> Result<Self, IsaError> {
        if config.memory_words == 0 {
            return Err(IsaError::InvalidConfiguration {
                reason: "memory capacity must be at least one word".to_owned(),
            });
        }

        let numeric = NumericType::new(config.numeric.unwrap_or_else(|| variant.default_numeric()));
        let mut names = config.registers.unwrap_or_else(|| {
            variant
                .default_registers()
                .iter()
                .map(|name| (*name).to_owned())
                .collect()
        });
        for required in variant.required_registers() {
            if !names.iter().any(|name| name == required) {
                names.push((*required).to_owned());
            }
        }

        let mut processor = Self {
            instruction_set: variant.instruction_set(),
            registers: RegisterFile::new(numeric, names)?,
            memory: MemoryUnit::new(numeric, config.memory_words),
            execution: ExecutionConfig::default(),
            state: CycleState::Ready,
            variant,
        };
        processor.initialise()?;
        Ok(processor)
    }

    /// Model of the running variant.
    #[must_use]
    pub fn model(&self) -> ProcessorModel {
        self.variant.model()
    }

    /// Instruction table of the running variant.
    #[must_use]
    pub const fn instruction_set(&self) -> InstructionSet {
        self.instruction_set
    }

    /// Word encoding shared by registers and memory.
    #[must_use]
    pub const fn numeric(&self) -> NumericType {
        self.registers.numeric()
    }

    /// Register file.
    #[must_use]
    pub const fn registers(&self) -> &RegisterFile {
        &self.registers
    }

    /// Mutable register file, for host-side setup such as setting `ip`.
    pub fn registers_mut(&mut self) -> &mut RegisterFile {
        &mut self.registers
    }

    /// Memory unit.
    #[must_use]
    pub const fn memory(&self) -> &MemoryUnit {
        &self.memory
    }

    /// Mutable memory unit.
    pub fn memory_mut(&mut self) -> &mut MemoryUnit {
        &mut self.memory
    }

    /// Execution switches.
    #[must_use]
    pub const fn execution_config(&self) -> &ExecutionConfig {
        &self.execution
    }

    /// Mutable execution switches; changes apply from the next cycle.
    pub fn execution_config_mut(&mut self) -> &mut ExecutionConfig {
        &mut self.execution
    }

    /// State reached by the last cycle.
    #[must_use]
    pub const fn state(&self) -> CycleState {
        self.state
    }

    /// Installs the memory write observer (last registration wins).
    pub fn on_memory_write(&mut self, observer: impl FnMut(usize, usize, &MemoryUnit) + 'static) {
        self.memory.set_observer(Box::new(observer));
    }

    /// Installs the register write observer (last registration wins).
    pub fn on_register_write(
        &mut self,
        observer: impl FnMut(usize, f64, &RegisterFile) + 'static,
    ) {
        self.registers.set_observer(Box::new(observer));
    }

    /// Hex dump of `value` in the configured encoding.
    #[must_use]
    pub fn to_hex(&self, value: f64) -> String {
        self.registers.numeric().to_hex_string(value)
    }

    /// Copies a program image into memory starting at word `start` and
    /// returns the exclusive end address.
    ///
    /// # Errors
    ///
    /// Returns [`IsaError::MemoryAccess`] when the image does not fit.
    pub fn load_program(&mut self, start: usize, bytes: &[u8]) -> Result<usize, IsaError> {
        self.memory.load_bytes(start, bytes)
    }

    /// Encodes `words` in the configured numeric type and loads them at
    /// `start`.
    ///
    /// # Errors
    ///
    /// Returns [`IsaError::MemoryAccess`] when the words do not fit.
    pub fn load_words(&mut self, start: usize, words: &[f64]) -> Result<usize, IsaError> {
        let bytes = self.registers.numeric().encode_words(words);
        self.memory.load_bytes(start, &bytes)
    }

    /// Zeroes every register, reruns the variant's initialisation and
    /// returns to [`CycleState::Ready`]. Memory is kept.
    ///
    /// # Errors
    ///
    /// Propagates failures of the variant's initialisation.
    pub fn reset(&mut self) -> Result<(), IsaError> {
        self.registers.clear();
        self.state = CycleState::Ready;
        self.initialise()
    }

    /// Reads the word at `ip` and advances `ip`.
    ///
    /// # Errors
    ///
    /// Returns [`IsaError::MemoryAccess`] when `ip` is out of bounds.
    pub fn fetch(&mut self) -> Result<f64, IsaError> {
        ExecuteContext::new(
            &mut self.registers,
            &mut self.memory,
            &self.execution,
            self.instruction_set,
        )
        .fetch()
    }

    /// Runs one fetch-execute cycle and returns whether execution continues.
    ///
    /// `record` is cleared before the fetch, so one record can be reused
    /// across cycles.
    ///
    /// # Errors
    ///
    /// Returns a [`CycleError`] carrying the `ip` at cycle start when the
    /// fetch or the execute step fails. The record is marked terminated and
    /// holds a copy of the error; registers and memory keep any partial
    /// writes.
    pub fn cycle(&mut self, record: &mut ExecutionRecord) -> Result<bool, CycleError> {
        let ip = self.registers.ip();
        *record = ExecutionRecord {
            ip,
            ..ExecutionRecord::new()
        };

        match self.fetch_execute(ip, record) {
            Ok(continue_execution) => {
                self.state = CycleState::after_success(continue_execution);
                Ok(continue_execution)
            }
            Err(error) => {
                self.state = CycleState::Faulted;
                record.terminate = true;
                record.error = Some(error.clone());
                Err(error)
            }
        }
    }

    /// [`Self::cycle`] with trace events delivered to `sink`.
    ///
    /// # Errors
    ///
    /// Same as [`Self::cycle`].
    pub fn cycle_traced<S: TraceSink + ?Sized>(
        &mut self,
        record: &mut ExecutionRecord,
        sink: &mut S,
    ) -> Result<bool, CycleError> {
        let ip = self.registers.ip();
        sink.on_event(TraceEvent::CycleStarted { ip });

        let result = self.cycle(record);
        match &result {
            Ok(continue_execution) => sink.on_event(TraceEvent::InstructionRetired {
                ip,
                opcode: record.opcode.unwrap_or(f64::NAN),
                continue_execution: *continue_execution,
            }),
            Err(error) => sink.on_event(TraceEvent::FaultRaised {
                ip,
                class: error.root_cause().class(),
            }),
        }
        result
    }

    /// Cycles until a cycle asks to stop or `limit` cycles have completed.
    ///
    /// # Errors
    ///
    /// Returns the first [`CycleError`]; cycles completed before it keep
    /// their effects.
    pub fn run<S: TraceSink + ?Sized>(
        &mut self,
        limit: u64,
        sink: &mut S,
    ) -> Result<RunOutcome, CycleError> {
        let mut cycles = 0;
        let mut last = ExecutionRecord::new();

        while cycles < limit {
            let mut record = ExecutionRecord::new();
            let continue_execution = self.cycle_traced(&mut record, sink)?;
            cycles += 1;
            last = record;
            if !continue_execution {
                return Ok(RunOutcome {
                    cycles,
                    stop: StopReason::Terminated,
                    last,
                });
            }
        }

        Ok(RunOutcome {
            cycles,
            stop: StopReason::CycleLimit,
            last,
        })
    }

    fn fetch_execute(&mut self, ip: f64, record: &mut ExecutionRecord) -> Result<bool, CycleError> {
        let mut ctx = ExecuteContext::new(
            &mut self.registers,
            &mut self.memory,
            &self.execution,
            self.instruction_set,
        );

        self.state = CycleState::Fetching;
        let opcode = ctx.fetch().map_err(|cause| CycleError::fetch(ip, cause))?;
        record.opcode = Some(opcode);

        self.state = CycleState::Executing;
        self.variant
            .execute(opcode, record, &mut ctx)
            .map_err(|cause| CycleError::execute(ip, opcode, cause))
    }

    fn initialise(&mut self) -> Result<(), IsaError> {
        let mut ctx = ExecuteContext::new(
            &mut self.registers,
            &mut self.memory,
            &self.execution,
            self.instruction_set,
        );
        self.variant.initialise(&mut ctx)
    }
}

/// Resolves a fetched opcode word to an opcode byte, or builds the dispatch
/// error.
fn dispatch_byte(record: &mut ExecutionRecord, opcode: f64) -> Result<u8, IsaError> {
    opcode_byte(opcode).ok_or_else(|| ExecuteContext::unknown_opcode(record, opcode))
}

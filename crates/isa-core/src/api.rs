//! Public host-facing API contracts for embedding the processor core.
//!
//! Configuration goes in, execution records and trace events come out.

use crate::{CycleError, ErrorClass, NumericKind, DEFAULT_MEMORY_WORDS};

/// Per-cycle execution switches, read on every cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[allow(clippy::struct_excessive_bools)]
pub struct ExecutionConfig {
    /// `NULL`/`NOP` stops execution instead of being skipped.
    pub halt_on_no_op: bool,
    /// Fill [`ExecutionRecord::mnemonic`] and
    /// [`ExecutionRecord::argument_details`].
    pub emit_detail: bool,
    /// Fill [`ExecutionRecord::text`] with a description of the operation.
    pub emit_commentary: bool,
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self {
            halt_on_no_op: true,
            emit_detail: true,
            emit_commentary: true,
        }
    }
}

/// Construction parameters for a processor.
///
/// `None` fields fall back to the model defaults. The model's required
/// registers are appended when `registers` omits them.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ProcessorConfig {
    /// Word encoding of registers and memory.
    pub numeric: Option<NumericKind>,
    /// Memory capacity in words.
    pub memory_words: usize,
    /// Register names in index order.
    pub registers: Option<Vec<String>>,
}

impl Default for ProcessorConfig {
    fn default() -> Self {
        Self {
            numeric: None,
            memory_words: DEFAULT_MEMORY_WORDS,
            registers: None,
        }
    }
}

impl ProcessorConfig {
    /// Default configuration with an explicit numeric kind.
    #[must_use]
    pub fn with_numeric(numeric: NumericKind) -> Self {
        Self {
            numeric: Some(numeric),
            ..Self::default()
        }
    }

    /// Replaces the memory capacity.
    #[must_use]
    pub fn memory_words(mut self, memory_words: usize) -> Self {
        self.memory_words = memory_words;
        self
    }
}

/// Observable summary of one cycle, filled progressively while it runs.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ExecutionRecord {
    /// Instruction pointer when the cycle started.
    pub ip: f64,
    /// Opcode word, once fetched.
    pub opcode: Option<f64>,
    /// Operand words in encoding order.
    pub arguments: Vec<f64>,
    /// Human-readable description, when commentary is enabled.
    pub text: Option<String>,
    /// Mnemonic of the executed instruction, when detail is enabled.
    pub mnemonic: Option<&'static str>,
    /// One `kind: value` string per operand, when detail is enabled.
    pub argument_details: Vec<String>,
    /// Execution must not continue after this cycle.
    pub terminate: bool,
    /// Failure raised by the cycle, if any.
    #[cfg_attr(feature = "serde", serde(skip))]
    pub error: Option<CycleError>,
}

impl ExecutionRecord {
    /// Fresh record for a new cycle.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

/// Deterministic trace events emitted at cycle boundaries.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum TraceEvent {
    /// A cycle is about to fetch its opcode.
    CycleStarted {
        /// Instruction pointer at cycle start.
        ip: f64,
    },
    /// A cycle completed without error.
    InstructionRetired {
        /// Instruction pointer at cycle start.
        ip: f64,
        /// Executed opcode word.
        opcode: f64,
        /// Value returned by the cycle.
        continue_execution: bool,
    },
    /// A cycle failed.
    FaultRaised {
        /// Instruction pointer at cycle start.
        ip: f64,
        /// Class of the root cause.
        class: ErrorClass,
    },
}

/// Sink trait for deterministic trace hooks.
pub trait TraceSink {
    /// Records an event in execution order.
    fn on_event(&mut self, event: TraceEvent);
}

impl TraceSink for Vec<TraceEvent> {
    fn on_event(&mut self, event: TraceEvent) {
        self.push(event);
    }
}

/// Why [`crate::Processor::run`] returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum StopReason {
    /// A cycle asked to stop (`HALT`, `BRK`, halting `NULL`/`NOP`).
    Terminated,
    /// The cycle limit was reached first.
    CycleLimit,
}

/// Aggregated outcome of a bounded run.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct RunOutcome {
    /// Cycles completed during this run call.
    pub cycles: u64,
    /// Why the run stopped.
    pub stop: StopReason,
    /// Record of the last completed cycle (default when none ran).
    pub last: ExecutionRecord,
}

#[cfg(test)]
mod tests {
    use super::{ExecutionConfig, ExecutionRecord, ProcessorConfig, TraceEvent, TraceSink};
    use crate::{ErrorClass, NumericKind, DEFAULT_MEMORY_WORDS};

    #[test]
    fn execution_config_defaults_enable_everything() {
        let config = ExecutionConfig::default();
        assert!(config.halt_on_no_op);
        assert!(config.emit_detail);
        assert!(config.emit_commentary);
    }

    #[test]
    fn processor_config_defaults_defer_to_model() {
        let config = ProcessorConfig::default();
        assert_eq!(config.numeric, None);
        assert_eq!(config.memory_words, DEFAULT_MEMORY_WORDS);
        assert_eq!(config.registers, None);

        let config = ProcessorConfig::with_numeric(NumericKind::Int16).memory_words(32);
        assert_eq!(config.numeric, Some(NumericKind::Int16));
        assert_eq!(config.memory_words, 32);
    }

    #[test]
    fn fresh_record_is_empty() {
        let record = ExecutionRecord::new();
        assert_eq!(record.opcode, None);
        assert!(record.arguments.is_empty());
        assert!(!record.terminate);
        assert!(record.error.is_none());
    }

    #[test]
    fn vec_sink_keeps_execution_order() {
        let mut sink = Vec::new();
        sink.on_event(TraceEvent::CycleStarted { ip: 0.0 });
        sink.on_event(TraceEvent::FaultRaised {
            ip: 0.0,
            class: ErrorClass::Dispatch,
        });
        assert_eq!(sink.len(), 2);
        assert_eq!(sink[0], TraceEvent::CycleStarted { ip: 0.0 });
    }
}

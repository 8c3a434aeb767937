/// Fetch-execute state machine as observed by the host.
///
/// The processor records the state it reached; it never refuses a further
/// cycle because of it. Resuming after `BRK` is just another `cycle` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum CycleState {
    /// Waiting for the host to start the next cycle.
    #[default]
    Ready,
    /// Reading the opcode word at `ip`.
    Fetching,
    /// Dispatching the fetched opcode.
    Executing,
    /// Last cycle completed and asked to continue.
    Continuing,
    /// Last cycle completed and asked to stop (`HALT`, `BRK`, `NULL`).
    Halted,
    /// Last cycle failed.
    Faulted,
}

impl CycleState {
    /// `true` for the states that end the current run.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Halted | Self::Faulted)
    }

    /// State reached after a cycle that returned `continue_execution`.
    #[must_use]
    pub const fn after_success(continue_execution: bool) -> Self {
        if continue_execution {
            Self::Continuing
        } else {
            Self::Halted
        }
    }
}

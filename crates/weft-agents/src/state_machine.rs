use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Stage
// ---------------------------------------------------------------------------

/// One of the three overridable pipeline stages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    PreparePrompt,
    ProcessData,
    SaveResult,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Stage::PreparePrompt => "PreparePrompt",
            Stage::ProcessData => "ProcessData",
            Stage::SaveResult => "SaveResult",
        };
        write!(f, "{}", label)
    }
}

// ---------------------------------------------------------------------------
// RunState
// ---------------------------------------------------------------------------

/// The state of one pipeline run. `Completed` and `Failed` are terminal; no
/// state is re-entered, and a new run starts from a fresh machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunState {
    Created,
    PreparingPrompt,
    ProcessingData,
    SavingResult,
    Completed,
    Failed(Stage),
}

impl RunState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, RunState::Completed | RunState::Failed(_))
    }
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunState::Created => write!(f, "Created"),
            RunState::PreparingPrompt => write!(f, "PreparingPrompt"),
            RunState::ProcessingData => write!(f, "ProcessingData"),
            RunState::SavingResult => write!(f, "SavingResult"),
            RunState::Completed => write!(f, "Completed"),
            RunState::Failed(stage) => write!(f, "Failed({})", stage),
        }
    }
}

// ---------------------------------------------------------------------------
// RunEvent
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunEvent {
    Begin,
    PromptReady,
    ResultParsed,
    ResultSaved,
    Fail(Stage),
}

impl fmt::Display for RunEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunEvent::Begin => write!(f, "Begin"),
            RunEvent::PromptReady => write!(f, "PromptReady"),
            RunEvent::ResultParsed => write!(f, "ResultParsed"),
            RunEvent::ResultSaved => write!(f, "ResultSaved"),
            RunEvent::Fail(stage) => write!(f, "Fail({})", stage),
        }
    }
}

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

/// An attempt to apply a [`RunEvent`] that is not valid for the current
/// [`RunState`] — for example parsing a result before the prompt is ready,
/// or any event after a terminal state.
#[derive(Debug, thiserror::Error)]
pub enum StateMachineError {
    #[error("invalid transition: cannot apply {event} in state {state}")]
    InvalidTransition { state: RunState, event: RunEvent },
}

// ---------------------------------------------------------------------------
// PipelineStateMachine
// ---------------------------------------------------------------------------

/// Tracks one pipeline run through its stages.
///
/// Valid transitions:
/// - Created         + Begin        -> PreparingPrompt
/// - PreparingPrompt + PromptReady  -> ProcessingData
/// - ProcessingData  + ResultParsed -> SavingResult
/// - SavingResult    + ResultSaved  -> Completed
/// - any non-terminal + Fail(stage) -> Failed(stage)
#[derive(Debug, Clone)]
pub struct PipelineStateMachine {
    current: RunState,
    history: Vec<(RunState, RunEvent, RunState)>,
}

impl PipelineStateMachine {
    /// Create a new state machine starting in `Created`.
    pub fn new() -> Self {
        Self {
            current: RunState::Created,
            history: Vec::new(),
        }
    }

    /// Return the current state.
    pub fn state(&self) -> RunState {
        self.current
    }

    /// Return the full transition history.
    pub fn history(&self) -> &[(RunState, RunEvent, RunState)] {
        &self.history
    }

    /// Attempt a state transition driven by `event`.
    pub fn transition(&mut self, event: RunEvent) -> Result<RunState, StateMachineError> {
        let next = match (self.current, event) {
            (RunState::Created, RunEvent::Begin) => RunState::PreparingPrompt,
            (RunState::PreparingPrompt, RunEvent::PromptReady) => RunState::ProcessingData,
            (RunState::ProcessingData, RunEvent::ResultParsed) => RunState::SavingResult,
            (RunState::SavingResult, RunEvent::ResultSaved) => RunState::Completed,
            (state, RunEvent::Fail(stage)) if !state.is_terminal() => RunState::Failed(stage),
            _ => {
                return Err(StateMachineError::InvalidTransition {
                    state: self.current,
                    event,
                });
            }
        };

        let from = self.current;
        self.current = next;
        self.history.push((from, event, next));
        tracing::debug!(from = %from, event = %event, to = %next, "pipeline state transition");
        Ok(next)
    }

    /// Returns `true` if the given event is valid in the current state.
    pub fn can_transition(&self, event: RunEvent) -> bool {
        matches!(
            (self.current, event),
            (RunState::Created, RunEvent::Begin)
                | (RunState::PreparingPrompt, RunEvent::PromptReady)
                | (RunState::ProcessingData, RunEvent::ResultParsed)
                | (RunState::SavingResult, RunEvent::ResultSaved)
        ) || (matches!(event, RunEvent::Fail(_)) && !self.current.is_terminal())
    }
}

impl Default for PipelineStateMachine {
    fn default() -> Self {
        Self::new()
    }
}

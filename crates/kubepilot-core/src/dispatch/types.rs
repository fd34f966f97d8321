//! Dispatch types
//!
//! - `DispatchState` for the loop's position
//! - `DispatchStep` for one decide/act/observe round
//! - `DispatchStatus` and `DispatchOutcome` for the result of a run

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Output of a run that hit the iteration cap
pub const ABORTED_MESSAGE: &str = "Agent stopped due to iteration limit or time limit.";

/// Pseudo-tool recorded for unparseable model output
pub const FORMAT_ERROR_TOOL: &str = "_exception";

/// Where the loop is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DispatchState {
    /// Waiting on the model
    AwaitingDecision,
    /// Running the chosen tool
    ToolExecuting,
    /// Final answer received
    Finished,
    /// Iteration cap reached
    AbortedOnCap,
}

impl DispatchState {
    /// Whether the loop has stopped
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Finished | Self::AbortedOnCap)
    }

    /// Whether `next` may follow this state
    #[must_use]
    pub fn can_transition_to(&self, next: DispatchState) -> bool {
        use DispatchState::*;
        matches!(
            (self, next),
            (AwaitingDecision, ToolExecuting)
                | (AwaitingDecision, Finished)
                | (AwaitingDecision, AwaitingDecision)
                | (AwaitingDecision, AbortedOnCap)
                | (ToolExecuting, AwaitingDecision)
        )
    }
}

/// One round of the loop
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchStep {
    /// Tool the model chose
    pub tool: String,
    /// Raw tool input
    pub tool_input: String,
    /// Model text that led to the choice
    pub log: String,
    /// What the tool returned
    pub observation: String,
}

/// How a run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DispatchStatus {
    /// The model gave a final answer
    Finished,
    /// The iteration cap was reached
    AbortedOnCap,
}

impl From<DispatchStatus> for DispatchState {
    fn from(status: DispatchStatus) -> Self {
        match status {
            DispatchStatus::Finished => DispatchState::Finished,
            DispatchStatus::AbortedOnCap => DispatchState::AbortedOnCap,
        }
    }
}

/// Result of one run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispatchOutcome {
    /// Run identifier
    pub execution_id: Uuid,
    /// Agent that ran
    pub agent: String,
    /// Final status
    pub status: DispatchStatus,
    /// Final answer, or [`ABORTED_MESSAGE`]
    pub output: String,
    /// Every step, in order
    pub steps: Vec<DispatchStep>,
    /// Decisions taken
    pub iterations: usize,
    /// When the run started
    pub started_at: DateTime<Utc>,
    /// Run duration in milliseconds
    pub duration_ms: u64,
}

impl DispatchOutcome {
    /// Whether the model gave a final answer
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.status == DispatchStatus::Finished
    }
}

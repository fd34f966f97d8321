//! EventBus - broadcast-based step events for one or more dispatches.
//!
//! A dispatch publishes its steps here while it runs, so the chat bridge can
//! relay progress before the final answer is ready.

use serde::Serialize;
use tokio::sync::broadcast;
use uuid::Uuid;

/// Events emitted while an agent runs
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DispatchEvent {
    /// A dispatch has started
    DispatchStarted {
        /// Dispatch identifier
        execution_id: Uuid,
        /// Agent name
        agent: String,
        /// Instruction being handled
        input: String,
    },
    /// The model picked a tool
    StepDecided {
        /// Dispatch identifier
        execution_id: Uuid,
        /// 1-based iteration
        iteration: usize,
        /// Chosen tool
        tool: String,
        /// Raw tool input
        tool_input: String,
    },
    /// A tool answered
    StepObserved {
        /// Dispatch identifier
        execution_id: Uuid,
        /// 1-based iteration
        iteration: usize,
        /// Tool that ran
        tool: String,
        /// Model rationale for the step
        log: String,
        /// Tool output
        observation: String,
    },
    /// The model produced a final answer
    DispatchFinished {
        /// Dispatch identifier
        execution_id: Uuid,
        /// Decisions taken
        iterations: usize,
        /// Final answer
        output: String,
    },
    /// The dispatch ended without a final answer
    DispatchAborted {
        /// Dispatch identifier
        execution_id: Uuid,
        /// Decisions taken
        iterations: usize,
        /// Why it stopped
        reason: String,
    },
}

impl DispatchEvent {
    /// Get the execution_id from any event variant.
    #[must_use]
    pub fn execution_id(&self) -> Uuid {
        match self {
            Self::DispatchStarted { execution_id, .. }
            | Self::StepDecided { execution_id, .. }
            | Self::StepObserved { execution_id, .. }
            | Self::DispatchFinished { execution_id, .. }
            | Self::DispatchAborted { execution_id, .. } => *execution_id,
        }
    }

    /// Whether this is the last event of a dispatch
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::DispatchFinished { .. } | Self::DispatchAborted { .. }
        )
    }
}

/// Broadcast-based event bus for dispatch events.
///
/// Uses `tokio::broadcast` so multiple subscribers can receive the same events.
/// Slow subscribers will miss events (lagged) rather than blocking the publisher.
/// Once every clone of the bus is dropped, receivers drain what is buffered and
/// then see `RecvError::Closed`.
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<DispatchEvent>,
}

impl EventBus {
    /// Create a new EventBus with the given channel capacity.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Subscribe to events. Returns a receiver that will get all future events.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<DispatchEvent> {
        self.sender.subscribe()
    }

    /// Publish an event to all active subscribers.
    ///
    /// Returns the number of subscribers that received the event.
    /// If there are no subscribers, the event is silently dropped.
    pub fn publish(&self, event: DispatchEvent) -> usize {
        self.sender.send(event).unwrap_or(0)
    }

    /// Get the current number of active subscribers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(256)
    }
}

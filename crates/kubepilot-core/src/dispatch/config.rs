//! Agent configuration and dispatch input

use crate::event_bus::EventBus;
use kubepilot_tools::builtins::MessageTarget;

/// Decisions allowed per run unless configured otherwise
pub const DEFAULT_MAX_ITERATIONS: usize = 15;

/// Configuration of one agent
///
/// `suffix` must contain the `{input}` and `{agent_scratchpad}` placeholders.
#[derive(Debug, Clone)]
pub struct AgentConfig {
    /// Agent name, also its tool name when used as a sub-agent
    pub name: String,
    /// Tool description when used as a sub-agent
    pub description: String,
    /// Text before the tool list
    pub prefix: String,
    /// Text after the format instructions
    pub suffix: String,
    /// Maximum decisions per run
    pub max_iterations: usize,
    /// Completion model
    pub model: String,
    /// Sampling temperature
    pub temperature: f32,
    /// Completion length limit
    pub max_tokens: u32,
}

impl AgentConfig {
    /// Create a configuration with default model settings
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        prefix: impl Into<String>,
        suffix: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            prefix: prefix.into(),
            suffix: suffix.into(),
            max_iterations: DEFAULT_MAX_ITERATIONS,
            model: "gpt-4".to_string(),
            temperature: 0.0,
            max_tokens: 1024,
        }
    }

    /// Set the sub-agent description
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Set maximum iterations
    #[must_use]
    pub fn with_max_iterations(mut self, max: usize) -> Self {
        self.max_iterations = max;
        self
    }

    /// Set the completion model
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set the temperature
    #[must_use]
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Set the completion length limit
    #[must_use]
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }
}

/// Input for one dispatch
#[derive(Debug, Clone)]
pub struct DispatchRequest {
    /// Natural-language instruction
    pub input: String,
    /// Where step events go, if anyone is watching
    pub event_bus: Option<EventBus>,
    /// Conversation the request came from, for agents that can post messages
    pub reply_to: Option<MessageTarget>,
}

impl DispatchRequest {
    /// Create a request with no observers
    #[must_use]
    pub fn new(input: impl Into<String>) -> Self {
        Self {
            input: input.into(),
            event_bus: None,
            reply_to: None,
        }
    }

    /// Publish step events to `bus`
    #[must_use]
    pub fn with_event_bus(mut self, bus: EventBus) -> Self {
        self.event_bus = Some(bus);
        self
    }

    /// Bind messaging tools to this conversation
    #[must_use]
    pub fn with_reply_to(mut self, target: MessageTarget) -> Self {
        self.reply_to = Some(target);
        self
    }
}

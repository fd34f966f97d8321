//! Coordinator - the top-level agent
//!
//! The coordinator's tools are the sub-agents plus, when a message sink is
//! configured, `slack_send_message` bound to the conversation the request came
//! from. Because of that binding the coordinator agent is assembled per request.

use crate::dispatch::{Agent, DispatchOutcome, DispatchRequest};
use crate::error::Result;
use crate::factory::{AgentFactory, K8S_ENGINEER_AGENT};
use crate::prompts;
use kubepilot_tools::builtins::{MessageTarget, SharedMessageSink, SlackSendMessageTool};
use kubepilot_tools::{Tool, ToolRegistry};
use std::sync::Arc;
use tracing::instrument;

/// Anything that can handle a dispatch request
///
/// Front ends depend on this rather than on [`Coordinator`] directly.
#[async_trait::async_trait]
pub trait Dispatcher: Send + Sync {
    /// Run one request to completion
    async fn dispatch(&self, request: DispatchRequest) -> Result<DispatchOutcome>;
}

/// Shared dispatcher handle
pub type SharedDispatcher = Arc<dyn Dispatcher>;

/// Routes instructions to sub-agents
#[derive(Clone)]
pub struct Coordinator {
    factory: AgentFactory,
    agent_tools: Vec<Arc<dyn Tool>>,
    sink: Option<SharedMessageSink>,
    default_channel: Option<String>,
}

impl std::fmt::Debug for Coordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Coordinator")
            .field("factory", &self.factory)
            .field("messaging", &self.sink.is_some())
            .field("default_channel", &self.default_channel)
            .finish()
    }
}

impl Coordinator {
    /// Coordinate the sub-agents built by `factory`
    #[must_use]
    pub fn new(factory: AgentFactory) -> Self {
        let agent_tools = factory.agent_tools();
        Self {
            factory,
            agent_tools,
            sink: None,
            default_channel: None,
        }
    }

    /// Offer `slack_send_message` through `sink`
    #[must_use]
    pub fn with_message_sink(mut self, sink: SharedMessageSink) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Channel used when a request carries no conversation of its own
    #[must_use]
    pub fn with_default_channel(mut self, channel: impl Into<String>) -> Self {
        self.default_channel = Some(channel.into());
        self
    }

    /// The sub-agent factory
    #[must_use]
    pub fn factory(&self) -> &AgentFactory {
        &self.factory
    }

    /// Build the top-level agent for one conversation
    pub fn agent_for(&self, target: Option<&MessageTarget>) -> Result<Agent> {
        let mut registry = ToolRegistry::new();
        for tool in &self.agent_tools {
            registry.register(Arc::clone(tool))?;
        }

        let target = target
            .cloned()
            .or_else(|| self.default_channel.clone().map(MessageTarget::channel));
        if let (Some(sink), Some(target)) = (&self.sink, target) {
            registry.register(Arc::new(SlackSendMessageTool::new(Arc::clone(sink), target)))?;
        }

        let settings = self.factory.settings();
        let config = settings.agent_config(
            K8S_ENGINEER_AGENT,
            prompts::K8S_ENGINEER_PREFIX,
            prompts::K8S_ENGINEER_SUFFIX,
        );
        let runner = settings.runner.clone().with_timeout(settings.agent_timeout);

        Agent::new(config, Arc::clone(self.factory.llm()), registry, runner)
    }
}

#[async_trait::async_trait]
impl Dispatcher for Coordinator {
    #[instrument(skip(self, request), fields(threaded = request.reply_to.is_some()))]
    async fn dispatch(&self, request: DispatchRequest) -> Result<DispatchOutcome> {
        let agent = self.agent_for(request.reply_to.as_ref())?;
        agent.run(request).await
    }
}

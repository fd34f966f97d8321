//! Agent tool - a sub-agent behind the ordinary tool interface
//!
//! The coordinator cannot tell an [`AgentTool`] from any other tool: it passes
//! an instruction in and gets the sub-agent's final answer back as text.

use crate::dispatch::{Agent, DispatchRequest};
use crate::error::Error as CoreError;
use kubepilot_tools::{
    ArgSchema, Error, ParsedArgs, Result, Tool, ToolCategory, ToolDefinition,
};
use tracing::{info, warn};

/// A sub-agent exposed as a tool
pub struct AgentTool {
    definition: ToolDefinition,
    agent: Agent,
}

impl AgentTool {
    /// Wrap `agent`; its name and description become the tool's
    #[must_use]
    pub fn new(agent: Agent) -> Self {
        let config = agent.config();
        let definition = ToolDefinition::new(&config.name, &config.description)
            .with_args(ArgSchema::none().text("instruction", "a plain-language instruction"))
            .with_category(ToolCategory::Agent);
        Self { definition, agent }
    }

    /// The wrapped agent
    #[must_use]
    pub fn agent(&self) -> &Agent {
        &self.agent
    }
}

#[async_trait::async_trait]
impl Tool for AgentTool {
    fn definition(&self) -> &ToolDefinition {
        &self.definition
    }

    async fn call(&self, args: ParsedArgs) -> Result<String> {
        let instruction = args.str("instruction")?;
        let outcome = self
            .agent
            .run(DispatchRequest::new(instruction))
            .await
            .map_err(|e| match e {
                CoreError::Tool(inner) => inner,
                other => Error::Upstream(other.to_string()),
            })?;

        if outcome.is_finished() {
            info!(agent = %outcome.agent, iterations = outcome.iterations, "Sub-agent answered");
            Ok(outcome.output)
        } else {
            warn!(agent = %outcome.agent, iterations = outcome.iterations, "Sub-agent hit its cap");
            Err(Error::Upstream(format!(
                "agent {} stopped after {} steps without a final answer",
                outcome.agent, outcome.iterations
            )))
        }
    }
}

//! Agent struct and builder

use super::config::AgentConfig;
use super::prompt::PromptTemplate;
use crate::error::{Error, Result};
use kubepilot_llm::SharedLlmProvider;
use kubepilot_tools::{RunnerConfig, ToolRegistry, ToolRunner};
use std::sync::Arc;

/// A tool-using agent: prompt, model and tools, immutable once built
#[derive(Clone)]
pub struct Agent {
    pub(super) config: AgentConfig,
    pub(super) llm: SharedLlmProvider,
    pub(super) runner: ToolRunner,
    pub(super) prompt: PromptTemplate,
}

impl std::fmt::Debug for Agent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Agent")
            .field("name", &self.config.name)
            .field("llm", &self.llm.name())
            .field("tools", &self.runner.registry().list_names())
            .finish()
    }
}

impl Agent {
    /// Build an agent over `registry`
    pub fn new(
        config: AgentConfig,
        llm: SharedLlmProvider,
        registry: ToolRegistry,
        runner_config: RunnerConfig,
    ) -> Result<Self> {
        if config.max_iterations == 0 {
            return Err(Error::Configuration(format!(
                "agent {} needs max_iterations of at least 1",
                config.name
            )));
        }
        if registry.is_empty() {
            return Err(Error::Configuration(format!(
                "agent {} has no tools",
                config.name
            )));
        }

        let prompt = PromptTemplate::new(&config.prefix, &registry, &config.suffix)?;
        let runner = ToolRunner::new(Arc::new(registry), runner_config);

        Ok(Self {
            config,
            llm,
            runner,
            prompt,
        })
    }

    /// Agent name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.config.name
    }

    /// Agent configuration
    #[must_use]
    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    /// Tool names, in prompt order
    #[must_use]
    pub fn tool_names(&self) -> Vec<&str> {
        self.runner.registry().list_names()
    }

    /// Prompt for `input` before any step has run
    #[must_use]
    pub fn initial_prompt(&self, input: &str) -> String {
        self.prompt.render(input, &[])
    }
}

//! Agent factory - builds the built-in sub-agents once at startup
//!
//! Each sub-agent gets one collaborator's toolkit and its own prompts. A
//! collaborator that is not configured simply leaves its agent out.

use crate::agent_tool::AgentTool;
use crate::dispatch::{Agent, AgentConfig, DEFAULT_MAX_ITERATIONS};
use crate::error::Result;
use crate::prompts;
use kubepilot_llm::SharedLlmProvider;
use kubepilot_tools::builtins::{
    git, gitlab, k8s, ClusterClient, IssueTracker, KnowledgeBase, KnowledgeTool, SourceControl,
};
use kubepilot_tools::{RunnerConfig, Tool, Toolkit};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// Cluster sub-agent
pub const K8S_EXPLORER_AGENT: &str = "k8s_explorer_agent";
/// Source-control sub-agent
pub const GIT_AGENT: &str = "git_agent";
/// Issue-tracker sub-agent
pub const GITLAB_AGENT: &str = "gitlab_agent";
/// Documentation sub-agent
pub const K8S_SME_AGENT: &str = "k8s_sme_agent";
/// Top-level agent
pub const K8S_ENGINEER_AGENT: &str = "k8s_engineer";

/// Model and loop settings shared by every agent
#[derive(Debug, Clone)]
pub struct AgentSettings {
    /// Completion model
    pub model: String,
    /// Sampling temperature
    pub temperature: f32,
    /// Completion length limit
    pub max_tokens: u32,
    /// Decisions per run
    pub max_iterations: usize,
    /// Runner settings for collaborator tools
    pub runner: RunnerConfig,
    /// Time limit for one sub-agent call made by the coordinator
    pub agent_timeout: Duration,
}

impl Default for AgentSettings {
    fn default() -> Self {
        Self {
            model: "gpt-4".to_string(),
            temperature: 0.0,
            max_tokens: 1024,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            runner: RunnerConfig::default(),
            agent_timeout: Duration::from_secs(900),
        }
    }
}

impl AgentSettings {
    /// Configuration for one agent with these settings
    #[must_use]
    pub fn agent_config(&self, name: &str, prefix: &str, suffix: &str) -> AgentConfig {
        AgentConfig::new(name, prefix, suffix)
            .with_model(&self.model)
            .with_temperature(self.temperature)
            .with_max_tokens(self.max_tokens)
            .with_max_iterations(self.max_iterations)
    }
}

/// Shared clients the sub-agents work through
#[derive(Clone, Default)]
pub struct Collaborators {
    /// Kubernetes API
    pub cluster: Option<Arc<dyn ClusterClient>>,
    /// Local git working copies
    pub source_control: Option<Arc<dyn SourceControl>>,
    /// GitLab
    pub issue_tracker: Option<Arc<dyn IssueTracker>>,
    /// Documentation index
    pub knowledge: Option<Arc<dyn KnowledgeBase>>,
}

impl std::fmt::Debug for Collaborators {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Collaborators")
            .field("cluster", &self.cluster.is_some())
            .field("source_control", &self.source_control.is_some())
            .field("issue_tracker", &self.issue_tracker.is_some())
            .field("knowledge", &self.knowledge.is_some())
            .finish()
    }
}

/// Builds and holds the sub-agents
#[derive(Clone)]
pub struct AgentFactory {
    llm: SharedLlmProvider,
    settings: AgentSettings,
    sub_agents: Vec<Agent>,
}

impl std::fmt::Debug for AgentFactory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AgentFactory")
            .field("llm", &self.llm.name())
            .field("settings", &self.settings)
            .field("sub_agents", &self.sub_agents)
            .finish()
    }
}

impl AgentFactory {
    /// Build every sub-agent whose collaborator is present
    pub fn new(
        llm: SharedLlmProvider,
        settings: AgentSettings,
        collaborators: Collaborators,
    ) -> Result<Self> {
        let mut factory = Self {
            llm,
            settings,
            sub_agents: Vec::new(),
        };

        match collaborators.cluster {
            Some(client) => factory.add(
                K8S_EXPLORER_AGENT,
                prompts::K8S_EXPLORER_PREFIX,
                prompts::K8S_EXPLORER_SUFFIX,
                prompts::K8S_EXPLORER_AGENT_DESCRIPTION,
                k8s::toolkit(client),
            )?,
            None => warn!(agent = K8S_EXPLORER_AGENT, "No cluster client, agent disabled"),
        }

        match collaborators.source_control {
            Some(client) => factory.add(
                GIT_AGENT,
                prompts::GIT_PREFIX,
                prompts::GIT_SUFFIX,
                prompts::GIT_AGENT_DESCRIPTION,
                git::toolkit(client),
            )?,
            None => warn!(agent = GIT_AGENT, "No source control client, agent disabled"),
        }

        match collaborators.issue_tracker {
            Some(client) => factory.add(
                GITLAB_AGENT,
                prompts::GITLAB_PREFIX,
                prompts::GITLAB_SUFFIX,
                prompts::GITLAB_AGENT_DESCRIPTION,
                gitlab::toolkit(client),
            )?,
            None => warn!(agent = GITLAB_AGENT, "No issue tracker client, agent disabled"),
        }

        match collaborators.knowledge {
            Some(knowledge) => factory.add(
                K8S_SME_AGENT,
                prompts::K8S_SME_PREFIX,
                prompts::K8S_SME_SUFFIX,
                prompts::K8S_SME_AGENT_DESCRIPTION,
                Toolkit::new("k8s_sme").with_tool(Arc::new(KnowledgeTool::new(knowledge))),
            )?,
            None => warn!(agent = K8S_SME_AGENT, "No document index, agent disabled"),
        }

        info!(
            agents = ?factory.sub_agents.iter().map(Agent::name).collect::<Vec<_>>(),
            "Sub-agents ready"
        );
        Ok(factory)
    }

    fn add(
        &mut self,
        name: &str,
        prefix: &str,
        suffix: &str,
        description: &str,
        toolkit: Toolkit,
    ) -> Result<()> {
        let config = self
            .settings
            .agent_config(name, prefix, suffix)
            .with_description(description);
        let agent = Agent::new(
            config,
            Arc::clone(&self.llm),
            toolkit.into_registry()?,
            self.settings.runner.clone(),
        )?;
        self.sub_agents.push(agent);
        Ok(())
    }

    /// The model every agent uses
    #[must_use]
    pub fn llm(&self) -> &SharedLlmProvider {
        &self.llm
    }

    /// Shared settings
    #[must_use]
    pub fn settings(&self) -> &AgentSettings {
        &self.settings
    }

    /// Built sub-agents, in coordinator order
    #[must_use]
    pub fn sub_agents(&self) -> &[Agent] {
        &self.sub_agents
    }

    /// Look up a sub-agent by name
    #[must_use]
    pub fn sub_agent(&self, name: &str) -> Option<&Agent> {
        self.sub_agents.iter().find(|a| a.name() == name)
    }

    /// Every sub-agent wrapped as a tool
    #[must_use]
    pub fn agent_tools(&self) -> Vec<Arc<dyn Tool>> {
        self.sub_agents
            .iter()
            .map(|agent| Arc::new(AgentTool::new(agent.clone())) as Arc<dyn Tool>)
            .collect()
    }
}

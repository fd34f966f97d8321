//! Server configuration types
//!
//! Mirrors `config/default.toml`. Secrets never live here; each client reads
//! its own from the environment.

use kubepilot_core::AgentSettings;
use kubepilot_tools::RunnerConfig;
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// Application configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub dispatch: DispatchConfig,
    #[serde(default)]
    pub git: GitConfig,
    #[serde(default)]
    pub gitlab: GitLabAppConfig,
    #[serde(default)]
    pub knowledge: KnowledgeConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Settings shared by every agent
    pub fn agent_settings(&self) -> AgentSettings {
        AgentSettings {
            model: self.llm.model.clone(),
            temperature: self.llm.temperature,
            max_tokens: self.llm.max_tokens,
            max_iterations: self.dispatch.max_iterations,
            runner: RunnerConfig::default()
                .with_timeout(Duration::from_secs(self.dispatch.tool_timeout_secs))
                .with_read_only(self.dispatch.read_only),
            agent_timeout: Duration::from_secs(self.dispatch.agent_timeout_secs),
        }
    }
}

/// Language model settings
#[derive(Debug, Clone, Deserialize)]
pub struct LlmConfig {
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default)]
    pub temperature: f32,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_embedding_model")]
    pub embedding_model: String,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            temperature: 0.0,
            max_tokens: default_max_tokens(),
            embedding_model: default_embedding_model(),
        }
    }
}

fn default_model() -> String {
    kubepilot_llm::openai::DEFAULT_MODEL.to_string()
}
fn default_max_tokens() -> u32 {
    1024
}
fn default_embedding_model() -> String {
    kubepilot_llm::embeddings::DEFAULT_EMBEDDING_MODEL.to_string()
}

/// Dispatch loop limits
#[derive(Debug, Clone, Deserialize)]
pub struct DispatchConfig {
    /// Decisions per agent run
    #[serde(default = "default_max_iterations")]
    pub max_iterations: usize,
    /// Time limit for one collaborator call
    #[serde(default = "default_tool_timeout")]
    pub tool_timeout_secs: u64,
    /// Time limit for one sub-agent run
    #[serde(default = "default_agent_timeout")]
    pub agent_timeout_secs: u64,
    /// Refuse every tool that changes something
    #[serde(default)]
    pub read_only: bool,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            max_iterations: default_max_iterations(),
            tool_timeout_secs: default_tool_timeout(),
            agent_timeout_secs: default_agent_timeout(),
            read_only: false,
        }
    }
}

fn default_max_iterations() -> usize {
    kubepilot_core::dispatch::DEFAULT_MAX_ITERATIONS
}
fn default_tool_timeout() -> u64 {
    120
}
fn default_agent_timeout() -> u64 {
    900
}

/// Local git working copies
#[derive(Debug, Clone, Deserialize)]
pub struct GitConfig {
    #[serde(default = "default_workspace_dir")]
    pub workspace_dir: PathBuf,
}

impl Default for GitConfig {
    fn default() -> Self {
        Self {
            workspace_dir: default_workspace_dir(),
        }
    }
}

fn default_workspace_dir() -> PathBuf {
    PathBuf::from("repos")
}

/// GitLab endpoint; the token comes from `GITLAB_PRIVATE_TOKEN`
#[derive(Debug, Clone, Deserialize)]
pub struct GitLabAppConfig {
    #[serde(default = "default_gitlab_url")]
    pub url: String,
}

impl Default for GitLabAppConfig {
    fn default() -> Self {
        Self {
            url: default_gitlab_url(),
        }
    }
}

fn default_gitlab_url() -> String {
    kubepilot_tools::builtins::gitlab::DEFAULT_GITLAB_URL.to_string()
}

/// Documentation index
#[derive(Debug, Clone, Deserialize)]
pub struct KnowledgeConfig {
    #[serde(default = "default_index_dir")]
    pub index_dir: PathBuf,
    /// Document to index; `K8S_DOC_URL` is used when empty
    #[serde(default)]
    pub doc_url: String,
    #[serde(default = "default_top_k")]
    pub top_k: usize,
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
    #[serde(default = "default_chunk_overlap")]
    pub chunk_overlap: usize,
}

impl Default for KnowledgeConfig {
    fn default() -> Self {
        Self {
            index_dir: default_index_dir(),
            doc_url: String::new(),
            top_k: default_top_k(),
            chunk_size: default_chunk_size(),
            chunk_overlap: default_chunk_overlap(),
        }
    }
}

impl KnowledgeConfig {
    /// The configured document, falling back to `K8S_DOC_URL`
    pub fn doc_url(&self) -> Option<String> {
        Some(self.doc_url.trim().to_string())
            .filter(|url| !url.is_empty())
            .or_else(|| std::env::var("K8S_DOC_URL").ok())
            .filter(|url| !url.trim().is_empty())
    }
}

fn default_index_dir() -> PathBuf {
    PathBuf::from("k8s_index")
}
fn default_top_k() -> usize {
    kubepilot_tools::builtins::knowledge::DEFAULT_TOP_K
}
fn default_chunk_size() -> usize {
    kubepilot_search::chunker::DEFAULT_CHUNK_SIZE
}
fn default_chunk_overlap() -> usize {
    kubepilot_search::chunker::DEFAULT_CHUNK_OVERLAP
}

/// Log output
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoggingConfig {
    /// Emit JSON lines instead of human-readable text
    #[serde(default)]
    pub json: bool,
}

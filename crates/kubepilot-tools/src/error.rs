//! Error types for kubepilot-tools

use thiserror::Error;

/// Tool error type
#[derive(Debug, Error)]
pub enum Error {
    /// Tool not found
    #[error("tool not found: {0}")]
    NotFound(String),

    /// Two tools with the same name in one registry
    #[error("duplicate tool name: {0}")]
    DuplicateTool(String),

    /// Invalid input
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Permission denied
    #[error("permission denied: {0}")]
    PermissionDenied(String),

    /// Timeout
    #[error("timeout after {0}ms")]
    Timeout(u64),

    /// A collaborator (cluster, git, tracker, chat, index) reported a failure
    #[error("{0}")]
    Upstream(String),

    /// Network error
    #[error("network error: {0}")]
    Network(String),

    /// Collaborator is missing configuration
    #[error("not configured: {0}")]
    NotConfigured(String),

    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<kubepilot_llm::Error> for Error {
    fn from(e: kubepilot_llm::Error) -> Self {
        Self::Upstream(e.to_string())
    }
}

impl From<kubepilot_search::Error> for Error {
    fn from(e: kubepilot_search::Error) -> Self {
        Self::Upstream(e.to_string())
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

//! Error types for kubepilot-channels

use thiserror::Error;

/// Channel error type
#[derive(Debug, Error)]
pub enum Error {
    /// Slack error
    #[error("slack error: {0}")]
    Slack(String),

    /// The coordinator failed
    #[error("dispatch error: {0}")]
    Dispatch(#[from] kubepilot_core::Error),

    /// A message could not be delivered
    #[error("delivery error: {0}")]
    Delivery(#[from] kubepilot_tools::Error),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

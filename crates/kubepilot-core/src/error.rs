//! Error types for kubepilot-core
//!
//! This module provides error types and user-facing error text. Raw error
//! details stay in the logs; chat users only ever see the friendly wording.

use thiserror::Error;

/// Core error type
#[derive(Debug, Error)]
pub enum Error {
    /// LLM provider error
    #[error("llm error: {0}")]
    Llm(#[from] kubepilot_llm::Error),

    /// Tool setup error (duplicate names, missing collaborators)
    #[error("tool error: {0}")]
    Tool(#[from] kubepilot_tools::Error),

    /// Configuration error (bad agent settings, bad prompt templates)
    #[error("configuration error: {0}")]
    Configuration(String),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Trait for user-friendly error messages
pub trait UserFriendlyError {
    /// Get a user-friendly error message
    fn user_message(&self) -> String;

    /// Get a suggestion for how to fix the error
    fn suggestion(&self) -> Option<String>;
}

impl UserFriendlyError for Error {
    fn user_message(&self) -> String {
        match self {
            Error::Llm(kubepilot_llm::Error::NotConfigured(_)) => {
                "Sorry, the language model is not configured, so I can't help with that right now."
                    .to_string()
            }
            Error::Llm(_) => {
                "Sorry, I couldn't get an answer from the language model. Please try again in a moment."
                    .to_string()
            }
            Error::Tool(_) | Error::Configuration(_) => {
                "Sorry, something went wrong while handling your request.".to_string()
            }
        }
    }

    fn suggestion(&self) -> Option<String> {
        match self {
            Error::Llm(kubepilot_llm::Error::NotConfigured(_)) => {
                Some("Set OPENAI_API_KEY and restart the assistant.".to_string())
            }
            Error::Configuration(_) => {
                Some("Check config/default.toml and the KUBEPILOT_* environment variables.".to_string())
            }
            _ => None,
        }
    }
}

/// Format an error for display in a chat message
pub fn format_error_for_chat(error: &Error) -> String {
    let mut output = error.user_message();

    if let Some(suggestion) = error.suggestion() {
        output.push_str("\n\n");
        output.push_str(&suggestion);
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_llm_error_hides_details() {
        let error = Error::Llm(kubepilot_llm::Error::Api(
            "401 invalid key sk-abcdef".to_string(),
        ));

        let output = format_error_for_chat(&error);
        assert!(output.starts_with("Sorry"));
        assert!(!output.contains("sk-abcdef"));
    }

    #[test]
    fn test_not_configured_suggestion() {
        let error = Error::Llm(kubepilot_llm::Error::NotConfigured("OPENAI_API_KEY".to_string()));
        assert!(error.suggestion().unwrap().contains("OPENAI_API_KEY"));
    }

    #[test]
    fn test_tool_error_conversion() {
        let error: Error = kubepilot_tools::Error::DuplicateTool("k8s_sme".to_string()).into();
        assert!(error.to_string().starts_with("tool error"));
        assert!(error.suggestion().is_none());
    }
}

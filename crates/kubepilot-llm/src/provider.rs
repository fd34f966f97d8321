//! LLM provider trait

use crate::completion::{CompletionRequest, CompletionResponse};
use crate::error::Result;
use std::sync::Arc;

/// A chat-completion backend.
///
/// Implementations must be safe to share across concurrently running dispatch loops.
#[async_trait::async_trait]
pub trait LlmProvider: Send + Sync {
    /// Get the provider name
    fn name(&self) -> &str;

    /// Get the default model
    fn default_model(&self) -> &str;

    /// Complete a conversation (text only)
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse>;
}

/// Shared handle to a provider
pub type SharedLlmProvider = Arc<dyn LlmProvider>;

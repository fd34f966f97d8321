//! Kubepilot LLM - LLM Provider Abstraction
//!
//! This crate provides the language-model integration used by the dispatch loop:
//! - `LlmProvider`: the provider trait every planner talks to
//! - OpenAI: chat completions through async-openai
//! - Embeddings: OpenAI embeddings for the retrieval index
//! - Mock: a scripted provider for deterministic tests

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod completion;
pub mod embeddings;
pub mod error;
pub mod message;
pub mod mock;
pub mod openai;
pub mod provider;
pub mod util;

pub use completion::{CompletionRequest, CompletionResponse, TokenUsage};
pub use embeddings::{EmbeddingProvider, OpenAiEmbeddings, SharedEmbeddingProvider};
pub use error::{Error, Result};
pub use message::{Message, MessageRole};
pub use mock::MockProvider;
pub use openai::{OpenAiConfig, OpenAiProvider};
pub use provider::{LlmProvider, SharedLlmProvider};

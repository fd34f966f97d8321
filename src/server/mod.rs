//! Server module for Kubepilot
//!
//! Builds the shared clients and the coordinator, and runs the Slack bridge.
//!
//! # Module Structure
//!
//! - `config`: Configuration structures
//! - `loader`: Configuration loading from files and environment
//! - `init`: Client construction and the serve loop

pub mod config;
mod init;
mod loader;

pub use init::{build_coordinator, collaborators, embedder, llm_provider, run};
pub use loader::load_config;

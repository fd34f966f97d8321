//! Kubepilot Core - Dispatch Engine
//!
//! This crate turns a language model and a tool registry into agents:
//! - Dispatch: the decide/act/observe loop with an iteration cap
//! - Prompts: instructions for every built-in agent
//! - Agent tools: sub-agents exposed to another agent as ordinary tools
//! - Factory: builds the built-in sub-agents from shared clients
//! - Coordinator: the top-level agent that routes work to the sub-agents
//! - Event bus: live step events for observers such as the chat bridge

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod agent_tool;
pub mod coordinator;
pub mod dispatch;
pub mod error;
pub mod event_bus;
pub mod factory;
pub mod prompts;

#[cfg(test)]
mod test_support;

pub use agent_tool::AgentTool;
pub use coordinator::{Coordinator, Dispatcher, SharedDispatcher};
pub use dispatch::{
    Agent, AgentConfig, AgentDecision, DispatchOutcome, DispatchRequest, DispatchState,
    DispatchStatus, DispatchStep, ABORTED_MESSAGE,
};
pub use error::{format_error_for_chat, Error, Result, UserFriendlyError};
pub use event_bus::{DispatchEvent, EventBus};
pub use factory::{AgentFactory, AgentSettings, Collaborators};
pub use kubepilot_tools::builtins::MessageTarget;

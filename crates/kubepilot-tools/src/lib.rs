//! Kubepilot Tools - Tool Registry and Adapters
//!
//! This crate provides the tool layer used by every dispatch loop:
//! - Args: typed, ordered argument schemas parsed from free text
//! - Registry: name-keyed tool lookup, in registration order
//! - Runner: the total string-in/string-out invocation boundary
//! - Toolkit: named bundles of tools handed to one agent
//! - Builtins: cluster, source-control, issue-tracker, messaging and knowledge tools
//!
//! Every tool returns `Result<String>` internally; [`ToolRunner::invoke`] turns any
//! failure into readable text prefixed with [`ERROR_PREFIX`], so a planner never
//! sees a raised fault.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod args;
pub mod builtins;
pub mod error;
pub mod registry;
pub mod runner;
pub mod toolkit;

pub use args::{ArgField, ArgKind, ArgSchema, ArgValue, ParsedArgs};
pub use error::{Error, Result};
pub use registry::{RiskLevel, Tool, ToolCategory, ToolDefinition, ToolRegistry};
pub use runner::{RunnerConfig, ToolRunner, ERROR_PREFIX};
pub use toolkit::Toolkit;

//! Kubepilot Channels - Chat front ends
//!
//! This crate connects chat systems to the coordinator:
//! - Slack: Socket Mode listener that relays every step into the thread

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod slack;

pub use error::{Error, Result};
pub use slack::{SlackBridge, SlackConfig, SlackMessageSink};

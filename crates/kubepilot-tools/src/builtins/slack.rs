//! Slack - Outbound chat messages
//!
//! [`MessageSink`] is the outbound half of the chat bridge. The bridge uses it to
//! post progress and answers; [`SlackSendMessageTool`] lets a planner post on its
//! own, bound to the channel and thread the request came from.

use crate::args::{ArgSchema, ParsedArgs};
use crate::error::Result;
use crate::registry::{RiskLevel, Tool, ToolCategory, ToolDefinition};
use std::sync::Arc;

/// Where a message goes
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MessageTarget {
    /// Channel id
    pub channel: String,
    /// Parent message timestamp, for threaded replies
    pub thread_ts: Option<String>,
}

impl MessageTarget {
    /// Top level of a channel
    #[must_use]
    pub fn channel(channel: impl Into<String>) -> Self {
        Self {
            channel: channel.into(),
            thread_ts: None,
        }
    }

    /// A thread in a channel
    #[must_use]
    pub fn thread(channel: impl Into<String>, thread_ts: impl Into<String>) -> Self {
        Self {
            channel: channel.into(),
            thread_ts: Some(thread_ts.into()),
        }
    }
}

/// Message body
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutgoingMessage {
    /// Plain text
    Text(String),
    /// Markdown sections, rendered as blocks
    Sections(Vec<String>),
}

impl OutgoingMessage {
    /// Plain text message
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    /// Text fallback for clients that do not render blocks
    #[must_use]
    pub fn plain_text(&self) -> String {
        match self {
            Self::Text(text) => text.clone(),
            Self::Sections(sections) => sections.join("\n\n"),
        }
    }
}

/// Posts messages to a chat system
#[async_trait::async_trait]
pub trait MessageSink: Send + Sync {
    /// Post one message
    async fn post(&self, target: &MessageTarget, message: OutgoingMessage) -> Result<()>;
}

/// Shared message sink
pub type SharedMessageSink = Arc<dyn MessageSink>;

/// Turn the two-character sequence `\n` into real newlines
#[must_use]
pub fn unescape_newlines(text: &str) -> String {
    text.replace("\\n", "\n")
}

/// `slack_send_message`: post into the conversation the request came from
pub struct SlackSendMessageTool {
    definition: ToolDefinition,
    sink: SharedMessageSink,
    target: MessageTarget,
}

impl SlackSendMessageTool {
    /// Create a tool bound to one channel and thread
    #[must_use]
    pub fn new(sink: SharedMessageSink, target: MessageTarget) -> Self {
        Self {
            definition: ToolDefinition::new(
                "slack_send_message",
                "Only use this tool if you are absolutely sure you want to send a message to slack. \
                 Can be used to send a message in Slack.",
            )
            .with_args(ArgSchema::none().text("message", "the message to send"))
            .with_risk_level(RiskLevel::High)
            .with_category(ToolCategory::Messaging),
            sink,
            target,
        }
    }

    /// Where messages go
    #[must_use]
    pub fn target(&self) -> &MessageTarget {
        &self.target
    }
}

#[async_trait::async_trait]
impl Tool for SlackSendMessageTool {
    fn definition(&self) -> &ToolDefinition {
        &self.definition
    }

    async fn call(&self, args: ParsedArgs) -> Result<String> {
        let text = unescape_newlines(args.str("message")?);
        self.sink
            .post(&self.target, OutgoingMessage::Text(text))
            .await?;
        Ok("Message sent".to_string())
    }
}

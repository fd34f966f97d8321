use super::{formatting, SlackBridge, SlackConfig};
use crate::error::{Error, Result};
use kubepilot_tools::builtins::{MessageSink, MessageTarget, OutgoingMessage};
use slack_morphism::prelude::*;
use std::sync::Arc;
use tracing::{debug, info};

/// Posts messages with `chat.postMessage`
pub struct SlackMessageSink {
    client: Arc<SlackHyperClient>,
    token: SlackApiToken,
}

impl std::fmt::Debug for SlackMessageSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SlackMessageSink").finish_non_exhaustive()
    }
}

impl SlackMessageSink {
    /// Create a sink that posts as the bot
    pub fn new(config: &SlackConfig) -> Result<Self> {
        let connector = SlackClientHyperConnector::new()
            .map_err(|e| Error::Slack(format!("Failed to create HTTP connector: {}", e)))?;
        Ok(Self {
            client: Arc::new(SlackClient::new(connector)),
            token: config.bot_api_token(),
        })
    }
}

#[async_trait::async_trait]
impl MessageSink for SlackMessageSink {
    async fn post(
        &self,
        target: &MessageTarget,
        message: OutgoingMessage,
    ) -> kubepilot_tools::Result<()> {
        let session = self.client.open_session(&self.token);

        let mut content = SlackMessageContent::new().with_text(message.plain_text());
        if let OutgoingMessage::Sections(sections) = &message {
            content = content.with_blocks(formatting::section_blocks(sections));
        }

        let mut request = SlackApiChatPostMessageRequest::new(target.channel.clone().into(), content);
        if let Some(thread_ts) = &target.thread_ts {
            request = request.with_thread_ts(thread_ts.clone().into());
        }

        let response = session
            .chat_post_message(&request)
            .await
            .map_err(|e| kubepilot_tools::Error::Upstream(format!("slack: {}", e)))?;

        debug!(channel = %target.channel, ts = %response.ts, "Slack message posted");
        Ok(())
    }
}

impl SlackBridge {
    /// Fetch bot user info and cache the bot user ID
    pub(crate) async fn fetch_bot_info(&self) -> Result<()> {
        let connector = SlackClientHyperConnector::new()
            .map_err(|e| Error::Slack(format!("Failed to create HTTP connector: {}", e)))?;
        let client = SlackClient::new(connector);
        let token = self.config.bot_api_token();
        let session = client.open_session(&token);

        let auth_response = session
            .auth_test()
            .await
            .map_err(|e| Error::Slack(format!("Failed to fetch bot info: {}", e)))?;

        let user_id = auth_response.user_id;
        info!(user_id = %user_id, "Bot user ID fetched");
        self.set_bot_user_id(user_id.to_string()).await;

        Ok(())
    }
}

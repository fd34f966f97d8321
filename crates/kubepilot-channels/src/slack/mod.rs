//! Slack - slack-morphism bridge
//!
//! Listens over Socket Mode for `message` and `app_mention` events, hands each
//! accepted message to the coordinator and relays the steps into the thread
//! the message came from.

use crate::error::{Error, Result};
use kubepilot_core::SharedDispatcher;
use kubepilot_llm::util::mask_api_key;
use kubepilot_tools::builtins::SharedMessageSink;
use slack_morphism::prelude::*;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::info;

/// Slack Web API client and outbound messages.
pub mod api;
/// Socket Mode event handlers.
pub mod events;
/// Message text and blocks.
pub mod formatting;


pub use api::SlackMessageSink;
pub use events::InboundMessage;

/// Slack bot configuration
#[derive(Clone)]
pub struct SlackConfig {
    /// Bot token (xoxb-...)
    pub bot_token: String,
    /// App token for Socket Mode (xapp-...)
    pub app_token: String,
    /// Channel for messages that have no conversation of their own
    pub default_channel: Option<String>,
}

impl std::fmt::Debug for SlackConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SlackConfig")
            .field("bot_token", &mask_api_key(&self.bot_token))
            .field("app_token", &mask_api_key(&self.app_token))
            .field("default_channel", &self.default_channel)
            .finish()
    }
}

impl SlackConfig {
    /// Create from environment variables
    pub fn from_env() -> Result<Self> {
        let bot_token = std::env::var("SLACK_BOT_TOKEN")
            .map_err(|_| Error::Slack("SLACK_BOT_TOKEN not set".to_string()))?;

        let app_token = std::env::var("SLACK_APP_TOKEN")
            .map_err(|_| Error::Slack("SLACK_APP_TOKEN not set".to_string()))?;

        let default_channel = std::env::var("SLACK_CHANNEL_ID")
            .ok()
            .filter(|c| !c.trim().is_empty());

        Ok(Self {
            bot_token,
            app_token,
            default_channel,
        })
    }

    /// Create with both tokens
    #[must_use]
    pub fn new(bot_token: impl Into<String>, app_token: impl Into<String>) -> Self {
        Self {
            bot_token: bot_token.into(),
            app_token: app_token.into(),
            default_channel: None,
        }
    }

    /// Set the default channel
    #[must_use]
    pub fn with_default_channel(mut self, channel: impl Into<String>) -> Self {
        self.default_channel = Some(channel.into());
        self
    }

    pub(crate) fn bot_api_token(&self) -> SlackApiToken {
        SlackApiToken::new(self.bot_token.clone().into())
    }

    pub(crate) fn app_api_token(&self) -> SlackApiToken {
        SlackApiToken::new(self.app_token.clone().into())
    }
}

/// Slack bridge with Socket Mode support
pub struct SlackBridge {
    pub(crate) config: SlackConfig,
    pub(crate) sink: SharedMessageSink,
    pub(crate) dispatcher: SharedDispatcher,
    pub(crate) bot_user_id: RwLock<Option<String>>,
}

impl std::fmt::Debug for SlackBridge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SlackBridge")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl SlackBridge {
    /// Create a bridge that posts through `sink` and answers with `dispatcher`
    #[must_use]
    pub fn new(config: SlackConfig, sink: SharedMessageSink, dispatcher: SharedDispatcher) -> Self {
        Self {
            config,
            sink,
            dispatcher,
            bot_user_id: RwLock::new(None),
        }
    }

    /// Bridge configuration
    #[must_use]
    pub fn config(&self) -> &SlackConfig {
        &self.config
    }

    /// Get the cached bot user ID
    pub async fn get_bot_user_id(&self) -> Option<String> {
        self.bot_user_id.read().await.clone()
    }

    /// Set the bot user ID
    pub async fn set_bot_user_id(&self, user_id: impl Into<String>) {
        *self.bot_user_id.write().await = Some(user_id.into());
    }

    /// Start the bridge in Socket Mode.
    ///
    /// Resolves the bot's own user id first so its messages are never answered,
    /// then serves events until the listener shuts down.
    pub async fn run(self: Arc<Self>) -> Result<()> {
        info!("Starting Slack bridge in Socket Mode");

        self.fetch_bot_info().await?;

        info!(
            bot_user_id = ?self.get_bot_user_id().await,
            "Slack bridge ready, starting Socket Mode listener"
        );

        let connector = SlackClientHyperConnector::new()
            .map_err(|e| Error::Slack(format!("HTTP connector: {}", e)))?;
        let client = Arc::new(SlackClient::new(connector));

        let callbacks =
            SlackSocketModeListenerCallbacks::new().with_push_events(events::socket_mode_push_handler);

        let user_state = events::SocketModeState {
            bridge: self.clone(),
        };

        let listener_env = Arc::new(
            SlackClientEventsListenerEnvironment::new(client.clone()).with_user_state(user_state),
        );

        let listener = SlackClientSocketModeListener::new(
            &SlackClientSocketModeConfig::new(),
            listener_env,
            callbacks,
        );

        listener
            .listen_for(&self.config.app_api_token())
            .await
            .map_err(|e| Error::Slack(format!("Socket Mode listen: {}", e)))?;

        info!("Socket Mode connected, serving events...");
        listener.serve().await;

        info!("Slack bridge shutdown complete");
        Ok(())
    }
}

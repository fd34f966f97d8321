use super::formatting::{format_step, mentions_user, strip_leading_mention, THINKING_MESSAGE};
use super::SlackBridge;
use crate::error::Result;
use kubepilot_core::{format_error_for_chat, DispatchEvent, DispatchRequest, EventBus, MessageTarget};
use kubepilot_tools::builtins::slack::unescape_newlines;
use kubepilot_tools::builtins::{OutgoingMessage, SharedMessageSink};
use slack_morphism::prelude::*;
use std::sync::Arc;
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

/// Shared state passed to Socket Mode callbacks via user state.
pub(crate) struct SocketModeState {
    pub(crate) bridge: Arc<SlackBridge>,
}

/// Socket Mode push event handler (plain function, no captures).
pub(crate) async fn socket_mode_push_handler(
    event: SlackPushEventCallback,
    _client: Arc<SlackHyperClient>,
    states: SlackClientEventsUserState,
) -> std::result::Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let bridge = {
        let state_guard = states.read().await;
        let Some(state) = state_guard.get_user_state::<SocketModeState>() else {
            warn!("SocketModeState not found in user state");
            return Ok(());
        };
        Arc::clone(&state.bridge)
    };

    let inbound = match event.event {
        SlackEventCallbackBody::Message(msg) => InboundMessage::from_message(msg),
        SlackEventCallbackBody::AppMention(mention) => Some(InboundMessage::from_mention(mention)),
        _ => {
            debug!("Unhandled Slack event type, ignoring");
            None
        }
    };

    if let Some(inbound) = inbound {
        // The task runs on its own; the listener must ack quickly
        let _ = bridge.handle(inbound).await;
    }

    Ok(())
}

/// A chat message as the bridge sees it
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InboundMessage {
    /// Channel id
    pub channel: String,
    /// Sender user id
    pub user: Option<String>,
    /// Set when a bot sent the message
    pub bot_id: Option<String>,
    /// Edits, joins and other non-plain messages
    pub has_subtype: bool,
    /// Message text
    pub text: String,
    /// Message timestamp
    pub ts: String,
    /// Parent timestamp when the message is in a thread
    pub thread_ts: Option<String>,
    /// Came in as an `app_mention`
    pub mention: bool,
}

impl InboundMessage {
    /// From a `message` event; `None` when it has no channel
    #[must_use]
    pub fn from_message(msg: SlackMessageEvent) -> Option<Self> {
        let channel = msg.origin.channel.as_ref()?.to_string();
        Some(Self {
            channel,
            user: msg.sender.user.as_ref().map(|u| u.to_string()),
            bot_id: msg.sender.bot_id.as_ref().map(|b| b.to_string()),
            has_subtype: msg.subtype.is_some(),
            text: msg
                .content
                .as_ref()
                .and_then(|c| c.text.as_ref())
                .cloned()
                .unwrap_or_default(),
            ts: msg.origin.ts.to_string(),
            thread_ts: msg.origin.thread_ts.as_ref().map(|t| t.to_string()),
            mention: false,
        })
    }

    /// From an `app_mention` event
    #[must_use]
    pub fn from_mention(mention: SlackAppMentionEvent) -> Self {
        Self {
            channel: mention.channel.to_string(),
            user: Some(mention.user.to_string()),
            bot_id: None,
            has_subtype: false,
            text: mention.content.text.clone().unwrap_or_default(),
            ts: mention.origin.ts.to_string(),
            thread_ts: mention.origin.thread_ts.as_ref().map(|t| t.to_string()),
            mention: true,
        }
    }

    /// Sent in a direct message channel, where no `app_mention` is delivered
    #[must_use]
    pub fn is_direct(&self) -> bool {
        self.channel.starts_with('D')
    }

    /// The thread replies go to
    #[must_use]
    pub fn reply_target(&self) -> MessageTarget {
        MessageTarget::thread(
            self.channel.clone(),
            self.thread_ts.clone().unwrap_or_else(|| self.ts.clone()),
        )
    }
}

impl SlackBridge {
    /// Decide whether to answer; returns the reply thread and the instruction
    pub async fn accept(&self, msg: &InboundMessage) -> Option<(MessageTarget, String)> {
        if msg.bot_id.is_some() || msg.has_subtype {
            return None;
        }

        let bot_user_id = self.get_bot_user_id().await;
        if let Some(bot) = &bot_user_id {
            if msg.user.as_deref() == Some(bot.as_str()) {
                return None;
            }
            // Channel mentions also arrive as `app_mention`; answer that one only
            if !msg.mention && !msg.is_direct() && mentions_user(&msg.text, bot) {
                return None;
            }
        }

        let text = if msg.mention {
            strip_leading_mention(&msg.text)
        } else {
            msg.text.clone()
        };
        let text = text.trim();
        if text.is_empty() {
            return None;
        }

        Some((msg.reply_target(), text.to_string()))
    }

    /// Answer `msg` in a task of its own; `None` when it is ignored
    pub async fn handle(self: &Arc<Self>, msg: InboundMessage) -> Option<JoinHandle<()>> {
        let Some((target, text)) = self.accept(&msg).await else {
            debug!(channel = %msg.channel, "Ignoring Slack message");
            return None;
        };

        info!(channel = %target.channel, user = ?msg.user, "Processing Slack message");

        let bridge = Arc::clone(self);
        Some(tokio::spawn(async move {
            if let Err(e) = bridge.respond(target, text).await {
                error!(error = %e, "Failed to process Slack message");
            }
        }))
    }

    /// Run one request and post progress and the answer into `target`
    pub async fn respond(&self, target: MessageTarget, text: String) -> Result<()> {
        self.sink
            .post(&target, OutgoingMessage::text(THINKING_MESSAGE))
            .await?;

        let bus = EventBus::default();
        let relay = tokio::spawn(relay_steps(
            bus.subscribe(),
            Arc::clone(&self.sink),
            target.clone(),
        ));

        let request = DispatchRequest::new(text)
            .with_event_bus(bus)
            .with_reply_to(target.clone());
        let result = self.dispatcher.dispatch(request).await;

        if let Err(e) = relay.await {
            warn!(error = %e, "Step relay ended abnormally");
        }

        match result {
            Ok(outcome) => {
                info!(
                    execution_id = %outcome.execution_id,
                    iterations = outcome.iterations,
                    finished = outcome.is_finished(),
                    "Slack request answered"
                );
                self.sink
                    .post(&target, OutgoingMessage::Text(unescape_newlines(&outcome.output)))
                    .await?;
                Ok(())
            }
            Err(e) => {
                self.sink
                    .post(&target, OutgoingMessage::Text(format_error_for_chat(&e)))
                    .await?;
                Err(e.into())
            }
        }
    }
}

/// Post every observed step until the dispatch ends
async fn relay_steps(
    mut rx: broadcast::Receiver<DispatchEvent>,
    sink: SharedMessageSink,
    target: MessageTarget,
) {
    loop {
        match rx.recv().await {
            Ok(DispatchEvent::StepObserved {
                log, observation, ..
            }) => {
                let text = format_step(&log, &observation);
                if let Err(e) = sink.post(&target, OutgoingMessage::Text(text)).await {
                    warn!(error = %e, "Failed to relay step");
                }
            }
            Ok(event) if event.is_terminal() => break,
            Ok(_) => {}
            Err(RecvError::Lagged(skipped)) => {
                warn!(skipped, "Step relay lagged");
            }
            Err(RecvError::Closed) => break,
        }
    }
}

//! Per-channel invocation context
//!
//! A context carries the channel id, the latest message snapshot for that
//! channel, and the outbound capability handle. Contexts are cached one per
//! channel so repeated commands reuse the same capability wiring; the cache
//! is intentionally unbounded (one entry per channel the account speaks in).

use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use parking_lot::RwLock;
use serde_json::Value;

use wirebot_core::{Message, Snowflake, User};
use wirebot_rest::{Outbound, RestError, RestResult};

/// Invocation context handed to command handlers
pub struct Context {
    channel_id: Snowflake,
    message: RwLock<Option<Message>>,
    outbound: Arc<dyn Outbound>,
}

impl Context {
    /// Create a context for a channel
    pub fn new(channel_id: Snowflake, outbound: Arc<dyn Outbound>) -> Self {
        Self {
            channel_id,
            message: RwLock::new(None),
            outbound,
        }
    }

    /// The channel this context is bound to
    pub fn channel_id(&self) -> Snowflake {
        self.channel_id
    }

    /// Snapshot of the message that triggered the current invocation
    pub fn message(&self) -> Option<Message> {
        self.message.read().clone()
    }

    /// Replace the message snapshot (called as new messages arrive)
    pub fn set_message(&self, message: Message) {
        *self.message.write() = Some(message);
    }

    /// Send a message to this channel
    pub async fn send(&self, content: &str) -> RestResult<Message> {
        self.outbound.send(self.channel_id, content).await
    }

    /// Edit a message in this channel
    pub async fn edit(&self, message_id: Snowflake, content: &str) -> RestResult<Message> {
        self.outbound.edit(self.channel_id, message_id, content).await
    }

    /// Delete a message in this channel
    pub async fn delete(&self, message_id: Snowflake) -> RestResult<()> {
        self.outbound.delete(self.channel_id, message_id).await
    }

    /// Delete several messages in one call
    pub async fn bulk_delete(&self, message_ids: &[Snowflake]) -> RestResult<()> {
        self.outbound.bulk_delete(self.channel_id, message_ids).await
    }

    /// React to a message
    pub async fn add_reaction(&self, message_id: Snowflake, emoji: &str) -> RestResult<()> {
        self.outbound
            .add_reaction(self.channel_id, message_id, emoji)
            .await
    }

    /// Remove own reaction from a message
    pub async fn remove_reaction(&self, message_id: Snowflake, emoji: &str) -> RestResult<()> {
        self.outbound
            .remove_reaction(self.channel_id, message_id, emoji)
            .await
    }

    /// Users who reacted with an emoji
    pub async fn reactions(&self, message_id: Snowflake, emoji: &str) -> RestResult<Vec<User>> {
        self.outbound
            .fetch_reactions(self.channel_id, message_id, emoji)
            .await
    }

    /// Recent channel history, newest first
    pub async fn history(&self, limit: u8, before: Option<Snowflake>) -> RestResult<Vec<Message>> {
        self.outbound
            .fetch_history(self.channel_id, limit, before)
            .await
    }

    /// Raw info for this channel
    pub async fn channel_info(&self) -> RestResult<Value> {
        self.outbound.fetch_channel(self.channel_id).await
    }

    /// Raw info for the guild of the current message
    pub async fn guild_info(&self) -> RestResult<Value> {
        let guild_id = self
            .message()
            .and_then(|m| m.guild_id)
            .ok_or_else(|| RestError::NotFound("Guild".to_string()))?;
        self.outbound.fetch_guild(guild_id).await
    }

    /// Raw info for a user
    pub async fn user_info(&self, user_id: Snowflake) -> RestResult<Value> {
        self.outbound.fetch_user(user_id).await
    }

    /// Show the typing indicator in this channel
    pub async fn typing(&self) -> RestResult<()> {
        self.outbound.trigger_typing(self.channel_id).await
    }

    /// Send `content` repeatedly
    ///
    /// `count` of zero repeats until a send fails. The delay separates
    /// consecutive sends; there is no delay after the last one.
    pub async fn spam(&self, content: &str, count: u64, delay: Duration) -> RestResult<()> {
        let mut sent = 0u64;
        loop {
            self.send(content).await?;
            sent += 1;
            if count != 0 && sent >= count {
                return Ok(());
            }
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
        }
    }
}

/// Cache of one live context per channel
///
/// Get-or-create is a single atomic map operation, so two concurrent events
/// for the same channel can never produce two contexts.
pub struct ContextCache {
    channels: DashMap<Snowflake, Arc<Context>>,
    outbound: Arc<dyn Outbound>,
}

impl ContextCache {
    /// Create an empty cache backed by an outbound capability
    pub fn new(outbound: Arc<dyn Outbound>) -> Self {
        Self {
            channels: DashMap::new(),
            outbound,
        }
    }

    /// The context for a channel, created on first use
    ///
    /// When a message snapshot is supplied the cached context is updated in
    /// place before being returned.
    pub fn get_or_create(&self, channel_id: Snowflake, message: Option<Message>) -> Arc<Context> {
        let ctx = self
            .channels
            .entry(channel_id)
            .or_insert_with(|| Arc::new(Context::new(channel_id, Arc::clone(&self.outbound))))
            .clone();
        if let Some(message) = message {
            ctx.set_message(message);
        }
        ctx
    }

    /// Number of channels with a live context
    pub fn len(&self) -> usize {
        self.channels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }
}

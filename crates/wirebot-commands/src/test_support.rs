//! Shared doubles and fixtures for this crate's unit tests

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::{json, Value};

use wirebot_core::{Message, Snowflake, User};
use wirebot_rest::{Outbound, RestError, RestResult};

/// Outbound double that records sends and can be told to fail
pub(crate) struct RecordingOutbound {
    sent: Mutex<Vec<(Snowflake, String)>>,
    fail_sends: Mutex<bool>,
}

impl RecordingOutbound {
    pub(crate) fn shared() -> Arc<Self> {
        Arc::new(Self {
            sent: Mutex::new(Vec::new()),
            fail_sends: Mutex::new(false),
        })
    }

    /// Contents of every send so far, in order
    pub(crate) fn sent(&self) -> Vec<String> {
        self.sent.lock().iter().map(|(_, c)| c.clone()).collect()
    }

    /// Make subsequent sends fail with a permission error
    pub(crate) fn fail_sends(&self) {
        *self.fail_sends.lock() = true;
    }
}

#[async_trait]
impl Outbound for RecordingOutbound {
    async fn send(&self, channel_id: Snowflake, content: &str) -> RestResult<Message> {
        if *self.fail_sends.lock() {
            return Err(RestError::MissingPermission("send_messages".into()));
        }
        self.sent.lock().push((channel_id, content.to_string()));
        Ok(sample_message(0, channel_id.into_inner(), content))
    }

    async fn edit(
        &self,
        channel_id: Snowflake,
        _message_id: Snowflake,
        content: &str,
    ) -> RestResult<Message> {
        Ok(sample_message(0, channel_id.into_inner(), content))
    }

    async fn delete(&self, _channel_id: Snowflake, _message_id: Snowflake) -> RestResult<()> {
        Ok(())
    }

    async fn bulk_delete(
        &self,
        _channel_id: Snowflake,
        _message_ids: &[Snowflake],
    ) -> RestResult<()> {
        Ok(())
    }

    async fn add_reaction(
        &self,
        _channel_id: Snowflake,
        _message_id: Snowflake,
        _emoji: &str,
    ) -> RestResult<()> {
        Ok(())
    }

    async fn remove_reaction(
        &self,
        _channel_id: Snowflake,
        _message_id: Snowflake,
        _emoji: &str,
    ) -> RestResult<()> {
        Ok(())
    }

    async fn fetch_reactions(
        &self,
        _channel_id: Snowflake,
        _message_id: Snowflake,
        _emoji: &str,
    ) -> RestResult<Vec<User>> {
        Ok(Vec::new())
    }

    async fn fetch_history(
        &self,
        _channel_id: Snowflake,
        _limit: u8,
        _before: Option<Snowflake>,
    ) -> RestResult<Vec<Message>> {
        Ok(Vec::new())
    }

    async fn fetch_channel(&self, channel_id: Snowflake) -> RestResult<Value> {
        Ok(json!({ "id": channel_id.to_string() }))
    }

    async fn fetch_guild(&self, guild_id: Snowflake) -> RestResult<Value> {
        Ok(json!({ "id": guild_id.to_string() }))
    }

    async fn fetch_user(&self, user_id: Snowflake) -> RestResult<Value> {
        Ok(json!({ "id": user_id.to_string() }))
    }

    async fn trigger_typing(&self, _channel_id: Snowflake) -> RestResult<()> {
        Ok(())
    }
}

/// Build a message snapshot with the given author and content
pub(crate) fn sample_message(author_id: i64, channel_id: i64, content: &str) -> Message {
    Message {
        id: Snowflake::new(1),
        channel_id: Snowflake::new(channel_id),
        guild_id: None,
        author: User::with_id(Snowflake::new(author_id)),
        content: content.to_string(),
        timestamp: None,
        edited_timestamp: None,
    }
}

/// Wire-shaped MESSAGE_CREATE payload
pub(crate) fn message_create_payload(author_id: i64, channel_id: i64, content: &str) -> Value {
    json!({
        "id": "1",
        "channel_id": channel_id.to_string(),
        "author": { "id": author_id.to_string(), "username": "self" },
        "content": content,
    })
}

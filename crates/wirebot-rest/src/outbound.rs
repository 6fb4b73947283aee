//! Outbound capability trait
//!
//! The seam between the dispatch pipeline and the REST layer. Command
//! handlers only ever see this trait, which is what lets the test suite
//! substitute a recording double.

use async_trait::async_trait;
use serde_json::Value;

use wirebot_core::{Message, Snowflake, User};

use crate::error::RestResult;

/// Outbound calls available to command handlers
#[async_trait]
pub trait Outbound: Send + Sync {
    /// Send a message to a channel
    async fn send(&self, channel_id: Snowflake, content: &str) -> RestResult<Message>;

    /// Edit a previously sent message
    async fn edit(
        &self,
        channel_id: Snowflake,
        message_id: Snowflake,
        content: &str,
    ) -> RestResult<Message>;

    /// Delete a message
    async fn delete(&self, channel_id: Snowflake, message_id: Snowflake) -> RestResult<()>;

    /// Delete several messages in one call
    async fn bulk_delete(&self, channel_id: Snowflake, message_ids: &[Snowflake]) -> RestResult<()>;

    /// Add a reaction to a message on behalf of the acting account
    async fn add_reaction(
        &self,
        channel_id: Snowflake,
        message_id: Snowflake,
        emoji: &str,
    ) -> RestResult<()>;

    /// Remove the acting account's reaction from a message
    async fn remove_reaction(
        &self,
        channel_id: Snowflake,
        message_id: Snowflake,
        emoji: &str,
    ) -> RestResult<()>;

    /// List the users who reacted with an emoji
    async fn fetch_reactions(
        &self,
        channel_id: Snowflake,
        message_id: Snowflake,
        emoji: &str,
    ) -> RestResult<Vec<User>>;

    /// Fetch recent message history for a channel, newest first
    async fn fetch_history(
        &self,
        channel_id: Snowflake,
        limit: u8,
        before: Option<Snowflake>,
    ) -> RestResult<Vec<Message>>;

    /// Fetch raw channel info
    async fn fetch_channel(&self, channel_id: Snowflake) -> RestResult<Value>;

    /// Fetch raw guild info
    async fn fetch_guild(&self, guild_id: Snowflake) -> RestResult<Value>;

    /// Fetch raw user info
    async fn fetch_user(&self, user_id: Snowflake) -> RestResult<Value>;

    /// Show the typing indicator in a channel
    async fn trigger_typing(&self, channel_id: Snowflake) -> RestResult<()>;
}

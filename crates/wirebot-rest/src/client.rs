//! HTTP implementation of the outbound capability

use async_trait::async_trait;
use serde_json::{json, Value};
use std::time::Duration;

use wirebot_core::{Message, Snowflake, User};

use crate::error::{RestError, RestResult};
use crate::outbound::Outbound;

/// Fallback when a 429 response carries no usable Retry-After header
const DEFAULT_RETRY_AFTER: Duration = Duration::from_secs(1);

/// Reqwest-backed implementation of [`Outbound`]
///
/// One instance per bot; reqwest pools connections internally so cloning
/// the client is cheap and unnecessary.
pub struct RestClient {
    http: reqwest::Client,
    base_url: String,
    auth: String,
}

impl RestClient {
    /// Create a client for the given API root
    ///
    /// `bot_account` selects the `Bot ` authorization prefix used by bot
    /// credentials; user credentials are sent bare.
    pub fn new(base_url: impl Into<String>, token: impl Into<String>, bot_account: bool) -> Self {
        let token = token.into();
        let auth = if bot_account {
            format!("Bot {token}")
        } else {
            token
        };
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            auth,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// Map non-success statuses to the error taxonomy
    ///
    /// `permission` names the permission a 403 implies; `resource` names
    /// what a 404 failed to find.
    async fn check(
        response: reqwest::Response,
        permission: &str,
        resource: &str,
    ) -> RestResult<reqwest::Response> {
        let status = response.status();
        if status.as_u16() == 429 {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse::<f64>().ok())
                .map_or(DEFAULT_RETRY_AFTER, Duration::from_secs_f64);
            tracing::warn!(retry_after_s = retry_after.as_secs_f64(), "Rate limited");
            return Err(RestError::RateLimited { retry_after });
        }
        if status.as_u16() == 403 {
            return Err(RestError::MissingPermission(permission.to_string()));
        }
        if status.as_u16() == 404 {
            return Err(RestError::NotFound(resource.to_string()));
        }
        if status.is_client_error() || status.is_server_error() {
            let message = response.text().await.unwrap_or_default();
            return Err(RestError::Http {
                status: status.as_u16(),
                message,
            });
        }
        Ok(response)
    }
}

#[async_trait]
impl Outbound for RestClient {
    async fn send(&self, channel_id: Snowflake, content: &str) -> RestResult<Message> {
        let response = self
            .http
            .post(self.url(&format!("/channels/{channel_id}/messages")))
            .header("Authorization", &self.auth)
            .json(&json!({ "content": content }))
            .send()
            .await?;
        let response = Self::check(response, "send_messages", "Channel").await?;
        Ok(response.json().await?)
    }

    async fn edit(
        &self,
        channel_id: Snowflake,
        message_id: Snowflake,
        content: &str,
    ) -> RestResult<Message> {
        let response = self
            .http
            .patch(self.url(&format!("/channels/{channel_id}/messages/{message_id}")))
            .header("Authorization", &self.auth)
            .json(&json!({ "content": content }))
            .send()
            .await?;
        let response = Self::check(response, "manage_messages", "Message").await?;
        Ok(response.json().await?)
    }

    async fn delete(&self, channel_id: Snowflake, message_id: Snowflake) -> RestResult<()> {
        let response = self
            .http
            .delete(self.url(&format!("/channels/{channel_id}/messages/{message_id}")))
            .header("Authorization", &self.auth)
            .send()
            .await?;
        Self::check(response, "manage_messages", "Message").await?;
        Ok(())
    }

    async fn bulk_delete(&self, channel_id: Snowflake, message_ids: &[Snowflake]) -> RestResult<()> {
        let response = self
            .http
            .post(self.url(&format!("/channels/{channel_id}/messages/bulk-delete")))
            .header("Authorization", &self.auth)
            .json(&json!({ "messages": message_ids }))
            .send()
            .await?;
        Self::check(response, "manage_messages", "Channel").await?;
        Ok(())
    }

    async fn add_reaction(
        &self,
        channel_id: Snowflake,
        message_id: Snowflake,
        emoji: &str,
    ) -> RestResult<()> {
        let emoji = urlencoding::encode(emoji);
        let response = self
            .http
            .put(self.url(&format!(
                "/channels/{channel_id}/messages/{message_id}/reactions/{emoji}/@me"
            )))
            .header("Authorization", &self.auth)
            .send()
            .await?;
        Self::check(response, "add_reactions", "Message").await?;
        Ok(())
    }

    async fn remove_reaction(
        &self,
        channel_id: Snowflake,
        message_id: Snowflake,
        emoji: &str,
    ) -> RestResult<()> {
        let emoji = urlencoding::encode(emoji);
        let response = self
            .http
            .delete(self.url(&format!(
                "/channels/{channel_id}/messages/{message_id}/reactions/{emoji}/@me"
            )))
            .header("Authorization", &self.auth)
            .send()
            .await?;
        Self::check(response, "add_reactions", "Message").await?;
        Ok(())
    }

    async fn fetch_reactions(
        &self,
        channel_id: Snowflake,
        message_id: Snowflake,
        emoji: &str,
    ) -> RestResult<Vec<User>> {
        let emoji = urlencoding::encode(emoji);
        let response = self
            .http
            .get(self.url(&format!(
                "/channels/{channel_id}/messages/{message_id}/reactions/{emoji}"
            )))
            .header("Authorization", &self.auth)
            .send()
            .await?;
        let response = Self::check(response, "read_message_history", "Message").await?;
        Ok(response.json().await?)
    }

    async fn fetch_history(
        &self,
        channel_id: Snowflake,
        limit: u8,
        before: Option<Snowflake>,
    ) -> RestResult<Vec<Message>> {
        let mut request = self
            .http
            .get(self.url(&format!("/channels/{channel_id}/messages")))
            .header("Authorization", &self.auth)
            .query(&[("limit", u64::from(limit))]);
        if let Some(before) = before {
            request = request.query(&[("before", before.to_string())]);
        }
        let response = request.send().await?;
        let response = Self::check(response, "read_message_history", "Channel").await?;
        Ok(response.json().await?)
    }

    async fn fetch_channel(&self, channel_id: Snowflake) -> RestResult<Value> {
        let response = self
            .http
            .get(self.url(&format!("/channels/{channel_id}")))
            .header("Authorization", &self.auth)
            .send()
            .await?;
        let response = Self::check(response, "view_channel", "Channel").await?;
        Ok(response.json().await?)
    }

    async fn fetch_guild(&self, guild_id: Snowflake) -> RestResult<Value> {
        let response = self
            .http
            .get(self.url(&format!("/guilds/{guild_id}")))
            .header("Authorization", &self.auth)
            .send()
            .await?;
        let response = Self::check(response, "view_guild", "Guild").await?;
        Ok(response.json().await?)
    }

    async fn fetch_user(&self, user_id: Snowflake) -> RestResult<Value> {
        let response = self
            .http
            .get(self.url(&format!("/users/{user_id}")))
            .header("Authorization", &self.auth)
            .send()
            .await?;
        let response = Self::check(response, "view_user", "User").await?;
        Ok(response.json().await?)
    }

    async fn trigger_typing(&self, channel_id: Snowflake) -> RestResult<()> {
        let response = self
            .http
            .post(self.url(&format!("/channels/{channel_id}/typing")))
            .header("Authorization", &self.auth)
            .send()
            .await?;
        Self::check(response, "send_messages", "Channel").await?;
        Ok(())
    }
}

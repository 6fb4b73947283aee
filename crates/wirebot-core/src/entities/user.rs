//! User entity - a user as delivered in gateway payloads

use serde::{Deserialize, Serialize};

use crate::value_objects::Snowflake;

/// A user account, deserialized from dispatch payloads
///
/// Only the fields the client acts on are modeled; everything else in the
/// wire object is ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: Snowflake,
    #[serde(default)]
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discriminator: Option<String>,
    #[serde(default)]
    pub bot: bool,
}

impl User {
    /// Create a User with just an id (tests and fixtures)
    pub fn with_id(id: Snowflake) -> Self {
        Self {
            id,
            username: String::new(),
            discriminator: None,
            bot: false,
        }
    }

    /// Get the full tag: username#discriminator, or username alone
    pub fn tag(&self) -> String {
        match &self.discriminator {
            Some(disc) => format!("{}#{}", self.username, disc),
            None => self.username.clone(),
        }
    }
}

//! Payload definitions
//!
//! Structures carried in the `d` field of the frames the client sends
//! (Identify, Resume) and the handshake frames it receives (Hello, READY).

use serde::{Deserialize, Serialize};

use wirebot_core::User;

/// Payload of op 10 (Hello), the first frame the server sends
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HelloPayload {
    /// Heartbeat interval in milliseconds
    pub heartbeat_interval: u64,
}

/// Payload of op 2 (Identify)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentifyPayload {
    /// Credential token
    pub token: String,
    /// Capability bitmask selecting event classes
    pub capabilities: u64,
    /// Client platform metadata
    pub properties: ClientProperties,
}

/// Client platform metadata sent with Identify
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientProperties {
    pub os: String,
    pub client: String,
    pub device: String,
}

/// Payload of op 4 (Resume)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResumePayload {
    /// Credential token
    pub token: String,
    /// Session to resume
    pub session_id: String,
    /// Last dispatch sequence number the client processed
    pub seq: u64,
}

/// Payload of the READY dispatch event
///
/// Only the parts the session records are modeled; the full payload still
/// reaches event handlers untouched.
#[derive(Debug, Clone, Deserialize)]
pub struct ReadyPayload {
    /// The session's own user
    pub user: User,
    /// Session id usable for Resume
    #[serde(default)]
    pub session_id: Option<String>,
}

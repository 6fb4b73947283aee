//! Gateway frame format
//!
//! Every message on the connection is one JSON frame: op code, optional
//! event type tag and sequence (dispatch only), and an opaque payload.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{HelloPayload, IdentifyPayload, OpCode, ResumePayload};

/// A single frame on the gateway connection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayFrame {
    /// Operation code
    pub op: OpCode,

    /// Event type (only for op=0 Dispatch)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub t: Option<String>,

    /// Sequence number (only for op=0 Dispatch)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub s: Option<u64>,

    /// Payload
    #[serde(skip_serializing_if = "Option::is_none")]
    pub d: Option<Value>,
}

impl GatewayFrame {
    // === Frames the client sends ===

    /// Build a heartbeat frame carrying the last processed sequence
    #[must_use]
    pub fn heartbeat(last_sequence: Option<u64>) -> Self {
        Self {
            op: OpCode::Heartbeat,
            t: None,
            s: None,
            d: Some(last_sequence.map_or(Value::Null, |s| Value::Number(s.into()))),
        }
    }

    /// Build an identify frame
    #[must_use]
    pub fn identify(payload: &IdentifyPayload) -> Self {
        Self {
            op: OpCode::Identify,
            t: None,
            s: None,
            d: serde_json::to_value(payload).ok(),
        }
    }

    /// Build a resume frame
    #[must_use]
    pub fn resume(payload: &ResumePayload) -> Self {
        Self {
            op: OpCode::Resume,
            t: None,
            s: None,
            d: serde_json::to_value(payload).ok(),
        }
    }

    // === Frames the client receives ===

    /// Try to read this frame as a Hello (op 10)
    pub fn as_hello(&self) -> Option<HelloPayload> {
        if self.op != OpCode::Hello {
            return None;
        }
        self.d
            .as_ref()
            .and_then(|d| serde_json::from_value(d.clone()).ok())
    }

    /// Consume a dispatch frame into its (type, sequence, payload) parts
    pub fn into_dispatch(self) -> Option<(String, Option<u64>, Value)> {
        if self.op != OpCode::Dispatch {
            return None;
        }
        let kind = self.t?;
        Some((kind, self.s, self.d.unwrap_or(Value::Null)))
    }

    /// Whether an InvalidSession frame allows resuming (false by default)
    #[must_use]
    pub fn invalid_session_resumable(&self) -> bool {
        self.op == OpCode::InvalidSession
            && self.d.as_ref().and_then(Value::as_bool).unwrap_or(false)
    }

    // === Encoding ===

    /// Serialize to a JSON string
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserialize from a JSON string
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

impl std::fmt::Display for GatewayFrame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (&self.t, self.s) {
            (Some(t), Some(s)) => write!(f, "GatewayFrame(op={}, t={t}, s={s})", self.op),
            (Some(t), None) => write!(f, "GatewayFrame(op={}, t={t})", self.op),
            _ => write!(f, "GatewayFrame(op={})", self.op),
        }
    }
}

//! Dispatched event value

use serde_json::Value;

use super::EventType;

/// A single dispatched gateway event
///
/// Produced by the session from a dispatch frame, consumed by the router.
/// Immutable once constructed; the payload stays opaque until a consumer
/// deserializes the parts it cares about.
#[derive(Debug, Clone)]
pub struct Event {
    kind: String,
    payload: Value,
}

impl Event {
    /// Create an event from a type tag and its payload
    pub fn new(kind: impl Into<String>, payload: Value) -> Self {
        Self {
            kind: kind.into(),
            payload,
        }
    }

    /// The event-type tag (e.g. "MESSAGE_CREATE")
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// The opaque payload
    pub fn payload(&self) -> &Value {
        &self.payload
    }

    /// The tag as a known event type, if it is one
    pub fn event_type(&self) -> Option<EventType> {
        EventType::parse(&self.kind)
    }
}

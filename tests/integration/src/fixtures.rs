//! Wire payload builders shared across tests

use serde_json::{json, Value};

/// The `d` payload of a READY dispatch
pub fn ready_payload(user_id: i64, session_id: &str) -> Value {
    json!({
        "user": { "id": user_id.to_string(), "username": "self" },
        "session_id": session_id,
    })
}

/// The `d` payload of a MESSAGE_CREATE dispatch
pub fn message_create_payload(author_id: i64, channel_id: i64, content: &str) -> Value {
    json!({
        "id": "1",
        "channel_id": channel_id.to_string(),
        "author": { "id": author_id.to_string(), "username": "self" },
        "content": content,
    })
}

/// A complete hello frame
pub fn hello_frame(heartbeat_interval_ms: u64) -> Value {
    json!({ "op": 10, "d": { "heartbeat_interval": heartbeat_interval_ms } })
}

/// A complete dispatch frame
pub fn dispatch_frame(event_type: &str, seq: u64, payload: Value) -> Value {
    json!({ "op": 0, "t": event_type, "s": seq, "d": payload })
}

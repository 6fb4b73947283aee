//! # wirebot-gateway
//!
//! The client half of the push gateway: wire protocol definitions and the
//! session state machine (handshake, heartbeat, reconnect-with-resume,
//! event translation).

pub mod protocol;
pub mod session;

// Re-export commonly used types at crate root
pub use protocol::{ClientProperties, CloseCode, GatewayFrame, HelloPayload, OpCode, ReadyPayload};
pub use session::{GatewaySession, SessionError, SessionState, ShutdownHandle};

//! Gateway session
//!
//! Owns the duplex connection and its lifecycle: connect, hello handshake,
//! identify or resume, concurrent heartbeat, receive loop, and unbounded
//! reconnect with backoff. Only an explicit shutdown reaches Disconnected.

mod heartbeat;
mod session;
mod state;

pub use session::{GatewaySession, SessionError, ShutdownHandle};
pub use state::SessionState;

//! Session connection state

use std::fmt;

/// State of the gateway session
///
/// The machine cycles `Connecting -> AwaitingHello -> Identifying ->
/// Connected` and drops to `Reconnecting(k)` on any failure; `Disconnected`
/// is reached only through an explicit shutdown request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Not running (initial, or after shutdown)
    Disconnected,
    /// Opening the duplex connection
    Connecting,
    /// Connection open, waiting for the server's Hello
    AwaitingHello,
    /// Hello received, identify/resume sent
    Identifying,
    /// Handshake complete, receive loop and heartbeat running
    Connected,
    /// Torn down after the k-th failure, waiting to reconnect
    Reconnecting(u32),
}

impl SessionState {
    /// Check if the session is in the connected state
    #[must_use]
    pub const fn is_connected(self) -> bool {
        matches!(self, Self::Connected)
    }

    /// Check if the session is between connection attempts
    #[must_use]
    pub const fn is_reconnecting(self) -> bool {
        matches!(self, Self::Reconnecting(_))
    }

    /// Get the name of this state
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Disconnected => "Disconnected",
            Self::Connecting => "Connecting",
            Self::AwaitingHello => "AwaitingHello",
            Self::Identifying => "Identifying",
            Self::Connected => "Connected",
            Self::Reconnecting(_) => "Reconnecting",
        }
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Reconnecting(attempt) => write!(f, "Reconnecting({attempt})"),
            other => write!(f, "{}", other.name()),
        }
    }
}

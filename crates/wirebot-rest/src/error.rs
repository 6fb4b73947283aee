//! Outbound-call error taxonomy
//!
//! Every capability method fails with exactly one of these variants. The
//! core never retries; rate-limit waits are the caller's policy.

use std::time::Duration;

use thiserror::Error;

/// Outbound REST errors
#[derive(Debug, Error)]
pub enum RestError {
    /// The service asked the caller to back off
    #[error("Rate limited, retry after {:.2}s", .retry_after.as_secs_f64())]
    RateLimited {
        /// How long the service asked the caller to wait
        retry_after: Duration,
    },

    /// The acting account lacks a permission
    #[error("Missing required permission: {0}")]
    MissingPermission(String),

    /// The target resource does not exist
    #[error("{0} not found")]
    NotFound(String),

    /// Any other HTTP-level failure
    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },

    /// Connection/transport failure before an HTTP status existed
    #[error("Transport error: {0}")]
    Transport(String),
}

impl RestError {
    /// Check if this is a rate-limit failure
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, Self::RateLimited { .. })
    }

    /// The caller-visible backoff duration, for rate-limit failures
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            Self::RateLimited { retry_after } => Some(*retry_after),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for RestError {
    fn from(err: reqwest::Error) -> Self {
        Self::Transport(err.to_string())
    }
}

/// Outbound-call result type
pub type RestResult<T> = Result<T, RestError>;

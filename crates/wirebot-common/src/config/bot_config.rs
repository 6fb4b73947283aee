//! Bot configuration structs
//!
//! Loads configuration from environment variables. Everything here is
//! immutable after construction; the credential token is deliberately not
//! configuration (it is passed to the bot at construction).

use serde::Deserialize;
use std::env;

use wirebot_core::Capabilities;

/// Top-level bot configuration
#[derive(Debug, Clone, Deserialize)]
pub struct BotConfig {
    /// Command prefix recognized in message content
    #[serde(default = "default_prefix")]
    pub prefix: String,
    pub gateway: GatewayConfig,
    pub rest: RestConfig,
    #[serde(default)]
    pub identify: IdentifyConfig,
}

/// Gateway connection configuration
#[derive(Debug, Clone, Deserialize)]
pub struct GatewayConfig {
    /// WebSocket URL of the gateway (ws:// or wss://)
    pub url: String,
    /// Base reconnect delay in milliseconds
    #[serde(default = "default_reconnect_delay_ms")]
    pub reconnect_delay_ms: u64,
    /// Upper bound for the exponential reconnect backoff
    #[serde(default = "default_reconnect_max_delay_ms")]
    pub reconnect_max_delay_ms: u64,
    /// Consecutive unacknowledged heartbeats tolerated before the
    /// connection is considered dead
    #[serde(default = "default_missed_ack_tolerance")]
    pub missed_ack_tolerance: u32,
}

/// Outbound REST collaborator configuration
#[derive(Debug, Clone, Deserialize)]
pub struct RestConfig {
    /// Base URL of the REST API (no trailing slash)
    pub base_url: String,
    /// Whether the credential is a bot token (adds the `Bot ` auth prefix)
    #[serde(default)]
    pub bot_account: bool,
}

/// Identify handshake configuration
#[derive(Debug, Clone, Deserialize)]
pub struct IdentifyConfig {
    /// Capability bitmask sent with Identify
    #[serde(default = "default_capabilities")]
    pub capabilities: u64,
    #[serde(default = "default_os")]
    pub os: String,
    #[serde(default = "default_client")]
    pub client: String,
    #[serde(default = "default_device")]
    pub device: String,
}

impl Default for IdentifyConfig {
    fn default() -> Self {
        Self {
            capabilities: default_capabilities(),
            os: default_os(),
            client: default_client(),
            device: default_device(),
        }
    }
}

/// Configuration loading errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingVar(&'static str),
}

// Default value functions
fn default_prefix() -> String {
    "!".to_string()
}

fn default_reconnect_delay_ms() -> u64 {
    5_000
}

fn default_reconnect_max_delay_ms() -> u64 {
    60_000
}

fn default_missed_ack_tolerance() -> u32 {
    2
}

fn default_capabilities() -> u64 {
    Capabilities::standard().bits()
}

fn default_os() -> String {
    "linux".to_string()
}

fn default_client() -> String {
    "wirebot".to_string()
}

fn default_device() -> String {
    "desktop".to_string()
}

impl BotConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    /// Returns an error if a required environment variable is missing.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Ok(Self {
            prefix: env::var("COMMAND_PREFIX").unwrap_or_else(|_| default_prefix()),
            gateway: GatewayConfig {
                url: env::var("GATEWAY_URL").map_err(|_| ConfigError::MissingVar("GATEWAY_URL"))?,
                reconnect_delay_ms: env::var("RECONNECT_DELAY_MS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or_else(default_reconnect_delay_ms),
                reconnect_max_delay_ms: env::var("RECONNECT_MAX_DELAY_MS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or_else(default_reconnect_max_delay_ms),
                missed_ack_tolerance: env::var("MISSED_ACK_TOLERANCE")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or_else(default_missed_ack_tolerance),
            },
            rest: RestConfig {
                base_url: env::var("REST_BASE_URL")
                    .map_err(|_| ConfigError::MissingVar("REST_BASE_URL"))?,
                bot_account: env::var("BOT_ACCOUNT")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(false),
            },
            identify: IdentifyConfig {
                capabilities: env::var("CAPABILITIES")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or_else(default_capabilities),
                os: env::var("CLIENT_OS").unwrap_or_else(|_| default_os()),
                client: env::var("CLIENT_NAME").unwrap_or_else(|_| default_client()),
                device: env::var("CLIENT_DEVICE").unwrap_or_else(|_| default_device()),
            },
        })
    }

    /// A configuration suitable for tests: local endpoints, fast reconnects
    #[must_use]
    pub fn for_endpoints(gateway_url: impl Into<String>, rest_base_url: impl Into<String>) -> Self {
        Self {
            prefix: default_prefix(),
            gateway: GatewayConfig {
                url: gateway_url.into(),
                reconnect_delay_ms: default_reconnect_delay_ms(),
                reconnect_max_delay_ms: default_reconnect_max_delay_ms(),
                missed_ack_tolerance: default_missed_ack_tolerance(),
            },
            rest: RestConfig {
                base_url: rest_base_url.into(),
                bot_account: false,
            },
            identify: IdentifyConfig::default(),
        }
    }
}

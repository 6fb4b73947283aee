//! # wirebot
//!
//! A client for a push-notification gateway with a text-command framework:
//! one long-lived session (handshake, heartbeat, reconnect-with-resume)
//! feeding dispatched events into registered handlers and prefixed
//! commands. The client only acts on messages authored by its own account.

mod bot;

pub use bot::Bot;

// Re-export the public surface of the underlying crates
pub use wirebot_commands::{
    ArgValue, CommandDescriptor, CommandError, CommandErrorHandler, CommandHandler,
    CommandRegistry, CommandResult, Context, EventHandler, EventRouter, FnEventHandler, FnHandler,
    ParamKind, ParameterSpec,
};
pub use wirebot_common::{init_tracing, try_init_tracing, BotConfig, ConfigError, TracingConfig};
pub use wirebot_core::{
    Capabilities, Event, EventSink, EventType, Message, SelfIdentity, Snowflake, User,
};
pub use wirebot_gateway::{GatewaySession, SessionError, SessionState, ShutdownHandle};
pub use wirebot_rest::{Outbound, RestClient, RestError, RestResult};

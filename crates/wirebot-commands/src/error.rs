//! Command-level error taxonomy
//!
//! Every invocation attempt ends in success or exactly one of these
//! variants; the router converts the failure into a single reply line and
//! nothing here may take down the session or the process.

use thiserror::Error;

use crate::descriptor::ParamKind;

/// Command dispatch failures
#[derive(Debug, Error)]
pub enum CommandError {
    /// A required parameter had no token
    #[error("Missing required argument: {0}")]
    MissingArgument(String),

    /// A token could not be coerced to its parameter's type
    #[error("Invalid argument for {param}: {value} (expected {expected})")]
    BadArgument {
        param: String,
        value: String,
        expected: ParamKind,
    },

    /// No command registered under the parsed name
    #[error("Command not found: {0}")]
    NotFound(String),

    /// The handler itself failed with something other than a CommandError
    #[error("Error in command: {0}")]
    Invoke(String),
}

impl CommandError {
    /// Wrap an arbitrary handler failure, keeping its message
    pub fn invoke(cause: impl std::fmt::Display) -> Self {
        Self::Invoke(cause.to_string())
    }

    /// The single user-facing reply line for this failure
    pub fn reply_text(&self) -> String {
        self.to_string()
    }
}

// Outbound failures escaping a handler become invocation errors; handlers
// that want different behavior match on RestError before propagating.
impl From<wirebot_rest::RestError> for CommandError {
    fn from(err: wirebot_rest::RestError) -> Self {
        Self::invoke(err)
    }
}

impl From<anyhow::Error> for CommandError {
    fn from(err: anyhow::Error) -> Self {
        Self::invoke(err)
    }
}

/// Command invocation result type
pub type CommandResult<T> = Result<T, CommandError>;

//! # wirebot-commands
//!
//! The text-command framework: tokenization of prefixed message content,
//! command registration and alias resolution, typed positional argument
//! binding, and the event router that feeds the pipeline.

pub mod context;
pub mod descriptor;
pub mod error;
pub mod invoker;
pub mod registry;
pub mod router;
pub mod tokenizer;

// Re-export commonly used types at crate root
pub use context::{Context, ContextCache};
pub use descriptor::{
    ArgValue, CommandDescriptor, CommandErrorHandler, CommandHandler, FnHandler, ParamKind,
    ParameterSpec,
};
pub use error::{CommandError, CommandResult};
pub use invoker::{bind_arguments, invoke};
pub use registry::CommandRegistry;
pub use router::{EventHandler, EventRouter, FnEventHandler};
pub use tokenizer::{tokenize, Tokenized};

#[cfg(test)]
pub(crate) mod test_support;

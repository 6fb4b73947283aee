//! Command descriptors and typed parameters
//!
//! A descriptor is the static registration unit: name, aliases, ordered
//! parameter specs, and the handler. Parameter specs make the
//! required/default invariant structural: a required parameter has no
//! default slot and an optional one cannot be built without its default.

use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;

use crate::context::Context;
use crate::error::{CommandError, CommandResult};

/// Semantic type tag of a command parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamKind {
    Text,
    Integer,
    Float,
}

impl ParamKind {
    /// The tag name used in error replies and help output
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Integer => "integer",
            Self::Float => "float",
        }
    }

    /// Attempt to coerce a raw token to this kind
    #[must_use]
    pub fn coerce(self, raw: &str) -> Option<ArgValue> {
        match self {
            Self::Text => Some(ArgValue::Text(raw.to_string())),
            Self::Integer => raw.parse::<i64>().ok().map(ArgValue::Integer),
            Self::Float => raw.parse::<f64>().ok().map(ArgValue::Float),
        }
    }
}

impl fmt::Display for ParamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A bound argument value
#[derive(Debug, Clone, PartialEq)]
pub enum ArgValue {
    Text(String),
    Integer(i64),
    Float(f64),
}

impl ArgValue {
    /// The kind this value belongs to
    #[must_use]
    pub const fn kind(&self) -> ParamKind {
        match self {
            Self::Text(_) => ParamKind::Text,
            Self::Integer(_) => ParamKind::Integer,
            Self::Float(_) => ParamKind::Float,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Self::Integer(v) => Some(*v),
            _ => None,
        }
    }

    /// Numeric view; integers widen to float
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Self::Float(v) => Some(*v),
            Self::Integer(v) => Some(*v as f64),
            Self::Text(_) => None,
        }
    }
}

/// Declaration of one positional command parameter
#[derive(Debug, Clone)]
pub struct ParameterSpec {
    name: String,
    kind: ParamKind,
    default: Option<ArgValue>,
}

impl ParameterSpec {
    /// A parameter the caller must supply
    pub fn required(name: impl Into<String>, kind: ParamKind) -> Self {
        Self {
            name: name.into(),
            kind,
            default: None,
        }
    }

    /// A parameter bound to `default` when its token is absent
    pub fn optional(name: impl Into<String>, kind: ParamKind, default: ArgValue) -> Self {
        debug_assert_eq!(default.kind(), kind, "default must match the declared kind");
        Self {
            name: name.into(),
            kind,
            default: Some(default),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> ParamKind {
        self.kind
    }

    pub fn is_required(&self) -> bool {
        self.default.is_none()
    }

    pub fn default(&self) -> Option<&ArgValue> {
        self.default.as_ref()
    }
}

/// The handler a command dispatches to
///
/// Returning `CommandError` propagates it unchanged; any other failure must
/// be wrapped (see [`CommandError::invoke`]) before it crosses this
/// boundary.
#[async_trait]
pub trait CommandHandler: Send + Sync {
    async fn invoke(&self, ctx: Arc<Context>, args: Vec<ArgValue>) -> CommandResult<()>;
}

/// Per-command error callback, replacing the default error reply
#[async_trait]
pub trait CommandErrorHandler: Send + Sync {
    async fn handle(&self, ctx: Arc<Context>, error: &CommandError);
}

/// Adapter letting plain async closures act as command handlers
pub struct FnHandler<F>(F);

impl<F, Fut> FnHandler<F>
where
    F: Fn(Arc<Context>, Vec<ArgValue>) -> Fut + Send + Sync + 'static,
    Fut: std::future::Future<Output = CommandResult<()>> + Send + 'static,
{
    /// Wrap a closure as a shareable handler
    pub fn wrap(f: F) -> Arc<dyn CommandHandler> {
        Arc::new(Self(f))
    }
}

#[async_trait]
impl<F, Fut> CommandHandler for FnHandler<F>
where
    F: Fn(Arc<Context>, Vec<ArgValue>) -> Fut + Send + Sync + 'static,
    Fut: std::future::Future<Output = CommandResult<()>> + Send + 'static,
{
    async fn invoke(&self, ctx: Arc<Context>, args: Vec<ArgValue>) -> CommandResult<()> {
        (self.0)(ctx, args).await
    }
}

/// Static description of a registered command
#[derive(Clone)]
pub struct CommandDescriptor {
    name: String,
    aliases: Vec<String>,
    params: Vec<ParameterSpec>,
    description: Option<String>,
    handler: Arc<dyn CommandHandler>,
    error_handler: Option<Arc<dyn CommandErrorHandler>>,
}

impl CommandDescriptor {
    /// Create a descriptor with no parameters or aliases
    pub fn new(name: impl Into<String>, handler: Arc<dyn CommandHandler>) -> Self {
        Self {
            name: name.into(),
            aliases: Vec::new(),
            params: Vec::new(),
            description: None,
            handler,
            error_handler: None,
        }
    }

    /// Add an alternate name resolving to this command
    #[must_use]
    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.aliases.push(alias.into());
        self
    }

    /// Append a positional parameter (declaration order matters)
    #[must_use]
    pub fn with_param(mut self, param: ParameterSpec) -> Self {
        self.params.push(param);
        self
    }

    /// Set the help description
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Install a per-command error callback
    #[must_use]
    pub fn with_error_handler(mut self, handler: Arc<dyn CommandErrorHandler>) -> Self {
        self.error_handler = Some(handler);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn aliases(&self) -> &[String] {
        &self.aliases
    }

    pub fn params(&self) -> &[ParameterSpec] {
        &self.params
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn handler(&self) -> &Arc<dyn CommandHandler> {
        &self.handler
    }

    pub fn error_handler(&self) -> Option<&Arc<dyn CommandErrorHandler>> {
        self.error_handler.as_ref()
    }

    /// One-line usage summary: required in angle brackets, optional in square
    pub fn usage(&self) -> String {
        let mut usage = self.name.clone();
        for param in &self.params {
            if param.is_required() {
                usage.push_str(&format!(" <{}>", param.name()));
            } else {
                usage.push_str(&format!(" [{}]", param.name()));
            }
        }
        usage
    }
}

impl fmt::Debug for CommandDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandDescriptor")
            .field("name", &self.name)
            .field("aliases", &self.aliases)
            .field("params", &self.params)
            .finish()
    }
}

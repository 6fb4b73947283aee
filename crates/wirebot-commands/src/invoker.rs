//! Command invoker
//!
//! Binds tokenized arguments to a descriptor's parameters in declaration
//! order, coercing each token to its parameter's type, then runs the
//! handler. Binding is fail-fast: the first bad or missing position aborts
//! with no partial invocation.

use std::sync::Arc;

use crate::context::Context;
use crate::descriptor::{ArgValue, CommandDescriptor, ParameterSpec};
use crate::error::{CommandError, CommandResult};

/// Bind tokens positionally to parameter specs
///
/// Empty tokens bind as absent: a required parameter fails, an optional one
/// takes its default. Surplus tokens beyond the declared parameters are
/// ignored.
pub fn bind_arguments(params: &[ParameterSpec], tokens: &[String]) -> CommandResult<Vec<ArgValue>> {
    let mut bound = Vec::with_capacity(params.len());

    for (position, param) in params.iter().enumerate() {
        let token = tokens
            .get(position)
            .map(String::as_str)
            .filter(|t| !t.is_empty());

        match token {
            Some(raw) => match param.kind().coerce(raw) {
                Some(value) => bound.push(value),
                None => {
                    return Err(CommandError::BadArgument {
                        param: param.name().to_string(),
                        value: raw.to_string(),
                        expected: param.kind(),
                    })
                }
            },
            None => match param.default() {
                Some(default) => bound.push(default.clone()),
                None => return Err(CommandError::MissingArgument(param.name().to_string())),
            },
        }
    }

    Ok(bound)
}

/// Bind arguments and invoke the descriptor's handler
///
/// Every attempt ends in success or exactly one `CommandError`; handler
/// failures that are already command errors propagate unchanged.
pub async fn invoke(
    descriptor: &CommandDescriptor,
    tokens: &[String],
    ctx: Arc<Context>,
) -> CommandResult<()> {
    let bound = bind_arguments(descriptor.params(), tokens)?;
    tracing::debug!(command = descriptor.name(), args = bound.len(), "Invoking command");
    descriptor.handler().invoke(ctx, bound).await
}

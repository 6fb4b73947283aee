//! Event router
//!
//! Routes each dispatched event to at most one named handler and, for
//! message creation, feeds the content through the command pipeline:
//! self-authorship filter, prefix gate, tokenize, resolve, invoke. Command
//! failures become a single reply in the originating channel; nothing that
//! happens here may stop later events from being processed.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;

use wirebot_core::{Event, EventSink, EventType, Message, SelfIdentity};
use wirebot_rest::Outbound;

use crate::context::{Context, ContextCache};
use crate::error::CommandError;
use crate::invoker::invoke;
use crate::registry::CommandRegistry;
use crate::tokenizer::tokenize;

/// Named handler for one event-type tag
///
/// Failures are logged by the router and never propagated.
#[async_trait]
pub trait EventHandler: Send + Sync {
    async fn handle(&self, event: &Event) -> anyhow::Result<()>;
}

/// Adapter letting plain async closures act as event handlers
pub struct FnEventHandler<F>(F);

impl<F, Fut> FnEventHandler<F>
where
    F: Fn(Event) -> Fut + Send + Sync + 'static,
    Fut: std::future::Future<Output = anyhow::Result<()>> + Send + 'static,
{
    pub fn wrap(f: F) -> Arc<dyn EventHandler> {
        Arc::new(Self(f))
    }
}

#[async_trait]
impl<F, Fut> EventHandler for FnEventHandler<F>
where
    F: Fn(Event) -> Fut + Send + Sync + 'static,
    Fut: std::future::Future<Output = anyhow::Result<()>> + Send + 'static,
{
    async fn handle(&self, event: &Event) -> anyhow::Result<()> {
        (self.0)(event.clone()).await
    }
}

/// Routes gateway events into named handlers and the command pipeline
pub struct EventRouter {
    prefix: String,
    registry: Arc<CommandRegistry>,
    contexts: ContextCache,
    identity: SelfIdentity,
    handlers: RwLock<HashMap<String, Arc<dyn EventHandler>>>,
}

impl EventRouter {
    /// Create a router for a prefix, registry, and outbound capability
    pub fn new(
        prefix: impl Into<String>,
        registry: Arc<CommandRegistry>,
        outbound: Arc<dyn Outbound>,
        identity: SelfIdentity,
    ) -> Self {
        Self {
            prefix: prefix.into(),
            registry,
            contexts: ContextCache::new(outbound),
            identity,
            handlers: RwLock::new(HashMap::new()),
        }
    }

    /// Register the handler for an event tag (at most one per tag)
    pub fn on(&self, tag: impl Into<String>, handler: Arc<dyn EventHandler>) {
        self.handlers.write().insert(tag.into(), handler);
    }

    /// Remove the handler for an event tag
    pub fn off(&self, tag: &str) -> bool {
        self.handlers.write().remove(tag).is_some()
    }

    /// The per-channel context cache
    pub fn contexts(&self) -> &ContextCache {
        &self.contexts
    }

    async fn run_named_handler(&self, event: &Event) {
        let handler = self.handlers.read().get(event.kind()).cloned();
        if let Some(handler) = handler {
            if let Err(error) = handler.handle(event).await {
                tracing::warn!(
                    event = event.kind(),
                    error = %error,
                    "Event handler failed"
                );
            }
        }
    }

    async fn handle_message_create(&self, event: &Event) {
        let Some(message) = Message::from_value(event.payload()) else {
            tracing::debug!("Dropping malformed message payload");
            return;
        };

        // Self-authorship filter: only ever act on our own messages, and on
        // nothing at all before READY recorded who we are
        if !self.identity.is_self(message.author.id) {
            return;
        }
        if !message.content.starts_with(&self.prefix) {
            return;
        }

        tracing::debug!(
            channel_id = %message.channel_id,
            content = message.preview(64),
            "Processing own command message"
        );

        let ctx = self
            .contexts
            .get_or_create(message.channel_id, Some(message.clone()));
        self.dispatch_command(&message.content, ctx).await;
    }

    /// Run the command pipeline and deliver at most one error reply
    async fn dispatch_command(&self, content: &str, ctx: Arc<Context>) {
        let Some(tokenized) = tokenize(content, &self.prefix) else {
            return;
        };
        if tokenized.name.is_empty() {
            // Bare prefix: not a command, take no action
            return;
        }

        let error = match self.registry.resolve(&tokenized.name) {
            Some(descriptor) => {
                match invoke(&descriptor, &tokenized.args, Arc::clone(&ctx)).await {
                    Ok(()) => return,
                    Err(error) => {
                        if let Some(handler) = descriptor.error_handler() {
                            handler.handle(Arc::clone(&ctx), &error).await;
                            return;
                        }
                        error
                    }
                }
            }
            None => CommandError::NotFound(tokenized.name.clone()),
        };

        tracing::debug!(command = tokenized.name, error = %error, "Command failed");
        if let Err(send_error) = ctx.send(&error.reply_text()).await {
            tracing::warn!(
                channel_id = %ctx.channel_id(),
                error = %send_error,
                "Failed to deliver error reply"
            );
        }
    }
}

#[async_trait]
impl EventSink for EventRouter {
    async fn dispatch(&self, event: Event) {
        self.run_named_handler(&event).await;

        if event.event_type() == Some(EventType::MessageCreate) {
            self.handle_message_create(&event).await;
        }
    }
}

//! Bot facade
//!
//! Wires the pieces together: registry + router + identity + outbound
//! capability, plus the gateway session factory. This is the registration
//! surface callers configure before running.

use std::sync::{Arc, Weak};

use wirebot_commands::{
    ArgValue, CommandDescriptor, CommandRegistry, Context, EventHandler, EventRouter, FnHandler,
    ParamKind, ParameterSpec,
};
use wirebot_common::BotConfig;
use wirebot_core::{EventSink, SelfIdentity};
use wirebot_gateway::GatewaySession;
use wirebot_rest::{Outbound, RestClient};

/// A configured bot instance
///
/// Owns the command registry and event router; produces gateway sessions
/// bound to them. Registration methods may be called at any time, including
/// while a session is running.
pub struct Bot {
    config: BotConfig,
    token: String,
    registry: Arc<CommandRegistry>,
    router: Arc<EventRouter>,
    identity: SelfIdentity,
}

impl Bot {
    /// Create a bot using the HTTP outbound collaborator
    pub fn new(config: BotConfig, token: impl Into<String>) -> Self {
        let token = token.into();
        let outbound: Arc<dyn Outbound> = Arc::new(RestClient::new(
            config.rest.base_url.clone(),
            token.clone(),
            config.rest.bot_account,
        ));
        Self::with_outbound(config, token, outbound)
    }

    /// Create a bot with a custom outbound capability (tests, embeddings)
    pub fn with_outbound(
        config: BotConfig,
        token: impl Into<String>,
        outbound: Arc<dyn Outbound>,
    ) -> Self {
        let registry = Arc::new(CommandRegistry::new());
        let identity = SelfIdentity::new();
        let router = Arc::new(EventRouter::new(
            config.prefix.clone(),
            Arc::clone(&registry),
            outbound,
            identity.clone(),
        ));

        let bot = Self {
            config,
            token: token.into(),
            registry,
            router,
            identity,
        };
        bot.register_help();
        bot
    }

    /// Register a command (last-write-wins for its name and aliases)
    pub fn command(&self, descriptor: CommandDescriptor) {
        self.registry.register(descriptor);
    }

    /// Remove a command by primary name
    pub fn remove_command(&self, name: &str) -> bool {
        self.registry.unregister(name)
    }

    /// Register the handler for an event tag (at most one per tag)
    pub fn on_event(&self, tag: impl Into<String>, handler: Arc<dyn EventHandler>) {
        self.router.on(tag, handler);
    }

    /// The command registry
    pub fn registry(&self) -> &Arc<CommandRegistry> {
        &self.registry
    }

    /// The router as an event sink (what a session dispatches into)
    pub fn event_sink(&self) -> Arc<dyn EventSink> {
        Arc::clone(&self.router) as Arc<dyn EventSink>
    }

    /// The session's recorded identity
    pub fn identity(&self) -> &SelfIdentity {
        &self.identity
    }

    /// The configured command prefix
    pub fn prefix(&self) -> &str {
        &self.config.prefix
    }

    /// Build a gateway session wired to this bot's router
    pub fn gateway_session(&self) -> GatewaySession {
        GatewaySession::new(
            self.config.gateway.clone(),
            self.config.identify.clone(),
            self.token.clone(),
            self.event_sink(),
            self.identity.clone(),
        )
    }

    /// Connect and run until shutdown
    ///
    /// For external shutdown control, build the session yourself via
    /// [`gateway_session`](Self::gateway_session) and keep its handle.
    pub async fn run(&self) {
        self.gateway_session().run().await;
    }

    /// The built-in `help` command: list commands, or detail one
    fn register_help(&self) {
        // Weak, or the registry would own a handler that owns the registry
        let registry: Weak<CommandRegistry> = Arc::downgrade(&self.registry);
        let prefix = self.config.prefix.clone();

        let handler = FnHandler::wrap(move |ctx: Arc<Context>, args: Vec<ArgValue>| {
            let registry = registry.clone();
            let prefix = prefix.clone();
            async move {
                let Some(registry) = registry.upgrade() else {
                    return Ok(());
                };
                let topic = args
                    .first()
                    .and_then(ArgValue::as_text)
                    .unwrap_or_default()
                    .to_string();
                let reply = if topic.is_empty() {
                    render_command_list(&registry, &prefix)
                } else {
                    render_command_detail(&registry, &prefix, &topic)
                };
                ctx.send(&reply).await?;
                Ok(())
            }
        });

        self.registry.register(
            CommandDescriptor::new("help", handler)
                .with_param(ParameterSpec::optional(
                    "command",
                    ParamKind::Text,
                    ArgValue::Text(String::new()),
                ))
                .with_description("Show available commands or details for one command"),
        );
    }
}

fn render_command_list(registry: &CommandRegistry, prefix: &str) -> String {
    let descriptors = registry.descriptors();
    if descriptors.is_empty() {
        return "No commands available.".to_string();
    }

    let mut out = String::from("**Available Commands:**\n");
    for descriptor in descriptors {
        out.push_str(&format!("- `{prefix}{}`", descriptor.name()));
        if !descriptor.aliases().is_empty() {
            out.push_str(&format!(" (aliases: {})", descriptor.aliases().join(", ")));
        }
        out.push_str(&format!(
            ": {}\n",
            descriptor.description().unwrap_or("No description.")
        ));
    }
    out
}

fn render_command_detail(registry: &CommandRegistry, prefix: &str, topic: &str) -> String {
    let Some(descriptor) = registry.resolve(topic) else {
        return format!("Command `{topic}` not found.");
    };

    let mut out = format!("**{prefix}{}**\n", descriptor.usage());
    if !descriptor.aliases().is_empty() {
        out.push_str(&format!("Aliases: {}\n", descriptor.aliases().join(", ")));
    }
    out.push_str(&format!(
        "Description: {}\n",
        descriptor.description().unwrap_or("No description.")
    ));
    if !descriptor.params().is_empty() {
        out.push_str("Parameters:\n");
        for param in descriptor.params() {
            out.push_str(&format!(
                "- {} ({}, {})\n",
                param.name(),
                param.kind(),
                if param.is_required() { "required" } else { "optional" }
            ));
        }
    }
    out
}

//! Bot entry point
//!
//! Run with:
//! ```bash
//! cargo run -p wirebot
//! ```
//!
//! Configuration is loaded from environment variables; the credential is
//! read from `BOT_TOKEN`.

use std::sync::Arc;
use std::time::Duration;

use tracing::{error, info};

use wirebot::{
    ArgValue, Bot, BotConfig, CommandDescriptor, ConfigError, Context, FnHandler, ParamKind,
    ParameterSpec, TracingConfig,
};

#[tokio::main]
async fn main() {
    if let Err(e) = wirebot::try_init_tracing(&TracingConfig::default()) {
        eprintln!("Warning: Failed to initialize tracing: {e}");
    }

    if let Err(e) = run().await {
        error!(error = %e, "Bot failed to start");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    info!("Starting wirebot...");

    let config = BotConfig::from_env()?;
    let token = std::env::var("BOT_TOKEN").map_err(|_| ConfigError::MissingVar("BOT_TOKEN"))?;

    info!(
        gateway = %config.gateway.url,
        prefix = %config.prefix,
        "Configuration loaded"
    );

    let bot = Bot::new(config, token);
    register_builtin_commands(&bot);

    let session = bot.gateway_session();
    let shutdown = session.shutdown_handle();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Shutdown requested");
            shutdown.shutdown();
        }
    });

    session.run().await;
    Ok(())
}

fn register_builtin_commands(bot: &Bot) {
    bot.command(
        CommandDescriptor::new(
            "echo",
            FnHandler::wrap(|ctx: Arc<Context>, args: Vec<ArgValue>| async move {
                let text = args[0].as_text().unwrap_or_default().to_string();
                ctx.send(&text).await?;
                Ok(())
            }),
        )
        .with_param(ParameterSpec::required("text", ParamKind::Text))
        .with_description("Send the given text back"),
    );

    bot.command(
        CommandDescriptor::new(
            "spam",
            FnHandler::wrap(|ctx: Arc<Context>, args: Vec<ArgValue>| async move {
                let text = args[0].as_text().unwrap_or_default().to_string();
                let count = args[1].as_integer().unwrap_or(0).max(0) as u64;
                let delay_s = args[2].as_float().unwrap_or(2.0).max(0.0);
                ctx.spam(&text, count, Duration::from_secs_f64(delay_s))
                    .await?;
                Ok(())
            }),
        )
        .with_param(ParameterSpec::required("text", ParamKind::Text))
        .with_param(ParameterSpec::optional(
            "count",
            ParamKind::Integer,
            ArgValue::Integer(0),
        ))
        .with_param(ParameterSpec::optional(
            "delay",
            ParamKind::Float,
            ArgValue::Float(2.0),
        ))
        .with_description("Send a message repeatedly (count 0 = until stopped)"),
    );
}

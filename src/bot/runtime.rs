//! Bot runtime - Polling and Webhook runners.

use teloxide::prelude::*;
use teloxide::update_listeners::Polling;
use tracing::{info, warn};

use super::dispatcher::ThrottledBot;
use super::{health, webhook};
use crate::config::{BotMode, Config};

/// Run the bot with the configured mode until Ctrl+C.
pub async fn run(
    config: &Config,
    bot: ThrottledBot,
    mut dispatcher: Dispatcher<ThrottledBot, anyhow::Error, teloxide::dispatching::DefaultKey>,
) -> anyhow::Result<()> {
    match config.bot_mode {
        BotMode::Polling => {
            if let Some(port) = config.health_port {
                tokio::spawn(async move {
                    if let Err(e) = health::serve(port).await {
                        warn!("Health endpoint stopped: {}", e);
                    }
                });
            }

            info!(
                "Starting bot in polling mode (timeout {}s)...",
                config.poll_timeout.as_secs()
            );
            let listener = Polling::builder(bot)
                .timeout(config.poll_timeout)
                .build();

            dispatcher
                .dispatch_with_listener(
                    listener,
                    LoggingErrorHandler::with_custom_text("Error from update listener"),
                )
                .await;
        }
        BotMode::Webhook => {
            info!("Starting bot in webhook mode...");
            webhook::start_webhook(config, dispatcher, bot).await?;
        }
    }

    Ok(())
}

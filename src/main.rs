//! Vidgate - channel-gated video delivery bot for Telegram.
//!
//! Users who belong to the required channel get the current video on
//! `/start`; it disappears after a delay. The admin swaps the video with
//! `/update`.
//!
//! ## Architecture
//!
//! - `config` - Environment configuration
//! - `storage` - The single persisted video reference
//! - `membership` - Channel membership gate (fail-closed)
//! - `scheduler` - Delayed deletion of delivered messages
//! - `cache` - Expiring in-memory state with Moka
//! - `bot` - Dispatcher, runtime and the Telegram seam (with Throttle)
//! - `plugins` - Command and callback handlers
//! - `i18n` - User-facing text
//! - `utils` - Utility functions

mod bot;
mod cache;
mod config;
mod i18n;
mod membership;
mod plugins;
mod scheduler;
mod storage;
mod utils;

use teloxide::adaptors::throttle::Limits;
use teloxide::prelude::*;
use teloxide::utils::command::BotCommands;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use bot::AppState;
use config::Config;
use plugins::Command;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file first (before anything else)
    dotenvy::dotenv().ok();

    // If RUST_LOG is not set, default to "info" level for our crate
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("vidgate=info,teloxide=warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .init();

    info!("✅ Starting vidgate...");

    // A missing BOT_TOKEN stops the process here.
    let config = Config::from_env()?;
    info!("Configuration loaded successfully");
    info!("Bot mode: {:?}", config.bot_mode);
    info!("Required channel: {:?}", config.channel);
    info!("Messages deleted after {}s", config.delete_after.as_secs());

    let state = AppState::new(&config);
    match state.store.load() {
        Some(_) => info!("Video configured ({})", state.store.path().display()),
        None => info!("No video configured yet; admin can set one with /update"),
    }

    // Throttle keeps us inside Telegram's per-chat and global rate limits
    let bot = Bot::new(&config.bot_token).throttle(Limits::default());
    info!("Bot initialized with rate limiting (Throttle)");

    let me = bot.get_me().await?;
    info!("Bot username: @{}", me.username());

    if let Err(e) = bot.set_my_commands(Command::bot_commands()).await {
        warn!("Failed to register bot commands: {}", e);
    }

    let deletions = state.deletions.clone();
    let dispatcher = bot::build_dispatcher(bot.clone(), state);

    bot::run(&config, bot, dispatcher).await?;

    // Timers live only in memory; anything still pending stays in the chats.
    let pending = deletions.pending();
    if let Some(last) = pending.iter().map(|p| p.fire_at).max() {
        warn!(
            "Shutting down with {} scheduled deletion(s) pending (last due {})",
            pending.len(),
            last.format("%Y-%m-%d %H:%M:%S UTC")
        );
    }
    info!("Bot stopped");

    Ok(())
}

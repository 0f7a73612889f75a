//! Plugin system for command handlers.
//!
//! Add new plugins by:
//! 1. Creating a new file in this directory
//! 2. Adding `pub mod your_plugin;` below
//! 3. Adding the handler to `command_handler()`

pub mod join;
pub mod start;
pub mod update;

use teloxide::dispatching::UpdateHandler;
use teloxide::prelude::*;
use teloxide::utils::command::BotCommands;

use crate::bot::dispatcher::AppState;

/// All bot commands.
#[derive(BotCommands, Clone)]
#[command(rename_rule = "lowercase", description = "Available commands:")]
pub enum Command {
    // Trailing arguments (deep-link payloads included) are accepted and ignored.
    #[command(description = "Get the current video")]
    Start(String),

    #[command(description = "Replace the current video (admin only)")]
    Update(String),
}

/// Build the combined command handler.
pub fn command_handler() -> UpdateHandler<anyhow::Error> {
    use dptree::case;

    teloxide::filter_command::<Command, _>()
        .branch(case![Command::Start(payload)].endpoint(start::start_command))
        .branch(case![Command::Update(args)].endpoint(update::update_command))
}

/// Build the handler for the message that follows an armed /update.
pub fn upload_handler() -> UpdateHandler<anyhow::Error> {
    dptree::filter(|msg: Message, state: AppState| update::is_awaited_upload(&msg, &state))
        .endpoint(update::upload_message)
}

/// Build the callback query handler.
pub fn callback_handler() -> UpdateHandler<anyhow::Error> {
    Update::filter_callback_query().branch(
        dptree::filter(|q: CallbackQuery| q.data.as_deref() == Some(join::CHECK_JOIN))
            .endpoint(start::retry_callback),
    )
}

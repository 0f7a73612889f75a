//! Message dispatcher setup.
//!
//! Builds the dispatcher with all command, callback and continuation handlers.

use std::sync::Arc;
use std::time::Duration;

use teloxide::adaptors::Throttle;
use teloxide::dispatching::UpdateHandler;
use teloxide::prelude::*;
use teloxide::types::UserId;
use url::Url;

use crate::config::Config;
use crate::membership::MembershipGate;
use crate::plugins::{self, update::PendingUploads};
use crate::scheduler::DeletionScheduler;
use crate::storage::VideoStore;

/// Bot type with Throttle adaptor for automatic rate limiting.
pub type ThrottledBot = Throttle<Bot>;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// The currently distributed video.
    pub store: Arc<VideoStore>,

    /// Channel membership checker.
    pub gate: MembershipGate,

    /// Delayed deletion of delivered messages.
    pub deletions: DeletionScheduler,

    /// Armed `/update` continuations.
    pub uploads: PendingUploads,

    /// The only user allowed to run `/update`.
    pub admin_id: UserId,

    pub channel_join_url: Url,
    pub update_channel_url: Url,

    /// Pause before re-checking membership on "Try Again".
    pub retry_pause: Duration,
}

impl AppState {
    /// Create a new application state.
    pub fn new(config: &Config) -> Self {
        Self {
            store: Arc::new(VideoStore::new(config.video_store_file.clone())),
            gate: MembershipGate::new(&config.channel),
            deletions: DeletionScheduler::new(config.delete_after),
            uploads: plugins::update::pending_uploads(config.upload_timeout),
            admin_id: config.admin_id,
            channel_join_url: config.channel_join_url.clone(),
            update_channel_url: config.update_channel_url.clone(),
            retry_pause: config.retry_pause,
        }
    }

    /// Check if a user is the bot administrator.
    #[inline]
    pub fn is_admin(&self, user_id: UserId) -> bool {
        self.admin_id == user_id
    }
}

/// Build the dispatcher with all handlers.
pub fn build_dispatcher(
    bot: ThrottledBot,
    state: AppState,
) -> Dispatcher<ThrottledBot, anyhow::Error, teloxide::dispatching::DefaultKey> {
    Dispatcher::builder(bot, schema())
        .dependencies(dptree::deps![state])
        .error_handler(LoggingErrorHandler::with_custom_text("Error in update handler"))
        .enable_ctrlc_handler()
        .build()
}

/// Build the handler schema.
fn schema() -> UpdateHandler<anyhow::Error> {
    // An armed /update continuation sees the admin's next message before
    // any command does.
    let message_handler = Update::filter_message()
        .branch(plugins::upload_handler())
        .branch(plugins::command_handler());

    dptree::entry()
        .branch(message_handler)
        .branch(plugins::callback_handler())
}

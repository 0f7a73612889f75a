//! /update command (admin only).
//!
//! Two steps: `/update` arms a continuation for the admin in that chat, and
//! the admin's next message there either replaces the stored video or is
//! rejected. Either way the continuation is spent.

use std::time::Duration;

use teloxide::prelude::*;
use teloxide::types::{ChatId, UserId};
use tracing::{info, warn};

use crate::bot::dispatcher::{AppState, ThrottledBot};
use crate::bot::messenger::{Messenger, OutgoingText};
use crate::cache::{CacheConfig, TypedCache};
use crate::i18n::get_text;

/// Armed continuations, keyed by (chat, admin). Entries expire on their own.
pub type PendingUploads = TypedCache<(ChatId, UserId), ()>;

/// Create the continuation cache with the given lifetime per entry.
pub fn pending_uploads(timeout: Duration) -> PendingUploads {
    TypedCache::new("pending_uploads", CacheConfig::with_capacity(64).ttl(timeout))
}

/// Handle the /update command.
pub async fn update_command(bot: ThrottledBot, msg: Message, state: AppState) -> anyhow::Result<()> {
    let Some(user) = msg.from.as_ref() else {
        return Ok(());
    };

    begin_update(&bot, &state, msg.chat.id, user.id).await?;
    Ok(())
}

/// Handle the message following an armed /update.
pub async fn upload_message(bot: ThrottledBot, msg: Message, state: AppState) -> anyhow::Result<()> {
    receive_upload(&bot, &state, &msg).await?;
    Ok(())
}

/// Spend the sender's armed continuation on `msg`.
///
/// Returns `None` when nothing was armed for the sender in that chat (or the
/// entry expired since the filter saw it), otherwise whether a video was saved.
pub async fn receive_upload<M: Messenger>(
    messenger: &M,
    state: &AppState,
    msg: &Message,
) -> anyhow::Result<Option<bool>> {
    let Some(user) = msg.from.as_ref() else {
        return Ok(None);
    };

    if state.uploads.take(&(msg.chat.id, user.id)).is_none() {
        return Ok(None);
    }

    let video = msg.video().map(|v| v.file.id.to_string());
    complete_update(messenger, state, msg.chat.id, video).await.map(Some)
}

/// Whether `msg` is the awaited follow-up to an /update.
pub fn is_awaited_upload(msg: &Message, state: &AppState) -> bool {
    msg.from
        .as_ref()
        .is_some_and(|user| state.uploads.contains(&(msg.chat.id, user.id)))
}

/// Step one: refuse non-admins, otherwise ask for the video and arm the
/// continuation. Returns whether a continuation was armed.
pub async fn begin_update<M: Messenger>(
    messenger: &M,
    state: &AppState,
    chat_id: ChatId,
    user_id: UserId,
) -> anyhow::Result<bool> {
    if !state.is_admin(user_id) {
        warn!("User {} tried /update in chat {}", user_id, chat_id);
        messenger
            .send_text(chat_id, OutgoingText::plain(get_text("update.unauthorized")))
            .await?;
        return Ok(false);
    }

    messenger
        .send_text(chat_id, OutgoingText::plain(get_text("update.send_video")))
        .await?;
    state.uploads.insert((chat_id, user_id), ());
    info!("Awaiting new video from admin {} in chat {}", user_id, chat_id);

    Ok(true)
}

/// Step two: persist the video's file id, or report that none was sent.
/// Returns whether a video was received.
pub async fn complete_update<M: Messenger>(
    messenger: &M,
    state: &AppState,
    chat_id: ChatId,
    video_file_id: Option<String>,
) -> anyhow::Result<bool> {
    let Some(file_id) = video_file_id else {
        messenger
            .send_text(chat_id, OutgoingText::plain(get_text("update.no_video")))
            .await?;
        return Ok(false);
    };

    // Write failures are logged by the store and not shown to the admin.
    if state.store.save(&file_id).is_ok() {
        info!("Stored video replaced via chat {}", chat_id);
    }

    messenger
        .send_text(chat_id, OutgoingText::plain(get_text("update.saved")))
        .await?;
    Ok(true)
}

//! /start command and the "Try Again" callback.
//!
//! Members of the required channel get the stored video plus a notice, and
//! both are deleted after the configured delay. Everyone else gets the join
//! prompt.

use teloxide::prelude::*;
use teloxide::types::{ChatId, InlineKeyboardButton, InlineKeyboardMarkup, MessageId, UserId};
use tracing::{debug, info};

use super::join::send_join_prompt;
use crate::bot::dispatcher::{AppState, ThrottledBot};
use crate::bot::messenger::{Messenger, OutgoingText};
use crate::i18n::{get_text, get_text_with};
use crate::scheduler::DeletionTicket;
use crate::utils::format_duration;

/// What a start invocation did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartOutcome {
    /// Allowed, but no video is configured.
    NoVideo,
    /// Video and notice sent, deletion scheduled.
    Delivered(DeletionTicket),
    /// Not allowed (or unknown); join prompt sent.
    Prompted,
}

/// Handle the /start command.
pub async fn start_command(bot: ThrottledBot, msg: Message, state: AppState) -> anyhow::Result<()> {
    let Some(user) = msg.from.as_ref() else {
        return Ok(());
    };

    run_start(&bot, &state, msg.chat.id, user.id).await?;
    Ok(())
}

/// Handle the "Try Again" button under the join prompt.
pub async fn retry_callback(bot: ThrottledBot, q: CallbackQuery, state: AppState) -> anyhow::Result<()> {
    // Fall back to the private chat when the prompt is no longer accessible.
    let chat_id = q
        .message
        .as_ref()
        .map(|m| m.chat().id)
        .unwrap_or_else(|| ChatId::from(q.from.id));

    run_retry(&bot, &state, &q.id, chat_id, q.from.id).await?;
    Ok(())
}

/// Gate the user and deliver the video or the join prompt.
pub async fn run_start<M: Messenger>(
    messenger: &M,
    state: &AppState,
    chat_id: ChatId,
    user_id: UserId,
) -> anyhow::Result<StartOutcome> {
    let current_video = state.store.load();
    let membership = state.gate.check(messenger, user_id).await;

    if !membership.is_allowed() {
        debug!("User {} not allowed ({:?}), sending join prompt", user_id, membership);
        send_join_prompt(messenger, chat_id, &state.channel_join_url).await?;
        return Ok(StartOutcome::Prompted);
    }

    let Some(file_id) = current_video else {
        messenger
            .send_text(chat_id, OutgoingText::plain(get_text("start.no_video")))
            .await?;
        return Ok(StartOutcome::NoVideo);
    };

    let video_id = messenger.send_video(chat_id, &file_id).await?;
    let notice = messenger.send_text(chat_id, notice_message(state)).await;

    // The video goes on the timer even if the notice failed.
    let mut sent: Vec<MessageId> = vec![video_id];
    if let Ok(notice_id) = &notice {
        sent.push(*notice_id);
    }
    let ticket = state.deletions.schedule(messenger.clone(), chat_id, sent);
    notice?;

    info!("Delivered video to user {} in chat {}", user_id, chat_id);
    Ok(StartOutcome::Delivered(ticket))
}

/// Acknowledge the button, give Telegram a moment, then rerun /start.
pub async fn run_retry<M: Messenger>(
    messenger: &M,
    state: &AppState,
    query_id: &str,
    chat_id: ChatId,
    user_id: UserId,
) -> anyhow::Result<StartOutcome> {
    if let Err(e) = messenger.answer_callback(query_id, &get_text("join.checking")).await {
        debug!("Failed to answer callback {}: {}", query_id, e);
    }

    tokio::time::sleep(state.retry_pause).await;
    run_start(messenger, state, chat_id, user_id).await
}

fn notice_message(state: &AppState) -> OutgoingText {
    let duration = format_duration(state.deletions.delay());
    let keyboard = InlineKeyboardMarkup::new(vec![vec![InlineKeyboardButton::url(
        get_text("start.update_button"),
        state.update_channel_url.clone(),
    )]]);

    OutgoingText::plain(get_text_with("start.notice", &[("duration", &duration)]))
        .html()
        .keyboard(keyboard)
}

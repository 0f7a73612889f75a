//! Join prompt shown to users who are not (or cannot be confirmed as)
//! channel members.

use teloxide::types::{ChatId, InlineKeyboardButton, InlineKeyboardMarkup, MessageId};
use url::Url;

use crate::bot::messenger::{Messenger, OutgoingText};
use crate::i18n::get_text;

/// Callback data carried by the "Try Again" button.
pub const CHECK_JOIN: &str = "check_join";

/// Keyboard with a join link row and a "Try Again" row.
pub fn join_keyboard(join_url: &Url) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![
        vec![InlineKeyboardButton::url(get_text("join.join_button"), join_url.clone())],
        vec![InlineKeyboardButton::callback(get_text("join.retry_button"), CHECK_JOIN)],
    ])
}

/// Send the join prompt to `chat_id`.
pub async fn send_join_prompt<M: Messenger>(
    messenger: &M,
    chat_id: ChatId,
    join_url: &Url,
) -> anyhow::Result<MessageId> {
    messenger
        .send_text(
            chat_id,
            OutgoingText::plain(get_text("join.prompt")).keyboard(join_keyboard(join_url)),
        )
        .await
}

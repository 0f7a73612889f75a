//! Outbound Telegram operations used by the flows.
//!
//! Flows are written against [`Messenger`] rather than the concrete bot so
//! they can run against a recording double in tests.

use std::future::Future;

use teloxide::prelude::*;
use teloxide::types::{
    ChatId, ChatMemberStatus, InlineKeyboardMarkup, InputFile, MessageId, ParseMode, Recipient,
    UserId,
};

use super::dispatcher::ThrottledBot;

/// A text message to send.
#[derive(Debug, Clone, PartialEq)]
pub struct OutgoingText {
    pub text: String,
    pub html: bool,
    pub keyboard: Option<InlineKeyboardMarkup>,
}

impl OutgoingText {
    /// Plain text without markup.
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            html: false,
            keyboard: None,
        }
    }

    /// Parse the text as HTML.
    #[must_use]
    pub fn html(mut self) -> Self {
        self.html = true;
        self
    }

    /// Attach an inline keyboard.
    #[must_use]
    pub fn keyboard(mut self, keyboard: InlineKeyboardMarkup) -> Self {
        self.keyboard = Some(keyboard);
        self
    }
}

/// The subset of the Bot API the bot relies on.
pub trait Messenger: Clone + Send + Sync + 'static {
    /// Look up a user's status in a chat.
    fn member_status(
        &self,
        chat: Recipient,
        user_id: UserId,
    ) -> impl Future<Output = anyhow::Result<ChatMemberStatus>> + Send;

    /// Send a text message, returning its id.
    fn send_text(
        &self,
        chat_id: ChatId,
        message: OutgoingText,
    ) -> impl Future<Output = anyhow::Result<MessageId>> + Send;

    /// Send a previously uploaded video by file id.
    fn send_video(
        &self,
        chat_id: ChatId,
        file_id: &str,
    ) -> impl Future<Output = anyhow::Result<MessageId>> + Send;

    fn delete_message(
        &self,
        chat_id: ChatId,
        message_id: MessageId,
    ) -> impl Future<Output = anyhow::Result<()>> + Send;

    fn answer_callback(
        &self,
        query_id: &str,
        text: &str,
    ) -> impl Future<Output = anyhow::Result<()>> + Send;
}

impl Messenger for ThrottledBot {
    async fn member_status(&self, chat: Recipient, user_id: UserId) -> anyhow::Result<ChatMemberStatus> {
        let member = self.get_chat_member(chat, user_id).await?;
        Ok(member.kind.status())
    }

    async fn send_text(&self, chat_id: ChatId, message: OutgoingText) -> anyhow::Result<MessageId> {
        let mut req = self.send_message(chat_id, message.text);
        if message.html {
            req = req.parse_mode(ParseMode::Html);
        }
        if let Some(keyboard) = message.keyboard {
            req = req.reply_markup(keyboard);
        }
        Ok(req.await?.id)
    }

    async fn send_video(&self, chat_id: ChatId, file_id: &str) -> anyhow::Result<MessageId> {
        let sent = Requester::send_video(self, chat_id, InputFile::file_id(file_id.to_string())).await?;
        Ok(sent.id)
    }

    async fn delete_message(&self, chat_id: ChatId, message_id: MessageId) -> anyhow::Result<()> {
        Requester::delete_message(self, chat_id, message_id).await?;
        Ok(())
    }

    async fn answer_callback(&self, query_id: &str, text: &str) -> anyhow::Result<()> {
        self.answer_callback_query(query_id.to_string())
            .text(text)
            .await?;
        Ok(())
    }
}

//! Recording [`Messenger`] double for flow tests.

use std::sync::Arc;
use std::sync::atomic::{AtomicI32, Ordering};

use anyhow::anyhow;
use parking_lot::Mutex;
use teloxide::types::{ChatId, ChatMemberStatus, MessageId, Recipient, UserId};

use super::dispatcher::AppState;
use super::messenger::{Messenger, OutgoingText};
use crate::config::Config;

/// App state with default config and the video store inside `dir`.
pub fn state_in(dir: &tempfile::TempDir) -> AppState {
    let store = dir.path().join("current_video.txt");
    let store = store.to_string_lossy().into_owned();
    let config = Config::from_lookup(|key| match key {
        "BOT_TOKEN" => Some("123:abc".to_string()),
        "VIDEO_STORE_FILE" => Some(store.clone()),
        _ => None,
    })
    .expect("default config");
    AppState::new(&config)
}

/// Something the bot sent.
#[derive(Debug, Clone, PartialEq)]
pub enum Sent {
    Text { chat_id: ChatId, id: MessageId, message: OutgoingText },
    Video { chat_id: ChatId, id: MessageId, file_id: String },
}

impl Sent {
    pub fn id(&self) -> MessageId {
        match self {
            Self::Text { id, .. } | Self::Video { id, .. } => *id,
        }
    }

    pub fn text(&self) -> Option<&str> {
        match self {
            Self::Text { message, .. } => Some(&message.text),
            Self::Video { .. } => None,
        }
    }
}

#[derive(Default)]
struct Recorded {
    sent: Vec<Sent>,
    deleted: Vec<(ChatId, MessageId)>,
    answered: Vec<(String, String)>,
    lookups: Vec<(Recipient, UserId)>,
}

/// In-memory messenger. `None` status makes membership lookups fail.
#[derive(Clone)]
pub struct RecordingMessenger {
    status: Arc<Mutex<Option<ChatMemberStatus>>>,
    fail_deletes: bool,
    next_id: Arc<AtomicI32>,
    recorded: Arc<Mutex<Recorded>>,
}

impl RecordingMessenger {
    pub fn with_status(status: ChatMemberStatus) -> Self {
        Self::build(Some(status), false)
    }

    /// Every membership lookup errors.
    pub fn failing_lookups() -> Self {
        Self::build(None, false)
    }

    /// Every delete request errors.
    pub fn failing_deletes(status: ChatMemberStatus) -> Self {
        Self::build(Some(status), true)
    }

    fn build(status: Option<ChatMemberStatus>, fail_deletes: bool) -> Self {
        Self {
            status: Arc::new(Mutex::new(status)),
            fail_deletes,
            next_id: Arc::new(AtomicI32::new(100)),
            recorded: Arc::new(Mutex::new(Recorded::default())),
        }
    }

    pub fn set_status(&self, status: ChatMemberStatus) {
        *self.status.lock() = Some(status);
    }

    pub fn sent(&self) -> Vec<Sent> {
        self.recorded.lock().sent.clone()
    }

    pub fn deleted(&self) -> Vec<(ChatId, MessageId)> {
        self.recorded.lock().deleted.clone()
    }

    pub fn answered(&self) -> Vec<(String, String)> {
        self.recorded.lock().answered.clone()
    }

    pub fn lookups(&self) -> Vec<(Recipient, UserId)> {
        self.recorded.lock().lookups.clone()
    }

    fn next_id(&self) -> MessageId {
        MessageId(self.next_id.fetch_add(1, Ordering::SeqCst))
    }
}

impl Messenger for RecordingMessenger {
    async fn member_status(&self, chat: Recipient, user_id: UserId) -> anyhow::Result<ChatMemberStatus> {
        self.recorded.lock().lookups.push((chat, user_id));
        let status = *self.status.lock();
        status.ok_or_else(|| anyhow!("Bad Request: member list is inaccessible"))
    }

    async fn send_text(&self, chat_id: ChatId, message: OutgoingText) -> anyhow::Result<MessageId> {
        let id = self.next_id();
        self.recorded.lock().sent.push(Sent::Text { chat_id, id, message });
        Ok(id)
    }

    async fn send_video(&self, chat_id: ChatId, file_id: &str) -> anyhow::Result<MessageId> {
        let id = self.next_id();
        self.recorded.lock().sent.push(Sent::Video {
            chat_id,
            id,
            file_id: file_id.to_string(),
        });
        Ok(id)
    }

    async fn delete_message(&self, chat_id: ChatId, message_id: MessageId) -> anyhow::Result<()> {
        if self.fail_deletes {
            return Err(anyhow!("Bad Request: message to delete not found"));
        }
        self.recorded.lock().deleted.push((chat_id, message_id));
        Ok(())
    }

    async fn answer_callback(&self, query_id: &str, text: &str) -> anyhow::Result<()> {
        self.recorded
            .lock()
            .answered
            .push((query_id.to_string(), text.to_string()));
        Ok(())
    }
}

//! Delayed message deletion.
//!
//! Each scheduled deletion is an independent tokio task that sleeps for the
//! configured delay and then deletes its messages one by one. Failures
//! (already deleted, too old, missing rights) are ignored per message.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use futures::future::join_all;
use teloxide::types::{ChatId, MessageId};
use tokio::task::AbortHandle;
use tracing::{debug, info};

use crate::bot::messenger::Messenger;

/// Handle identifying one scheduled deletion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DeletionTicket(u64);

/// A deletion waiting for its timer.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingDeletion {
    pub chat_id: ChatId,
    pub message_ids: Vec<MessageId>,
    pub fire_at: DateTime<Utc>,
}

struct Entry {
    record: PendingDeletion,
    abort: Option<AbortHandle>,
}

/// Schedules delayed deletions. Cloning shares the same registry.
#[derive(Clone)]
pub struct DeletionScheduler {
    delay: Duration,
    next_ticket: Arc<AtomicU64>,
    pending: Arc<DashMap<DeletionTicket, Entry>>,
}

impl DeletionScheduler {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            next_ticket: Arc::new(AtomicU64::new(1)),
            pending: Arc::new(DashMap::new()),
        }
    }

    /// Delay applied to every deletion.
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Delete `message_ids` from `chat_id` once the delay has elapsed.
    ///
    /// Returns immediately; the caller never waits on the deletion.
    pub fn schedule<M: Messenger>(
        &self,
        messenger: M,
        chat_id: ChatId,
        message_ids: Vec<MessageId>,
    ) -> DeletionTicket {
        let ticket = DeletionTicket(self.next_ticket.fetch_add(1, Ordering::Relaxed));
        let fire_at = Utc::now()
            + chrono::Duration::from_std(self.delay).unwrap_or_else(|_| chrono::Duration::zero());

        // Register before spawning so the task's own removal cannot race ahead.
        self.pending.insert(
            ticket,
            Entry {
                record: PendingDeletion {
                    chat_id,
                    message_ids: message_ids.clone(),
                    fire_at,
                },
                abort: None,
            },
        );

        let count = message_ids.len();
        let delay = self.delay;
        let pending = Arc::clone(&self.pending);
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;

            let results = join_all(
                message_ids
                    .iter()
                    .map(|&id| messenger.delete_message(chat_id, id)),
            )
            .await;

            for (id, result) in message_ids.iter().zip(results) {
                if let Err(e) = result {
                    debug!("Could not delete message {} in chat {}: {}", id.0, chat_id, e);
                }
            }

            pending.remove(&ticket);
        });

        if let Some(mut entry) = self.pending.get_mut(&ticket) {
            entry.abort = Some(handle.abort_handle());
        }

        info!(
            "Scheduled deletion of {} message(s) in chat {} at {}",
            count,
            chat_id,
            fire_at.format("%H:%M:%S")
        );

        ticket
    }

    /// Abort a scheduled deletion. Returns `false` if it already ran.
    #[allow(dead_code)]
    pub fn cancel(&self, ticket: DeletionTicket) -> bool {
        match self.pending.remove(&ticket) {
            Some((_, entry)) => {
                if let Some(abort) = entry.abort {
                    abort.abort();
                }
                debug!("Cancelled deletion {:?}", ticket);
                true
            }
            None => false,
        }
    }

    /// Snapshot of outstanding deletions.
    pub fn pending(&self) -> Vec<PendingDeletion> {
        self.pending.iter().map(|e| e.record.clone()).collect()
    }
}

#[cfg(test)]
mod tests {
    use teloxide::types::ChatMemberStatus;

    use super::*;
    use crate::bot::testing::RecordingMessenger;

    const DELAY: Duration = Duration::from_secs(900);

    #[tokio::test(start_paused = true)]
    async fn test_deletes_after_delay() {
        let messenger = RecordingMessenger::with_status(ChatMemberStatus::Member);
        let scheduler = DeletionScheduler::new(DELAY);

        scheduler.schedule(messenger.clone(), ChatId(7), vec![MessageId(1), MessageId(2)]);

        let pending = scheduler.pending();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].chat_id, ChatId(7));
        assert_eq!(pending[0].message_ids, vec![MessageId(1), MessageId(2)]);

        tokio::time::sleep(DELAY - Duration::from_secs(1)).await;
        assert!(messenger.deleted().is_empty());

        tokio::time::sleep(Duration::from_secs(2)).await;
        let mut deleted = messenger.deleted();
        deleted.sort_by_key(|(_, id)| id.0);
        assert_eq!(deleted, vec![(ChatId(7), MessageId(1)), (ChatId(7), MessageId(2))]);
        assert!(scheduler.pending().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_delete_errors_are_swallowed() {
        let messenger = RecordingMessenger::failing_deletes(ChatMemberStatus::Member);
        let scheduler = DeletionScheduler::new(DELAY);

        scheduler.schedule(messenger.clone(), ChatId(7), vec![MessageId(1), MessageId(2)]);
        tokio::time::sleep(DELAY + Duration::from_secs(1)).await;

        assert!(messenger.deleted().is_empty());
        assert!(scheduler.pending().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_timers_are_independent() {
        let messenger = RecordingMessenger::with_status(ChatMemberStatus::Member);
        let scheduler = DeletionScheduler::new(DELAY);

        scheduler.schedule(messenger.clone(), ChatId(1), vec![MessageId(10)]);
        tokio::time::sleep(Duration::from_secs(300)).await;
        scheduler.schedule(messenger.clone(), ChatId(2), vec![MessageId(20)]);
        assert_eq!(scheduler.pending().len(), 2);

        tokio::time::sleep(Duration::from_secs(601)).await;
        assert_eq!(messenger.deleted(), vec![(ChatId(1), MessageId(10))]);
        assert_eq!(scheduler.pending().len(), 1);

        tokio::time::sleep(Duration::from_secs(300)).await;
        assert_eq!(
            messenger.deleted(),
            vec![(ChatId(1), MessageId(10)), (ChatId(2), MessageId(20))]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_prevents_deletion() {
        let messenger = RecordingMessenger::with_status(ChatMemberStatus::Member);
        let scheduler = DeletionScheduler::new(DELAY);

        let ticket = scheduler.schedule(messenger.clone(), ChatId(7), vec![MessageId(1)]);
        assert!(scheduler.cancel(ticket));
        assert!(!scheduler.cancel(ticket));

        tokio::time::sleep(DELAY * 2).await;
        assert!(messenger.deleted().is_empty());
        assert!(scheduler.pending().is_empty());
    }
}

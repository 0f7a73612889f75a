//! Membership checker.

use teloxide::types::{ChatMemberStatus, Recipient, UserId};
use tracing::{debug, warn};

use crate::bot::messenger::Messenger;
use crate::config::ChannelRef;

/// Outcome of a membership check.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Membership {
    /// Member, owner or administrator of the channel.
    Allowed(ChatMemberStatus),
    /// Any other reported status (left, banned, restricted).
    Denied(ChatMemberStatus),
    /// The lookup itself failed.
    Unknown,
}

impl Membership {
    /// Classify a status reported by Telegram.
    pub fn from_status(status: ChatMemberStatus) -> Self {
        match status {
            ChatMemberStatus::Member
            | ChatMemberStatus::Owner
            | ChatMemberStatus::Administrator => Self::Allowed(status),
            _ => Self::Denied(status),
        }
    }

    /// Whether content may be delivered. `Unknown` fails closed.
    #[inline]
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allowed(_))
    }
}

/// Checks users against the required channel.
///
/// The bot must be an administrator of the channel for lookups to succeed
/// reliably; without that Telegram rejects them and every user is denied.
#[derive(Debug, Clone)]
pub struct MembershipGate {
    channel: Recipient,
}

impl MembershipGate {
    pub fn new(channel: &ChannelRef) -> Self {
        Self {
            channel: channel.recipient(),
        }
    }

    /// Look up `user_id` in the channel and classify the result.
    pub async fn check<M: Messenger>(&self, messenger: &M, user_id: UserId) -> Membership {
        match messenger.member_status(self.channel.clone(), user_id).await {
            Ok(status) => {
                let membership = Membership::from_status(status);
                debug!("User {} in {:?}: {:?}", user_id, self.channel, membership);
                membership
            }
            Err(e) => {
                warn!("getChatMember failed for user {} in {:?}: {}", user_id, self.channel, e);
                Membership::Unknown
            }
        }
    }
}

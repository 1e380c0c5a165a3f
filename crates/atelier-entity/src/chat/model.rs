//! Chat message entity model.

use atelier_core::types::{MessageId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A direct chat message between two users.
///
/// Messages are immutable once appended. Identity lives in `id`: equality
/// and hashing ignore the payload so clients can deduplicate redeliveries
/// by id alone.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ChatMessage {
    /// Unique, time-ordered message identifier.
    pub id: MessageId,
    /// The sending user.
    pub sender_id: UserId,
    /// The receiving user.
    pub recipient_id: UserId,
    /// Text as typed by the sender.
    pub body: String,
    /// Sender display name, snapshotted at send time.
    pub sender_name: Option<String>,
    /// When the message was appended.
    pub created_at: DateTime<Utc>,
}

impl ChatMessage {
    /// Materialize a draft into a message, assigning id and timestamp.
    pub fn from_draft(draft: ChatDraft) -> Self {
        Self {
            id: MessageId::new(),
            sender_id: draft.sender_id,
            recipient_id: draft.recipient_id,
            body: draft.body,
            sender_name: draft.sender_name,
            created_at: Utc::now(),
        }
    }

    /// Check whether the given user is a party to this message.
    pub fn involves(&self, user_id: &UserId) -> bool {
        self.sender_id == *user_id || self.recipient_id == *user_id
    }
}

impl PartialEq for ChatMessage {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for ChatMessage {}

impl std::hash::Hash for ChatMessage {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

/// A chat message before the store has assigned id and timestamp.
#[derive(Debug, Clone)]
pub struct ChatDraft {
    /// The sending user.
    pub sender_id: UserId,
    /// The receiving user.
    pub recipient_id: UserId,
    /// Text as typed by the sender.
    pub body: String,
    /// Sender display name snapshot, if known.
    pub sender_name: Option<String>,
}

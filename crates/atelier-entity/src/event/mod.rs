//! Durable event union and replay cursor.

pub mod cursor;

pub use cursor::EventCursor;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::chat::ChatMessage;
use crate::notification::Notification;

/// Kinds of durable events kept in the history store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    /// A direct chat message.
    Chat,
    /// A notification.
    Notification,
}

/// A durable event, as appended to or replayed from the history store.
///
/// Presence is not part of this union. Presence updates are ephemeral and
/// never written to history.
#[derive(Debug, Clone, PartialEq)]
pub enum HistoryEvent {
    /// A chat message addressed to the stream's user.
    Chat(ChatMessage),
    /// A notification owned by the stream's user.
    Notification(Notification),
}

impl HistoryEvent {
    /// The raw time-ordered event id.
    pub fn id(&self) -> Uuid {
        match self {
            Self::Chat(message) => message.id.into_uuid(),
            Self::Notification(notification) => notification.id.into_uuid(),
        }
    }

    /// The kind of this event.
    pub fn kind(&self) -> EventKind {
        match self {
            Self::Chat(_) => EventKind::Chat,
            Self::Notification(_) => EventKind::Notification,
        }
    }

    /// When the event was appended.
    pub fn created_at(&self) -> DateTime<Utc> {
        match self {
            Self::Chat(message) => message.created_at,
            Self::Notification(notification) => notification.created_at,
        }
    }

    /// A cursor pointing at this event.
    pub fn cursor(&self) -> EventCursor {
        EventCursor::new(self.id())
    }
}

//! Outbound event frames and inbound client messages.
//!
//! Frames are adjacently tagged: `{"event": "...", "data": {...}}` for
//! server pushes and `{"type": "..."}` for client messages. Field names
//! are part of the client contract and must not drift.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use atelier_core::types::{MessageId, NotificationId, SessionId, UserId};
use atelier_entity::chat::ChatMessage;
use atelier_entity::event::HistoryEvent;
use atelier_entity::notification::{Notification, Severity};
use atelier_entity::presence::{Position, PresenceUpdate};

/// Events pushed from the hub to connected clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum OutboundEvent {
    /// A chat message addressed to the receiving user.
    ChatMessageAdded(ChatMessagePayload),
    /// A new notification for the receiving user.
    NotificationAdded(NotificationPayload),
    /// A notification's read flag changed on another device.
    NotificationUpdated(NotificationReadPayload),
    /// A collaborator's cursor moved, or left the canvas.
    PresenceUpdated(PresencePayload),
    /// Server heartbeat; clients answer with a `pong` message.
    Ping(PingPayload),
    /// A client message could not be honored.
    Error(ErrorPayload),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessagePayload {
    pub id: MessageId,
    pub from: UserId,
    pub to: UserId,
    pub message: String,
    /// Sender display name as of send time, when known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sender_name: Option<String>,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationPayload {
    pub id: NotificationId,
    #[serde(rename = "type")]
    pub kind: String,
    pub severity: Severity,
    pub title: String,
    pub message: String,
    pub read: bool,
    pub created_at: DateTime<Utc>,
    pub metadata: Option<Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NotificationReadPayload {
    pub id: NotificationId,
    pub read: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresencePayload {
    pub user_id: UserId,
    pub session_id: SessionId,
    /// `null` means the cursor left the canvas or the session ended.
    pub position: Option<Position>,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PingPayload {
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorPayload {
    pub code: String,
    pub message: String,
}

impl From<&ChatMessage> for ChatMessagePayload {
    fn from(message: &ChatMessage) -> Self {
        Self {
            id: message.id,
            from: message.sender_id,
            to: message.recipient_id,
            message: message.body.clone(),
            sender_name: message.sender_name.clone(),
            timestamp: message.created_at,
        }
    }
}

impl From<&Notification> for NotificationPayload {
    fn from(notification: &Notification) -> Self {
        Self {
            id: notification.id,
            kind: notification.kind.clone(),
            severity: notification.severity,
            title: notification.title.clone(),
            message: notification.message.clone(),
            read: notification.read,
            created_at: notification.created_at,
            metadata: notification.metadata.clone(),
        }
    }
}

impl From<&PresenceUpdate> for PresencePayload {
    fn from(update: &PresenceUpdate) -> Self {
        Self {
            user_id: update.user_id,
            session_id: update.session_id,
            position: update.position,
            timestamp: update.timestamp,
        }
    }
}

impl OutboundEvent {
    pub fn chat(message: &ChatMessage) -> Self {
        Self::ChatMessageAdded(message.into())
    }

    pub fn notification(notification: &Notification) -> Self {
        Self::NotificationAdded(notification.into())
    }

    pub fn notification_read(id: NotificationId, read: bool) -> Self {
        Self::NotificationUpdated(NotificationReadPayload { id, read })
    }

    pub fn presence(update: &PresenceUpdate) -> Self {
        Self::PresenceUpdated(update.into())
    }

    pub fn ping() -> Self {
        Self::Ping(PingPayload {
            timestamp: Utc::now(),
        })
    }

    pub fn protocol_error(code: &str, message: impl Into<String>) -> Self {
        Self::Error(ErrorPayload {
            code: code.to_string(),
            message: message.into(),
        })
    }

    /// Converts a replayed history event into its live wire form.
    pub fn from_history(event: &HistoryEvent) -> Self {
        match event {
            HistoryEvent::Chat(message) => Self::chat(message),
            HistoryEvent::Notification(notification) => Self::notification(notification),
        }
    }

    /// Durable store id for events that exist in history, used to
    /// deduplicate the replay/live seam. Ephemeral frames return `None`.
    pub fn event_id(&self) -> Option<Uuid> {
        match self {
            Self::ChatMessageAdded(payload) => Some(*payload.id.as_uuid()),
            Self::NotificationAdded(payload) => Some(*payload.id.as_uuid()),
            _ => None,
        }
    }

    /// The (user, session) a presence frame describes.
    pub fn presence_key(&self) -> Option<(UserId, SessionId)> {
        match self {
            Self::PresenceUpdated(payload) => Some((payload.user_id, payload.session_id)),
            _ => None,
        }
    }

    /// The subject user of a presence frame.
    pub fn presence_user(&self) -> Option<UserId> {
        self.presence_key().map(|(user_id, _)| user_id)
    }

    /// Wire name of the frame, for logging.
    pub fn name(&self) -> &'static str {
        match self {
            Self::ChatMessageAdded(_) => "chatMessageAdded",
            Self::NotificationAdded(_) => "notificationAdded",
            Self::NotificationUpdated(_) => "notificationUpdated",
            Self::PresenceUpdated(_) => "presenceUpdated",
            Self::Ping(_) => "ping",
            Self::Error(_) => "error",
        }
    }
}

/// Messages clients send over an established WebSocket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum InboundMessage {
    /// Cursor moved; `position: null` means it left the canvas.
    Presence { position: Option<Position> },
    /// Restrict which users' presence this session receives.
    /// `null` or a missing list clears the filter.
    #[serde(rename_all = "camelCase")]
    PresenceFilter { user_ids: Option<Vec<UserId>> },
    /// Answer to a server `ping`.
    Pong {},
}

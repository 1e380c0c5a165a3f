//! Per-user notification records.

use atelier_core::types::{NotificationId, UserId};
use atelier_core::{AppError, AppResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::Severity;

/// Maximum serialized size of the opaque metadata blob.
pub const MAX_METADATA_BYTES: usize = 8 * 1024;

/// A notification delivered to a single user.
///
/// The only mutable field is `read`; everything else is fixed at append
/// time. Equality and hashing are by id so clients can deduplicate
/// redeliveries.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Notification {
    /// Unique, time-ordered notification identifier.
    pub id: NotificationId,
    /// User this notification belongs to.
    pub user_id: UserId,
    /// Free-form type tag (e.g. `"export.finished"`), interpreted by
    /// clients only.
    pub kind: String,
    /// Severity level.
    pub severity: Severity,
    /// Short headline.
    pub title: String,
    /// Longer body text, may be empty.
    pub message: String,
    /// Opaque structured payload; never interpreted by the hub.
    pub metadata: Option<serde_json::Value>,
    /// Read flag, flipped by the read endpoints.
    pub read: bool,
    /// When the notification was appended.
    pub created_at: DateTime<Utc>,
}

impl Notification {
    /// Materialize a draft into a notification, assigning id and timestamp.
    pub fn from_draft(draft: NotificationDraft) -> Self {
        Self {
            id: NotificationId::new(),
            user_id: draft.user_id,
            kind: draft.kind,
            severity: draft.severity,
            title: draft.title,
            message: draft.message,
            metadata: draft.metadata,
            read: false,
            created_at: Utc::now(),
        }
    }

    /// Check if the notification is still unread.
    pub fn is_unread(&self) -> bool {
        !self.read
    }
}

impl PartialEq for Notification {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Notification {}

impl std::hash::Hash for Notification {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

/// A notification before the store has assigned id and timestamp.
#[derive(Debug, Clone)]
pub struct NotificationDraft {
    /// User this notification belongs to.
    pub user_id: UserId,
    /// Free-form type tag.
    pub kind: String,
    /// Severity level.
    pub severity: Severity,
    /// Short headline.
    pub title: String,
    /// Longer body text, may be empty.
    pub message: String,
    /// Opaque structured payload.
    pub metadata: Option<serde_json::Value>,
}

impl NotificationDraft {
    /// Reject metadata blobs over [`MAX_METADATA_BYTES`] once serialized.
    pub fn validate_metadata(&self) -> AppResult<()> {
        if let Some(metadata) = &self.metadata {
            let size = serde_json::to_vec(metadata)?.len();
            if size > MAX_METADATA_BYTES {
                return Err(AppError::validation(format!(
                    "Notification metadata is {size} bytes; limit is {MAX_METADATA_BYTES}"
                )));
            }
        }
        Ok(())
    }
}

//! Directory entry for a hub user.

use atelier_core::types::UserId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A user known to the hub.
///
/// Accounts are owned by the upstream identity service; the hub keeps a
/// directory copy with the fields it needs for rendering (display name,
/// presence color) and recipient validation.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    /// Unique user identifier, assigned upstream.
    pub id: UserId,
    /// Name rendered next to messages and cursors.
    pub display_name: String,
    /// Presence/cursor color as a hex string (e.g. `"#e64980"`).
    pub color: String,
    /// When the directory entry was created.
    pub created_at: DateTime<Utc>,
    /// When the directory entry was last updated.
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Create a directory entry stamped with the current time.
    pub fn new(id: UserId, display_name: impl Into<String>, color: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id,
            display_name: display_name.into(),
            color: color.into(),
            created_at: now,
            updated_at: now,
        }
    }
}

//! Presence value objects.
//!
//! Presence is ephemeral state: it is never persisted, and only the most
//! recent update per `(user, session)` matters.

use atelier_core::types::{SessionId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Coalescing key for presence updates.
pub type PresenceKey = (UserId, SessionId);

/// A 2D position on the shared canvas.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    /// Horizontal canvas coordinate.
    pub x: f64,
    /// Vertical canvas coordinate.
    pub y: f64,
}

/// A cursor/presence update for one session of one user.
///
/// `position: None` means the session is absent (cursor left the canvas or
/// the session disconnected).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PresenceUpdate {
    /// The user this presence belongs to.
    pub user_id: UserId,
    /// The originating session; one user may have several.
    pub session_id: SessionId,
    /// Current cursor position, or `None` when absent.
    pub position: Option<Position>,
    /// When the update was produced.
    pub timestamp: DateTime<Utc>,
}

impl PresenceUpdate {
    /// Create an update stamped with the current time.
    pub fn new(user_id: UserId, session_id: SessionId, position: Option<Position>) -> Self {
        Self {
            user_id,
            session_id,
            position,
            timestamp: Utc::now(),
        }
    }

    /// Create an absence marker for a session.
    pub fn absent(user_id: UserId, session_id: SessionId) -> Self {
        Self::new(user_id, session_id, None)
    }

    /// Check whether this update marks the session absent.
    pub fn is_absent(&self) -> bool {
        self.position.is_none()
    }

    /// The coalescing key: updates with equal keys supersede each other.
    pub fn key(&self) -> PresenceKey {
        (self.user_id, self.session_id)
    }
}

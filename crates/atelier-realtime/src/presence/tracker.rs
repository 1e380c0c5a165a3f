//! Authoritative in-memory presence state.
//!
//! One entry per `(user, session)`, last write wins. Presence is never
//! persisted: a restart simply forgets everyone, and reconnecting sessions
//! repopulate the map.

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

use atelier_core::types::{SessionId, UserId};
use atelier_entity::presence::{PresenceKey, PresenceUpdate};

#[derive(Debug, Default)]
pub struct PresenceTracker {
    latest: DashMap<PresenceKey, PresenceUpdate>,
}

impl PresenceTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an update, returning whether it won.
    ///
    /// An update older than the stored one for the same key is stale and
    /// must not be broadcast; callers drop it when this returns `false`.
    /// Absence markers clear the entry. A session's updates arrive in order
    /// on its own socket, so a cleared entry cannot be resurrected by a
    /// stale position from the same session.
    pub fn record(&self, update: &PresenceUpdate) -> bool {
        if update.is_absent() {
            self.latest.remove(&update.key());
            return true;
        }
        match self.latest.entry(update.key()) {
            Entry::Occupied(mut entry) => {
                if entry.get().timestamp > update.timestamp {
                    return false;
                }
                entry.insert(update.clone());
                true
            }
            Entry::Vacant(entry) => {
                entry.insert(update.clone());
                true
            }
        }
    }

    /// Forget a session and produce the absence marker to broadcast.
    pub fn release_session(&self, user_id: UserId, session_id: SessionId) -> PresenceUpdate {
        self.latest.remove(&(user_id, session_id));
        PresenceUpdate::absent(user_id, session_id)
    }

    /// Current presence of every tracked session.
    pub fn snapshot(&self) -> Vec<PresenceUpdate> {
        self.latest
            .iter()
            .map(|entry| entry.value().clone())
            .collect()
    }

    pub fn session_count(&self) -> usize {
        self.latest.len()
    }
}

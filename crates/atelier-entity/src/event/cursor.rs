//! Replay cursor over the durable event stream.

use std::fmt;
use std::str::FromStr;

use atelier_core::types::{MessageId, NotificationId};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Position in a user's durable event stream.
///
/// To clients a cursor is an opaque token they echo back on reconnect. It
/// wraps the v7 id of the last consumed event; since event ids order by
/// creation instant, "events newer than the cursor" is a plain id
/// comparison on both backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventCursor(pub Uuid);

impl EventCursor {
    /// Create a cursor from a raw event id.
    pub fn new(id: Uuid) -> Self {
        Self(id)
    }

    /// Return the inner event id.
    pub fn into_uuid(self) -> Uuid {
        self.0
    }

    /// Return a reference to the inner event id.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }

    /// Check whether an event id lies strictly after this cursor.
    pub fn precedes(&self, id: Uuid) -> bool {
        id > self.0
    }
}

impl fmt::Display for EventCursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for EventCursor {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

impl From<MessageId> for EventCursor {
    fn from(id: MessageId) -> Self {
        Self(id.into_uuid())
    }
}

impl From<NotificationId> for EventCursor {
    fn from(id: NotificationId) -> Self {
        Self(id.into_uuid())
    }
}

//! Subscription lifecycle phases.

use std::fmt;

/// Where a channel is in its lifecycle.
///
/// A subscription without a cursor jumps straight from `Connecting` to
/// `Subscribed`; with a cursor it stays `Connecting` until backfill opens
/// the replay gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// No channel registered.
    Disconnected,
    /// Channel registered, replay gate still closed.
    Connecting,
    /// Live events flowing.
    Subscribed,
}

impl SessionPhase {
    pub fn can_transition_to(self, next: SessionPhase) -> bool {
        matches!(
            (self, next),
            (Self::Disconnected, Self::Connecting)
                | (Self::Connecting, Self::Subscribed)
                | (Self::Connecting, Self::Disconnected)
                | (Self::Subscribed, Self::Disconnected)
        )
    }
}

impl fmt::Display for SessionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Disconnected => "disconnected",
            Self::Connecting => "connecting",
            Self::Subscribed => "subscribed",
        };
        write!(f, "{name}")
    }
}

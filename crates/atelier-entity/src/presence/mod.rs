//! Presence states and update records.

pub mod model;

pub use model::{Position, PresenceKey, PresenceUpdate};

//! Notification entities and severity levels.

pub mod model;
pub mod severity;

pub use model::{Notification, NotificationDraft, MAX_METADATA_BYTES};
pub use severity::Severity;

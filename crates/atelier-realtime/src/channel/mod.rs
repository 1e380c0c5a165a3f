//! Per-session delivery channels and the registry that indexes them.

pub mod channel;
pub mod registry;

pub use channel::{Channel, PushStatus};
pub use registry::ChannelRegistry;

//! Wire-level message types exchanged over WebSocket connections.

pub mod types;

pub use types::{
    ChatMessagePayload, InboundMessage, NotificationPayload, OutboundEvent, PresencePayload,
};

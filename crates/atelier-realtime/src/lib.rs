//! # atelier-realtime
//!
//! The live half of the hub: per-session delivery channels, the channel
//! registry, presence tracking, reconnect backfill, and the [`CollabHub`]
//! facade that the API layer drives.
//!
//! Events flow in one direction. Producers append to history first, then
//! hand the resulting entity to the [`router::DeliveryRouter`], which fans
//! it out to every open [`channel::Channel`] of the target users. Sockets
//! drain their channel with [`channel::Channel::recv`] and never touch the
//! store directly.

pub mod channel;
pub mod hub;
pub mod message;
pub mod metrics;
pub mod presence;
pub mod router;
pub mod session;

pub use hub::CollabHub;
pub use metrics::{HubMetrics, MetricsSnapshot};

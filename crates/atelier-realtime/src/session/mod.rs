//! Session lifecycle: subscription, reconnect backfill, heartbeats.

pub mod backfill;
pub mod heartbeat;
pub mod manager;
pub mod state;

pub use manager::SessionManager;
pub use state::SessionPhase;

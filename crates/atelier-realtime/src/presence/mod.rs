//! Last-write-wins presence state.

pub mod tracker;

pub use tracker::PresenceTracker;

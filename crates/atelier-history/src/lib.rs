//! # atelier-history
//!
//! Durable storage adapters for the Atelier hub. The hub persists chat
//! messages and notifications through the [`HistoryStore`] trait and looks
//! up users through [`UserDirectory`]; this crate provides the PostgreSQL
//! implementations used in production and the in-memory implementations
//! used for tests and single-process development.

pub mod directory;
pub mod memory;
pub mod migration;
pub mod postgres;
pub mod provider;
pub mod retention;
pub mod store;

pub use directory::UserDirectory;
pub use provider::HistoryBackend;
pub use store::{EventStream, HistoryStore};

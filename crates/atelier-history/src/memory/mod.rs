//! In-memory history backend for tests and single-process development.

pub mod directory;
pub mod store;

pub use directory::MemoryUserDirectory;
pub use store::MemoryHistoryStore;

//! PostgreSQL history backend.

pub mod connection;
pub mod directory;
pub mod store;

pub use connection::DatabasePool;
pub use directory::PgUserDirectory;
pub use store::PgHistoryStore;

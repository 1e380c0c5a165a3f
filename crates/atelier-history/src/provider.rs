//! History backend selection from configuration.

use std::sync::Arc;

use tracing::info;

use atelier_core::config::DatabaseConfig;
use atelier_core::config::history::HistoryConfig;
use atelier_core::error::AppError;
use atelier_core::result::AppResult;

use crate::directory::UserDirectory;
use crate::memory::{MemoryHistoryStore, MemoryUserDirectory};
use crate::postgres::{DatabasePool, PgHistoryStore, PgUserDirectory};
use crate::store::HistoryStore;

/// The selected history backend: a store, a directory, and the database
/// pool when one is in play.
///
/// The backend is chosen at construction time based on configuration,
/// mirroring how every other pluggable subsystem is wired.
#[derive(Clone)]
pub struct HistoryBackend {
    store: Arc<dyn HistoryStore>,
    directory: Arc<dyn UserDirectory>,
    pool: Option<DatabasePool>,
}

impl HistoryBackend {
    /// Build the backend named by `history.backend`.
    pub async fn connect(
        history: &HistoryConfig,
        database: &DatabaseConfig,
    ) -> AppResult<Self> {
        match history.backend.as_str() {
            "postgres" => {
                info!("Initializing PostgreSQL history backend");
                let pool = DatabasePool::connect(database).await?;
                let store = PgHistoryStore::new(pool.pool().clone(), history.backfill_limit);
                let directory = PgUserDirectory::new(pool.pool().clone());
                Ok(Self {
                    store: Arc::new(store),
                    directory: Arc::new(directory),
                    pool: Some(pool),
                })
            }
            "memory" => {
                info!("Initializing in-memory history backend");
                Ok(Self::memory(history.backfill_limit))
            }
            other => Err(AppError::configuration(format!(
                "Unknown history backend: '{other}'. Supported: postgres, memory"
            ))),
        }
    }

    /// Build an in-memory backend directly (tests, single-process dev).
    pub fn memory(backfill_limit: u64) -> Self {
        Self {
            store: Arc::new(MemoryHistoryStore::new(backfill_limit)),
            directory: Arc::new(MemoryUserDirectory::new()),
            pool: None,
        }
    }

    /// The event store.
    pub fn store(&self) -> Arc<dyn HistoryStore> {
        Arc::clone(&self.store)
    }

    /// The user directory.
    pub fn directory(&self) -> Arc<dyn UserDirectory> {
        Arc::clone(&self.directory)
    }

    /// The database pool, when the backend has one.
    pub fn pool(&self) -> Option<&DatabasePool> {
        self.pool.as_ref()
    }

    /// Close backend resources.
    pub async fn close(&self) {
        if let Some(pool) = &self.pool {
            pool.close().await;
        }
    }
}

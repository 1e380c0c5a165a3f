//! Application state shared across all handlers.

use std::fmt;
use std::sync::Arc;

use atelier_core::config::AppConfig;
use atelier_history::{HistoryStore, UserDirectory};
use atelier_realtime::CollabHub;

/// Everything a handler can reach, cloned per request.
///
/// Each field is an `Arc`, so the clone is a handful of refcounts.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    /// The collaboration hub: channels, presence, delivery.
    pub hub: Arc<CollabHub>,
    /// Durable event history.
    pub store: Arc<dyn HistoryStore>,
    /// User directory lookups.
    pub directory: Arc<dyn UserDirectory>,
}

impl fmt::Debug for AppState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppState")
            .field("config", &self.config)
            .field("hub", &self.hub)
            .finish_non_exhaustive()
    }
}

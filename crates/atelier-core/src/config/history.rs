//! `[history]` section: durable event storage.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryConfig {
    /// Backend selection: `"postgres"` or `"memory"`.
    #[serde(default = "defaults::backend")]
    pub backend: String,
    /// Maximum number of events replayed per backfill.
    #[serde(default = "defaults::backfill_limit")]
    pub backfill_limit: u64,
    /// Days after which stored events are pruned.
    #[serde(default = "defaults::retention_days")]
    pub retention_days: u32,
    /// Per-user cap on stored events of each kind.
    #[serde(default = "defaults::max_stored")]
    pub max_stored_per_user: u64,
    /// Interval between retention sweeps in seconds.
    #[serde(default = "defaults::cleanup_interval")]
    pub cleanup_interval_seconds: u64,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            backend: defaults::backend(),
            backfill_limit: defaults::backfill_limit(),
            retention_days: defaults::retention_days(),
            max_stored_per_user: defaults::max_stored(),
            cleanup_interval_seconds: defaults::cleanup_interval(),
        }
    }
}

mod defaults {
    pub fn backend() -> String {
        "postgres".to_string()
    }

    pub fn backfill_limit() -> u64 {
        500
    }

    pub fn retention_days() -> u32 {
        90
    }

    pub fn max_stored() -> u64 {
        10_000
    }

    pub fn cleanup_interval() -> u64 {
        3600
    }
}

//! Periodic retention sweep over stored events.
//!
//! History is bounded two ways: events older than the retention window are
//! pruned, and each user stream is capped at a fixed number of events per
//! kind. Both bounds are enforced by one periodic sweep.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use atelier_core::config::history::HistoryConfig;

use crate::store::HistoryStore;

/// Spawn the retention sweep loop. The first sweep runs immediately; the
/// loop stops when `cancel` fires.
pub fn spawn_retention_loop(
    store: Arc<dyn HistoryStore>,
    config: HistoryConfig,
    cancel: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = time::interval(Duration::from_secs(config.cleanup_interval_seconds));
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        info!(
            retention_days = config.retention_days,
            max_stored_per_user = config.max_stored_per_user,
            interval_seconds = config.cleanup_interval_seconds,
            "Retention loop started"
        );

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    info!("Retention loop stopped");
                    break;
                }
                _ = interval.tick() => {
                    sweep(store.as_ref(), &config).await;
                }
            }
        }
    })
}

async fn sweep(store: &dyn HistoryStore, config: &HistoryConfig) {
    let cutoff = Utc::now() - chrono::Duration::days(config.retention_days as i64);

    let expired = match store.prune_older_than(cutoff).await {
        Ok(n) => n,
        Err(e) => {
            warn!(error = %e, "Retention prune failed");
            return;
        }
    };

    let overflow = match store.trim_per_user(config.max_stored_per_user).await {
        Ok(n) => n,
        Err(e) => {
            warn!(error = %e, "Retention trim failed");
            return;
        }
    };

    if expired > 0 || overflow > 0 {
        info!(expired, overflow, "Retention sweep removed events");
    }
}

//! Hub counters, exposed through the health endpoint.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

use crate::channel::PushStatus;

/// Monotonic counters for hub activity.
///
/// All counters are relaxed atomics; they feed operational dashboards and
/// never gate behavior.
#[derive(Debug, Default)]
pub struct HubMetrics {
    pub channels_opened: AtomicU64,
    pub channels_closed: AtomicU64,
    pub events_delivered: AtomicU64,
    pub events_coalesced: AtomicU64,
    pub events_evicted: AtomicU64,
    pub events_dropped_closed: AtomicU64,
    pub backfill_events_replayed: AtomicU64,
    pub backfill_timeouts: AtomicU64,
    pub append_failures: AtomicU64,
    pub presence_updates: AtomicU64,
    pub presence_stale_dropped: AtomicU64,
}

impl HubMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn channel_opened(&self) {
        self.channels_opened.fetch_add(1, Ordering::Relaxed);
    }

    pub fn channel_closed(&self) {
        self.channels_closed.fetch_add(1, Ordering::Relaxed);
    }

    /// Account for one push attempt into a channel.
    pub fn record_push(&self, status: PushStatus) {
        let counter = match status {
            PushStatus::Delivered => &self.events_delivered,
            PushStatus::Coalesced => &self.events_coalesced,
            PushStatus::Evicted => &self.events_evicted,
            PushStatus::Closed => &self.events_dropped_closed,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_replayed(&self, count: u64) {
        self.backfill_events_replayed
            .fetch_add(count, Ordering::Relaxed);
    }

    pub fn backfill_timed_out(&self) {
        self.backfill_timeouts.fetch_add(1, Ordering::Relaxed);
    }

    pub fn append_failed(&self) {
        self.append_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn presence_update(&self) {
        self.presence_updates.fetch_add(1, Ordering::Relaxed);
    }

    pub fn presence_stale(&self) {
        self.presence_stale_dropped.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            channels_opened: self.channels_opened.load(Ordering::Relaxed),
            channels_closed: self.channels_closed.load(Ordering::Relaxed),
            events_delivered: self.events_delivered.load(Ordering::Relaxed),
            events_coalesced: self.events_coalesced.load(Ordering::Relaxed),
            events_evicted: self.events_evicted.load(Ordering::Relaxed),
            events_dropped_closed: self.events_dropped_closed.load(Ordering::Relaxed),
            backfill_events_replayed: self.backfill_events_replayed.load(Ordering::Relaxed),
            backfill_timeouts: self.backfill_timeouts.load(Ordering::Relaxed),
            append_failures: self.append_failures.load(Ordering::Relaxed),
            presence_updates: self.presence_updates.load(Ordering::Relaxed),
            presence_stale_dropped: self.presence_stale_dropped.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time copy of [`HubMetrics`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsSnapshot {
    pub channels_opened: u64,
    pub channels_closed: u64,
    pub events_delivered: u64,
    pub events_coalesced: u64,
    pub events_evicted: u64,
    pub events_dropped_closed: u64,
    pub backfill_events_replayed: u64,
    pub backfill_timeouts: u64,
    pub append_failures: u64,
    pub presence_updates: u64,
    pub presence_stale_dropped: u64,
}

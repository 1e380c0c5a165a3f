//! Replay of missed history into a freshly subscribed channel.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use futures::StreamExt;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};
use uuid::Uuid;

use atelier_core::error::AppError;
use atelier_entity::event::{EventCursor, EventKind};
use atelier_history::HistoryStore;

use crate::channel::{Channel, PushStatus};
use crate::message::OutboundEvent;
use crate::metrics::HubMetrics;

/// How a backfill run ended. All variants except `Cancelled` carry the ids
/// that made it into the channel, which the gate uses for deduplication.
#[derive(Debug)]
pub(crate) enum BackfillOutcome {
    /// Every missed event was replayed.
    Completed(HashSet<Uuid>),
    /// The deadline passed; the session goes live with a gap.
    TimedOut(HashSet<Uuid>),
    /// The store failed partway; the session goes live with a gap.
    Failed(HashSet<Uuid>),
    /// The channel was torn down while replaying.
    Cancelled,
}

enum ReplayEnd {
    Finished,
    ChannelClosed,
}

/// Stream events newer than `cursor` into the channel.
///
/// Runs under an overall deadline so a slow store can only delay, never
/// block, a session going live. Cancellation interrupts the run at any
/// point, including while the store is still producing the stream. The
/// caller opens the replay gate with the returned id set.
pub(crate) async fn run_backfill(
    store: Arc<dyn HistoryStore>,
    channel: Arc<Channel>,
    cursor: EventCursor,
    deadline: Duration,
    cancel: CancellationToken,
    metrics: Arc<HubMetrics>,
) -> BackfillOutcome {
    let mut replayed = HashSet::new();

    let result = tokio::select! {
        _ = cancel.cancelled() => {
            debug!(channel = %channel.id(), "Backfill cancelled");
            return BackfillOutcome::Cancelled;
        }
        result = tokio::time::timeout(
            deadline,
            replay(&*store, &channel, cursor, &mut replayed),
        ) => result,
    };

    metrics.record_replayed(replayed.len() as u64);

    match result {
        Ok(Ok(ReplayEnd::Finished)) => {
            debug!(
                channel = %channel.id(),
                replayed = replayed.len(),
                "Backfill complete"
            );
            BackfillOutcome::Completed(replayed)
        }
        Ok(Ok(ReplayEnd::ChannelClosed)) => {
            debug!(channel = %channel.id(), "Backfill stopped; channel closed");
            BackfillOutcome::Cancelled
        }
        Ok(Err(error)) => {
            warn!(
                channel = %channel.id(),
                replayed = replayed.len(),
                error = %error,
                "Backfill failed; session goes live with a gap"
            );
            BackfillOutcome::Failed(replayed)
        }
        Err(_elapsed) => {
            metrics.backfill_timed_out();
            warn!(
                channel = %channel.id(),
                replayed = replayed.len(),
                "Backfill deadline exceeded; session goes live with a gap"
            );
            BackfillOutcome::TimedOut(replayed)
        }
    }
}

async fn replay(
    store: &dyn HistoryStore,
    channel: &Channel,
    cursor: EventCursor,
    replayed: &mut HashSet<Uuid>,
) -> Result<ReplayEnd, AppError> {
    let kinds = [EventKind::Chat, EventKind::Notification];
    let mut events = store
        .events_after(channel.user_id(), Some(cursor), &kinds)
        .await?;

    while let Some(item) = events.next().await {
        let event = item?;
        let id = event.id();
        if channel.push_replay(OutboundEvent::from_history(&event)) == PushStatus::Closed {
            return Ok(ReplayEnd::ChannelClosed);
        }
        replayed.insert(id);
    }
    Ok(ReplayEnd::Finished)
}

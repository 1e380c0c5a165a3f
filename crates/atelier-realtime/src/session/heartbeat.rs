//! Server-side liveness probing of connected sessions.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::channel::Channel;
use crate::message::OutboundEvent;

/// Ping cadence and the silence budget before a session is declared dead.
#[derive(Debug, Clone, Copy)]
pub(crate) struct HeartbeatSchedule {
    pub interval: Duration,
    pub timeout: Duration,
}

/// Why a heartbeat loop stopped.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum HeartbeatEnd {
    /// The channel closed underneath us; teardown already happened.
    Closed,
    /// The client went silent past the timeout.
    TimedOut,
}

/// Ping the session on a fixed cadence until it closes or goes silent.
///
/// The caller tears the session down on [`HeartbeatEnd::TimedOut`]; this
/// loop only observes. Cancelling the token stops the loop immediately,
/// without waiting out the current tick.
pub(crate) async fn run_heartbeat(
    channel: Arc<Channel>,
    schedule: HeartbeatSchedule,
    cancel: CancellationToken,
) -> HeartbeatEnd {
    let mut ticker = tokio::time::interval(schedule.interval);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                debug!(channel = %channel.id(), "Heartbeat loop ending; shutdown requested");
                return HeartbeatEnd::Closed;
            }
            _ = ticker.tick() => {}
        }

        if !channel.is_open() {
            debug!(channel = %channel.id(), "Heartbeat loop ending; channel closed");
            return HeartbeatEnd::Closed;
        }

        let silent = (chrono::Utc::now() - channel.last_pong())
            .to_std()
            .unwrap_or(Duration::ZERO);
        if silent > schedule.timeout {
            return HeartbeatEnd::TimedOut;
        }

        channel.push_live(OutboundEvent::ping());
    }
}

//! Session lifecycle orchestration.
//!
//! The manager owns every background task a session needs (backfill,
//! heartbeat) and guarantees teardown is idempotent: a session may die via
//! socket close, heartbeat timeout, cap eviction, or server shutdown, and
//! any two of those may race.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{debug, info, warn};

use atelier_core::config::HubConfig;
use atelier_core::types::{ChannelId, SessionId, UserId};
use atelier_entity::event::EventCursor;
use atelier_history::HistoryStore;

use crate::channel::{Channel, ChannelRegistry};
use crate::message::OutboundEvent;
use crate::metrics::HubMetrics;
use crate::presence::PresenceTracker;
use crate::router::DeliveryRouter;
use crate::session::backfill::{BackfillOutcome, run_backfill};
use crate::session::heartbeat::{HeartbeatEnd, HeartbeatSchedule, run_heartbeat};
use crate::session::state::SessionPhase;

pub struct SessionManager {
    config: HubConfig,
    registry: Arc<ChannelRegistry>,
    router: Arc<DeliveryRouter>,
    presence: Arc<PresenceTracker>,
    store: Arc<dyn HistoryStore>,
    metrics: Arc<HubMetrics>,
    phases: DashMap<ChannelId, SessionPhase>,
    backfills: DashMap<ChannelId, CancellationToken>,
    tasks: TaskTracker,
    shutdown: CancellationToken,
}

impl SessionManager {
    pub fn new(
        config: HubConfig,
        registry: Arc<ChannelRegistry>,
        router: Arc<DeliveryRouter>,
        presence: Arc<PresenceTracker>,
        store: Arc<dyn HistoryStore>,
        metrics: Arc<HubMetrics>,
    ) -> Self {
        Self {
            config,
            registry,
            router,
            presence,
            store,
            metrics,
            phases: DashMap::new(),
            backfills: DashMap::new(),
            tasks: TaskTracker::new(),
            shutdown: CancellationToken::new(),
        }
    }

    /// Open a delivery channel for a session.
    ///
    /// With a cursor, history replay runs in the background and live events
    /// park behind the gate until it finishes. Without one, the session is
    /// live immediately. If the user is at their channel cap, their oldest
    /// channel is evicted first.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn subscribe(
        self: &Arc<Self>,
        user_id: UserId,
        session_id: SessionId,
        last_seen: Option<EventCursor>,
    ) -> Arc<Channel> {
        let mut existing = self.registry.channels_for(&user_id);
        while existing.len() >= self.config.max_channels_per_user {
            let oldest = existing.remove(0);
            info!(
                user = %user_id,
                channel = %oldest.id(),
                "Channel cap reached; evicting oldest channel"
            );
            self.disconnect(&oldest.id());
        }

        let channel = Arc::new(Channel::new(
            user_id,
            session_id,
            self.config.channel_buffer_size,
        ));
        self.phases.insert(channel.id(), SessionPhase::Connecting);
        self.registry.register(Arc::clone(&channel));
        self.metrics.channel_opened();

        match last_seen {
            Some(cursor) => self.spawn_backfill(&channel, cursor),
            None => {
                channel.open_gate(&HashSet::new());
                self.advance_phase(&channel.id(), SessionPhase::Subscribed);
                self.push_presence_snapshot(&channel);
            }
        }
        self.spawn_heartbeat(&channel);

        info!(
            user = %user_id,
            session = %session_id,
            channel = %channel.id(),
            backfill = last_seen.is_some(),
            "Session subscribed"
        );
        channel
    }

    /// Tear a session down. Safe to call repeatedly and from racing paths.
    pub fn disconnect(&self, channel_id: &ChannelId) {
        if let Some((_, token)) = self.backfills.remove(channel_id) {
            token.cancel();
        }
        let Some(channel) = self.registry.unregister(channel_id) else {
            debug!(channel = %channel_id, "Disconnect for unknown channel ignored");
            return;
        };
        channel.close();
        self.phases.remove(channel_id);
        self.metrics.channel_closed();

        // Only announce absence when no other channel serves the same
        // session, so a reconnect racing the old teardown keeps its presence.
        let session_still_live = self
            .registry
            .channels_for(&channel.user_id())
            .iter()
            .any(|c| c.session_id() == channel.session_id());
        if !session_still_live {
            let absent = self
                .presence
                .release_session(channel.user_id(), channel.session_id());
            let outcome = self.router.broadcast(&OutboundEvent::presence(&absent));
            debug!(
                session = %channel.session_id(),
                reached = outcome.delivered(),
                "Broadcast session absence"
            );
        }

        info!(
            channel = %channel_id,
            user = %channel.user_id(),
            "Session disconnected"
        );
    }

    /// Current lifecycle phase of a channel, if it is still tracked.
    pub fn phase(&self, channel_id: &ChannelId) -> Option<SessionPhase> {
        self.phases.get(channel_id).map(|entry| *entry.value())
    }

    /// Close every session and wait for background tasks to stop.
    pub async fn shutdown(&self) {
        info!("Session manager shutting down");
        self.shutdown.cancel();
        for entry in self.backfills.iter() {
            entry.value().cancel();
        }
        self.backfills.clear();

        for channel in self.registry.all_channels() {
            self.registry.unregister(&channel.id());
            channel.close();
            self.metrics.channel_closed();
        }
        self.phases.clear();

        self.tasks.close();
        self.tasks.wait().await;
        info!("All session tasks stopped");
    }

    fn spawn_backfill(self: &Arc<Self>, channel: &Arc<Channel>, cursor: EventCursor) {
        let token = CancellationToken::new();
        self.backfills.insert(channel.id(), token.clone());

        let manager = Arc::clone(self);
        let channel = Arc::clone(channel);
        let store = Arc::clone(&self.store);
        let metrics = Arc::clone(&self.metrics);
        let deadline = Duration::from_secs(self.config.backfill_timeout_seconds);
        self.tasks.spawn(async move {
            let outcome = run_backfill(store, Arc::clone(&channel), cursor, deadline, token, metrics).await;
            manager.backfills.remove(&channel.id());
            match outcome {
                BackfillOutcome::Cancelled => {}
                BackfillOutcome::Completed(replayed)
                | BackfillOutcome::TimedOut(replayed)
                | BackfillOutcome::Failed(replayed) => {
                    channel.open_gate(&replayed);
                    manager.advance_phase(&channel.id(), SessionPhase::Subscribed);
                    manager.push_presence_snapshot(&channel);
                }
            }
        });
    }

    fn spawn_heartbeat(self: &Arc<Self>, channel: &Arc<Channel>) {
        let schedule = HeartbeatSchedule {
            interval: Duration::from_secs(self.config.ping_interval_seconds),
            timeout: Duration::from_secs(self.config.ping_timeout_seconds),
        };
        let manager = Arc::clone(self);
        let channel = Arc::clone(channel);
        let cancel = self.shutdown.clone();
        self.tasks.spawn(async move {
            if run_heartbeat(Arc::clone(&channel), schedule, cancel).await == HeartbeatEnd::TimedOut {
                warn!(
                    channel = %channel.id(),
                    user = %channel.user_id(),
                    "Heartbeat timed out; disconnecting session"
                );
                manager.disconnect(&channel.id());
            }
        });
    }

    fn advance_phase(&self, channel_id: &ChannelId, next: SessionPhase) {
        if let Some(mut entry) = self.phases.get_mut(channel_id) {
            let current = *entry.value();
            if current.can_transition_to(next) {
                debug!(channel = %channel_id, from = %current, to = %next, "Session phase change");
                *entry.value_mut() = next;
            } else {
                warn!(
                    channel = %channel_id,
                    from = %current,
                    to = %next,
                    "Ignoring invalid session phase transition"
                );
            }
        }
    }

    /// Seed a fresh session with everyone's current presence.
    fn push_presence_snapshot(&self, channel: &Channel) {
        for update in self.presence.snapshot() {
            if update.session_id == channel.session_id() {
                continue;
            }
            if channel.wants_presence(&update.user_id) {
                channel.push_live(OutboundEvent::presence(&update));
            }
        }
    }
}

impl std::fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionManager")
            .field("channels", &self.registry.channel_count())
            .field("active_backfills", &self.backfills.len())
            .finish()
    }
}

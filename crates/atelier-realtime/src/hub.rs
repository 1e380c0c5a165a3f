//! The collaboration hub facade.
//!
//! Ties the durable store, the user directory, and the delivery subsystems
//! together behind the operations the API layer calls. The ordering
//! contract lives here: nothing is pushed live until the store has
//! acknowledged the append, so a delivered event is always replayable.

use std::fmt;
use std::sync::Arc;

use tracing::{debug, error, info};

use atelier_core::config::HubConfig;
use atelier_core::error::AppError;
use atelier_core::result::AppResult;
use atelier_core::types::{ChannelId, NotificationId, SessionId, UserId};
use atelier_entity::chat::{ChatDraft, ChatMessage};
use atelier_entity::event::EventCursor;
use atelier_entity::notification::{Notification, NotificationDraft};
use atelier_entity::presence::PresenceUpdate;
use atelier_history::{HistoryStore, UserDirectory};

use crate::channel::{Channel, ChannelRegistry};
use crate::message::OutboundEvent;
use crate::metrics::{HubMetrics, MetricsSnapshot};
use crate::presence::PresenceTracker;
use crate::router::DeliveryRouter;
use crate::session::SessionManager;

pub struct CollabHub {
    registry: Arc<ChannelRegistry>,
    router: Arc<DeliveryRouter>,
    sessions: Arc<SessionManager>,
    presence: Arc<PresenceTracker>,
    metrics: Arc<HubMetrics>,
    store: Arc<dyn HistoryStore>,
    directory: Arc<dyn UserDirectory>,
}

impl CollabHub {
    pub fn new(
        config: HubConfig,
        store: Arc<dyn HistoryStore>,
        directory: Arc<dyn UserDirectory>,
    ) -> Self {
        let registry = Arc::new(ChannelRegistry::new());
        let metrics = Arc::new(HubMetrics::new());
        let presence = Arc::new(PresenceTracker::new());
        let router = Arc::new(DeliveryRouter::new(
            Arc::clone(&registry),
            Arc::clone(&metrics),
        ));
        let sessions = Arc::new(SessionManager::new(
            config,
            Arc::clone(&registry),
            Arc::clone(&router),
            Arc::clone(&presence),
            Arc::clone(&store),
            Arc::clone(&metrics),
        ));
        info!("Collaboration hub initialized");
        Self {
            registry,
            router,
            sessions,
            presence,
            metrics,
            store,
            directory,
        }
    }

    /// Open a delivery channel for a session, replaying history newer than
    /// `last_seen` before live events when a cursor is given.
    pub fn subscribe(
        &self,
        user_id: UserId,
        session_id: SessionId,
        last_seen: Option<EventCursor>,
    ) -> Arc<Channel> {
        self.sessions.subscribe(user_id, session_id, last_seen)
    }

    /// Tear down a session's channel. Idempotent.
    pub fn disconnect(&self, channel_id: &ChannelId) {
        self.sessions.disconnect(channel_id);
    }

    /// Persist and deliver a direct chat message.
    ///
    /// The append happens first; if it fails the recipient sees nothing and
    /// the caller gets the error. An offline recipient receives the message
    /// through backfill on their next subscribe.
    pub async fn send_chat(
        &self,
        sender_id: UserId,
        recipient_id: UserId,
        body: String,
    ) -> AppResult<ChatMessage> {
        if body.trim().is_empty() {
            return Err(AppError::validation("Chat message body must not be empty"));
        }
        if !self.directory.exists(recipient_id).await? {
            return Err(AppError::validation(format!(
                "Unknown recipient: {recipient_id}"
            )));
        }
        let sender_name = self
            .directory
            .find(sender_id)
            .await?
            .map(|user| user.display_name);

        let draft = ChatDraft {
            sender_id,
            recipient_id,
            body,
            sender_name,
        };
        let message = match self.store.append_chat(draft).await {
            Ok(message) => message,
            Err(err) => {
                self.metrics.append_failed();
                error!(
                    sender = %sender_id,
                    recipient = %recipient_id,
                    error = %err,
                    "Chat append failed; nothing was delivered"
                );
                return Err(err);
            }
        };

        let outcome = self
            .router
            .deliver_to_user(&recipient_id, &OutboundEvent::chat(&message));
        if outcome.is_offline() {
            debug!(
                recipient = %recipient_id,
                message = %message.id,
                "Recipient offline; message awaits backfill"
            );
        }
        Ok(message)
    }

    /// Persist and deliver a notification to its owner.
    pub async fn notify(&self, draft: NotificationDraft) -> AppResult<Notification> {
        draft.validate_metadata()?;
        if !self.directory.exists(draft.user_id).await? {
            return Err(AppError::validation(format!(
                "Unknown notification recipient: {}",
                draft.user_id
            )));
        }

        let user_id = draft.user_id;
        let notification = match self.store.append_notification(draft).await {
            Ok(notification) => notification,
            Err(err) => {
                self.metrics.append_failed();
                error!(
                    user = %user_id,
                    error = %err,
                    "Notification append failed; nothing was delivered"
                );
                return Err(err);
            }
        };

        self.router
            .deliver_to_user(&user_id, &OutboundEvent::notification(&notification));
        Ok(notification)
    }

    /// Flip one notification's read flag and tell the user's other devices.
    pub async fn set_notification_read(
        &self,
        user_id: UserId,
        id: NotificationId,
        read: bool,
    ) -> AppResult<()> {
        let updated = self.store.set_read(user_id, id, read).await?;
        if !updated {
            return Err(AppError::not_found(format!("Notification not found: {id}")));
        }
        self.router
            .deliver_to_user(&user_id, &OutboundEvent::notification_read(id, read));
        Ok(())
    }

    /// Mark all of a user's notifications read. Other devices resync their
    /// unread counts on next query; no per-notification events are emitted.
    pub async fn mark_all_read(&self, user_id: UserId) -> AppResult<u64> {
        self.store.mark_all_read(user_id).await
    }

    /// Record a presence update and broadcast it if it is the newest for
    /// its `(user, session)`. Returns whether the update won.
    pub fn publish_presence(&self, update: PresenceUpdate) -> bool {
        if !self.presence.record(&update) {
            self.metrics.presence_stale();
            debug!(
                user = %update.user_id,
                session = %update.session_id,
                "Dropped stale presence update"
            );
            return false;
        }
        self.metrics.presence_update();
        self.router.broadcast(&OutboundEvent::presence(&update));
        true
    }

    /// Current presence of every tracked session.
    pub fn presence_snapshot(&self) -> Vec<PresenceUpdate> {
        self.presence.snapshot()
    }

    pub fn metrics_snapshot(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    pub fn open_channels(&self) -> usize {
        self.registry.channel_count()
    }

    pub fn connected_users(&self) -> usize {
        self.registry.user_count()
    }

    /// Close every session and stop background tasks.
    pub async fn shutdown(&self) {
        info!("Collaboration hub shutting down");
        self.sessions.shutdown().await;
        info!("Collaboration hub stopped");
    }
}

impl fmt::Debug for CollabHub {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CollabHub")
            .field("open_channels", &self.open_channels())
            .field("connected_users", &self.connected_users())
            .finish()
    }
}

//! The durable event store trait.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::stream::BoxStream;

use atelier_core::result::AppResult;
use atelier_core::types::{NotificationId, PageRequest, PageResponse, UserId};
use atelier_entity::chat::{ChatDraft, ChatMessage};
use atelier_entity::event::{EventCursor, EventKind, HistoryEvent};
use atelier_entity::notification::{Notification, NotificationDraft};

/// A finite, ordered stream of replayed events.
///
/// Streams are lazy and non-restartable. Both backends bound replay by the
/// configured backfill limit, so implementations may materialize the rows
/// up front.
pub type EventStream = BoxStream<'static, AppResult<HistoryEvent>>;

/// Durable storage for chat messages and notifications.
///
/// Append assigns the id and timestamp; the returned entity is exactly
/// what gets delivered live, so every consumer sees identical ids. All
/// read paths are point-in-time queries over what append has made durable.
#[async_trait]
pub trait HistoryStore: Send + Sync {
    /// Append a chat message, assigning its id and timestamp.
    async fn append_chat(&self, draft: ChatDraft) -> AppResult<ChatMessage>;

    /// Append a notification, assigning its id and timestamp.
    async fn append_notification(&self, draft: NotificationDraft) -> AppResult<Notification>;

    /// Stream events in a user's stream strictly after `after`, oldest
    /// first, restricted to `kinds` and capped at the backfill limit.
    ///
    /// The user's stream contains chat messages where the user is the
    /// recipient and notifications the user owns. `None` replays from the
    /// beginning of retained history.
    async fn events_after(
        &self,
        user_id: UserId,
        after: Option<EventCursor>,
        kinds: &[EventKind],
    ) -> AppResult<EventStream>;

    /// Page through the conversation between two users, newest first.
    /// The pair is unordered: either user may be passed first.
    async fn chat_history(
        &self,
        user_a: UserId,
        user_b: UserId,
        page: &PageRequest,
    ) -> AppResult<PageResponse<ChatMessage>>;

    /// Page through a user's notifications, newest first.
    async fn notifications_for(
        &self,
        user_id: UserId,
        page: &PageRequest,
    ) -> AppResult<PageResponse<Notification>>;

    /// Count a user's unread notifications.
    async fn unread_count(&self, user_id: UserId) -> AppResult<i64>;

    /// Set the read flag of one notification, in either direction.
    /// Returns `false` when the notification does not exist for the user.
    async fn set_read(&self, user_id: UserId, id: NotificationId, read: bool) -> AppResult<bool>;

    /// Mark all of a user's notifications read. Returns how many changed.
    async fn mark_all_read(&self, user_id: UserId) -> AppResult<u64>;

    /// Delete events older than the cutoff. Returns how many were removed.
    async fn prune_older_than(&self, cutoff: DateTime<Utc>) -> AppResult<u64>;

    /// Keep only the newest `keep` events per user stream of each kind.
    /// Returns how many were removed.
    async fn trim_per_user(&self, keep: u64) -> AppResult<u64>;

    /// Check backend connectivity.
    async fn health_check(&self) -> AppResult<bool>;
}

//! PostgreSQL history store implementation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::StreamExt;
use futures::stream;
use sqlx::PgPool;
use uuid::Uuid;

use atelier_core::error::{AppError, ErrorKind};
use atelier_core::result::AppResult;
use atelier_core::types::{NotificationId, PageRequest, PageResponse, UserId};
use atelier_entity::chat::{ChatDraft, ChatMessage};
use atelier_entity::event::{EventCursor, EventKind, HistoryEvent};
use atelier_entity::notification::{Notification, NotificationDraft};

use crate::store::{EventStream, HistoryStore};

/// PostgreSQL [`HistoryStore`].
///
/// Ids and timestamps are assigned in process (not by the database) so the
/// entity returned from append is byte-for-byte what later reads return.
#[derive(Debug, Clone)]
pub struct PgHistoryStore {
    pool: PgPool,
    backfill_limit: u64,
}

impl PgHistoryStore {
    /// Create a store over an existing pool.
    pub fn new(pool: PgPool, backfill_limit: u64) -> Self {
        Self {
            pool,
            backfill_limit,
        }
    }

    async fn chat_after(
        &self,
        user_id: UserId,
        after: Option<Uuid>,
    ) -> AppResult<Vec<ChatMessage>> {
        sqlx::query_as::<_, ChatMessage>(
            "SELECT * FROM chat_messages \
             WHERE recipient_id = $1 AND ($2::uuid IS NULL OR id > $2) \
             ORDER BY id ASC LIMIT $3",
        )
        .bind(user_id)
        .bind(after)
        .bind(self.backfill_limit as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to replay chat", e))
    }

    async fn notifications_after(
        &self,
        user_id: UserId,
        after: Option<Uuid>,
    ) -> AppResult<Vec<Notification>> {
        sqlx::query_as::<_, Notification>(
            "SELECT * FROM notifications \
             WHERE user_id = $1 AND ($2::uuid IS NULL OR id > $2) \
             ORDER BY id ASC LIMIT $3",
        )
        .bind(user_id)
        .bind(after)
        .bind(self.backfill_limit as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to replay notifications", e))
    }
}

#[async_trait]
impl HistoryStore for PgHistoryStore {
    async fn append_chat(&self, draft: ChatDraft) -> AppResult<ChatMessage> {
        let message = ChatMessage::from_draft(draft);
        sqlx::query_as::<_, ChatMessage>(
            "INSERT INTO chat_messages (id, sender_id, recipient_id, body, sender_name, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING *",
        )
        .bind(message.id)
        .bind(message.sender_id)
        .bind(message.recipient_id)
        .bind(&message.body)
        .bind(&message.sender_name)
        .bind(message.created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to append chat message", e))
    }

    async fn append_notification(&self, draft: NotificationDraft) -> AppResult<Notification> {
        let notification = Notification::from_draft(draft);
        sqlx::query_as::<_, Notification>(
            "INSERT INTO notifications (id, user_id, kind, severity, title, message, metadata, read, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) RETURNING *",
        )
        .bind(notification.id)
        .bind(notification.user_id)
        .bind(&notification.kind)
        .bind(notification.severity)
        .bind(&notification.title)
        .bind(&notification.message)
        .bind(&notification.metadata)
        .bind(notification.read)
        .bind(notification.created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to append notification", e)
        })
    }

    async fn events_after(
        &self,
        user_id: UserId,
        after: Option<EventCursor>,
        kinds: &[EventKind],
    ) -> AppResult<EventStream> {
        let after = after.map(EventCursor::into_uuid);

        // v7 ids compare bytewise in creation order, so a per-kind LIMIT
        // plus an in-memory merge preserves the global stream order.
        let mut events: Vec<HistoryEvent> = Vec::new();
        if kinds.contains(&EventKind::Chat) {
            events.extend(
                self.chat_after(user_id, after)
                    .await?
                    .into_iter()
                    .map(HistoryEvent::Chat),
            );
        }
        if kinds.contains(&EventKind::Notification) {
            events.extend(
                self.notifications_after(user_id, after)
                    .await?
                    .into_iter()
                    .map(HistoryEvent::Notification),
            );
        }

        events.sort_by_key(|e| e.id());
        events.truncate(self.backfill_limit as usize);
        Ok(stream::iter(events.into_iter().map(Ok)).boxed())
    }

    async fn chat_history(
        &self,
        user_a: UserId,
        user_b: UserId,
        page: &PageRequest,
    ) -> AppResult<PageResponse<ChatMessage>> {
        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM chat_messages \
             WHERE (sender_id = $1 AND recipient_id = $2) OR (sender_id = $2 AND recipient_id = $1)",
        )
        .bind(user_a)
        .bind(user_b)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to count chat history", e))?;

        let messages = sqlx::query_as::<_, ChatMessage>(
            "SELECT * FROM chat_messages \
             WHERE (sender_id = $1 AND recipient_id = $2) OR (sender_id = $2 AND recipient_id = $1) \
             ORDER BY id DESC LIMIT $3 OFFSET $4",
        )
        .bind(user_a)
        .bind(user_b)
        .bind(page.limit() as i64)
        .bind(page.offset() as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list chat history", e))?;

        Ok(PageResponse::new(
            messages,
            page.page,
            page.page_size,
            total as u64,
        ))
    }

    async fn notifications_for(
        &self,
        user_id: UserId,
        page: &PageRequest,
    ) -> AppResult<PageResponse<Notification>> {
        let total: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM notifications WHERE user_id = $1")
                .bind(user_id)
                .fetch_one(&self.pool)
                .await
                .map_err(|e| {
                    AppError::with_source(ErrorKind::Database, "Failed to count notifications", e)
                })?;

        let notifications = sqlx::query_as::<_, Notification>(
            "SELECT * FROM notifications WHERE user_id = $1 \
             ORDER BY id DESC LIMIT $2 OFFSET $3",
        )
        .bind(user_id)
        .bind(page.limit() as i64)
        .bind(page.offset() as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list notifications", e))?;

        Ok(PageResponse::new(
            notifications,
            page.page,
            page.page_size,
            total as u64,
        ))
    }

    async fn unread_count(&self, user_id: UserId) -> AppResult<i64> {
        sqlx::query_scalar("SELECT COUNT(*) FROM notifications WHERE user_id = $1 AND NOT read")
            .bind(user_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to count unread", e))
    }

    async fn set_read(&self, user_id: UserId, id: NotificationId, read: bool) -> AppResult<bool> {
        let result = sqlx::query(
            "UPDATE notifications SET read = $3 WHERE id = $1 AND user_id = $2",
        )
        .bind(id)
        .bind(user_id)
        .bind(read)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to set read flag", e))?;
        Ok(result.rows_affected() > 0)
    }

    async fn mark_all_read(&self, user_id: UserId) -> AppResult<u64> {
        let result =
            sqlx::query("UPDATE notifications SET read = TRUE WHERE user_id = $1 AND NOT read")
                .bind(user_id)
                .execute(&self.pool)
                .await
                .map_err(|e| {
                    AppError::with_source(ErrorKind::Database, "Failed to mark all read", e)
                })?;
        Ok(result.rows_affected())
    }

    async fn prune_older_than(&self, cutoff: DateTime<Utc>) -> AppResult<u64> {
        let chat = sqlx::query("DELETE FROM chat_messages WHERE created_at < $1")
            .bind(cutoff)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to prune chat messages", e)
            })?;

        let notifications = sqlx::query("DELETE FROM notifications WHERE created_at < $1")
            .bind(cutoff)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to prune notifications", e)
            })?;

        Ok(chat.rows_affected() + notifications.rows_affected())
    }

    async fn trim_per_user(&self, keep: u64) -> AppResult<u64> {
        let chat = sqlx::query(
            "DELETE FROM chat_messages WHERE id IN (\
                SELECT id FROM (\
                    SELECT id, ROW_NUMBER() OVER (PARTITION BY recipient_id ORDER BY id DESC) AS r_num \
                    FROM chat_messages\
                ) t WHERE t.r_num > $1\
             )",
        )
        .bind(keep as i64)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to trim chat messages", e))?;

        let notifications = sqlx::query(
            "DELETE FROM notifications WHERE id IN (\
                SELECT id FROM (\
                    SELECT id, ROW_NUMBER() OVER (PARTITION BY user_id ORDER BY id DESC) AS r_num \
                    FROM notifications\
                ) t WHERE t.r_num > $1\
             )",
        )
        .bind(keep as i64)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to trim notifications", e))?;

        Ok(chat.rows_affected() + notifications.rows_affected())
    }

    async fn health_check(&self) -> AppResult<bool> {
        sqlx::query_scalar::<_, i32>("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map(|v| v == 1)
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Health check failed", e))
    }
}

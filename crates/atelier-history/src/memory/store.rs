//! In-memory history store implementation.

use std::collections::HashMap;
use std::sync::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::StreamExt;
use futures::stream;

use atelier_core::error::AppError;
use atelier_core::result::AppResult;
use atelier_core::types::{NotificationId, PageRequest, PageResponse, UserId};
use atelier_entity::chat::{ChatDraft, ChatMessage};
use atelier_entity::event::{EventCursor, EventKind, HistoryEvent};
use atelier_entity::notification::{Notification, NotificationDraft};

use crate::store::{EventStream, HistoryStore};

/// In-memory [`HistoryStore`].
///
/// Events live in per-kind vectors kept in append order, which is id order
/// because appends run behind the write lock and event ids are
/// time-ordered.
pub struct MemoryHistoryStore {
    state: RwLock<MemoryState>,
    backfill_limit: u64,
    fail_appends: AtomicBool,
}

#[derive(Default)]
struct MemoryState {
    chat: Vec<ChatMessage>,
    notifications: Vec<Notification>,
}

impl MemoryHistoryStore {
    /// Create an empty store with the given backfill cap.
    pub fn new(backfill_limit: u64) -> Self {
        Self {
            state: RwLock::new(MemoryState::default()),
            backfill_limit,
            fail_appends: AtomicBool::new(false),
        }
    }

    /// Make every subsequent append fail with a database error. Test hook
    /// for exercising durability-failure paths.
    pub fn set_fail_appends(&self, fail: bool) {
        self.fail_appends.store(fail, Ordering::SeqCst);
    }

    fn check_append_allowed(&self) -> AppResult<()> {
        if self.fail_appends.load(Ordering::SeqCst) {
            return Err(AppError::database("Append rejected: store unavailable"));
        }
        Ok(())
    }

    fn lock_read(&self) -> std::sync::RwLockReadGuard<'_, MemoryState> {
        self.state.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn lock_write(&self) -> std::sync::RwLockWriteGuard<'_, MemoryState> {
        self.state.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl HistoryStore for MemoryHistoryStore {
    async fn append_chat(&self, draft: ChatDraft) -> AppResult<ChatMessage> {
        self.check_append_allowed()?;
        let message = ChatMessage::from_draft(draft);
        self.lock_write().chat.push(message.clone());
        Ok(message)
    }

    async fn append_notification(&self, draft: NotificationDraft) -> AppResult<Notification> {
        self.check_append_allowed()?;
        let notification = Notification::from_draft(draft);
        self.lock_write().notifications.push(notification.clone());
        Ok(notification)
    }

    async fn events_after(
        &self,
        user_id: UserId,
        after: Option<EventCursor>,
        kinds: &[EventKind],
    ) -> AppResult<EventStream> {
        let newer = |id: uuid::Uuid| after.map(|cursor| cursor.precedes(id)).unwrap_or(true);

        let mut events: Vec<HistoryEvent> = Vec::new();
        {
            let state = self.lock_read();
            if kinds.contains(&EventKind::Chat) {
                events.extend(
                    state
                        .chat
                        .iter()
                        .filter(|m| m.recipient_id == user_id && newer(m.id.into_uuid()))
                        .cloned()
                        .map(HistoryEvent::Chat),
                );
            }
            if kinds.contains(&EventKind::Notification) {
                events.extend(
                    state
                        .notifications
                        .iter()
                        .filter(|n| n.user_id == user_id && newer(n.id.into_uuid()))
                        .cloned()
                        .map(HistoryEvent::Notification),
                );
            }
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
        let state = self.lock_read();
        let mut matching: Vec<ChatMessage> = state
            .chat
            .iter()
            .filter(|m| {
                (m.sender_id == user_a && m.recipient_id == user_b)
                    || (m.sender_id == user_b && m.recipient_id == user_a)
            })
            .cloned()
            .collect();
        drop(state);

        matching.sort_by_key(|m| std::cmp::Reverse(m.id));
        let total = matching.len() as u64;
        let items: Vec<ChatMessage> = matching
            .into_iter()
            .skip(page.offset() as usize)
            .take(page.limit() as usize)
            .collect();
        Ok(PageResponse::new(items, page.page, page.page_size, total))
    }

    async fn notifications_for(
        &self,
        user_id: UserId,
        page: &PageRequest,
    ) -> AppResult<PageResponse<Notification>> {
        let state = self.lock_read();
        let mut matching: Vec<Notification> = state
            .notifications
            .iter()
            .filter(|n| n.user_id == user_id)
            .cloned()
            .collect();
        drop(state);

        matching.sort_by_key(|n| std::cmp::Reverse(n.id));
        let total = matching.len() as u64;
        let items: Vec<Notification> = matching
            .into_iter()
            .skip(page.offset() as usize)
            .take(page.limit() as usize)
            .collect();
        Ok(PageResponse::new(items, page.page, page.page_size, total))
    }

    async fn unread_count(&self, user_id: UserId) -> AppResult<i64> {
        let state = self.lock_read();
        Ok(state
            .notifications
            .iter()
            .filter(|n| n.user_id == user_id && n.is_unread())
            .count() as i64)
    }

    async fn set_read(&self, user_id: UserId, id: NotificationId, read: bool) -> AppResult<bool> {
        let mut state = self.lock_write();
        match state
            .notifications
            .iter_mut()
            .find(|n| n.id == id && n.user_id == user_id)
        {
            Some(notification) => {
                notification.read = read;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn mark_all_read(&self, user_id: UserId) -> AppResult<u64> {
        let mut state = self.lock_write();
        let mut changed = 0u64;
        for notification in state
            .notifications
            .iter_mut()
            .filter(|n| n.user_id == user_id && n.is_unread())
        {
            notification.read = true;
            changed += 1;
        }
        Ok(changed)
    }

    async fn prune_older_than(&self, cutoff: DateTime<Utc>) -> AppResult<u64> {
        let mut state = self.lock_write();
        let before = (state.chat.len() + state.notifications.len()) as u64;
        state.chat.retain(|m| m.created_at >= cutoff);
        state.notifications.retain(|n| n.created_at >= cutoff);
        let after = (state.chat.len() + state.notifications.len()) as u64;
        Ok(before - after)
    }

    async fn trim_per_user(&self, keep: u64) -> AppResult<u64> {
        let mut state = self.lock_write();
        let removed_chat = trim_stream(&mut state.chat, keep, |m| m.recipient_id);
        let removed_notifs = trim_stream(&mut state.notifications, keep, |n| n.user_id);
        Ok(removed_chat + removed_notifs)
    }

    async fn health_check(&self) -> AppResult<bool> {
        Ok(true)
    }
}

/// Drop the oldest entries of each user's stream beyond `keep`.
///
/// `items` is ascending by id, so retention walks oldest-first and removes
/// entries while a stream is still over its budget.
fn trim_stream<T>(items: &mut Vec<T>, keep: u64, stream_of: impl Fn(&T) -> UserId) -> u64 {
    let mut remaining: HashMap<UserId, u64> = HashMap::new();
    for item in items.iter() {
        *remaining.entry(stream_of(item)).or_insert(0) += 1;
    }

    let before = items.len() as u64;
    items.retain(|item| match remaining.get_mut(&stream_of(item)) {
        Some(count) if *count > keep => {
            *count -= 1;
            false
        }
        _ => true,
    });
    before - items.len() as u64
}

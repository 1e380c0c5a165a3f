//! In-memory user directory implementation.

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;

use atelier_core::result::AppResult;
use atelier_core::types::UserId;
use atelier_entity::user::User;

use crate::directory::UserDirectory;

/// In-memory [`UserDirectory`] backed by a concurrent map.
#[derive(Default)]
pub struct MemoryUserDirectory {
    users: DashMap<UserId, User>,
}

impl MemoryUserDirectory {
    /// Create an empty directory.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserDirectory for MemoryUserDirectory {
    async fn find(&self, id: UserId) -> AppResult<Option<User>> {
        Ok(self.users.get(&id).map(|entry| entry.value().clone()))
    }

    async fn exists(&self, id: UserId) -> AppResult<bool> {
        Ok(self.users.contains_key(&id))
    }

    async fn upsert(&self, mut user: User) -> AppResult<User> {
        if let Some(existing) = self.users.get(&user.id) {
            user.created_at = existing.created_at;
        }
        user.updated_at = Utc::now();
        self.users.insert(user.id, user.clone());
        Ok(user)
    }
}

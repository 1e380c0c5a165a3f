//! User directory lookup trait.

use async_trait::async_trait;

use atelier_core::result::AppResult;
use atelier_core::types::UserId;
use atelier_entity::user::User;

/// Lookup of users known to the hub.
///
/// Accounts are owned by the upstream identity service; the directory is
/// the hub's synchronized copy, fed by upsert. The hub consults it to
/// validate recipients and snapshot display names.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Find a user by id.
    async fn find(&self, id: UserId) -> AppResult<Option<User>>;

    /// Check whether a user exists.
    async fn exists(&self, id: UserId) -> AppResult<bool> {
        Ok(self.find(id).await?.is_some())
    }

    /// Insert or update a directory entry. Returns the stored entry.
    async fn upsert(&self, user: User) -> AppResult<User>;
}

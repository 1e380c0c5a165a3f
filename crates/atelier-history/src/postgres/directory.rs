//! PostgreSQL user directory implementation.

use async_trait::async_trait;
use sqlx::PgPool;

use atelier_core::error::{AppError, ErrorKind};
use atelier_core::result::AppResult;
use atelier_core::types::UserId;
use atelier_entity::user::User;

use crate::directory::UserDirectory;

/// PostgreSQL [`UserDirectory`] over the `hub_users` table.
#[derive(Debug, Clone)]
pub struct PgUserDirectory {
    pool: PgPool,
}

impl PgUserDirectory {
    /// Create a directory over an existing pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserDirectory for PgUserDirectory {
    async fn find(&self, id: UserId) -> AppResult<Option<User>> {
        sqlx::query_as::<_, User>("SELECT * FROM hub_users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find user", e))
    }

    async fn exists(&self, id: UserId) -> AppResult<bool> {
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM hub_users WHERE id = $1)")
            .bind(id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to check user existence", e)
            })
    }

    async fn upsert(&self, user: User) -> AppResult<User> {
        sqlx::query_as::<_, User>(
            "INSERT INTO hub_users (id, display_name, color, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, NOW()) \
             ON CONFLICT (id) DO UPDATE SET display_name = $2, color = $3, updated_at = NOW() \
             RETURNING *",
        )
        .bind(user.id)
        .bind(&user.display_name)
        .bind(&user.color)
        .bind(user.created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to upsert user", e))
    }
}

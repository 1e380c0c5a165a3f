//! Applies the bundled sqlx migrations at startup.

use sqlx::PgPool;
use tracing::info;

use atelier_core::error::{AppError, ErrorKind};
use atelier_core::result::AppResult;

/// Bring the schema up to date. Safe on every boot; migrations already
/// recorded in `_sqlx_migrations` are skipped.
pub async fn run_migrations(pool: &PgPool) -> AppResult<()> {
    let migrator = sqlx::migrate!("../../migrations");
    info!(
        bundled = migrator.migrations.len(),
        "Applying schema migrations"
    );

    migrator.run(pool).await.map_err(|e| {
        AppError::with_source(ErrorKind::Database, format!("Migration failed: {e}"), e)
    })?;

    info!("Schema is up to date");
    Ok(())
}

//! Atelier Hub Server — real-time collaboration backend
//!
//! Wires the history backend, the hub engine, and the HTTP surface
//! together, then runs until a shutdown signal arrives.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing_subscriber::{EnvFilter, fmt};

use atelier_core::config::AppConfig;
use atelier_core::error::AppError;
use atelier_history::HistoryBackend;
use atelier_realtime::CollabHub;

#[tokio::main]
async fn main() {
    let config = match load_configuration() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(config).await {
        tracing::error!("Server error: {e}");
        std::process::exit(1);
    }
}

/// Read the merged configuration for the `ATELIER_ENV` environment.
fn load_configuration() -> Result<AppConfig, AppError> {
    let env = std::env::var("ATELIER_ENV").unwrap_or_else(|_| "development".to_string());
    AppConfig::load(&env)
}

/// Install the tracing subscriber per the `[logging]` section.
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    if config.logging.is_json() {
        fmt()
            .json()
            .with_env_filter(filter)
            .with_target(true)
            .with_thread_ids(true)
            .init();
    } else {
        fmt().pretty().with_env_filter(filter).with_target(true).init();
    }
}

/// Boot, serve, and drain.
async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!("Starting Atelier hub v{}", env!("CARGO_PKG_VERSION"));

    // ── Step 1: History backend + migrations ─────────────────────
    tracing::info!("Connecting history backend ({})...", config.history.backend);
    let backend = HistoryBackend::connect(&config.history, &config.database).await?;

    if let Some(pool) = backend.pool() {
        atelier_history::migration::run_migrations(pool.pool()).await?;
    }

    // ── Step 2: Collaboration hub ────────────────────────────────
    let hub = Arc::new(CollabHub::new(
        config.hub.clone(),
        backend.store(),
        backend.directory(),
    ));

    // ── Step 3: Retention sweep ──────────────────────────────────
    let retention_cancel = CancellationToken::new();
    let retention_handle = atelier_history::retention::spawn_retention_loop(
        backend.store(),
        config.history.clone(),
        retention_cancel.clone(),
    );

    // ── Step 4: HTTP server ──────────────────────────────────────
    let state = atelier_api::AppState {
        config: Arc::new(config),
        hub: Arc::clone(&hub),
        store: backend.store(),
        directory: backend.directory(),
    };

    atelier_api::run_server(state, async {
        shutdown_signal().await;
        tracing::info!("Shutdown signal received, draining...");
    })
    .await?;

    // ── Step 5: Drain ────────────────────────────────────────────
    hub.shutdown().await;

    retention_cancel.cancel();
    let _ = retention_handle.await;

    backend.close().await;

    tracing::info!("Atelier hub shut down gracefully");
    Ok(())
}

/// Completes on Ctrl+C or, on unix, SIGTERM.
async fn shutdown_signal() {
    let interrupt = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = interrupt => {},
        _ = terminate => {},
    }
}

//! HTTP server lifecycle — bind, serve, drain.

use std::future::Future;

use tokio::net::TcpListener;
use tracing::info;

use atelier_core::error::AppError;

use crate::router::build_router;
use crate::state::AppState;

/// Serve the API until `shutdown` resolves.
///
/// In-flight requests are drained before this returns. WebSocket
/// connections are torn down separately through
/// [`CollabHub::shutdown`](atelier_realtime::CollabHub::shutdown).
pub async fn run_server(
    state: AppState,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> Result<(), AppError> {
    let addr = format!(
        "{}:{}",
        state.config.server.host, state.config.server.port
    );
    let app = build_router(state);

    let listener = TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind {addr}: {e}")))?;

    info!("Atelier hub listening on {addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|e| AppError::internal(format!("Server error: {e}")))?;

    Ok(())
}

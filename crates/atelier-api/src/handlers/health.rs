//! Liveness and readiness probes.

use axum::Json;
use axum::extract::State;

use crate::dto::response::{ApiResponse, DetailedHealthResponse, HealthResponse};
use crate::state::AppState;

/// GET /api/health — process is up
pub async fn health() -> Json<ApiResponse<HealthResponse>> {
    Json(ApiResponse::ok(HealthResponse {
        status: "ok".into(),
        version: env!("CARGO_PKG_VERSION").into(),
    }))
}

/// GET /api/health/detailed — store reachability plus hub counters
pub async fn health_detailed(
    State(state): State<AppState>,
) -> Json<ApiResponse<DetailedHealthResponse>> {
    let store_up = matches!(state.store.health_check().await, Ok(true));

    Json(ApiResponse::ok(DetailedHealthResponse {
        status: if store_up { "ok" } else { "degraded" }.to_string(),
        database: if store_up { "connected" } else { "unavailable" }.to_string(),
        open_channels: state.hub.open_channels(),
        connected_users: state.hub.connected_users(),
        metrics: state.hub.metrics_snapshot(),
    }))
}

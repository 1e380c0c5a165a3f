//! Presence handlers.

use axum::Json;
use axum::extract::State;

use atelier_realtime::message::PresencePayload;

use crate::dto::response::ApiResponse;
use crate::state::AppState;

/// GET /api/presence
///
/// The current cursor position of every live session, for rendering the
/// canvas before the WebSocket snapshot arrives.
pub async fn presence_snapshot(
    State(state): State<AppState>,
) -> Json<ApiResponse<Vec<PresencePayload>>> {
    let snapshot = state
        .hub
        .presence_snapshot()
        .iter()
        .map(PresencePayload::from)
        .collect();
    Json(ApiResponse::ok(snapshot))
}

//! Notification endpoints: listing, creation, and read state.

use axum::Json;
use axum::extract::{Path, Query, State};
use validator::Validate;

use atelier_core::types::NotificationId;
use atelier_entity::notification::NotificationDraft;
use atelier_realtime::message::NotificationPayload;

use crate::dto::request::{CreateNotificationRequest, SetReadRequest};
use crate::dto::response::{ApiResponse, CountResponse, MarkedResponse, PaginatedResponse};
use crate::error::ApiError;
use crate::extractors::{Identity, PaginationParams};
use crate::state::AppState;

/// GET /api/notifications
pub async fn list_notifications(
    State(state): State<AppState>,
    identity: Identity,
    Query(params): Query<PaginationParams>,
) -> Result<Json<ApiResponse<PaginatedResponse<NotificationPayload>>>, ApiError> {
    let page = state
        .store
        .notifications_for(identity.user_id, &params.into_page_request())
        .await?;
    let page = page.map(|notification| NotificationPayload::from(&notification));
    Ok(Json(ApiResponse::ok(PaginatedResponse::from_page(page))))
}

/// POST /api/notifications
///
/// Called by backend services announcing finished jobs, mentions, and the
/// like, so no caller identity is required.
pub async fn create_notification(
    State(state): State<AppState>,
    Json(req): Json<CreateNotificationRequest>,
) -> Result<Json<ApiResponse<NotificationPayload>>, ApiError> {
    req.validate()?;
    let draft = NotificationDraft {
        user_id: req.user_id,
        kind: req.kind,
        severity: req.severity,
        title: req.title,
        message: req.message,
        metadata: req.metadata,
    };
    let notification = state.hub.notify(draft).await?;
    Ok(Json(ApiResponse::ok(NotificationPayload::from(
        &notification,
    ))))
}

/// GET /api/notifications/unread-count
pub async fn unread_count(
    State(state): State<AppState>,
    identity: Identity,
) -> Result<Json<ApiResponse<CountResponse>>, ApiError> {
    let count = state.store.unread_count(identity.user_id).await?;
    Ok(Json(ApiResponse::ok(CountResponse { count })))
}

/// PUT /api/notifications/{id}/read
pub async fn set_read(
    State(state): State<AppState>,
    identity: Identity,
    Path(id): Path<NotificationId>,
    Json(req): Json<SetReadRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    state
        .hub
        .set_notification_read(identity.user_id, id, req.read)
        .await?;
    Ok(Json(
        serde_json::json!({ "success": true, "data": { "read": req.read } }),
    ))
}

/// PUT /api/notifications/read-all
pub async fn mark_all_read(
    State(state): State<AppState>,
    identity: Identity,
) -> Result<Json<ApiResponse<MarkedResponse>>, ApiError> {
    let marked = state.hub.mark_all_read(identity.user_id).await?;
    Ok(Json(ApiResponse::ok(MarkedResponse { marked })))
}

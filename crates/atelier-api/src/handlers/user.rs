//! User directory handlers.

use axum::Json;
use axum::extract::{Path, State};
use validator::Validate;

use atelier_core::error::AppError;
use atelier_core::types::UserId;
use atelier_entity::user::User;

use crate::dto::request::UpsertUserRequest;
use crate::dto::response::{ApiResponse, UserResponse};
use crate::error::ApiError;
use crate::state::AppState;

/// PUT /api/users
///
/// Synchronizes a directory entry from the upstream identity service.
pub async fn upsert_user(
    State(state): State<AppState>,
    Json(req): Json<UpsertUserRequest>,
) -> Result<Json<ApiResponse<UserResponse>>, ApiError> {
    req.validate()?;
    let stored = state
        .directory
        .upsert(User::new(req.id, req.display_name, req.color))
        .await?;
    Ok(Json(ApiResponse::ok(stored.into())))
}

/// GET /api/users/{id}
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<UserId>,
) -> Result<Json<ApiResponse<UserResponse>>, ApiError> {
    let user = state
        .directory
        .find(id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Unknown user: {id}")))?;
    Ok(Json(ApiResponse::ok(user.into())))
}

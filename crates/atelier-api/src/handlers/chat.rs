//! Chat handlers.

use axum::Json;
use axum::extract::{Query, State};
use serde::Deserialize;
use validator::Validate;

use atelier_core::types::UserId;
use atelier_realtime::message::ChatMessagePayload;

use crate::dto::request::SendChatRequest;
use crate::dto::response::{ApiResponse, PaginatedResponse};
use crate::error::ApiError;
use crate::extractors::{Identity, PaginationParams};
use crate::state::AppState;

/// Query parameters for the chat history endpoint.
#[derive(Debug, Deserialize)]
pub struct ChatHistoryQuery {
    /// The other party of the conversation.
    pub with: UserId,
}

/// POST /api/chat/messages
pub async fn send_message(
    State(state): State<AppState>,
    identity: Identity,
    Json(req): Json<SendChatRequest>,
) -> Result<Json<ApiResponse<ChatMessagePayload>>, ApiError> {
    req.validate()?;
    let message = state
        .hub
        .send_chat(identity.user_id, req.to, req.message)
        .await?;
    Ok(Json(ApiResponse::ok(ChatMessagePayload::from(&message))))
}

/// GET /api/chat/history?with={user}
pub async fn chat_history(
    State(state): State<AppState>,
    identity: Identity,
    Query(query): Query<ChatHistoryQuery>,
    Query(params): Query<PaginationParams>,
) -> Result<Json<ApiResponse<PaginatedResponse<ChatMessagePayload>>>, ApiError> {
    let page = state
        .store
        .chat_history(identity.user_id, query.with, &params.into_page_request())
        .await?;
    let page = page.map(|message| ChatMessagePayload::from(&message));
    Ok(Json(ApiResponse::ok(PaginatedResponse::from_page(page))))
}

//! `Identity` extractor — reads the caller identity forwarded by the gateway.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use uuid::Uuid;

use atelier_core::error::AppError;
use atelier_core::types::{SessionId, UserId};

use crate::error::ApiError;
use crate::state::AppState;

/// The calling user, as asserted by the upstream gateway.
///
/// Authentication happens before requests reach the hub: the gateway
/// verifies the caller and injects `x-user-id` (and `x-session-id` when the
/// request originates from a modeling session). The hub trusts these
/// headers.
#[derive(Debug, Clone, Copy)]
pub struct Identity {
    /// Verified caller id from `x-user-id`.
    pub user_id: UserId,
    /// The modeling session the request came from, when one exists.
    pub session_id: Option<SessionId>,
}

impl FromRequestParts<AppState> for Identity {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let raw_user = parts
            .headers
            .get("x-user-id")
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| AppError::session("Missing x-user-id header"))?;

        let user_id = raw_user
            .parse::<Uuid>()
            .map(UserId::from_uuid)
            .map_err(|_| AppError::session(format!("Invalid x-user-id: '{raw_user}'")))?;

        let session_id = parts
            .headers
            .get("x-session-id")
            .and_then(|v| v.to_str().ok())
            .and_then(|raw| raw.parse::<Uuid>().ok())
            .map(SessionId::from_uuid);

        Ok(Self {
            user_id,
            session_id,
        })
    }
}

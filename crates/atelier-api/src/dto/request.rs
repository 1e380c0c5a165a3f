//! Inbound request bodies and their validation rules.

use serde::{Deserialize, Serialize};
use validator::Validate;

use atelier_core::types::UserId;
use atelier_entity::notification::Severity;

/// Send chat message request body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SendChatRequest {
    /// Recipient user id.
    pub to: UserId,
    /// Text to deliver.
    #[validate(length(min = 1, max = 4000, message = "Message must be 1-4000 characters"))]
    pub message: String,
}

/// Create notification request body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateNotificationRequest {
    /// Recipient user id.
    pub user_id: UserId,
    /// Free-form type tag, e.g. `"export.finished"`.
    #[serde(rename = "type")]
    #[validate(length(min = 1, max = 100, message = "Type must be 1-100 characters"))]
    pub kind: String,
    /// Severity level (default: info).
    #[serde(default)]
    pub severity: Severity,
    /// Short headline shown in notification lists.
    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    pub title: String,
    /// Longer body text, optional.
    #[serde(default)]
    #[validate(length(max = 2000, message = "Message must be at most 2000 characters"))]
    pub message: String,
    /// Opaque structured payload, passed through to clients unchanged.
    #[serde(default)]
    pub metadata: Option<serde_json::Value>,
}

/// Set notification read flag request body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetReadRequest {
    /// Desired read state.
    pub read: bool,
}

/// Upsert directory user request body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpsertUserRequest {
    /// Upstream user id.
    pub id: UserId,
    /// Name rendered to other collaborators.
    #[validate(length(min = 1, max = 100, message = "Display name must be 1-100 characters"))]
    pub display_name: String,
    /// Presence color as a hex string, e.g. `"#1c7ed6"`.
    #[validate(length(min = 4, max = 9, message = "Color must be a hex string like #1c7ed6"))]
    pub color: String,
}

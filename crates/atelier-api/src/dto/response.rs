//! Outbound JSON shapes.
//!
//! Chat messages, notifications, and presence reuse the realtime payload
//! structs so the REST and WebSocket surfaces agree on field names.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use atelier_core::types::{PageResponse, UserId};
use atelier_entity::user::User;
use atelier_realtime::MetricsSnapshot;

/// Envelope around every successful response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

/// Wire form of one result page.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginatedResponse<T: Serialize> {
    pub items: Vec<T>,
    pub page: u64,
    pub page_size: u64,
    pub total_items: u64,
    pub total_pages: u64,
}

impl<T: Serialize> PaginatedResponse<T> {
    /// Reshape a store page into the HTTP wire form.
    pub fn from_page(page: PageResponse<T>) -> Self {
        Self {
            items: page.items,
            page: page.page,
            page_size: page.page_size,
            total_items: page.total_items,
            total_pages: page.total_pages,
        }
    }
}

/// Directory record as the client sees it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: UserId,
    pub display_name: String,
    /// Presence cursor color, `#rrggbb`.
    pub color: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            display_name: user.display_name,
            color: user.color,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

/// Body of `GET /api/notifications/unread-count`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CountResponse {
    pub count: i64,
}

/// Body of `PUT /api/notifications/read-all`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarkedResponse {
    /// Rows flipped to read.
    pub marked: u64,
}

/// Body of the liveness probe.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Body of the detailed probe: store reachability plus hub counters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetailedHealthResponse {
    pub status: String,
    pub database: String,
    pub open_channels: usize,
    pub connected_users: usize,
    pub metrics: MetricsSnapshot,
}

//! # atelier-api
//!
//! HTTP API layer for the Atelier hub built on Axum.
//!
//! Provides the REST endpoints for chat, notifications, presence, and the
//! user directory, the WebSocket subscription upgrade, request extractors,
//! DTOs, and error mapping.

pub mod app;
pub mod dto;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use app::run_server;
pub use router::build_router;
pub use state::AppState;

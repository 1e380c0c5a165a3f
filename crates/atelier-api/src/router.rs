//! The HTTP surface: REST routes under `/api`, the WebSocket upgrade at
//! `/ws`, and the middleware stack around both.

use axum::http::{HeaderValue, Method};
use axum::routing::{get, post, put};
use axum::{Router, middleware as axum_middleware};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use atelier_core::config::server::CorsConfig;

use crate::handlers;
use crate::middleware;
use crate::state::AppState;

/// Assemble the router, one route group per domain, with tracing, CORS,
/// and access logging applied to everything including `/ws`.
pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .merge(chat_routes())
        .merge(notification_routes())
        .merge(presence_routes())
        .merge(user_routes())
        .merge(health_routes());

    let ws_routes = Router::new().route("/ws", get(handlers::ws::ws_upgrade));

    let cors = build_cors_layer(&state.config.server.cors);

    Router::new()
        .nest("/api", api_routes)
        .merge(ws_routes)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(axum_middleware::from_fn(
            middleware::logging::request_logging,
        ))
        .with_state(state)
}

/// Chat endpoints: send, conversation history
fn chat_routes() -> Router<AppState> {
    Router::new()
        .route("/chat/messages", post(handlers::chat::send_message))
        .route("/chat/history", get(handlers::chat::chat_history))
}

/// Notification endpoints: list, create, unread count, read flags
fn notification_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/notifications",
            get(handlers::notification::list_notifications)
                .post(handlers::notification::create_notification),
        )
        .route(
            "/notifications/unread-count",
            get(handlers::notification::unread_count),
        )
        .route(
            "/notifications/read-all",
            put(handlers::notification::mark_all_read),
        )
        .route(
            "/notifications/{id}/read",
            put(handlers::notification::set_read),
        )
}

/// Presence endpoints: snapshot
fn presence_routes() -> Router<AppState> {
    Router::new().route("/presence", get(handlers::presence::presence_snapshot))
}

/// User directory endpoints: sync, lookup
fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/users", put(handlers::user::upsert_user))
        .route("/users/{id}", get(handlers::user::get_user))
}

/// Probes
fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(handlers::health::health))
        .route("/health/detailed", get(handlers::health::health_detailed))
}

/// Translate the `[server.cors]` section into a tower layer.
fn build_cors_layer(config: &CorsConfig) -> CorsLayer {
    let mut layer = CorsLayer::new();

    if config.allowed_origins.iter().any(|origin| origin == "*") {
        layer = layer.allow_origin(Any);
    } else {
        let origins: Vec<HeaderValue> = config
            .allowed_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();
        layer = layer.allow_origin(origins);
    }

    let methods: Vec<Method> = config
        .allowed_methods
        .iter()
        .filter_map(|method| method.parse().ok())
        .collect();
    layer = layer.allow_methods(methods);

    if config.allowed_headers.iter().any(|header| header == "*") {
        layer = layer.allow_headers(Any);
    }

    layer.max_age(std::time::Duration::from_secs(config.max_age_seconds))
}

//! Test fixtures: an in-memory app, an HTTP driver, and WebSocket plumbing.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use futures::{SinkExt, StreamExt};
use serde_json::Value;
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message as WsMessage;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};
use tower::ServiceExt;
use uuid::Uuid;

use atelier_core::config::history::HistoryConfig;
use atelier_core::config::hub::HubConfig;
use atelier_core::config::logging::LoggingConfig;
use atelier_core::config::server::ServerConfig;
use atelier_core::config::{AppConfig, DatabaseConfig};
use atelier_core::types::{SessionId, UserId};
use atelier_entity::user::User;
use atelier_history::UserDirectory;
use atelier_history::memory::{MemoryHistoryStore, MemoryUserDirectory};
use atelier_realtime::CollabHub;

/// A connected WebSocket test client.
pub type WsClient = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Test application context backed by the in-memory history store.
pub struct TestApp {
    /// Router under test, driven through `oneshot`.
    pub router: Router,
    /// The hub, for direct publishing and channel inspection
    pub hub: Arc<CollabHub>,
    /// The backing store, exposing its fault-injection hook
    pub store: Arc<MemoryHistoryStore>,
    /// The user directory, for seeding directory entries
    pub directory: Arc<MemoryUserDirectory>,
}

impl TestApp {
    /// Stand up the full stack on the in-memory backend.
    pub fn new() -> Self {
        let config = test_config();

        let store = Arc::new(MemoryHistoryStore::new(config.history.backfill_limit));
        let directory = Arc::new(MemoryUserDirectory::new());
        let hub = Arc::new(CollabHub::new(
            config.hub.clone(),
            store.clone(),
            directory.clone(),
        ));

        let state = atelier_api::AppState {
            config: Arc::new(config),
            hub: Arc::clone(&hub),
            store: store.clone(),
            directory: directory.clone(),
        };
        let router = atelier_api::build_router(state);

        Self {
            router,
            hub,
            store,
            directory,
        }
    }

    /// Seed a directory user and return their id.
    pub async fn create_user(&self, display_name: &str) -> UserId {
        let id = UserId::new();
        self.directory
            .upsert(User::new(id, display_name, "#1c7ed6"))
            .await
            .expect("Failed to seed user");
        id
    }

    /// Drive one request through the router and parse the JSON reply.
    pub async fn request(
        &self,
        method: &str,
        path: &str,
        body: Option<Value>,
        user: Option<UserId>,
    ) -> TestResponse {
        let body_str = body
            .map(|b| serde_json::to_string(&b).expect("Failed to serialize body"))
            .unwrap_or_default();

        let mut req = Request::builder()
            .method(method)
            .uri(path)
            .header("Content-Type", "application/json");

        if let Some(user) = user {
            req = req.header("x-user-id", user.to_string());
        }

        let req = req
            .body(Body::from(body_str))
            .expect("Failed to build request");

        let response = self
            .router
            .clone()
            .oneshot(req)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let body_bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
            .await
            .expect("Failed to read body");

        let body: Value = serde_json::from_slice(&body_bytes).unwrap_or(Value::Null);

        TestResponse { status, body }
    }

    /// Serve the router on an OS-assigned port for WebSocket tests.
    pub async fn spawn_server(&self) -> SocketAddr {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind test listener");
        let addr = listener.local_addr().expect("Listener has no local addr");
        let router = self.router.clone();
        tokio::spawn(async move {
            axum::serve(listener, router).await.expect("Test server failed");
        });
        addr
    }
}

/// Status and parsed body of a driven request.
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
}

/// Configuration for tests: in-memory backend, default everything else.
pub fn test_config() -> AppConfig {
    AppConfig {
        server: ServerConfig::default(),
        database: DatabaseConfig {
            url: "postgres://unused-in-tests".to_string(),
            max_connections: 1,
            min_connections: 1,
            connect_timeout_seconds: 1,
            idle_timeout_seconds: 1,
        },
        history: HistoryConfig {
            backend: "memory".to_string(),
            ..HistoryConfig::default()
        },
        hub: HubConfig::default(),
        logging: LoggingConfig::default(),
    }
}

/// Open a WebSocket subscription for `user` under a fresh or given session.
pub async fn connect_ws(
    addr: SocketAddr,
    user: UserId,
    session: SessionId,
    cursor: Option<Uuid>,
) -> WsClient {
    let mut url = format!("ws://{addr}/ws?user={user}&session={session}");
    if let Some(cursor) = cursor {
        url.push_str(&format!("&cursor={cursor}"));
    }
    let (ws, _response) = tokio_tungstenite::connect_async(&url)
        .await
        .expect("WebSocket handshake failed");
    ws
}

/// Send one client frame.
pub async fn send_frame(ws: &mut WsClient, payload: Value) {
    send_raw(ws, payload.to_string()).await;
}

/// Send raw text over the socket, valid JSON or not.
pub async fn send_raw(ws: &mut WsClient, text: impl Into<String>) {
    ws.send(WsMessage::Text(text.into().into()))
        .await
        .expect("Failed to send frame");
}

/// Read the next event frame, skipping heartbeat pings.
///
/// Returns the full frame (`{"event": ..., "data": ...}`). Panics if no
/// frame arrives within five seconds.
pub async fn recv_frame(ws: &mut WsClient) -> Value {
    let next = async {
        loop {
            let message = ws
                .next()
                .await
                .expect("Socket closed while waiting for a frame")
                .expect("WebSocket read failed");
            let WsMessage::Text(text) = message else {
                continue;
            };
            let frame: Value =
                serde_json::from_str(text.as_str()).expect("Frame is not valid JSON");
            if frame["event"] == "ping" {
                continue;
            }
            return frame;
        }
    };
    tokio::time::timeout(Duration::from_secs(5), next)
        .await
        .expect("Timed out waiting for a frame")
}

/// Poll `condition` until it holds, failing the test after one second.
pub async fn wait_until(what: &str, mut condition: impl FnMut() -> bool) {
    for _ in 0..100 {
        if condition() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("Timed out waiting for {what}");
}

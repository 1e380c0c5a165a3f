//! Integration tests for the hub's HTTP and WebSocket surfaces.
//!
//! REST round-trips go through `tower::ServiceExt::oneshot` against the
//! in-memory backend; WebSocket tests serve the same router on a real
//! listener and connect with `tokio-tungstenite`.

mod chat_test;
mod helpers;
mod notification_test;
mod user_test;
mod ws_test;

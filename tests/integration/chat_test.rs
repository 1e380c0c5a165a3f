//! Integration tests for chat send and history endpoints.

use axum::http::StatusCode;
use serde_json::json;

use atelier_core::types::UserId;

use crate::helpers::TestApp;

#[tokio::test]
async fn test_send_message_returns_payload() {
    let app = TestApp::new();
    let alice = app.create_user("Alice").await;
    let bob = app.create_user("Bob").await;

    let response = app
        .request(
            "POST",
            "/api/chat/messages",
            Some(json!({ "to": bob, "message": "ready for review" })),
            Some(alice),
        )
        .await;

    assert_eq!(response.status, StatusCode::OK, "{:?}", response.body);
    assert_eq!(response.body["success"], true);

    let data = &response.body["data"];
    assert_eq!(data["from"], alice.to_string());
    assert_eq!(data["to"], bob.to_string());
    assert_eq!(data["message"], "ready for review");
    assert_eq!(data["senderName"], "Alice");
    assert!(data["id"].is_string());
    assert!(data["timestamp"].is_string());
}

#[tokio::test]
async fn test_send_to_unknown_recipient_rejected() {
    let app = TestApp::new();
    let alice = app.create_user("Alice").await;
    let nobody = UserId::new();

    let response = app
        .request(
            "POST",
            "/api/chat/messages",
            Some(json!({ "to": nobody, "message": "hello?" })),
            Some(alice),
        )
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["error"], "VALIDATION");
}

#[tokio::test]
async fn test_send_without_identity_rejected() {
    let app = TestApp::new();
    let bob = app.create_user("Bob").await;

    let response = app
        .request(
            "POST",
            "/api/chat/messages",
            Some(json!({ "to": bob, "message": "anonymous" })),
            None,
        )
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["error"], "SESSION");
}

#[tokio::test]
async fn test_blank_message_rejected() {
    let app = TestApp::new();
    let alice = app.create_user("Alice").await;
    let bob = app.create_user("Bob").await;

    let empty = app
        .request(
            "POST",
            "/api/chat/messages",
            Some(json!({ "to": bob, "message": "" })),
            Some(alice),
        )
        .await;
    assert_eq!(empty.status, StatusCode::BAD_REQUEST);
    assert_eq!(empty.body["error"], "VALIDATION");
    assert!(empty.body["details"].is_object());

    // Whitespace passes the length check but not the hub's trim check.
    let blank = app
        .request(
            "POST",
            "/api/chat/messages",
            Some(json!({ "to": bob, "message": "   " })),
            Some(alice),
        )
        .await;
    assert_eq!(blank.status, StatusCode::BAD_REQUEST);
    assert_eq!(blank.body["error"], "VALIDATION");
}

#[tokio::test]
async fn test_chat_history_pages_newest_first() {
    let app = TestApp::new();
    let alice = app.create_user("Alice").await;
    let bob = app.create_user("Bob").await;

    for (sender, recipient, text) in [
        (alice, bob, "m1"),
        (bob, alice, "m2"),
        (alice, bob, "m3"),
        (bob, alice, "m4"),
        (alice, bob, "m5"),
    ] {
        let response = app
            .request(
                "POST",
                "/api/chat/messages",
                Some(json!({ "to": recipient, "message": text })),
                Some(sender),
            )
            .await;
        assert_eq!(response.status, StatusCode::OK, "{:?}", response.body);
    }

    let first_page = app
        .request(
            "GET",
            &format!("/api/chat/history?with={bob}&page=1&page_size=2"),
            None,
            Some(alice),
        )
        .await;

    assert_eq!(first_page.status, StatusCode::OK);
    let data = &first_page.body["data"];
    assert_eq!(data["totalItems"], 5);
    assert_eq!(data["totalPages"], 3);
    assert_eq!(data["pageSize"], 2);
    assert_eq!(data["items"][0]["message"], "m5");
    assert_eq!(data["items"][1]["message"], "m4");

    let last_page = app
        .request(
            "GET",
            &format!("/api/chat/history?with={bob}&page=3&page_size=2"),
            None,
            Some(alice),
        )
        .await;
    assert_eq!(last_page.body["data"]["items"][0]["message"], "m1");
    assert_eq!(last_page.body["data"]["items"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_chat_history_is_pair_scoped() {
    let app = TestApp::new();
    let alice = app.create_user("Alice").await;
    let bob = app.create_user("Bob").await;
    let cara = app.create_user("Cara").await;

    app.request(
        "POST",
        "/api/chat/messages",
        Some(json!({ "to": bob, "message": "for bob" })),
        Some(alice),
    )
    .await;
    app.request(
        "POST",
        "/api/chat/messages",
        Some(json!({ "to": cara, "message": "for cara" })),
        Some(alice),
    )
    .await;

    let with_bob = app
        .request(
            "GET",
            &format!("/api/chat/history?with={bob}"),
            None,
            Some(alice),
        )
        .await;
    assert_eq!(with_bob.body["data"]["totalItems"], 1);
    assert_eq!(with_bob.body["data"]["items"][0]["message"], "for bob");

    // Both parties see the same conversation.
    let bobs_view = app
        .request(
            "GET",
            &format!("/api/chat/history?with={alice}"),
            None,
            Some(bob),
        )
        .await;
    assert_eq!(bobs_view.body["data"]["totalItems"], 1);
    assert_eq!(bobs_view.body["data"]["items"][0]["message"], "for bob");
}

#[tokio::test]
async fn test_append_failure_surfaces_and_stores_nothing() {
    let app = TestApp::new();
    let alice = app.create_user("Alice").await;
    let bob = app.create_user("Bob").await;

    app.store.set_fail_appends(true);
    let response = app
        .request(
            "POST",
            "/api/chat/messages",
            Some(json!({ "to": bob, "message": "lost" })),
            Some(alice),
        )
        .await;
    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(response.body["error"], "DATABASE");

    app.store.set_fail_appends(false);
    let history = app
        .request(
            "GET",
            &format!("/api/chat/history?with={bob}"),
            None,
            Some(alice),
        )
        .await;
    assert_eq!(history.body["data"]["totalItems"], 0);
}

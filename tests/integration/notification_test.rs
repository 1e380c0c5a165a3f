//! Integration tests for notification endpoints.

use axum::http::StatusCode;
use serde_json::json;

use atelier_core::types::{NotificationId, UserId};

use crate::helpers::TestApp;

#[tokio::test]
async fn test_create_and_list_notifications() {
    let app = TestApp::new();
    let bob = app.create_user("Bob").await;

    let created = app
        .request(
            "POST",
            "/api/notifications",
            Some(json!({
                "userId": bob,
                "type": "export.finished",
                "severity": "success",
                "title": "Export complete",
                "message": "scene.gltf is ready",
                "metadata": { "sceneId": "s-1" },
            })),
            None,
        )
        .await;

    assert_eq!(created.status, StatusCode::OK, "{:?}", created.body);
    let data = &created.body["data"];
    assert_eq!(data["type"], "export.finished");
    assert_eq!(data["severity"], "success");
    assert_eq!(data["read"], false);
    assert!(data["createdAt"].is_string());

    let listed = app
        .request("GET", "/api/notifications", None, Some(bob))
        .await;
    assert_eq!(listed.status, StatusCode::OK);
    let page = &listed.body["data"];
    assert_eq!(page["totalItems"], 1);
    assert_eq!(page["items"][0]["type"], "export.finished");
    assert_eq!(page["items"][0]["metadata"]["sceneId"], "s-1");
}

#[tokio::test]
async fn test_create_defaults_severity_and_message() {
    let app = TestApp::new();
    let bob = app.create_user("Bob").await;

    let created = app
        .request(
            "POST",
            "/api/notifications",
            Some(json!({
                "userId": bob,
                "type": "mention",
                "title": "Rin mentioned you",
            })),
            None,
        )
        .await;

    assert_eq!(created.status, StatusCode::OK, "{:?}", created.body);
    assert_eq!(created.body["data"]["severity"], "info");
    assert_eq!(created.body["data"]["message"], "");
    assert!(created.body["data"]["metadata"].is_null());
}

#[tokio::test]
async fn test_create_for_unknown_user_rejected() {
    let app = TestApp::new();
    let nobody = UserId::new();

    let response = app
        .request(
            "POST",
            "/api/notifications",
            Some(json!({
                "userId": nobody,
                "type": "mention",
                "title": "Hello",
            })),
            None,
        )
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["error"], "VALIDATION");
}

#[tokio::test]
async fn test_create_with_empty_title_rejected() {
    let app = TestApp::new();
    let bob = app.create_user("Bob").await;

    let response = app
        .request(
            "POST",
            "/api/notifications",
            Some(json!({
                "userId": bob,
                "type": "mention",
                "title": "",
            })),
            None,
        )
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["error"], "VALIDATION");
    assert!(response.body["details"].is_object());
}

#[tokio::test]
async fn test_oversized_metadata_rejected() {
    let app = TestApp::new();
    let bob = app.create_user("Bob").await;

    let response = app
        .request(
            "POST",
            "/api/notifications",
            Some(json!({
                "userId": bob,
                "type": "export.finished",
                "title": "Export complete",
                "metadata": { "blob": "x".repeat(9 * 1024) },
            })),
            None,
        )
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["error"], "VALIDATION");
}

#[tokio::test]
async fn test_unread_count_and_mark_all_read() {
    let app = TestApp::new();
    let bob = app.create_user("Bob").await;

    for i in 0..3 {
        app.request(
            "POST",
            "/api/notifications",
            Some(json!({
                "userId": bob,
                "type": "mention",
                "title": format!("Mention {i}"),
            })),
            None,
        )
        .await;
    }

    let count = app
        .request("GET", "/api/notifications/unread-count", None, Some(bob))
        .await;
    assert_eq!(count.body["data"]["count"], 3);

    let marked = app
        .request("PUT", "/api/notifications/read-all", None, Some(bob))
        .await;
    assert_eq!(marked.status, StatusCode::OK);
    assert_eq!(marked.body["data"]["marked"], 3);

    let count = app
        .request("GET", "/api/notifications/unread-count", None, Some(bob))
        .await;
    assert_eq!(count.body["data"]["count"], 0);

    // Marking again is a no-op.
    let marked = app
        .request("PUT", "/api/notifications/read-all", None, Some(bob))
        .await;
    assert_eq!(marked.body["data"]["marked"], 0);
}

#[tokio::test]
async fn test_set_read_toggles_both_directions() {
    let app = TestApp::new();
    let bob = app.create_user("Bob").await;

    let created = app
        .request(
            "POST",
            "/api/notifications",
            Some(json!({
                "userId": bob,
                "type": "mention",
                "title": "Rin mentioned you",
            })),
            None,
        )
        .await;
    let id = created.body["data"]["id"].as_str().unwrap().to_string();

    let read = app
        .request(
            "PUT",
            &format!("/api/notifications/{id}/read"),
            Some(json!({ "read": true })),
            Some(bob),
        )
        .await;
    assert_eq!(read.status, StatusCode::OK);
    assert_eq!(read.body["data"]["read"], true);

    let count = app
        .request("GET", "/api/notifications/unread-count", None, Some(bob))
        .await;
    assert_eq!(count.body["data"]["count"], 0);

    let unread = app
        .request(
            "PUT",
            &format!("/api/notifications/{id}/read"),
            Some(json!({ "read": false })),
            Some(bob),
        )
        .await;
    assert_eq!(unread.body["data"]["read"], false);

    let count = app
        .request("GET", "/api/notifications/unread-count", None, Some(bob))
        .await;
    assert_eq!(count.body["data"]["count"], 1);
}

#[tokio::test]
async fn test_set_read_unknown_notification_404() {
    let app = TestApp::new();
    let bob = app.create_user("Bob").await;
    let missing = NotificationId::new();

    let response = app
        .request(
            "PUT",
            &format!("/api/notifications/{missing}/read"),
            Some(json!({ "read": true })),
            Some(bob),
        )
        .await;

    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.body["error"], "NOT_FOUND");
}

#[tokio::test]
async fn test_set_read_scoped_to_owner() {
    let app = TestApp::new();
    let alice = app.create_user("Alice").await;
    let bob = app.create_user("Bob").await;

    let created = app
        .request(
            "POST",
            "/api/notifications",
            Some(json!({
                "userId": bob,
                "type": "mention",
                "title": "For Bob only",
            })),
            None,
        )
        .await;
    let id = created.body["data"]["id"].as_str().unwrap().to_string();

    // Another user cannot flip someone else's notification.
    let response = app
        .request(
            "PUT",
            &format!("/api/notifications/{id}/read"),
            Some(json!({ "read": true })),
            Some(alice),
        )
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);

    let count = app
        .request("GET", "/api/notifications/unread-count", None, Some(bob))
        .await;
    assert_eq!(count.body["data"]["count"], 1);
}

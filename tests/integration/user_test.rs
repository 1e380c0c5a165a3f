//! Integration tests for user directory endpoints.

use axum::http::StatusCode;
use serde_json::json;

use atelier_core::types::UserId;

use crate::helpers::TestApp;

#[tokio::test]
async fn test_upsert_then_get_user() {
    let app = TestApp::new();
    let id = UserId::new();

    let upserted = app
        .request(
            "PUT",
            "/api/users",
            Some(json!({
                "id": id,
                "displayName": "Mika",
                "color": "#e64980",
            })),
            None,
        )
        .await;
    assert_eq!(upserted.status, StatusCode::OK, "{:?}", upserted.body);
    assert_eq!(upserted.body["data"]["displayName"], "Mika");

    let fetched = app
        .request("GET", &format!("/api/users/{id}"), None, None)
        .await;
    assert_eq!(fetched.status, StatusCode::OK);
    assert_eq!(fetched.body["data"]["id"], id.to_string());
    assert_eq!(fetched.body["data"]["displayName"], "Mika");
    assert_eq!(fetched.body["data"]["color"], "#e64980");
}

#[tokio::test]
async fn test_upsert_overwrites_existing_entry() {
    let app = TestApp::new();
    let id = UserId::new();

    for name in ["Mika", "Mika S."] {
        let response = app
            .request(
                "PUT",
                "/api/users",
                Some(json!({
                    "id": id,
                    "displayName": name,
                    "color": "#e64980",
                })),
                None,
            )
            .await;
        assert_eq!(response.status, StatusCode::OK);
    }

    let fetched = app
        .request("GET", &format!("/api/users/{id}"), None, None)
        .await;
    assert_eq!(fetched.body["data"]["displayName"], "Mika S.");
}

#[tokio::test]
async fn test_get_unknown_user_404() {
    let app = TestApp::new();
    let missing = UserId::new();

    let response = app
        .request("GET", &format!("/api/users/{missing}"), None, None)
        .await;

    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.body["error"], "NOT_FOUND");
}

#[tokio::test]
async fn test_upsert_with_empty_display_name_rejected() {
    let app = TestApp::new();

    let response = app
        .request(
            "PUT",
            "/api/users",
            Some(json!({
                "id": UserId::new(),
                "displayName": "",
                "color": "#e64980",
            })),
            None,
        )
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["error"], "VALIDATION");
    assert!(response.body["details"].is_object());
}

//! Integration tests for WebSocket subscriptions and health endpoints.

use axum::http::StatusCode;
use serde_json::json;
use uuid::Uuid;

use atelier_core::types::{SessionId, UserId};
use tokio_tungstenite::tungstenite;

use crate::helpers::{TestApp, connect_ws, recv_frame, send_frame, send_raw, wait_until};

#[tokio::test]
async fn test_health_check() {
    let app = TestApp::new();

    let response = app.request("GET", "/api/health", None, None).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["data"]["status"], "ok");
    assert!(response.body["data"]["version"].is_string());
}

#[tokio::test]
async fn test_detailed_health_check() {
    let app = TestApp::new();

    let response = app.request("GET", "/api/health/detailed", None, None).await;

    assert_eq!(response.status, StatusCode::OK);
    let data = &response.body["data"];
    assert_eq!(data["status"], "ok");
    assert_eq!(data["database"], "connected");
    assert_eq!(data["openChannels"], 0);
    assert_eq!(data["connectedUsers"], 0);
    assert_eq!(data["metrics"]["channelsOpened"], 0);
}

#[tokio::test]
async fn test_ws_upgrade_for_unknown_user_rejected() {
    let app = TestApp::new();
    let addr = app.spawn_server().await;
    let url = format!(
        "ws://{addr}/ws?user={}&session={}",
        UserId::new(),
        SessionId::new()
    );

    match tokio_tungstenite::connect_async(&url).await {
        Err(tungstenite::Error::Http(response)) => {
            assert_eq!(response.status(), StatusCode::NOT_FOUND);
        }
        Ok(_) => panic!("Handshake for an unknown user should fail"),
        Err(other) => panic!("Expected an HTTP rejection, got: {other}"),
    }
}

#[tokio::test]
async fn test_live_chat_delivery() {
    let app = TestApp::new();
    let alice = app.create_user("Alice").await;
    let bob = app.create_user("Bob").await;
    let addr = app.spawn_server().await;

    let mut alice_ws = connect_ws(addr, alice, SessionId::new(), None).await;
    wait_until("alice's channel to open", || app.hub.open_channels() == 1).await;

    let sent = app
        .request(
            "POST",
            "/api/chat/messages",
            Some(json!({ "to": alice, "message": "are you on the scene?" })),
            Some(bob),
        )
        .await;
    assert_eq!(sent.status, StatusCode::OK, "{:?}", sent.body);

    let frame = recv_frame(&mut alice_ws).await;
    assert_eq!(frame["event"], "chatMessageAdded");
    assert_eq!(frame["data"]["from"], bob.to_string());
    assert_eq!(frame["data"]["message"], "are you on the scene?");
    assert_eq!(frame["data"]["senderName"], "Bob");
}

#[tokio::test]
async fn test_sender_devices_do_not_receive_own_messages() {
    let app = TestApp::new();
    let alice = app.create_user("Alice").await;
    let bob = app.create_user("Bob").await;
    let addr = app.spawn_server().await;

    let mut alice_ws = connect_ws(addr, alice, SessionId::new(), None).await;
    wait_until("alice's channel to open", || app.hub.open_channels() == 1).await;

    app.request(
        "POST",
        "/api/chat/messages",
        Some(json!({ "to": bob, "message": "from alice" })),
        Some(alice),
    )
    .await;
    app.request(
        "POST",
        "/api/chat/messages",
        Some(json!({ "to": alice, "message": "reply from bob" })),
        Some(bob),
    )
    .await;

    // Only the reply arrives; alice's own send went to bob alone.
    let frame = recv_frame(&mut alice_ws).await;
    assert_eq!(frame["event"], "chatMessageAdded");
    assert_eq!(frame["data"]["from"], bob.to_string());
    assert_eq!(frame["data"]["message"], "reply from bob");
}

#[tokio::test]
async fn test_reconnect_replays_missed_events() {
    let app = TestApp::new();
    let alice = app.create_user("Alice").await;
    let bob = app.create_user("Bob").await;
    let addr = app.spawn_server().await;

    let mut ids = Vec::new();
    for text in ["m1", "m2", "m3"] {
        let response = app
            .request(
                "POST",
                "/api/chat/messages",
                Some(json!({ "to": bob, "message": text })),
                Some(alice),
            )
            .await;
        ids.push(response.body["data"]["id"].as_str().unwrap().to_string());
    }

    // Bob reconnects having seen only m1.
    let cursor = Uuid::parse_str(&ids[0]).unwrap();
    let mut bob_ws = connect_ws(addr, bob, SessionId::new(), Some(cursor)).await;

    let replayed = recv_frame(&mut bob_ws).await;
    assert_eq!(replayed["event"], "chatMessageAdded");
    assert_eq!(replayed["data"]["id"], ids[1].as_str());
    assert_eq!(replayed["data"]["message"], "m2");

    let replayed = recv_frame(&mut bob_ws).await;
    assert_eq!(replayed["data"]["id"], ids[2].as_str());
    assert_eq!(replayed["data"]["message"], "m3");

    // Live events resume after the replay.
    let sent = app
        .request(
            "POST",
            "/api/chat/messages",
            Some(json!({ "to": bob, "message": "m4" })),
            Some(alice),
        )
        .await;
    let live = recv_frame(&mut bob_ws).await;
    assert_eq!(live["data"]["id"], sent.body["data"]["id"]);
    assert_eq!(live["data"]["message"], "m4");
}

#[tokio::test]
async fn test_notification_delivery_and_read_sync() {
    let app = TestApp::new();
    let bob = app.create_user("Bob").await;
    let addr = app.spawn_server().await;

    let mut bob_ws = connect_ws(addr, bob, SessionId::new(), None).await;
    wait_until("bob's channel to open", || app.hub.open_channels() == 1).await;

    app.request(
        "POST",
        "/api/notifications",
        Some(json!({
            "userId": bob,
            "type": "export.finished",
            "severity": "success",
            "title": "Export complete",
        })),
        None,
    )
    .await;

    let added = recv_frame(&mut bob_ws).await;
    assert_eq!(added["event"], "notificationAdded");
    assert_eq!(added["data"]["type"], "export.finished");
    let id = added["data"]["id"].as_str().unwrap().to_string();

    // Reading on another device pushes the flag change to this one.
    app.request(
        "PUT",
        &format!("/api/notifications/{id}/read"),
        Some(json!({ "read": true })),
        Some(bob),
    )
    .await;

    let updated = recv_frame(&mut bob_ws).await;
    assert_eq!(updated["event"], "notificationUpdated");
    assert_eq!(updated["data"]["id"], id.as_str());
    assert_eq!(updated["data"]["read"], true);
}

#[tokio::test]
async fn test_presence_roundtrip_and_rest_snapshot() {
    let app = TestApp::new();
    let alice = app.create_user("Alice").await;
    let bob = app.create_user("Bob").await;
    let addr = app.spawn_server().await;

    let mut bob_ws = connect_ws(addr, bob, SessionId::new(), None).await;
    let mut alice_ws = connect_ws(addr, alice, SessionId::new(), None).await;
    wait_until("both channels to open", || app.hub.open_channels() == 2).await;

    send_frame(
        &mut alice_ws,
        json!({ "type": "presence", "position": { "x": 12.5, "y": -3.0 } }),
    )
    .await;

    let frame = recv_frame(&mut bob_ws).await;
    assert_eq!(frame["event"], "presenceUpdated");
    assert_eq!(frame["data"]["userId"], alice.to_string());
    assert_eq!(frame["data"]["position"]["x"], 12.5);
    assert_eq!(frame["data"]["position"]["y"], -3.0);

    let snapshot = app.request("GET", "/api/presence", None, None).await;
    assert_eq!(snapshot.status, StatusCode::OK);
    let entries = snapshot.body["data"].as_array().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["userId"], alice.to_string());
}

#[tokio::test]
async fn test_disconnect_broadcasts_absence() {
    let app = TestApp::new();
    let alice = app.create_user("Alice").await;
    let bob = app.create_user("Bob").await;
    let addr = app.spawn_server().await;

    let mut bob_ws = connect_ws(addr, bob, SessionId::new(), None).await;
    let mut alice_ws = connect_ws(addr, alice, SessionId::new(), None).await;
    wait_until("both channels to open", || app.hub.open_channels() == 2).await;

    send_frame(
        &mut alice_ws,
        json!({ "type": "presence", "position": { "x": 3.0, "y": 4.0 } }),
    )
    .await;
    let present = recv_frame(&mut bob_ws).await;
    assert_eq!(present["data"]["userId"], alice.to_string());
    assert!(present["data"]["position"].is_object());

    alice_ws.close(None).await.unwrap();

    let absent = recv_frame(&mut bob_ws).await;
    assert_eq!(absent["event"], "presenceUpdated");
    assert_eq!(absent["data"]["userId"], alice.to_string());
    assert!(absent["data"]["position"].is_null());

    wait_until("alice's channel to close", || app.hub.open_channels() == 1).await;
    let snapshot = app.request("GET", "/api/presence", None, None).await;
    assert_eq!(snapshot.body["data"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_presence_filter_scopes_broadcasts() {
    let app = TestApp::new();
    let alice = app.create_user("Alice").await;
    let bob = app.create_user("Bob").await;
    let cara = app.create_user("Cara").await;
    let addr = app.spawn_server().await;

    let mut bob_ws = connect_ws(addr, bob, SessionId::new(), None).await;
    let mut alice_ws = connect_ws(addr, alice, SessionId::new(), None).await;
    let mut cara_ws = connect_ws(addr, cara, SessionId::new(), None).await;
    wait_until("all channels to open", || app.hub.open_channels() == 3).await;

    // Bob only wants Cara's cursor. The error reply to the garbage frame
    // confirms the server has processed the filter before we move on.
    send_frame(&mut bob_ws, json!({ "type": "presenceFilter", "userIds": [cara] })).await;
    send_raw(&mut bob_ws, "sync-marker").await;
    let marker = recv_frame(&mut bob_ws).await;
    assert_eq!(marker["event"], "error");

    // Alice's echo on her own socket proves the broadcast fanned out.
    send_frame(
        &mut alice_ws,
        json!({ "type": "presence", "position": { "x": 1.0, "y": 1.0 } }),
    )
    .await;
    let echo = recv_frame(&mut alice_ws).await;
    assert_eq!(echo["data"]["userId"], alice.to_string());

    send_frame(
        &mut cara_ws,
        json!({ "type": "presence", "position": { "x": 2.0, "y": 2.0 } }),
    )
    .await;

    // Bob's next frame skips Alice's update entirely.
    let frame = recv_frame(&mut bob_ws).await;
    assert_eq!(frame["event"], "presenceUpdated");
    assert_eq!(frame["data"]["userId"], cara.to_string());

    // Clearing the filter restores everyone.
    send_frame(&mut bob_ws, json!({ "type": "presenceFilter", "userIds": null })).await;
    send_raw(&mut bob_ws, "sync-marker").await;
    let marker = recv_frame(&mut bob_ws).await;
    assert_eq!(marker["event"], "error");

    send_frame(
        &mut alice_ws,
        json!({ "type": "presence", "position": { "x": 5.0, "y": 5.0 } }),
    )
    .await;
    let frame = recv_frame(&mut bob_ws).await;
    assert_eq!(frame["data"]["userId"], alice.to_string());
    assert_eq!(frame["data"]["position"]["x"], 5.0);
}

#[tokio::test]
async fn test_malformed_client_message_gets_error_frame() {
    let app = TestApp::new();
    let alice = app.create_user("Alice").await;
    let addr = app.spawn_server().await;

    let mut alice_ws = connect_ws(addr, alice, SessionId::new(), None).await;

    send_raw(&mut alice_ws, "{not json").await;

    let frame = recv_frame(&mut alice_ws).await;
    assert_eq!(frame["event"], "error");
    assert_eq!(frame["data"]["code"], "malformed_message");
}

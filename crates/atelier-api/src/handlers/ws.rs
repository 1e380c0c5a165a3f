//! WebSocket subscription handler.

use std::sync::Arc;

use axum::extract::ws::{Message, Utf8Bytes, WebSocket};
use axum::extract::{Query, State, WebSocketUpgrade};
use axum::response::Response;
use futures::{SinkExt, StreamExt};
use serde::Deserialize;
use tracing::{debug, info, warn};
use uuid::Uuid;

use atelier_core::error::AppError;
use atelier_core::types::{SessionId, UserId};
use atelier_entity::event::EventCursor;
use atelier_entity::presence::PresenceUpdate;
use atelier_realtime::channel::Channel;
use atelier_realtime::message::{InboundMessage, OutboundEvent};

use crate::error::ApiError;
use crate::state::AppState;

/// Query parameters for the WebSocket subscription.
#[derive(Debug, Deserialize)]
pub struct WsQuery {
    /// Subscribing user.
    pub user: UserId,
    /// Modeling session; one subscription per session.
    pub session: SessionId,
    /// Newest event id the client has seen, for reconnect backfill.
    pub cursor: Option<Uuid>,
}

/// GET /ws?user={id}&session={id}&cursor={event id} — WebSocket upgrade
pub async fn ws_upgrade(
    State(state): State<AppState>,
    ws: WebSocketUpgrade,
    Query(query): Query<WsQuery>,
) -> Result<Response, ApiError> {
    // Unknown users get a clean HTTP error instead of an
    // immediately-closed socket.
    if !state.directory.exists(query.user).await? {
        return Err(AppError::not_found(format!("Unknown user: {}", query.user)).into());
    }

    Ok(ws.on_upgrade(move |socket| handle_ws_connection(state, query, socket)))
}

/// Drives an established WebSocket connection until either side closes.
async fn handle_ws_connection(state: AppState, query: WsQuery, socket: WebSocket) {
    let (mut ws_tx, mut ws_rx) = socket.split();

    let cursor = query.cursor.map(EventCursor::new);
    let channel = state.hub.subscribe(query.user, query.session, cursor);
    let channel_id = channel.id();

    info!(
        channel_id = %channel_id,
        user_id = %query.user,
        session_id = %query.session,
        "WebSocket subscription established"
    );

    // Forward channel events to the socket
    let outbound = Arc::clone(&channel);
    let outbound_task = tokio::spawn(async move {
        while let Some(event) = outbound.recv().await {
            let text = match serde_json::to_string(&event) {
                Ok(text) => text,
                Err(error) => {
                    warn!(channel_id = %outbound.id(), %error, "Failed to encode frame");
                    continue;
                }
            };
            if ws_tx.send(Message::Text(Utf8Bytes::from(text))).await.is_err() {
                break;
            }
        }
    });

    // Drain client frames until the socket closes
    while let Some(result) = ws_rx.next().await {
        match result {
            Ok(Message::Text(text)) => handle_inbound(&state, &channel, text.as_str()),
            Ok(Message::Close(_)) => break,
            Ok(_) => {}
            Err(error) => {
                debug!(channel_id = %channel_id, %error, "WebSocket error");
                break;
            }
        }
    }

    outbound_task.abort();
    state.hub.disconnect(&channel_id);

    info!(
        channel_id = %channel_id,
        user_id = %query.user,
        "WebSocket subscription closed"
    );
}

/// Applies one client message to the subscription.
fn handle_inbound(state: &AppState, channel: &Arc<Channel>, raw: &str) {
    let parsed: InboundMessage = match serde_json::from_str(raw) {
        Ok(parsed) => parsed,
        Err(error) => {
            debug!(channel_id = %channel.id(), %error, "Malformed client message");
            channel.push_live(OutboundEvent::protocol_error(
                "malformed_message",
                "Could not parse message",
            ));
            return;
        }
    };

    match parsed {
        InboundMessage::Presence { position } => {
            let update = PresenceUpdate::new(channel.user_id(), channel.session_id(), position);
            state.hub.publish_presence(update);
        }
        InboundMessage::PresenceFilter { user_ids } => {
            channel.set_presence_filter(user_ids.map(|ids| ids.into_iter().collect()));
        }
        InboundMessage::Pong {} => channel.record_pong(),
    }
}

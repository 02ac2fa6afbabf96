//! WebSocket handler for voice sessions
//!
//! Each connection gets its own receive loop, so one session's responder or
//! synthesis work never blocks another session. Within a connection, messages
//! are handled strictly in arrival order.

use std::sync::Arc;

use axum::{
    extract::{
        ws::{Message, WebSocket},
        State, WebSocketUpgrade,
    },
    response::IntoResponse,
    routing::get,
    Router,
};
use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc;

use super::ApiState;
use crate::relay::{ClientMessage, OUTBOUND_BUFFER, ServerMessage};

/// Build the WebSocket router
pub fn router(state: Arc<ApiState>) -> Router {
    Router::new().route("/ws", get(ws_upgrade)).with_state(state)
}

/// Handle WebSocket upgrade request
async fn ws_upgrade(
    State(state): State<Arc<ApiState>>,
    ws: WebSocketUpgrade,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Drive one session's connection lifecycle
async fn handle_socket(socket: WebSocket, state: Arc<ApiState>) {
    let (mut sender, mut receiver) = socket.split();

    let (tx, mut rx) = mpsc::channel::<ServerMessage>(OUTBOUND_BUFFER);
    let session = state.relay.connect(tx).await;

    // Forward relay output to the wire
    let mut send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if let Ok(text) = serde_json::to_string(&msg) {
                if sender.send(Message::Text(text.into())).await.is_err() {
                    break;
                }
            }
        }
    });

    // Process inbound messages in arrival order
    let relay = Arc::clone(&state.relay);
    let recv_session = Arc::clone(&session);
    let mut recv_task = tokio::spawn(async move {
        while let Some(Ok(msg)) = receiver.next().await {
            match msg {
                Message::Text(text) => match serde_json::from_str::<ClientMessage>(&text) {
                    Ok(message) => {
                        if let Err(e) = relay.handle_message(&recv_session, message).await {
                            tracing::warn!(
                                session = %recv_session.id,
                                error = %e,
                                "dropping session, outbound channel closed"
                            );
                            break;
                        }
                    }
                    // Malformed input is logged and ignored; the session stays open
                    Err(e) => {
                        tracing::warn!(
                            session = %recv_session.id,
                            error = %e,
                            "malformed message, ignoring"
                        );
                    }
                },
                Message::Close(_) => {
                    tracing::debug!(session = %recv_session.id, "close frame received");
                    break;
                }
                Message::Ping(data) => {
                    tracing::trace!(len = data.len(), "transport ping");
                }
                _ => {}
            }
        }
    });

    tokio::select! {
        _ = &mut send_task => recv_task.abort(),
        _ = &mut recv_task => send_task.abort(),
    }

    state.relay.disconnect(&session).await;
}

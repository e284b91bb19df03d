//! Snapshot Greeks over WebSocket
//!
//! `GET /ws` upgrades to a WebSocket. Every text frame carries one snapshot
//! and is answered with exactly one text frame: the snapshot result or the
//! `{error}` envelope. Frames on one connection are handled one at a time, in
//! arrival order. Binary frames are read as (lossy) UTF-8 text. A close frame
//! completes the closing handshake and ends the connection.

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::IntoResponse,
    routing::get,
    Router,
};
use tracing::Instrument;
use uuid::Uuid;

use super::AppState;

/// Build the WebSocket routes
pub fn routes() -> Router<AppState> {
    Router::new().route("/ws", get(ws_handler))
}

/// GET /ws - WebSocket upgrade
async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Handle individual WebSocket connection
async fn handle_socket(mut socket: WebSocket, state: AppState) {
    let connection_id = Uuid::new_v4();
    tracing::info!(%connection_id, "WebSocket client connected");

    while let Some(incoming) = socket.recv().await {
        let raw = match incoming {
            Ok(Message::Text(text)) => text.as_str().to_owned(),
            Ok(Message::Binary(bytes)) => String::from_utf8_lossy(&bytes).into_owned(),
            // The next read sends the close reply and ends the stream
            Ok(Message::Close(_)) => continue,
            // Ping/pong are answered by axum
            Ok(_) => continue,
            Err(err) => {
                tracing::warn!(%connection_id, error = %err, "WebSocket receive failed");
                break;
            }
        };

        let reply = respond(&state, &raw).await;
        if socket.send(Message::Text(reply.into())).await.is_err() {
            break;
        }
    }

    tracing::info!(%connection_id, "WebSocket client disconnected");
}

/// Reply text for one inbound snapshot message
pub async fn respond(state: &AppState, raw: &str) -> String {
    let request_id = Uuid::new_v4();
    let span = tracing::info_span!("ws_message", %request_id);

    async {
        match state.process(raw).await {
            Ok(result) => match serde_json::to_string(&result) {
                Ok(text) => text,
                Err(err) => {
                    tracing::error!(error = %err, "Failed to encode result");
                    crate::error::ErrorBody {
                        error: err.to_string(),
                    }
                    .to_json()
                }
            },
            Err(err) => {
                err.log();
                err.body().to_json()
            }
        }
    }
    .instrument(span)
    .await
}

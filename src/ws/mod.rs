pub mod handlers;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Query, State,
    },
    response::IntoResponse,
};
use futures::{
    sink::SinkExt,
    stream::{SplitSink, StreamExt},
};
use serde::Deserialize;
use tokio::sync::broadcast::error::RecvError;

use crate::engine::EngineHandle;
use crate::protocol::{ClientMessage, ServerMessage};
use crate::types::Role;

#[derive(Debug, Deserialize)]
pub struct WsQuery {
    pub role: Option<String>,
    /// Admin passphrase, checked by the auth middleware for host connections
    pub key: Option<String>,
}

/// WebSocket upgrade handler
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    Query(params): Query<WsQuery>,
    State(engine): State<EngineHandle>,
) -> impl IntoResponse {
    let role = Role::from_query(params.role.as_deref());
    tracing::info!("WebSocket connection request: role={:?}", role);

    ws.on_upgrade(move |socket| handle_socket(socket, role, engine))
}

/// Serialize and send one frame. Returns false once the socket is gone.
async fn send_message(sender: &mut SplitSink<WebSocket, Message>, msg: &ServerMessage) -> bool {
    match serde_json::to_string(msg) {
        Ok(json) => sender.send(Message::Text(json.into())).await.is_ok(),
        Err(e) => {
            tracing::error!("Failed to serialize server message: {}", e);
            true
        }
    }
}

/// Full-state frame for a resynced observer. The question bank was already
/// sent with the first `init`.
fn resync_frame(init: ServerMessage) -> ServerMessage {
    match init {
        ServerMessage::Init { game_state, .. } => ServerMessage::GameStateUpdate { game_state },
        other => other,
    }
}

/// Handle individual WebSocket connection
async fn handle_socket(socket: WebSocket, role: Role, engine: EngineHandle) {
    let (mut sender, mut receiver) = socket.split();

    let Some(attachment) = engine.attach(role).await else {
        tracing::error!("Game engine unavailable, closing WebSocket");
        return;
    };
    let mut connection_id = attachment.id;
    let mut updates = attachment.updates;

    if !send_message(&mut sender, &attachment.init).await {
        tracing::error!("Failed to send init message");
        engine.detach(connection_id);
        return;
    }

    loop {
        tokio::select! {
            update = updates.recv() => {
                match update {
                    Ok(msg) => {
                        if !send_message(&mut sender, &msg).await {
                            break;
                        }
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::warn!(
                            "Connection {} lagged by {} messages, resending full state",
                            connection_id,
                            skipped
                        );
                        let Some(fresh) = engine.resync(connection_id.clone(), role).await else {
                            break;
                        };
                        connection_id = fresh.id;
                        updates = fresh.updates;
                        if !send_message(&mut sender, &resync_frame(fresh.init)).await {
                            break;
                        }
                    }
                    Err(RecvError::Closed) => break,
                }
            }

            ws_msg = receiver.next() => {
                match ws_msg {
                    Some(Ok(Message::Text(text))) => {
                        tracing::debug!("Received message: {}", text);

                        match serde_json::from_str::<ClientMessage>(&text) {
                            Ok(client_msg) => {
                                handlers::handle_message(client_msg, &role, &engine);
                            }
                            Err(e) => {
                                // Malformed input is dropped without a reply
                                tracing::warn!("Failed to parse client message: {}", e);
                            }
                        }
                    }
                    Some(Ok(Message::Close(_))) => {
                        tracing::info!("WebSocket closed");
                        break;
                    }
                    Some(Ok(Message::Ping(data))) => {
                        if sender.send(Message::Pong(data)).await.is_err() {
                            break;
                        }
                    }
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        tracing::error!("WebSocket error: {}", e);
                        break;
                    }
                    None => break,
                }
            }
        }
    }

    engine.detach(connection_id);
    tracing::info!("WebSocket connection closed for role: {:?}", role);
}

pub mod handlers;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::IntoResponse,
};
use futures::{
    sink::SinkExt,
    stream::{SplitSink, StreamExt},
};
use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;

use crate::protocol::{ClientMessage, ServerMessage};
use crate::state::AppState;

/// WebSocket upgrade handler
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

type WsSender = SplitSink<WebSocket, Message>;

/// Serialize and send one message; `false` once the peer is gone
async fn send_message(sender: &mut WsSender, msg: &ServerMessage) -> bool {
    match serde_json::to_string(msg) {
        Ok(json) => sender.send(Message::Text(json.into())).await.is_ok(),
        Err(e) => {
            tracing::error!("Failed to serialize {:?}: {}", msg, e);
            true
        }
    }
}

async fn send_all(sender: &mut WsSender, msgs: &[ServerMessage]) -> bool {
    for msg in msgs {
        if !send_message(sender, msg).await {
            return false;
        }
    }
    true
}

/// Handle individual WebSocket connection
async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let (mut sender, mut receiver) = socket.split();

    let mut session = state.register_session().await;
    let session_id = session.id.clone();

    if send_all(&mut sender, &session.initial).await {
        loop {
            tokio::select! {
                broadcast_msg = session.rx.recv() => {
                    let delivered = match broadcast_msg {
                        Ok(msg) => send_message(&mut sender, &msg).await,
                        Err(RecvError::Lagged(skipped)) => {
                            tracing::warn!("Session {} lagged by {} messages, resyncing", session_id, skipped);
                            let msgs = state.resync_session(&mut session).await;
                            send_all(&mut sender, &msgs).await
                        }
                        Err(RecvError::Closed) => false,
                    };
                    if !delivered {
                        break;
                    }
                }

                ws_msg = receiver.next() => {
                    match ws_msg {
                        Some(Ok(Message::Text(text))) => {
                            tracing::debug!("Received message from {}: {}", session_id, text);

                            let client_msg = match serde_json::from_str::<ClientMessage>(&text) {
                                Ok(msg) => msg,
                                Err(e) => {
                                    tracing::debug!("Ignoring malformed message: {}", e);
                                    continue;
                                }
                            };

                            if let Some(response) = handlers::handle_message(client_msg, &state).await {
                                if !send_message(&mut sender, &response).await {
                                    tracing::error!("Failed to send response to {}", session_id);
                                    break;
                                }
                            }
                        }
                        Some(Ok(Message::Close(_))) => {
                            tracing::info!("WebSocket closed by {}", session_id);
                            break;
                        }
                        Some(Ok(Message::Ping(data))) => {
                            if sender.send(Message::Pong(data)).await.is_err() {
                                break;
                            }
                        }
                        Some(Ok(_)) => {}
                        Some(Err(e)) => {
                            tracing::error!("WebSocket error on {}: {}", session_id, e);
                            break;
                        }
                        None => break,
                    }
                }
            }
        }
    } else {
        tracing::error!("Failed to send initial state to {}", session_id);
    }

    state.unregister_session(&session_id).await;
}

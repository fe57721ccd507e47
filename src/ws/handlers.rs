//! WebSocket message dispatch
//!
//! Decodes observer requests into store and recorder calls. Broadcasts go out
//! from the store itself; the returned message, if any, is for the requester
//! only. Requests with an unknown counter key or an out-of-range value are
//! dropped without a reply.

use crate::protocol::{ClientMessage, ServerMessage};
use crate::state::AppState;
use crate::types::CounterKey;
use std::sync::Arc;

pub const RECORD_STOPPED_MESSAGE: &str = "Recording stopped";

/// Handle client messages and return optional response
pub async fn handle_message(msg: ClientMessage, state: &Arc<AppState>) -> Option<ServerMessage> {
    match msg {
        ClientMessage::Increment(key) => {
            state.increment(parse_key(&key)?).await;
            None
        }

        ClientMessage::Decrement(key) => {
            state.decrement(parse_key(&key)?).await;
            None
        }

        ClientMessage::Reset(key) => {
            let key = parse_key(&key)?;
            tracing::info!("Counter {} reset", key);
            state.reset(key).await;
            None
        }

        ClientMessage::UpdateSelectedValue(value) => {
            if let Err(e) = state.set_selected_value(value).await {
                tracing::debug!("Ignoring selector update: {}", e);
            }
            None
        }

        ClientMessage::Record => handle_record(state).await,

        ClientMessage::RecordStop => {
            tracing::info!("Recording stopped by request");
            state.set_recording(false).await;
            Some(ServerMessage::RecordStopped {
                success: true,
                message: Some(RECORD_STOPPED_MESSAGE.to_string()),
            })
        }
    }
}

async fn handle_record(state: &Arc<AppState>) -> Option<ServerMessage> {
    tracing::info!("Manual record requested");
    state.set_recording(true).await;

    // Failure is already logged by the recorder
    let success = state.record_now().await.is_ok();
    Some(ServerMessage::RecordSaved { success })
}

fn parse_key(raw: &str) -> Option<CounterKey> {
    match raw.parse() {
        Ok(key) => Some(key),
        Err(e) => {
            tracing::debug!("Ignoring request: {}", e);
            None
        }
    }
}

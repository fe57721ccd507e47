use crate::types::*;
use serde::{Deserialize, Serialize};

/// Observer -> authority events.
///
/// Counter keys and selector values arrive unvalidated; the dispatcher checks
/// them before anything touches the store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum ClientMessage {
    Increment(String),
    Decrement(String),
    Reset(String),
    UpdateSelectedValue(i64),
    /// Mark recording active and take a snapshot right away
    Record,
    RecordStop,
}

/// Authority -> observer events
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum ServerMessage {
    CountersUpdated(Counters),
    SelectedValueUpdated(u8),
    #[serde(rename_all = "camelCase")]
    RecordingStatusUpdated {
        is_recording: bool,
    },
    /// Requester only
    RecordSaved {
        success: bool,
    },
    /// Requester only
    RecordStopped {
        success: bool,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        message: Option<String>,
    },
}

impl ServerMessage {
    /// Messages that bring a fresh observer in line with `state`
    pub fn full_snapshot(state: &CounterState) -> Vec<ServerMessage> {
        vec![
            ServerMessage::CountersUpdated(state.counters),
            ServerMessage::SelectedValueUpdated(state.selected_value),
            ServerMessage::RecordingStatusUpdated {
                is_recording: state.is_recording,
            },
        ]
    }
}

//! Counter store operations

use super::AppState;
use crate::protocol::ServerMessage;
use crate::types::*;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StateError {
    #[error("Selected value {0} outside 0..={max}", max = SELECTED_VALUE_MAX)]
    SelectedValueOutOfRange(i64),
}

impl AppState {
    pub async fn increment(&self, key: CounterKey) -> Counters {
        self.apply(key, |value| *value += 1).await
    }

    pub async fn decrement(&self, key: CounterKey) -> Counters {
        self.apply(key, |value| *value -= 1).await
    }

    pub async fn reset(&self, key: CounterKey) -> Counters {
        self.apply(key, |value| *value = 0).await
    }

    /// Mutate one counter and broadcast the full set while still holding the lock
    async fn apply(&self, key: CounterKey, op: impl FnOnce(&mut i64)) -> Counters {
        let mut state = self.counters.write().await;
        op(state.counters.get_mut(key));
        let counters = state.counters;
        tracing::debug!("Counter {} now {}", key, counters.get(key));
        self.broadcast_to_all(ServerMessage::CountersUpdated(counters));
        counters
    }

    /// Store a new selector position; out-of-range values leave it untouched
    pub async fn set_selected_value(&self, value: i64) -> Result<u8, StateError> {
        let value = u8::try_from(value)
            .ok()
            .filter(|v| *v <= SELECTED_VALUE_MAX)
            .ok_or(StateError::SelectedValueOutOfRange(value))?;

        let mut state = self.counters.write().await;
        state.selected_value = value;
        self.broadcast_to_all(ServerMessage::SelectedValueUpdated(value));
        Ok(value)
    }

    pub async fn set_recording(&self, active: bool) {
        let mut state = self.counters.write().await;
        state.is_recording = active;
        self.broadcast_to_all(ServerMessage::RecordingStatusUpdated {
            is_recording: active,
        });
    }
}

mod counters;
mod sessions;

pub use counters::StateError;
pub use sessions::Session;

use crate::protocol::ServerMessage;
use crate::recorder::{RecordEntry, RecordError, Recorder};
use crate::types::*;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::{broadcast, RwLock};

/// Buffered broadcasts per session before it counts as lagging
pub(crate) const BROADCAST_CAPACITY: usize = 256;

/// Shared application state
///
/// Every mutation of `counters` happens under its write lock and publishes the
/// resulting broadcast before releasing it, so sessions see notifications in
/// commit order.
#[derive(Clone)]
pub struct AppState {
    counters: Arc<RwLock<CounterState>>,
    /// Fan-out to every connected session
    broadcast: broadcast::Sender<ServerMessage>,
    sessions: Arc<RwLock<HashSet<SessionId>>>,
    pub recorder: Recorder,
}

impl AppState {
    pub fn new(recorder: Recorder) -> Self {
        let (tx, _rx) = broadcast::channel(BROADCAST_CAPACITY);
        Self {
            counters: Arc::new(RwLock::new(CounterState::default())),
            broadcast: tx,
            sessions: Arc::new(RwLock::new(HashSet::new())),
            recorder,
        }
    }

    /// Detached copy of the current state
    pub async fn snapshot(&self) -> CounterState {
        *self.counters.read().await
    }

    /// Broadcast a message to all registered sessions
    fn broadcast_to_all(&self, msg: ServerMessage) {
        // Ignore send errors (no receivers connected is fine)
        let _ = self.broadcast.send(msg);
    }

    /// Record the current counters. The snapshot is taken up front, so
    /// mutations during the append are neither blocked nor included.
    pub async fn record_now(&self) -> Result<RecordEntry, RecordError> {
        let snapshot = self.snapshot().await;
        self.recorder.record(snapshot.counters).await
    }
}

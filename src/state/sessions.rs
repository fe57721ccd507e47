//! Observer session membership

use super::AppState;
use crate::protocol::ServerMessage;
use crate::types::*;
use tokio::sync::broadcast;

/// A registered observer: its id, its broadcast feed and the snapshot it must
/// see before anything from the feed.
pub struct Session {
    pub id: SessionId,
    pub rx: broadcast::Receiver<ServerMessage>,
    pub initial: Vec<ServerMessage>,
}

impl AppState {
    /// Add a session. Subscription and snapshot happen under the state read
    /// lock, so every mutation is either in `initial` or on `rx`, never both.
    pub async fn register_session(&self) -> Session {
        let id = ulid::Ulid::new().to_string();

        let state = self.counters.read().await;
        let rx = self.broadcast.subscribe();
        let initial = ServerMessage::full_snapshot(&state);
        drop(state);

        self.sessions.write().await.insert(id.clone());
        tracing::info!("Session {} registered", id);

        Session { id, rx, initial }
    }

    /// Remove a session; returns whether it was still registered.
    /// Delivery only stops once the caller drops `Session.rx`.
    pub async fn unregister_session(&self, id: &str) -> bool {
        let removed = self.sessions.write().await.remove(id);
        if removed {
            tracing::info!("Session {} unregistered", id);
        }
        removed
    }

    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Bring a session that fell behind the broadcast buffer back in line.
    /// Its feed is swapped for a fresh subscription under the state read lock,
    /// so the stale backlog is discarded and the returned snapshot comes
    /// before anything the new feed delivers.
    pub async fn resync_session(&self, session: &mut Session) -> Vec<ServerMessage> {
        let state = self.counters.read().await;
        session.rx = self.broadcast.subscribe();
        ServerMessage::full_snapshot(&state)
    }
}

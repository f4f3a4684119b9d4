//! SSE session registry: one broadcast channel per connected client,
//! keyed by a CSPRNG session id. Mirrors the teacher's
//! `SessionManager` (map of id to `broadcast::Sender`) but generates
//! opaque hex ids instead of UUIDs and surfaces typed "not found"/"closed"
//! errors rather than a bare bool.

use rand::RngCore;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{broadcast, RwLock};

const CHANNEL_CAPACITY: usize = 256;
const SESSION_ID_BYTES: usize = 16;

#[derive(Debug, thiserror::Error)]
pub enum SseError {
    #[error("SSE session not found: {0}")]
    SessionNotFound(String),
    #[error("SSE connection closed: {0}")]
    ConnectionClosed(String),
}

#[must_use]
pub fn new_session_id() -> String {
    let mut bytes = [0u8; SESSION_ID_BYTES];
    rand::rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

#[derive(Clone, Debug)]
pub struct SseRegistry {
    sessions: Arc<RwLock<HashMap<String, broadcast::Sender<String>>>>,
}

impl Default for SseRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl SseRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self { sessions: Arc::new(RwLock::new(HashMap::new())) }
    }

    /// Register a new connection, returning its session id and the
    /// receiving half of its broadcast channel.
    pub async fn register(&self) -> (String, broadcast::Receiver<String>) {
        let id = new_session_id();
        let (tx, rx) = broadcast::channel(CHANNEL_CAPACITY);
        self.sessions.write().await.insert(id.clone(), tx);
        tracing::debug!(session_id = %id, "sse session registered");
        (id, rx)
    }

    #[must_use]
    pub async fn contains(&self, session_id: &str) -> bool {
        self.sessions.read().await.contains_key(session_id)
    }

    pub async fn unregister(&self, session_id: &str) {
        self.sessions.write().await.remove(session_id);
        tracing::debug!(session_id, "sse session unregistered");
    }

    /// Send `message` to one session. Errors if the session is not
    /// registered, or if its receiver side has already been dropped.
    pub async fn send_message(&self, session_id: &str, message: &str) -> Result<(), SseError> {
        let sessions = self.sessions.read().await;
        let tx = sessions.get(session_id).ok_or_else(|| SseError::SessionNotFound(session_id.to_string()))?;
        tx.send(message.to_string()).map(|_| ()).map_err(|_| SseError::ConnectionClosed(session_id.to_string()))
    }

    /// Broadcast a JSON-RPC notification to every connected session,
    /// pruning any whose receivers have all been dropped. Returns the
    /// number of sessions the message was actually delivered to.
    pub async fn broadcast_notification(&self, payload: &serde_json::Value) -> usize {
        let message = payload.to_string();
        let sessions = self.sessions.read().await;
        let mut delivered = 0;
        let mut dead = Vec::new();
        for (id, tx) in sessions.iter() {
            if tx.send(message.clone()).is_ok() {
                delivered += 1;
            } else {
                dead.push(id.clone());
            }
        }
        drop(sessions);
        if !dead.is_empty() {
            let mut sessions = self.sessions.write().await;
            for id in dead {
                sessions.remove(&id);
            }
        }
        delivered
    }

    #[must_use]
    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }
}

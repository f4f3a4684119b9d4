//! Per-process registry of connected clients, keyed by an id derived
//! from their working directory (`gasoline_core::client_id`).

use chrono::{DateTime, Utc};
use gasoline_core::client_id::derive_client_id;
use gasoline_core::BufferCursor;
use parking_lot::Mutex;
use serde::Serialize;
use std::collections::{HashMap, VecDeque};

pub const MAX_CLIENTS: usize = 10;

/// A client's last-seen position on each capture buffer, so `observe`
/// reads without an explicit checkpoint can advance incrementally
/// instead of always reading from the beginning.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct ClientCursors {
    pub logs: BufferCursor,
    pub network: BufferCursor,
    pub websocket: BufferCursor,
    pub actions: BufferCursor,
    pub performance: BufferCursor,
}

#[derive(Debug, Clone, Serialize)]
pub struct Client {
    pub id: String,
    pub cwd: Option<String>,
    pub registered_at: DateTime<Utc>,
    pub last_seen: DateTime<Utc>,
    pub cursors: ClientCursors,
}

impl Client {
    /// The checkpoint namespace prefix for this client: `"{id}:"`, or
    /// empty for the prefix-less global client (`id == ""`).
    #[must_use]
    pub fn checkpoint_prefix(&self) -> String {
        if self.id.is_empty() {
            String::new()
        } else {
            format!("{}:", self.id)
        }
    }

    fn transient(id: impl Into<String>) -> Self {
        let now = Utc::now();
        Self { id: id.into(), cwd: None, registered_at: now, last_seen: now, cursors: ClientCursors::default() }
    }
}

struct Inner {
    clients: HashMap<String, Client>,
    /// Front = least recently used, back = most recently used.
    order: VecDeque<String>,
}

pub struct ClientRegistry {
    inner: Mutex<Inner>,
}

impl Default for ClientRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ClientRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self { inner: Mutex::new(Inner { clients: HashMap::new(), order: VecDeque::new() }) }
    }

    /// Register (or touch) the client for `cwd`. Evicts the
    /// least-recently-used client if the registry is at capacity and
    /// this is a new entry.
    pub fn register(&self, cwd: &str) -> Client {
        let id = derive_client_id(cwd);
        let mut inner = self.inner.lock();
        let now = Utc::now();

        if let Some(client) = inner.clients.get_mut(&id) {
            client.last_seen = now;
            let client = client.clone();
            Self::touch_order(&mut inner.order, &id);
            return client;
        }

        if inner.clients.len() >= MAX_CLIENTS {
            if let Some(lru_id) = inner.order.pop_front() {
                inner.clients.remove(&lru_id);
                tracing::debug!(evicted = %lru_id, "evicted LRU client");
            }
        }

        let client = Client {
            id: id.clone(),
            cwd: Some(cwd.to_string()),
            registered_at: now,
            last_seen: now,
            cursors: ClientCursors::default(),
        };
        inner.clients.insert(id.clone(), client.clone());
        inner.order.push_back(id);
        client
    }

    /// Look up `id`, never failing: unknown non-empty ids yield a
    /// transient (unregistered) client whose checkpoint prefix is
    /// still `"{id}:"`; the empty string yields the global,
    /// prefix-less client for backward compatibility.
    #[must_use]
    pub fn get_or_default(&self, id: &str) -> Client {
        if id.is_empty() {
            return Client::transient("");
        }
        let mut inner = self.inner.lock();
        if let Some(client) = inner.clients.get_mut(id) {
            client.last_seen = Utc::now();
            let client = client.clone();
            Self::touch_order(&mut inner.order, id);
            return client;
        }
        Client::transient(id)
    }

    /// Persist an advanced cursor for a registered client. A no-op for
    /// transient (unregistered) ids — they have nowhere to persist to,
    /// so the caller always gets a fresh `BufferCursor::zero()` next
    /// time and reads from the beginning.
    pub fn update_cursor(&self, id: &str, with: impl FnOnce(&mut ClientCursors)) {
        if id.is_empty() {
            return;
        }
        let mut inner = self.inner.lock();
        if let Some(client) = inner.clients.get_mut(id) {
            with(&mut client.cursors);
        }
    }

    fn touch_order(order: &mut VecDeque<String>, id: &str) {
        if let Some(pos) = order.iter().position(|x| x == id) {
            order.remove(pos);
        }
        order.push_back(id.to_string());
    }

    #[must_use]
    pub fn list(&self) -> Vec<Client> {
        let inner = self.inner.lock();
        inner.order.iter().filter_map(|id| inner.clients.get(id).cloned()).collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.lock().clients.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_then_touch_moves_to_mru() {
        let registry = ClientRegistry::new();
        registry.register("/a");
        registry.register("/b");
        registry.register("/a");
        let ids: Vec<String> = registry.list().into_iter().map(|c| c.id).collect();
        assert_eq!(ids.last().unwrap(), &derive_client_id("/a"));
    }

    #[test]
    fn capacity_evicts_lru() {
        let registry = ClientRegistry::new();
        for i in 0..MAX_CLIENTS {
            registry.register(&format!("/dir-{i}"));
        }
        assert_eq!(registry.len(), MAX_CLIENTS);
        registry.register("/overflow");
        assert_eq!(registry.len(), MAX_CLIENTS);
        let first_id = derive_client_id("/dir-0");
        assert!(registry.list().into_iter().all(|c| c.id != first_id));
    }

    #[test]
    fn unknown_id_yields_transient_client_with_prefix() {
        let registry = ClientRegistry::new();
        let client = registry.get_or_default("deadbeef0000");
        assert_eq!(client.checkpoint_prefix(), "deadbeef0000:");
        assert_eq!(registry.len(), 0);
    }

    #[test]
    fn empty_id_yields_prefix_less_global_client() {
        let registry = ClientRegistry::new();
        let client = registry.get_or_default("");
        assert_eq!(client.checkpoint_prefix(), "");
    }

    #[test]
    fn update_cursor_persists_for_registered_client_only() {
        let registry = ClientRegistry::new();
        let client = registry.register("/a");
        registry.update_cursor(&client.id, |c| c.network = BufferCursor::new(7));
        let reread = registry.get_or_default(&client.id);
        assert_eq!(reread.cursors.network.position, 7);

        registry.update_cursor("unregistered", |c| c.network = BufferCursor::new(9));
        let transient = registry.get_or_default("unregistered");
        assert_eq!(transient.cursors.network.position, 0);
    }
}

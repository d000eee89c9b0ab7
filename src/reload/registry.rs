//! Registry of connected live reload clients.
//!
//! # Responsibilities
//! - Hand out unique client IDs on connect
//! - Remove clients on disconnect (explicitly or via [`Registration`] drop)
//! - Fan a reload out to every client, isolating per-client failures
//!
//! # Design Decisions
//! - Clients are [`ReloadSink`]s, not websockets; transport lives in
//!   `http::websocket`
//! - Backed by `DashMap` so connect/disconnect never race the broadcast
//! - Broadcast snapshots the membership first and sends without holding
//!   any shard lock
//! - A closed sink found during broadcast is pruned

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::mpsc;

use crate::observability::metrics;

/// Global counter for client IDs. Only uniqueness matters, so relaxed is enough.
static CLIENT_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Unique identifier for a reload client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ClientId(u64);

impl ClientId {
    /// Generate a new unique client ID.
    pub fn new() -> Self {
        Self(CLIENT_ID_COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

impl Default for ClientId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ClientId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "client-{}", self.0)
    }
}

/// The client has gone away and can no longer accept reloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("reload client disconnected")]
pub struct SinkClosed;

/// Something that accepts reload notifications.
pub trait ReloadSink: Send + Sync {
    /// Queue a reload for this client without blocking.
    fn send_reload(&self) -> Result<(), SinkClosed>;
}

/// A [`ReloadSink`] backed by a bounded tokio channel.
///
/// The receiving half is drained by the transport task. When the queue is
/// already full the client has a reload pending, so the new one is folded
/// into it.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: mpsc::Sender<()>,
}

impl ChannelSink {
    pub fn new(capacity: usize) -> (Self, mpsc::Receiver<()>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (Self { tx }, rx)
    }
}

impl ReloadSink for ChannelSink {
    fn send_reload(&self) -> Result<(), SinkClosed> {
        match self.tx.try_send(()) {
            Ok(()) | Err(mpsc::error::TrySendError::Full(())) => Ok(()),
            Err(mpsc::error::TrySendError::Closed(())) => Err(SinkClosed),
        }
    }
}

/// Outcome of a single broadcast.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BroadcastReport {
    pub delivered: usize,
    pub failed: usize,
}

/// Thread-safe set of connected reload clients. Cheap to clone.
#[derive(Clone, Default)]
pub struct ClientRegistry {
    inner: Arc<DashMap<ClientId, Arc<dyn ReloadSink>>>,
}

impl ClientRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a client and return its ID.
    pub fn register(&self, sink: Arc<dyn ReloadSink>) -> ClientId {
        let id = ClientId::new();
        self.inner.insert(id, sink);
        // Read after the insert without a lock: concurrent connects can leave
        // the gauge one change behind until the next update or broadcast.
        metrics::set_reload_clients(self.inner.len());
        tracing::debug!(client = %id, clients = self.inner.len(), "Reload client connected");
        id
    }

    /// Add a client that is removed again when the returned guard drops.
    pub fn register_scoped(&self, sink: Arc<dyn ReloadSink>) -> Registration {
        Registration {
            id: self.register(sink),
            registry: self.clone(),
        }
    }

    /// Remove a client. Returns `false` if it was already gone.
    pub fn unregister(&self, id: ClientId) -> bool {
        let removed = self.inner.remove(&id).is_some();
        if removed {
            metrics::set_reload_clients(self.inner.len());
            tracing::debug!(client = %id, clients = self.inner.len(), "Reload client disconnected");
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Send a reload to every currently registered client.
    ///
    /// Never fails as a whole: a disconnected client is counted, logged and
    /// pruned, and delivery to the others continues.
    pub fn broadcast(&self) -> BroadcastReport {
        let snapshot: Vec<(ClientId, Arc<dyn ReloadSink>)> = self
            .inner
            .iter()
            .map(|entry| (*entry.key(), Arc::clone(entry.value())))
            .collect();

        let mut report = BroadcastReport::default();
        for (id, sink) in snapshot {
            match sink.send_reload() {
                Ok(()) => report.delivered += 1,
                Err(err) => {
                    report.failed += 1;
                    tracing::debug!(client = %id, error = %err, "Dropping reload client");
                    self.unregister(id);
                }
            }
        }
        metrics::set_reload_clients(self.inner.len());
        report
    }
}

impl std::fmt::Debug for ClientRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientRegistry")
            .field("clients", &self.inner.len())
            .finish()
    }
}

/// Keeps a client registered for as long as it lives.
#[derive(Debug)]
pub struct Registration {
    id: ClientId,
    registry: ClientRegistry,
}

impl Registration {
    pub fn id(&self) -> ClientId {
        self.id
    }
}

impl Drop for Registration {
    fn drop(&mut self) {
        self.registry.unregister(self.id);
    }
}

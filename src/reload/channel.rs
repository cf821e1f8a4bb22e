//! Notification Channel
//!
//! Registry of connected clients plus best-effort broadcast.
//!
//! ```text
//! accept() --> [registry] <-- remove() / poll_connections()
//!                  |
//!          snapshot (copy-on-read)
//!                  |
//!     broadcast() writes each connection independently
//! ```
//!
//! The registry lock is only held to copy or mutate the list. Each
//! connection has its own lock, so a slow write never blocks accept or
//! remove, and a connection closing mid-broadcast cannot skip the others.

use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use parking_lot::Mutex;
use thiserror::Error;

use super::classify::Classification;
use super::message::ReloadMessage;

/// Opaque connection identifier, unique for the lifetime of a channel.
pub type ConnectionId = u64;

/// Transport write failure.
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("connection closed")]
    Closed,

    #[error("write failed: {0}")]
    Io(String),
}

/// Liveness reported by [`ClientSink::poll`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SinkStatus {
    Open,
    Closed,
}

/// One writable client endpoint.
///
/// Implementations must not block indefinitely: a write either completes,
/// is buffered, or fails.
pub trait ClientSink: Send {
    /// Write a text frame.
    fn send_text(&mut self, text: &str) -> Result<(), SinkError>;

    /// Drain inbound traffic and report whether the peer is still there.
    fn poll(&mut self) -> SinkStatus;

    /// Close the connection (best effort).
    fn close(&mut self);
}

/// A registered client.
pub struct Connection {
    id: ConnectionId,
    opened_at: Instant,
    peer: Option<SocketAddr>,
    sink: Mutex<Box<dyn ClientSink>>,
}

impl Connection {
    #[cfg(test)]
    pub fn id(&self) -> ConnectionId {
        self.id
    }

    fn send_text(&self, text: &str) -> Result<(), SinkError> {
        self.sink.lock().send_text(text)
    }

    fn poll(&self) -> SinkStatus {
        self.sink.lock().poll()
    }

    fn close(&self) {
        self.sink.lock().close();
    }
}

impl std::fmt::Debug for Connection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connection")
            .field("id", &self.id)
            .field("opened_at", &self.opened_at)
            .field("peer", &self.peer)
            .finish_non_exhaustive()
    }
}

/// Result of one broadcast.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BroadcastReport {
    /// Connections the message was written (or buffered) to
    pub delivered: usize,
    /// Connections dropped because the write failed
    pub dropped: usize,
}

/// Connection registry with fan-out.
#[derive(Default)]
pub struct NotificationChannel {
    next_id: AtomicU64,
    connections: Mutex<Vec<Arc<Connection>>>,
}

impl NotificationChannel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new client. It takes part in every broadcast that starts
    /// after this returns.
    pub fn accept(&self, sink: Box<dyn ClientSink>, peer: Option<SocketAddr>) -> ConnectionId {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let conn = Arc::new(Connection {
            id,
            opened_at: Instant::now(),
            peer,
            sink: Mutex::new(sink),
        });

        let total = {
            let mut connections = self.connections.lock();
            connections.push(conn);
            connections.len()
        };
        crate::log!("ws"; "receive new connection, total: {}", total);
        id
    }

    /// Unregister a client. Removing an unknown id is a no-op.
    pub fn remove(&self, id: ConnectionId) -> bool {
        let (removed, total) = {
            let mut connections = self.connections.lock();
            let removed = connections
                .iter()
                .position(|c| c.id == id)
                .map(|index| connections.remove(index));
            (removed, connections.len())
        };
        let Some(conn) = removed else {
            return false;
        };
        crate::log!("ws"; "close a connection, total: {}", total);
        crate::debug!(
            "ws";
            "client {} ({}) was connected for {:.1}s",
            conn.id,
            conn.peer.map_or_else(|| "unknown peer".to_string(), |p| p.to_string()),
            conn.opened_at.elapsed().as_secs_f64()
        );
        true
    }

    /// Number of registered connections.
    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.connections.lock().len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.connections.lock().is_empty()
    }

    /// Copy of the current registry.
    pub fn snapshot(&self) -> Vec<Arc<Connection>> {
        self.connections.lock().clone()
    }

    /// Send a classification to every registered client.
    ///
    /// `NoOp` is never put on the wire.
    pub fn broadcast(&self, result: &Classification) -> BroadcastReport {
        match ReloadMessage::from_classification(result) {
            Some(msg) => self.broadcast_text(&msg.to_json()),
            None => BroadcastReport::default(),
        }
    }

    /// Write a text frame to every connection registered right now.
    ///
    /// A failed write drops only that connection.
    pub fn broadcast_text(&self, text: &str) -> BroadcastReport {
        let snapshot = self.snapshot();
        if snapshot.is_empty() {
            crate::debug!("ws"; "no clients connected");
            return BroadcastReport::default();
        }

        let mut report = BroadcastReport::default();
        for conn in &snapshot {
            match conn.send_text(text) {
                Ok(()) => report.delivered += 1,
                Err(e) => {
                    crate::debug!("ws"; "client {} disconnected: {}", conn.id, e);
                    self.remove(conn.id);
                    report.dropped += 1;
                }
            }
        }
        crate::debug!("ws"; "broadcast to {} clients ({} dropped)", report.delivered, report.dropped);
        report
    }

    /// Poll every connection and drop the ones whose peer went away.
    ///
    /// Returns how many were dropped.
    pub fn poll_connections(&self) -> usize {
        self.snapshot()
            .into_iter()
            .filter(|conn| conn.poll() == SinkStatus::Closed)
            .filter(|conn| self.remove(conn.id))
            .count()
    }

    /// Close and unregister everything (shutdown).
    pub fn close_all(&self) {
        let drained: Vec<_> = std::mem::take(&mut *self.connections.lock());
        for conn in drained {
            conn.close();
        }
    }
}

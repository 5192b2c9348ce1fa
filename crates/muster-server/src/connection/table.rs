//! Live-connection table
//!
//! The transport layer owns the authoritative mapping from connection
//! handles to outbound channels. Sessions in the registry hold only an
//! opaque `ConnectionId`; anything that wants to know "is this handle
//! still live" or "push this frame" asks the table.

use dashmap::DashMap;
use tokio::sync::mpsc;

use muster_core::ConnectionId;
use muster_protocol::Envelope;

/// Table of currently live agent connections, keyed by connection ID.
///
/// Each entry holds the bounded sender feeding that connection's outbound
/// WebSocket task.
pub struct ConnectionTable {
    connections: DashMap<ConnectionId, mpsc::Sender<Envelope>>,
}

impl ConnectionTable {
    /// Create a new empty table
    pub fn new() -> Self {
        Self {
            connections: DashMap::new(),
        }
    }

    /// Register a new live connection and mint its handle
    pub fn register(&self, sender: mpsc::Sender<Envelope>) -> ConnectionId {
        let id = ConnectionId::next();
        self.connections.insert(id, sender);
        id
    }

    /// Remove a connection. Idempotent: removing an unknown or already
    /// removed handle is a no-op. Returns whether an entry was removed.
    pub fn remove(&self, id: ConnectionId) -> bool {
        self.connections.remove(&id).is_some()
    }

    /// Whether the handle refers to a live connection
    pub fn contains(&self, id: ConnectionId) -> bool {
        self.connections.contains_key(&id)
    }

    /// Push a frame to a connection without blocking.
    ///
    /// Returns false if the handle is not live, the connection's queue is
    /// full, or its receiver is gone. A slow peer therefore fails its own
    /// delivery instead of stalling the caller.
    pub fn push(&self, id: ConnectionId, envelope: Envelope) -> bool {
        match self.connections.get(&id) {
            Some(sender) => sender.try_send(envelope).is_ok(),
            None => false,
        }
    }

    /// Number of live connections
    pub fn len(&self) -> usize {
        self.connections.len()
    }

    /// Check if the table is empty
    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }
}

impl Default for ConnectionTable {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use muster_protocol::{CommandFrame, CommandKind};

    #[test]
    fn test_register_and_push() {
        let table = ConnectionTable::new();
        let (tx, mut rx) = mpsc::channel(4);
        let id = table.register(tx);

        assert!(table.contains(id));
        assert!(table.push(id, Envelope::Command(CommandFrame::new(CommandKind::Reboot))));

        let received = rx.try_recv().unwrap();
        assert!(matches!(received, Envelope::Command(_)));
    }

    #[test]
    fn test_remove_is_idempotent() {
        let table = ConnectionTable::new();
        let (tx, _rx) = mpsc::channel(4);
        let id = table.register(tx);

        assert!(table.remove(id));
        assert!(!table.remove(id));
        assert!(!table.contains(id));
    }

    #[test]
    fn test_push_to_unknown_handle_fails() {
        let table = ConnectionTable::new();
        let stale = ConnectionId::next();
        assert!(!table.push(
            stale,
            Envelope::Command(CommandFrame::new(CommandKind::Shutdown))
        ));
    }

    #[test]
    fn test_push_to_full_queue_fails_fast() {
        let table = ConnectionTable::new();
        let (tx, _rx) = mpsc::channel(1);
        let id = table.register(tx);

        assert!(table.push(id, Envelope::Command(CommandFrame::new(CommandKind::Reboot))));
        // Queue depth 1 and nobody draining: second push must fail, not block
        assert!(!table.push(id, Envelope::Command(CommandFrame::new(CommandKind::Reboot))));
    }

    #[test]
    fn test_push_after_receiver_dropped_fails() {
        let table = ConnectionTable::new();
        let (tx, rx) = mpsc::channel(4);
        let id = table.register(tx);
        drop(rx);

        assert!(!table.push(id, Envelope::Command(CommandFrame::new(CommandKind::Reboot))));
    }
}

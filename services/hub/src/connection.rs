//! Per-connection identity, role classification, and the sendable handle
//! other tasks use to push frames to this connection's socket.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use axum::extract::ws::Message;
use hub_protocol::DeviceId;
use tokio::sync::mpsc;

/// Opaque, process-local identifier for a live connection. Used as the key
/// in every shared map so connections can be compared/hashed without
/// touching the underlying socket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnectionId(u64);

impl ConnectionId {
    fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        ConnectionId(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

/// A connection's role in the routing protocol (§4.2 of the hub spec).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Unknown,
    Device(DeviceId),
    Client,
}

/// The sendable half of a connection: a channel into its writer task, plus
/// the metadata needed for logging. Cloned freely into registries and
/// subscription sets; closing the channel (by dropping every clone) is not
/// how connections are torn down — the writer task exits when the socket
/// closes or a send errors, which is what actually frees resources.
#[derive(Debug, Clone)]
pub struct ConnectionHandle {
    pub id: ConnectionId,
    pub addr: String,
    tx: mpsc::UnboundedSender<Message>,
}

impl ConnectionHandle {
    pub fn new(addr: String, tx: mpsc::UnboundedSender<Message>) -> Self {
        ConnectionHandle {
            id: ConnectionId::next(),
            addr,
            tx,
        }
    }

    /// Queues a text frame for delivery. Returns `Err` if the connection's
    /// writer task has already exited (socket closed), in which case the
    /// caller should treat the target as stale.
    pub fn send_line(&self, line: impl Into<String>) -> Result<(), ()> {
        self.tx
            .send(Message::Text(line.into()))
            .map_err(|_| ())
    }
}

impl PartialEq for ConnectionHandle {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}
impl Eq for ConnectionHandle {}

impl std::hash::Hash for ConnectionHandle {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

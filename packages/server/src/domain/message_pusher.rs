//! Outbound notification seam towards the transport layer.
//!
//! The hub core never talks to sockets directly; it pushes serialized
//! payloads through this trait. Registry state is the source of truth:
//! group and broadcast delivery is best-effort, and a send failing for
//! some member never rolls back a registry mutation.

use async_trait::async_trait;
use tokio::sync::mpsc;

use super::error::MessagePushError;
use super::value_object::{ConnectionId, RoomCode};

/// Per-connection outbound channel carrying serialized payloads.
pub type PusherChannel = mpsc::UnboundedSender<String>;

/// Transport boundary: unicast to one connection, multicast to a named
/// group, broadcast to everyone, plus group membership bookkeeping.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MessagePusher: Send + Sync {
    /// Register a connection's outbound channel. Called once per
    /// connection at transport-level connect, before any identity exists.
    async fn register_client(&self, connection_id: ConnectionId, sender: PusherChannel);

    /// Forget a connection's outbound channel. Idempotent.
    async fn unregister_client(&self, connection_id: &ConnectionId);

    /// Send to one connection.
    async fn push_to(
        &self,
        connection_id: &ConnectionId,
        content: &str,
    ) -> Result<(), MessagePushError>;

    /// Send to every connection currently in the named group.
    /// Best-effort; individual failures are logged and swallowed.
    async fn push_to_group(&self, code: &RoomCode, content: &str);

    /// Send to every registered connection. Best-effort.
    async fn push_to_all(&self, content: &str);

    /// Send to an explicit target list. Used for notifications addressed
    /// from a captured snapshot (leave/disconnect), where the group
    /// bookkeeping has already moved on. Best-effort.
    async fn broadcast(&self, targets: Vec<ConnectionId>, content: &str);

    /// Associate the connection with a group.
    async fn add_to_group(&self, connection_id: &ConnectionId, code: &RoomCode);

    /// Dissociate the connection from a group. Idempotent.
    async fn remove_from_group(&self, connection_id: &ConnectionId, code: &RoomCode);
}

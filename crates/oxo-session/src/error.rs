//! Error types for the session layer.

use oxo_protocol::RoomCode;
use oxo_transport::ConnectionId;

/// Errors that can occur during session management.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// No session exists for the given connection.
    /// This happens when a connection is used after it was disconnected.
    #[error("session not found for {0}")]
    NotFound(ConnectionId),

    /// The connection already has a session.
    #[error("{0} already has an active session")]
    AlreadyConnected(ConnectionId),

    /// The connection is already bound to a room.
    /// A connection can sit in at most one room at a time.
    #[error("{0} is already bound to room {1}")]
    AlreadyBound(ConnectionId, RoomCode),
}

//! The server's record of one live connection.

use std::time::{Duration, Instant};

use oxo_protocol::RoomCode;
use oxo_transport::ConnectionId;

/// A single connection's session.
///
/// Created when the socket is accepted, dropped when it closes.
#[derive(Debug, Clone)]
pub struct Session {
    /// Which connection this session belongs to.
    pub conn_id: ConnectionId,

    /// The room this connection created or joined, if any.
    ///
    /// Set on a successful create or join, cleared on leave. Used on
    /// disconnect to find the room to leave.
    pub bound_room: Option<RoomCode>,

    /// When the socket was accepted.
    pub connected_at: Instant,
}

impl Session {
    pub fn new(conn_id: ConnectionId) -> Self {
        Self {
            conn_id,
            bound_room: None,
            connected_at: Instant::now(),
        }
    }

    pub fn is_bound(&self) -> bool {
        self.bound_room.is_some()
    }

    /// How long the connection has been open.
    pub fn age(&self) -> Duration {
        self.connected_at.elapsed()
    }
}

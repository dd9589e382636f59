//! Unified error type for the OXO server.

use oxo_protocol::ProtocolError;
use oxo_room::RoomError;
use oxo_session::SessionError;
use oxo_transport::TransportError;

use crate::ConfigError;

/// Top-level error that wraps all crate-specific errors.
///
/// The `#[from]` attribute on each variant generates the `From` impl, so
/// `?` converts sub-crate errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum OxoError {
    /// A transport-level error (bind, accept, send, recv).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A protocol-level error (encode, decode).
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A session-level error (duplicate connection, binding).
    #[error(transparent)]
    Session(#[from] SessionError),

    /// A room-level error (full, not found, refused move).
    #[error(transparent)]
    Room(#[from] RoomError),

    /// Invalid environment configuration.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

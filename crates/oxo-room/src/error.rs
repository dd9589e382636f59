//! Error types for the room layer.

use oxo_protocol::{RoomCode, Symbol};
use oxo_transport::ConnectionId;

use crate::RoomState;

/// Why a move was refused. Never sent to the client; a well-behaved
/// client does not produce these.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MoveError {
    /// The sender is not seated in the room.
    #[error("{0} is not a member of this room")]
    NotAMember(ConnectionId),

    /// Waiting for an opponent, or the game is over until a restart.
    #[error("room is {0}, moves are not accepted")]
    NotActive(RoomState),

    /// The index is outside `0..9`.
    #[error("cell index {0} is off the board")]
    OutOfRange(i64),

    /// The cell already holds a symbol.
    #[error("cell {0} is already taken")]
    Occupied(usize),

    /// The symbol does not match the current turn.
    #[error("it is {expected}'s turn, not {got}'s")]
    WrongTurn { expected: Symbol, got: Symbol },
}

/// Errors that can occur during room operations.
#[derive(Debug, thiserror::Error)]
pub enum RoomError {
    /// No room is registered under this code.
    #[error("room {0} not found")]
    NotFound(RoomCode),

    /// The room already has two members.
    #[error("room {0} is full")]
    RoomFull(RoomCode),

    /// The connection is already seated in this room.
    #[error("{0} already in room {1}")]
    AlreadyInRoom(ConnectionId, RoomCode),

    /// A move was refused by the state machine.
    #[error("invalid move: {0}")]
    InvalidMove(#[from] MoveError),

    /// Every generated code collided with a live room.
    #[error("no free room code after {0} attempts")]
    CodeSpaceExhausted(usize),

    /// The room's actor has stopped (emptied or expired).
    #[error("room {0} is unavailable")]
    Unavailable(RoomCode),
}

impl RoomError {
    /// The text shown to the player whose request was refused.
    pub fn client_message(&self) -> &'static str {
        match self {
            Self::NotFound(_) | Self::Unavailable(_) => "Room not found",
            Self::RoomFull(_) => "Room full",
            Self::AlreadyInRoom(..) => "Already in a room",
            Self::CodeSpaceExhausted(_) => "Could not create a room, try again",
            Self::InvalidMove(_) => "Request rejected",
        }
    }
}

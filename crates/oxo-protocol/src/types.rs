//! Message types for the OXO wire format.
//!
//! Every message is a flat JSON object with a `type` discriminator, e.g.
//! `{"type":"make_move","roomId":"AB1CD","index":4,"symbol":"X"}`. Field
//! names are camelCase on the wire because the browser client reads them
//! directly.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Number of cells on a tic-tac-toe board.
pub const BOARD_CELLS: usize = 9;

// ---------------------------------------------------------------------------
// Symbol
// ---------------------------------------------------------------------------

/// One of the two markers a player places on the board.
///
/// Serialized as `"X"` / `"O"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Symbol {
    X,
    O,
}

impl Symbol {
    /// Returns the opposing symbol.
    pub fn other(self) -> Self {
        match self {
            Self::X => Self::O,
            Self::O => Self::X,
        }
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::X => write!(f, "X"),
            Self::O => write!(f, "O"),
        }
    }
}

// ---------------------------------------------------------------------------
// RoomCode
// ---------------------------------------------------------------------------

/// Short, human-typeable identifier of a room, e.g. `"AB1CD"`.
///
/// Codes are always stored upper-case: whatever the client types is
/// trimmed and upper-cased on the way in, so lookups are case-insensitive.
/// On the wire it is a plain JSON string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct RoomCode(String);

impl RoomCode {
    /// Creates a code, normalizing it to upper-case.
    pub fn new(code: impl AsRef<str>) -> Self {
        Self(code.as_ref().trim().to_ascii_uppercase())
    }

    /// Returns the code as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for RoomCode {
    fn from(code: String) -> Self {
        Self::new(code)
    }
}

impl From<&str> for RoomCode {
    fn from(code: &str) -> Self {
        Self::new(code)
    }
}

impl From<RoomCode> for String {
    fn from(code: RoomCode) -> Self {
        code.0
    }
}

impl fmt::Display for RoomCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// Winner
// ---------------------------------------------------------------------------

/// The `winner` field of `game_over`: a symbol, or the literal `"draw"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Winner {
    X,
    O,
    #[serde(rename = "draw")]
    Draw,
}

impl From<Symbol> for Winner {
    fn from(symbol: Symbol) -> Self {
        match symbol {
            Symbol::X => Self::X,
            Symbol::O => Self::O,
        }
    }
}

// ---------------------------------------------------------------------------
// ClientMessage
// ---------------------------------------------------------------------------

/// Messages a client sends to the server.
///
/// `#[serde(tag = "type", rename_all = "snake_case")]` produces internally
/// tagged JSON: `ClientMessage::CreateRoom` is `{"type":"create_room"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// "Open a new room and seat me in it."
    CreateRoom,

    /// "Seat me in the room with this code."
    JoinRoom {
        #[serde(rename = "roomId")]
        room_id: RoomCode,
    },

    /// "Place `symbol` at `index`."
    ///
    /// `index` is signed so that an out-of-range number (e.g. `-1`) still
    /// parses and is rejected by the room as an invalid move rather than
    /// as a malformed message.
    MakeMove {
        #[serde(rename = "roomId")]
        room_id: RoomCode,
        index: i64,
        symbol: Symbol,
    },

    /// "Start the rematch."
    Restart {
        #[serde(rename = "roomId")]
        room_id: RoomCode,
    },

    /// "Take me out of this room."
    LeaveRoom {
        #[serde(rename = "roomId")]
        room_id: RoomCode,
    },
}

impl ClientMessage {
    /// The wire name of this message kind, for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::CreateRoom => "create_room",
            Self::JoinRoom { .. } => "join_room",
            Self::MakeMove { .. } => "make_move",
            Self::Restart { .. } => "restart",
            Self::LeaveRoom { .. } => "leave_room",
        }
    }
}

// ---------------------------------------------------------------------------
// ServerMessage
// ---------------------------------------------------------------------------

/// Messages the server sends to clients.
///
/// Symbol assignment is implied by ordering, never carried here: the
/// creator is X because it received `room_created`; the joiner is O
/// because it received `game_start` without a prior `room_created`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// To the creator only: the room exists and you hold X.
    RoomCreated {
        #[serde(rename = "roomId")]
        room_id: RoomCode,
    },

    /// To both members when the second one joins.
    GameStart {
        #[serde(rename = "roomId")]
        room_id: RoomCode,
    },

    /// To both members after every accepted move.
    MoveMade {
        index: usize,
        symbol: Symbol,
        #[serde(rename = "nextTurn")]
        next_turn: Symbol,
    },

    /// To both members when a move ends the game.
    ///
    /// `line` is the winning triple and is omitted on a draw.
    GameOver {
        winner: Winner,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        line: Option<[usize; 3]>,
    },

    /// To both members: the board is cleared and `turn` moves first.
    RestartGame { turn: Symbol },

    /// To the remaining member when the other one leaves.
    UserLeft,

    /// To a single requester whose create/join was refused.
    Error { message: String },
}

// =========================================================================
// Tests
// =========================================================================

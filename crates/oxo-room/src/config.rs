//! Room configuration and lifecycle states.

use std::time::Duration;

// ---------------------------------------------------------------------------
// RoomConfig
// ---------------------------------------------------------------------------

/// Settings shared by every room the registry creates.
#[derive(Debug, Clone)]
pub struct RoomConfig {
    /// Length of generated room codes. Codes draw from `[A-Z0-9]`, so five
    /// characters give ~60 million codes.
    pub code_length: usize,

    /// Capacity of each room actor's command channel. Senders wait when it
    /// is full.
    pub channel_size: usize,

    /// Rooms untouched for this long are closed by the idle sweep.
    /// `None` keeps rooms until their last member leaves.
    pub idle_timeout: Option<Duration>,
}

impl Default for RoomConfig {
    fn default() -> Self {
        Self {
            code_length: 5,
            channel_size: 64,
            idle_timeout: None,
        }
    }
}

// ---------------------------------------------------------------------------
// RoomState
// ---------------------------------------------------------------------------

/// The lifecycle state of a room.
///
/// Derived from the member count and whether the current game has ended:
///
/// ```text
///            2nd join              win / draw
/// Waiting ────────────→ Active ──────────────→ Finished
///    ↑                    ↑                       │
///    │ leave              └────── restart ────────┘
///    └──────────── (from Active or Finished)
/// ```
///
/// - **Waiting**: fewer than two members; joinable.
/// - **Active**: two members, game in progress; moves accepted.
/// - **Finished**: two members, a result was broadcast; moves are refused
///   until someone restarts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoomState {
    Waiting,
    Active,
    Finished,
}

impl RoomState {
    /// Returns `true` if another player may still join.
    pub fn is_joinable(&self) -> bool {
        matches!(self, Self::Waiting)
    }

    /// Returns `true` if moves are accepted.
    pub fn accepts_moves(&self) -> bool {
        matches!(self, Self::Active)
    }
}

impl std::fmt::Display for RoomState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Waiting => write!(f, "Waiting"),
            Self::Active => write!(f, "Active"),
            Self::Finished => write!(f, "Finished"),
        }
    }
}

//! Rooms for the OXO server.
//!
//! Each room runs as an isolated Tokio task (actor model) that owns its
//! board, its two seats and the rematch bookkeeping. Everything that
//! touches a room goes through the actor, so moves, joins and leaves for
//! one room never interleave.
//!
//! # Key types
//!
//! - [`RoomRegistry`]: creates rooms, maps codes to actors, sweeps idle rooms
//! - [`RoomHandle`]: send commands to a running room actor
//! - [`RoomState`]: lifecycle state machine
//! - [`Board`] / [`evaluate`]: the board engine
//! - [`RoomConfig`]: code length, channel size, idle timeout

mod actor;
mod board;
mod config;
mod error;
mod registry;
mod room;

pub use actor::{RoomHandle, RoomInfo};
pub use board::{Board, Outcome, WIN_LINES, evaluate};
pub use config::{RoomConfig, RoomState};
pub use error::{MoveError, RoomError};
pub use registry::{MAX_CODE_ATTEMPTS, RoomRegistry};
pub use room::{LeaveOutcome, MAX_MEMBERS, MemberSender};

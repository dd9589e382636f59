//! Connection session tracking for the OXO server.
//!
//! Every live WebSocket connection has exactly one [`Session`]. The session
//! remembers which room, if any, the connection is bound to, so that a
//! dropped socket can be taken out of its room without the client saying
//! goodbye.
//!
//! # How it fits in the stack
//!
//! ```text
//! Room Layer (beside)  ← rooms know their members, sessions know their room
//!     ↕
//! Session Layer (this crate)  ← one record per live connection
//!     ↕
//! Transport Layer (below)  ← provides ConnectionId
//! ```

mod error;
mod manager;
mod session;

pub use error::SessionError;
pub use manager::SessionManager;
pub use session::Session;

//! # OXO
//!
//! Realtime two-player tic-tac-toe room server.
//!
//! Clients connect over WebSocket and exchange JSON text frames. One client
//! creates a room and receives a five-character code, a second joins with
//! that code, and the server relays moves, decides wins and draws, and runs
//! rematches. Each room is an isolated actor task.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use oxo::prelude::*;
//!
//! # async fn start() -> Result<(), OxoError> {
//! let server = OxoServer::builder()
//!     .config(ServerConfig::from_env()?)
//!     .build()
//!     .await?;
//! server.run().await
//! # }
//! ```

mod config;
mod error;
mod handler;
mod server;

pub use config::{ConfigError, DEFAULT_PORT, IDLE_SECS_VAR, PORT_VAR, ServerConfig};
pub use error::OxoError;
pub use server::{OxoServer, OxoServerBuilder};

/// Re-exports of the sub-crates.
pub use oxo_protocol as protocol;
pub use oxo_room as room;
pub use oxo_session as session;
pub use oxo_transport as transport;

/// Commonly used types.
pub mod prelude {
    pub use crate::{ConfigError, OxoError, OxoServer, OxoServerBuilder, ServerConfig};
    pub use oxo_protocol::{ClientMessage, RoomCode, ServerMessage, Symbol, Winner};
    pub use oxo_room::RoomConfig;
}

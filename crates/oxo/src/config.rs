//! Server configuration read from the environment.

use std::time::Duration;

use oxo_room::RoomConfig;

/// Port used when `PORT` is unset.
pub const DEFAULT_PORT: u16 = 3000;

/// Environment variable holding the listen port.
pub const PORT_VAR: &str = "PORT";

/// Environment variable holding the idle-room timeout in seconds.
pub const IDLE_SECS_VAR: &str = "OXO_ROOM_IDLE_SECS";

/// Errors from reading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid PORT value {0:?}: expected a port number")]
    InvalidPort(String),

    #[error("invalid OXO_ROOM_IDLE_SECS value {0:?}: expected whole seconds")]
    InvalidIdleTimeout(String),
}

/// Everything the server needs to start.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Socket address to listen on, e.g. `0.0.0.0:3000`.
    pub bind_addr: String,
    /// Settings for every room.
    pub room: RoomConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: format!("0.0.0.0:{DEFAULT_PORT}"),
            room: RoomConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Reads `PORT` and `OXO_ROOM_IDLE_SECS` from the process environment.
    ///
    /// # Errors
    /// Returns a [`ConfigError`] if a variable is set but unparseable.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Like [`from_env`](Self::from_env), with the variables supplied by
    /// `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(raw) = lookup(PORT_VAR) {
            let port: u16 = raw
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidPort(raw.clone()))?;
            config.bind_addr = format!("0.0.0.0:{port}");
        }

        if let Some(raw) = lookup(IDLE_SECS_VAR) {
            let secs: u64 = raw
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidIdleTimeout(raw.clone()))?;
            // 0 keeps rooms until their last member leaves.
            config.room.idle_timeout = (secs > 0).then(|| Duration::from_secs(secs));
        }

        Ok(config)
    }
}

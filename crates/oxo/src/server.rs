//! `OxoServer` builder and server loop.
//!
//! This is the entry point for running the room server. It ties together
//! all the layers: transport → protocol → session → room.

use std::sync::Arc;
use std::time::Duration;

use oxo_protocol::{Codec, JsonCodec};
use oxo_room::{RoomConfig, RoomRegistry};
use oxo_session::SessionManager;
use oxo_transport::{Connection, Handshake, Transport, WebSocketTransport};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

use crate::handler::handle_connection;
use crate::{OxoError, ServerConfig};

/// Shortest pause between idle sweeps.
const MIN_SWEEP_PERIOD: Duration = Duration::from_secs(1);

/// How long a peer has to finish the WebSocket upgrade.
const HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(10);

/// Shared server state passed to each connection handler task.
///
/// Wrapped in `Arc` so it can be cheaply cloned across tasks.
pub(crate) struct ServerState<C: Codec> {
    pub(crate) sessions: Mutex<SessionManager>,
    pub(crate) rooms: RoomRegistry,
    pub(crate) codec: C,
}

/// Builder for configuring and starting an OXO server.
///
/// # Example
///
/// ```rust,no_run
/// use oxo::prelude::*;
///
/// # async fn start() -> Result<(), OxoError> {
/// let server = OxoServer::builder()
///     .bind("0.0.0.0:3000")
///     .build()
///     .await?;
/// server.run().await
/// # }
/// ```
pub struct OxoServerBuilder {
    config: ServerConfig,
}

impl OxoServerBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            config: ServerConfig::default(),
        }
    }

    /// Sets the address to bind the server to.
    pub fn bind(mut self, addr: &str) -> Self {
        self.config.bind_addr = addr.to_string();
        self
    }

    /// Sets the room configuration.
    pub fn room_config(mut self, config: RoomConfig) -> Self {
        self.config.room = config;
        self
    }

    /// Replaces the whole configuration, e.g. one read by
    /// [`ServerConfig::from_env`].
    pub fn config(mut self, config: ServerConfig) -> Self {
        self.config = config;
        self
    }

    /// Binds the listener.
    ///
    /// Uses `JsonCodec` and `WebSocketTransport`.
    pub async fn build(self) -> Result<OxoServer<JsonCodec>, OxoError> {
        let transport = WebSocketTransport::bind(&self.config.bind_addr).await?;
        let idle_timeout = self.config.room.idle_timeout.filter(|d| !d.is_zero());

        let state = Arc::new(ServerState {
            sessions: Mutex::new(SessionManager::new()),
            rooms: RoomRegistry::new(self.config.room),
            codec: JsonCodec,
        });

        Ok(OxoServer {
            transport,
            state,
            idle_timeout,
        })
    }
}

impl Default for OxoServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A bound OXO server.
///
/// Call [`run()`](Self::run) to start accepting connections.
pub struct OxoServer<C: Codec> {
    transport: WebSocketTransport,
    state: Arc<ServerState<C>>,
    idle_timeout: Option<Duration>,
}

impl OxoServer<JsonCodec> {
    /// Creates a new builder.
    pub fn builder() -> OxoServerBuilder {
        OxoServerBuilder::new()
    }
}

impl<C: Codec> OxoServer<C> {
    /// Returns the local address the server is bound to.
    pub fn local_addr(&self) -> std::io::Result<std::net::SocketAddr> {
        self.transport.local_addr()
    }

    /// Runs the server accept loop.
    ///
    /// Each accepted socket gets its own task, which runs the WebSocket
    /// handshake and then the connection handler. Also spawns the idle sweeper
    /// when an idle timeout is configured. Runs until the process is
    /// terminated.
    pub async fn run(mut self) -> Result<(), OxoError> {
        match self.local_addr() {
            Ok(addr) => tracing::info!(%addr, "OXO server listening"),
            Err(_) => tracing::info!("OXO server listening"),
        }

        let _sweeper = self
            .idle_timeout
            .map(|max_idle| spawn_idle_sweeper(Arc::clone(&self.state), max_idle));

        loop {
            match self.transport.accept().await {
                Ok(pending) => {
                    let state = Arc::clone(&self.state);
                    tokio::spawn(async move {
                        let addr = pending.peer_addr();
                        let conn =
                            match tokio::time::timeout(HANDSHAKE_TIMEOUT, pending.complete()).await {
                                Ok(Ok(conn)) => conn,
                                Ok(Err(e)) => {
                                    tracing::debug!(error = %e, "handshake failed");
                                    return;
                                }
                                Err(_) => {
                                    tracing::debug!(%addr, "handshake timed out");
                                    return;
                                }
                            };
                        tracing::info!(conn_id = %conn.id(), %addr, "connection accepted");
                        if let Err(e) = handle_connection(conn, state).await {
                            tracing::debug!(error = %e, "connection ended with error");
                        }
                    });
                }
                Err(e) => {
                    tracing::error!(error = %e, "accept failed");
                }
            }
        }
    }
}

/// Periodically closes rooms that have been idle for `max_idle`.
fn spawn_idle_sweeper<C: Codec>(state: Arc<ServerState<C>>, max_idle: Duration) -> JoinHandle<()> {
    let period = (max_idle / 2).max(MIN_SWEEP_PERIOD);
    tracing::info!(
        idle_secs = max_idle.as_secs(),
        period_ms = period.as_millis() as u64,
        "idle room sweep enabled"
    );

    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        // The first tick completes immediately.
        interval.tick().await;
        loop {
            interval.tick().await;
            let expired = state.rooms.sweep_idle(max_idle).await;
            if !expired.is_empty() {
                tracing::info!(count = expired.len(), "closed idle rooms");
            }
        }
    })
}

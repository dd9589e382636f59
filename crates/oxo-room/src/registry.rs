//! Room registry: creates, tracks, and routes connections to rooms.

use std::collections::HashMap;
use std::time::Duration;

use oxo_protocol::{RoomCode, ServerMessage, Symbol};
use oxo_transport::ConnectionId;
use rand::Rng;
use tokio::sync::Mutex;

use crate::actor::{RoomHandle, RoomInfo, spawn_room};
use crate::board::Outcome;
use crate::room::{LeaveOutcome, MemberSender, Room};
use crate::{RoomConfig, RoomError, RoomState};

/// Characters room codes are drawn from.
const CODE_CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// How many fresh codes `create` tries before giving up.
pub const MAX_CODE_ATTEMPTS: usize = 32;

/// Generates a random code of `len` characters from `[A-Z0-9]`.
fn generate_code(len: usize) -> String {
    let mut rng = rand::rng();
    (0..len)
        .map(|_| CODE_CHARSET[rng.random_range(0..CODE_CHARSET.len())] as char)
        .collect()
}

/// Maps room codes to running room actors.
///
/// The map lock is only held for map operations. Commands to a room are
/// sent after the lock is released, so a slow room never blocks lookups
/// for the others.
pub struct RoomRegistry {
    rooms: Mutex<HashMap<RoomCode, RoomHandle>>,
    config: RoomConfig,
}

impl RoomRegistry {
    pub fn new(config: RoomConfig) -> Self {
        Self {
            rooms: Mutex::new(HashMap::new()),
            config,
        }
    }

    pub fn config(&self) -> &RoomConfig {
        &self.config
    }

    /// Creates a room with `creator` seated as X and returns its code.
    ///
    /// `room_created` is queued on `sender` before the room becomes
    /// visible, so the creator always sees it ahead of the `game_start`
    /// that a quick joiner triggers.
    pub async fn create(
        &self,
        creator: ConnectionId,
        sender: MemberSender,
    ) -> Result<RoomCode, RoomError> {
        let mut rooms = self.rooms.lock().await;

        for _ in 0..MAX_CODE_ATTEMPTS {
            let code = RoomCode::new(generate_code(self.config.code_length));
            if rooms.contains_key(&code) {
                tracing::debug!(%code, "room code collision, retrying");
                continue;
            }

            let mut room = Room::new(code.clone());
            room.join(creator, sender.clone())?;
            let _ = sender.send(ServerMessage::RoomCreated {
                room_id: code.clone(),
            });

            let handle = spawn_room(room, self.config.channel_size);
            rooms.insert(code.clone(), handle);
            tracing::info!(%code, %creator, rooms = rooms.len(), "room created");
            return Ok(code);
        }

        tracing::error!(attempts = MAX_CODE_ATTEMPTS, "could not find a free room code");
        Err(RoomError::CodeSpaceExhausted(MAX_CODE_ATTEMPTS))
    }

    /// Returns a handle to the room registered under `code`.
    pub async fn lookup(&self, code: &RoomCode) -> Result<RoomHandle, RoomError> {
        self.rooms
            .lock()
            .await
            .get(code)
            .cloned()
            .ok_or_else(|| RoomError::NotFound(code.clone()))
    }

    pub async fn contains(&self, code: &RoomCode) -> bool {
        self.rooms.lock().await.contains_key(code)
    }

    /// Drops the mapping for `code`. Removing an unknown code is a no-op.
    pub async fn remove(&self, code: &RoomCode) -> Option<RoomHandle> {
        let removed = self.rooms.lock().await.remove(code);
        if removed.is_some() {
            tracing::info!(%code, "room removed");
        }
        removed
    }

    /// Drops the mapping only if it still points at `handle`'s actor.
    async fn remove_exact(&self, handle: &RoomHandle) -> bool {
        let mut rooms = self.rooms.lock().await;
        let matches = rooms
            .get(handle.code())
            .is_some_and(|current| current.same_room(handle));
        if matches {
            rooms.remove(handle.code());
            tracing::info!(code = %handle.code(), rooms = rooms.len(), "room removed");
        }
        matches
    }

    /// Seats `conn_id` in the room with `code`.
    pub async fn join(
        &self,
        code: &RoomCode,
        conn_id: ConnectionId,
        sender: MemberSender,
    ) -> Result<RoomState, RoomError> {
        let handle = self.lookup(code).await?;
        handle.join(conn_id, sender).await
    }

    /// Takes `conn_id` out of the room. The room is dropped from the
    /// registry once nobody is left in it.
    pub async fn leave(
        &self,
        code: &RoomCode,
        conn_id: ConnectionId,
    ) -> Result<LeaveOutcome, RoomError> {
        let handle = self.lookup(code).await?;
        let outcome = handle.leave(conn_id).await?;
        if outcome.remaining == 0 {
            self.remove_exact(&handle).await;
        }
        Ok(outcome)
    }

    pub async fn make_move(
        &self,
        code: &RoomCode,
        conn_id: ConnectionId,
        index: i64,
        symbol: Symbol,
    ) -> Result<Outcome, RoomError> {
        let handle = self.lookup(code).await?;
        handle.make_move(conn_id, index, symbol).await
    }

    pub async fn restart(&self, code: &RoomCode) -> Result<Symbol, RoomError> {
        let handle = self.lookup(code).await?;
        handle.restart().await
    }

    pub async fn info(&self, code: &RoomCode) -> Result<RoomInfo, RoomError> {
        let handle = self.lookup(code).await?;
        handle.info().await
    }

    /// Closes every room idle for at least `max_idle` and returns their
    /// codes. Members of a closed room receive `user_left`.
    pub async fn sweep_idle(&self, max_idle: Duration) -> Vec<RoomCode> {
        let handles: Vec<RoomHandle> = self.rooms.lock().await.values().cloned().collect();
        let mut expired = Vec::new();

        for handle in handles {
            let Ok(info) = handle.info().await else {
                continue;
            };
            if info.idle_for < max_idle {
                continue;
            }
            if !self.remove_exact(&handle).await {
                continue;
            }

            tracing::info!(
                code = %handle.code(),
                idle_secs = info.idle_for.as_secs(),
                members = info.member_count,
                "closing idle room"
            );
            let _ = handle.shutdown().await;
            expired.push(handle.code().clone());
        }

        expired
    }

    /// Number of registered rooms.
    pub async fn len(&self) -> usize {
        self.rooms.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.rooms.lock().await.is_empty()
    }

    /// Codes of all registered rooms, in no particular order.
    pub async fn codes(&self) -> Vec<RoomCode> {
        self.rooms.lock().await.keys().cloned().collect()
    }
}

impl Default for RoomRegistry {
    fn default() -> Self {
        Self::new(RoomConfig::default())
    }
}

//! Room actor: a Tokio task that owns one [`Room`].
//!
//! All access to a room goes through its command channel, so commands for
//! the same room are applied one at a time and in arrival order. Different
//! rooms run independently.

use std::time::Duration;

use oxo_protocol::{RoomCode, Symbol};
use oxo_transport::ConnectionId;
use tokio::sync::{mpsc, oneshot};

use crate::board::{Board, Outcome};
use crate::room::{LeaveOutcome, MemberSender, Room};
use crate::{RoomError, RoomState};

/// Commands sent to a room actor through its channel.
///
/// The `oneshot::Sender` in each variant is the reply channel.
pub(crate) enum RoomCommand {
    Join {
        conn_id: ConnectionId,
        sender: MemberSender,
        reply: oneshot::Sender<Result<RoomState, RoomError>>,
    },

    Leave {
        conn_id: ConnectionId,
        reply: oneshot::Sender<LeaveOutcome>,
    },

    Move {
        conn_id: ConnectionId,
        index: i64,
        symbol: Symbol,
        reply: oneshot::Sender<Result<Outcome, RoomError>>,
    },

    Restart {
        reply: oneshot::Sender<Symbol>,
    },

    /// Snapshot for the registry and tests. Does not count as activity.
    Info {
        reply: oneshot::Sender<RoomInfo>,
    },

    /// Notify members and stop.
    Shutdown,
}

/// A snapshot of a room.
#[derive(Debug, Clone)]
pub struct RoomInfo {
    pub code: RoomCode,
    pub state: RoomState,
    pub member_count: usize,
    pub board: Board,
    /// Symbol expected on the next move.
    pub turn: Symbol,
    /// Symbol that opened the current game.
    pub game_starter: Symbol,
    /// Symbol that will open the game after the next restart.
    pub next_starter: Symbol,
    /// Time since the last join, leave, move or restart.
    pub idle_for: Duration,
}

/// Handle to a running room actor.
///
/// Cheap to clone; it's an `mpsc::Sender` wrapper. The registry holds one
/// per room.
#[derive(Clone)]
pub struct RoomHandle {
    code: RoomCode,
    sender: mpsc::Sender<RoomCommand>,
}

impl RoomHandle {
    pub fn code(&self) -> &RoomCode {
        &self.code
    }

    /// Returns `true` if both handles talk to the same actor.
    ///
    /// Codes can be reused once a room is gone, so comparing codes is not
    /// enough.
    pub fn same_room(&self, other: &RoomHandle) -> bool {
        self.sender.same_channel(&other.sender)
    }

    fn unavailable(&self) -> RoomError {
        RoomError::Unavailable(self.code.clone())
    }

    /// Sends a command built around a fresh reply channel and waits for
    /// the answer.
    async fn request<T>(
        &self,
        build: impl FnOnce(oneshot::Sender<T>) -> RoomCommand,
    ) -> Result<T, RoomError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.sender
            .send(build(reply_tx))
            .await
            .map_err(|_| self.unavailable())?;
        reply_rx.await.map_err(|_| self.unavailable())
    }

    /// Seats a connection in the room.
    pub async fn join(
        &self,
        conn_id: ConnectionId,
        sender: MemberSender,
    ) -> Result<RoomState, RoomError> {
        self.request(|reply| RoomCommand::Join {
            conn_id,
            sender,
            reply,
        })
        .await?
    }

    /// Removes a connection. Once this reports zero remaining members the
    /// actor has stopped.
    pub async fn leave(&self, conn_id: ConnectionId) -> Result<LeaveOutcome, RoomError> {
        self.request(|reply| RoomCommand::Leave { conn_id, reply })
            .await
    }

    /// Submits a move.
    pub async fn make_move(
        &self,
        conn_id: ConnectionId,
        index: i64,
        symbol: Symbol,
    ) -> Result<Outcome, RoomError> {
        self.request(|reply| RoomCommand::Move {
            conn_id,
            index,
            symbol,
            reply,
        })
        .await?
    }

    /// Starts a rematch and returns the opening symbol.
    pub async fn restart(&self) -> Result<Symbol, RoomError> {
        self.request(|reply| RoomCommand::Restart { reply }).await
    }

    pub async fn info(&self) -> Result<RoomInfo, RoomError> {
        self.request(|reply| RoomCommand::Info { reply }).await
    }

    /// Tells the room to notify its members and stop.
    pub async fn shutdown(&self) -> Result<(), RoomError> {
        self.sender
            .send(RoomCommand::Shutdown)
            .await
            .map_err(|_| self.unavailable())
    }
}

struct RoomActor {
    room: Room,
    receiver: mpsc::Receiver<RoomCommand>,
}

impl RoomActor {
    /// Processes commands until the room empties or is shut down.
    async fn run(mut self) {
        tracing::debug!(code = %self.room.code(), "room actor started");

        while let Some(cmd) = self.receiver.recv().await {
            match cmd {
                RoomCommand::Join {
                    conn_id,
                    sender,
                    reply,
                } => {
                    let result = self.room.join(conn_id, sender);
                    let _ = reply.send(result);
                }
                RoomCommand::Leave { conn_id, reply } => {
                    let outcome = self.room.leave(conn_id);
                    let _ = reply.send(outcome);
                    if outcome.remaining == 0 {
                        break;
                    }
                }
                RoomCommand::Move {
                    conn_id,
                    index,
                    symbol,
                    reply,
                } => {
                    let result = self
                        .room
                        .make_move(conn_id, index, symbol)
                        .map_err(RoomError::from);
                    if let Err(e) = &result {
                        tracing::debug!(
                            code = %self.room.code(),
                            %conn_id,
                            error = %e,
                            "move refused"
                        );
                    }
                    let _ = reply.send(result);
                }
                RoomCommand::Restart { reply } => {
                    let _ = reply.send(self.room.restart());
                }
                RoomCommand::Info { reply } => {
                    let _ = reply.send(self.info());
                }
                RoomCommand::Shutdown => {
                    tracing::info!(code = %self.room.code(), "room shutting down");
                    self.room.close();
                    break;
                }
            }
        }

        tracing::debug!(code = %self.room.code(), "room actor stopped");
    }

    fn info(&self) -> RoomInfo {
        RoomInfo {
            code: self.room.code().clone(),
            state: self.room.state(),
            member_count: self.room.member_count(),
            board: *self.room.board(),
            turn: self.room.turn(),
            game_starter: self.room.game_starter(),
            next_starter: self.room.next_starter(),
            idle_for: self.room.idle_for(),
        }
    }
}

/// Spawns an actor for `room` and returns a handle to it.
///
/// `channel_size` bounds the command queue; senders wait when it is full.
pub(crate) fn spawn_room(room: Room, channel_size: usize) -> RoomHandle {
    let (tx, rx) = mpsc::channel(channel_size);
    let code = room.code().clone();

    tokio::spawn(RoomActor { room, receiver: rx }.run());

    RoomHandle { code, sender: tx }
}

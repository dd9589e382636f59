//! The per-room state machine.
//!
//! A [`Room`] is owned by exactly one actor task (see `actor.rs`), so every
//! method here runs to completion, broadcasts included, before the next
//! command for the same room is looked at.

use std::time::{Duration, Instant};

use oxo_protocol::{BOARD_CELLS, RoomCode, ServerMessage, Symbol, Winner};
use oxo_transport::ConnectionId;
use tokio::sync::mpsc;

use crate::board::{Board, Outcome, evaluate};
use crate::{MoveError, RoomError, RoomState};

/// Channel sender for delivering outbound messages to one connection.
///
/// When the connection's task has ended the receiver is gone and sends
/// fail; such members are skipped.
pub type MemberSender = mpsc::UnboundedSender<ServerMessage>;

/// The maximum number of members a room can hold.
pub const MAX_MEMBERS: usize = 2;

/// What a leave did to the room.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LeaveOutcome {
    /// Whether the connection was a member.
    pub removed: bool,
    /// Members left afterwards. At 0 the room is garbage.
    pub remaining: usize,
}

struct Member {
    conn_id: ConnectionId,
    symbol: Symbol,
    sender: MemberSender,
}

/// One match instance.
///
/// A member's symbol is fixed when it is seated: the first member plays X,
/// the second O. A member keeps its symbol for as long as it stays, and a
/// newcomer takes whichever seat is free. Rematches only move `turn` and
/// `game_starter`.
pub(crate) struct Room {
    code: RoomCode,
    members: Vec<Member>,
    board: Board,
    turn: Symbol,
    game_starter: Symbol,
    next_starter: Symbol,
    finished: bool,
    last_activity: Instant,
}

impl Room {
    pub(crate) fn new(code: RoomCode) -> Self {
        Self {
            code,
            members: Vec::with_capacity(MAX_MEMBERS),
            board: Board::new(),
            turn: Symbol::X,
            game_starter: Symbol::X,
            next_starter: Symbol::X,
            finished: false,
            last_activity: Instant::now(),
        }
    }

    pub(crate) fn code(&self) -> &RoomCode {
        &self.code
    }

    pub(crate) fn state(&self) -> RoomState {
        match (self.members.len() == MAX_MEMBERS, self.finished) {
            (false, _) => RoomState::Waiting,
            (true, false) => RoomState::Active,
            (true, true) => RoomState::Finished,
        }
    }

    pub(crate) fn member_count(&self) -> usize {
        self.members.len()
    }

    pub(crate) fn symbol_of(&self, conn_id: ConnectionId) -> Option<Symbol> {
        self.members
            .iter()
            .find(|m| m.conn_id == conn_id)
            .map(|m| m.symbol)
    }

    pub(crate) fn board(&self) -> &Board {
        &self.board
    }

    pub(crate) fn turn(&self) -> Symbol {
        self.turn
    }

    pub(crate) fn game_starter(&self) -> Symbol {
        self.game_starter
    }

    pub(crate) fn next_starter(&self) -> Symbol {
        self.next_starter
    }

    pub(crate) fn idle_for(&self) -> Duration {
        self.last_activity.elapsed()
    }

    fn touch(&mut self) {
        self.last_activity = Instant::now();
    }

    /// Seats a connection. The second seat starts the game.
    pub(crate) fn join(
        &mut self,
        conn_id: ConnectionId,
        sender: MemberSender,
    ) -> Result<RoomState, RoomError> {
        self.touch();
        if self.members.iter().any(|m| m.conn_id == conn_id) {
            return Err(RoomError::AlreadyInRoom(conn_id, self.code.clone()));
        }
        if self.members.len() >= MAX_MEMBERS {
            return Err(RoomError::RoomFull(self.code.clone()));
        }

        let symbol = if self.members.iter().any(|m| m.symbol == Symbol::X) {
            Symbol::O
        } else {
            Symbol::X
        };
        self.members.push(Member {
            conn_id,
            symbol,
            sender,
        });
        tracing::info!(
            code = %self.code,
            %conn_id,
            %symbol,
            members = self.members.len(),
            "player joined"
        );

        if self.members.len() == MAX_MEMBERS {
            tracing::info!(code = %self.code, "game started");
            self.broadcast(ServerMessage::GameStart {
                room_id: self.code.clone(),
            });
        }

        Ok(self.state())
    }

    /// Applies a move, broadcasting `move_made` and, if the game ended,
    /// `game_over`. Nothing changes when the move is refused.
    pub(crate) fn make_move(
        &mut self,
        conn_id: ConnectionId,
        index: i64,
        symbol: Symbol,
    ) -> Result<Outcome, MoveError> {
        self.touch();
        if self.symbol_of(conn_id).is_none() {
            return Err(MoveError::NotAMember(conn_id));
        }
        let state = self.state();
        if !state.accepts_moves() {
            return Err(MoveError::NotActive(state));
        }
        let cell = usize::try_from(index)
            .ok()
            .filter(|&i| i < BOARD_CELLS)
            .ok_or(MoveError::OutOfRange(index))?;
        if self.board.cell(cell).is_some() {
            return Err(MoveError::Occupied(cell));
        }
        if symbol != self.turn {
            return Err(MoveError::WrongTurn {
                expected: self.turn,
                got: symbol,
            });
        }

        self.board.place(cell, symbol);
        self.turn = symbol.other();
        self.broadcast(ServerMessage::MoveMade {
            index: cell,
            symbol,
            next_turn: self.turn,
        });

        let outcome = evaluate(&self.board);
        match outcome {
            Outcome::Win { symbol: winner, line } => {
                self.next_starter = winner;
                self.finished = true;
                tracing::info!(code = %self.code, %winner, ?line, "game won");
                self.broadcast(ServerMessage::GameOver {
                    winner: winner.into(),
                    line: Some(line),
                });
            }
            Outcome::Draw => {
                // Whoever did not open this game opens the next one.
                self.next_starter = self.game_starter.other();
                self.finished = true;
                tracing::info!(code = %self.code, "game drawn");
                self.broadcast(ServerMessage::GameOver {
                    winner: Winner::Draw,
                    line: None,
                });
            }
            Outcome::InProgress => {}
        }

        Ok(outcome)
    }

    /// Clears the board for a rematch and returns the symbol that opens it.
    ///
    /// Repeating a restart lands in the same state.
    pub(crate) fn restart(&mut self) -> Symbol {
        self.touch();
        self.board.clear();
        self.turn = self.next_starter;
        self.game_starter = self.next_starter;
        self.finished = false;
        tracing::info!(code = %self.code, turn = %self.turn, "game restarted");
        self.broadcast(ServerMessage::RestartGame { turn: self.turn });
        self.turn
    }

    /// Removes a connection. The remaining member is told if someone
    /// actually left.
    pub(crate) fn leave(&mut self, conn_id: ConnectionId) -> LeaveOutcome {
        self.touch();
        let before = self.members.len();
        self.members.retain(|m| m.conn_id != conn_id);
        let removed = self.members.len() < before;

        if removed {
            tracing::info!(
                code = %self.code,
                %conn_id,
                members = self.members.len(),
                "player left"
            );
            self.broadcast(ServerMessage::UserLeft);
        }

        LeaveOutcome {
            removed,
            remaining: self.members.len(),
        }
    }

    /// Tells everyone the room is going away and drops all members.
    pub(crate) fn close(&mut self) {
        self.broadcast(ServerMessage::UserLeft);
        self.members.clear();
    }

    /// Pushes the same message to every member whose connection is still up.
    fn broadcast(&self, msg: ServerMessage) {
        for member in &self.members {
            if member.sender.send(msg.clone()).is_err() {
                tracing::debug!(
                    code = %self.code,
                    conn_id = %member.conn_id,
                    "skipping closed member"
                );
            }
        }
    }
}

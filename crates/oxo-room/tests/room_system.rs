//! Integration tests for the room system: registry, actors and the game
//! state machine driven together.

use std::time::Duration;

use oxo_protocol::{RoomCode, ServerMessage, Symbol, Winner};
use oxo_room::{LeaveOutcome, Outcome, RoomConfig, RoomError, RoomRegistry, RoomState};
use oxo_transport::ConnectionId;
use tokio::sync::mpsc::{self, UnboundedReceiver};

// =========================================================================
// Helpers
// =========================================================================

fn cid(id: u64) -> ConnectionId {
    ConnectionId::new(id)
}

/// Receives the next message, failing the test after a short wait.
async fn next(rx: &mut UnboundedReceiver<ServerMessage>) -> ServerMessage {
    tokio::time::timeout(Duration::from_secs(1), rx.recv())
        .await
        .expect("timed out waiting for message")
        .expect("channel closed")
}

fn drain(rx: &mut UnboundedReceiver<ServerMessage>) -> Vec<ServerMessage> {
    let mut out = Vec::new();
    while let Ok(msg) = rx.try_recv() {
        out.push(msg);
    }
    out
}

/// A registry with one active room: conn 1 holds X, conn 2 holds O.
/// Creation and start messages are already consumed.
async fn active_room() -> (
    RoomRegistry,
    RoomCode,
    UnboundedReceiver<ServerMessage>,
    UnboundedReceiver<ServerMessage>,
) {
    let registry = RoomRegistry::default();
    let (tx1, mut rx1) = mpsc::unbounded_channel();
    let (tx2, mut rx2) = mpsc::unbounded_channel();

    let code = registry.create(cid(1), tx1).await.unwrap();
    registry.join(&code, cid(2), tx2).await.unwrap();
    drain(&mut rx1);
    drain(&mut rx2);

    (registry, code, rx1, rx2)
}

/// Plays `moves` as (conn, index) with the symbol whose turn it is.
async fn play(registry: &RoomRegistry, code: &RoomCode, moves: &[(u64, i64)]) {
    for &(conn, index) in moves {
        let turn = registry.info(code).await.unwrap().turn;
        registry
            .make_move(code, cid(conn), index, turn)
            .await
            .unwrap_or_else(|e| panic!("move {index} refused: {e}"));
    }
}

// =========================================================================
// Create / join
// =========================================================================

#[tokio::test]
async fn test_create_sends_room_created_to_creator() {
    let registry = RoomRegistry::default();
    let (tx, mut rx) = mpsc::unbounded_channel();

    let code = registry.create(cid(1), tx).await.unwrap();

    assert_eq!(
        next(&mut rx).await,
        ServerMessage::RoomCreated {
            room_id: code.clone()
        }
    );
    let info = registry.info(&code).await.unwrap();
    assert_eq!(info.state, RoomState::Waiting);
    assert_eq!(info.member_count, 1);
}

#[tokio::test]
async fn test_codes_are_five_uppercase_alphanumerics() {
    let registry = RoomRegistry::default();
    for id in 0..20 {
        let (tx, _rx) = mpsc::unbounded_channel();
        let code = registry.create(cid(id), tx).await.unwrap();
        assert_eq!(code.as_str().len(), 5);
        assert!(
            code.as_str()
                .chars()
                .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()),
            "{code}"
        );
    }
    assert_eq!(registry.len().await, 20);
}

#[tokio::test]
async fn test_join_starts_game_for_both() {
    let registry = RoomRegistry::default();
    let (tx1, mut rx1) = mpsc::unbounded_channel();
    let (tx2, mut rx2) = mpsc::unbounded_channel();
    let code = registry.create(cid(1), tx1).await.unwrap();

    let state = registry.join(&code, cid(2), tx2).await.unwrap();

    assert_eq!(state, RoomState::Active);
    let start = ServerMessage::GameStart {
        room_id: code.clone(),
    };
    assert_eq!(
        drain(&mut rx1),
        vec![
            ServerMessage::RoomCreated {
                room_id: code.clone()
            },
            start.clone()
        ]
    );
    assert_eq!(drain(&mut rx2), vec![start]);
}

#[tokio::test]
async fn test_join_accepts_lowercase_code() {
    let registry = RoomRegistry::default();
    let (tx1, _rx1) = mpsc::unbounded_channel();
    let (tx2, _rx2) = mpsc::unbounded_channel();
    let code = registry.create(cid(1), tx1).await.unwrap();

    let typed = RoomCode::new(code.as_str().to_lowercase());
    assert_eq!(
        registry.join(&typed, cid(2), tx2).await.unwrap(),
        RoomState::Active
    );
}

#[tokio::test]
async fn test_join_unknown_room_is_not_found() {
    let registry = RoomRegistry::default();
    let (tx, mut rx) = mpsc::unbounded_channel();

    let result = registry.join(&RoomCode::new("ZZZZZ"), cid(1), tx).await;

    let err = result.unwrap_err();
    assert!(matches!(err, RoomError::NotFound(_)));
    assert_eq!(err.client_message(), "Room not found");
    assert!(drain(&mut rx).is_empty());
}

#[tokio::test]
async fn test_third_join_is_room_full() {
    let (registry, code, mut rx1, mut rx2) = active_room().await;
    let (tx3, mut rx3) = mpsc::unbounded_channel();

    let err = registry.join(&code, cid(3), tx3).await.unwrap_err();

    assert!(matches!(err, RoomError::RoomFull(_)));
    assert_eq!(err.client_message(), "Room full");
    assert!(drain(&mut rx1).is_empty());
    assert!(drain(&mut rx2).is_empty());
    assert!(drain(&mut rx3).is_empty());
}

// =========================================================================
// Moves
// =========================================================================

#[tokio::test]
async fn test_accepted_move_reaches_both_members() {
    let (registry, code, mut rx1, mut rx2) = active_room().await;

    registry.make_move(&code, cid(1), 4, Symbol::X).await.unwrap();

    let made = ServerMessage::MoveMade {
        index: 4,
        symbol: Symbol::X,
        next_turn: Symbol::O,
    };
    assert_eq!(next(&mut rx1).await, made);
    assert_eq!(next(&mut rx2).await, made);
}

#[tokio::test]
async fn test_wrong_turn_is_silently_refused() {
    let (registry, code, mut rx1, mut rx2) = active_room().await;

    let result = registry.make_move(&code, cid(2), 0, Symbol::O).await;

    assert!(matches!(result, Err(RoomError::InvalidMove(_))));
    assert!(registry.info(&code).await.unwrap().board.is_clear());
    assert!(drain(&mut rx1).is_empty());
    assert!(drain(&mut rx2).is_empty());
}

#[tokio::test]
async fn test_concurrent_moves_for_same_turn_accept_exactly_one() {
    let (registry, code, mut rx1, mut rx2) = active_room().await;

    // Both members go for the centre at once. Whichever order the actor
    // sees them in, only X's move can land.
    let (x, o) = tokio::join!(
        registry.make_move(&code, cid(1), 4, Symbol::X),
        registry.make_move(&code, cid(2), 4, Symbol::O),
    );

    assert!(x.is_ok());
    assert!(matches!(o, Err(RoomError::InvalidMove(_))));
    let info = registry.info(&code).await.unwrap();
    assert_eq!(info.board.cell(4), Some(Symbol::X));
    assert_eq!(info.board.cells().iter().flatten().count(), 1);
    assert_eq!(info.turn, Symbol::O);
    assert_eq!(drain(&mut rx1).len(), 1);
    assert_eq!(drain(&mut rx2).len(), 1);
}

#[tokio::test]
async fn test_move_in_unknown_room_is_not_found() {
    let registry = RoomRegistry::default();
    let result = registry
        .make_move(&RoomCode::new("NOPE1"), cid(1), 0, Symbol::X)
        .await;
    assert!(matches!(result, Err(RoomError::NotFound(_))));
}

// =========================================================================
// Game over / restart
// =========================================================================

#[tokio::test]
async fn test_win_is_broadcast_with_line() {
    let (registry, code, mut rx1, mut rx2) = active_room().await;
    play(&registry, &code, &[(1, 0), (2, 3), (1, 1), (2, 4)]).await;
    drain(&mut rx1);
    drain(&mut rx2);

    let outcome = registry.make_move(&code, cid(1), 2, Symbol::X).await.unwrap();

    assert_eq!(
        outcome,
        Outcome::Win {
            symbol: Symbol::X,
            line: [0, 1, 2]
        }
    );
    let over = ServerMessage::GameOver {
        winner: Winner::X,
        line: Some([0, 1, 2]),
    };
    for rx in [&mut rx1, &mut rx2] {
        let msgs = drain(rx);
        assert_eq!(msgs.len(), 2);
        assert_eq!(msgs[1], over);
    }
    assert_eq!(
        registry.info(&code).await.unwrap().state,
        RoomState::Finished
    );
}

#[tokio::test]
async fn test_restart_after_draw_alternates_opener() {
    let (registry, code, mut rx1, mut rx2) = active_room().await;
    play(
        &registry,
        &code,
        &[(1, 0), (2, 1), (1, 2), (2, 4), (1, 3), (2, 5), (1, 7), (2, 6), (1, 8)],
    )
    .await;
    drain(&mut rx1);
    drain(&mut rx2);

    let turn = registry.restart(&code).await.unwrap();

    assert_eq!(turn, Symbol::O);
    let restart = ServerMessage::RestartGame { turn: Symbol::O };
    assert_eq!(next(&mut rx1).await, restart);
    assert_eq!(next(&mut rx2).await, restart);

    let info = registry.info(&code).await.unwrap();
    assert!(info.board.is_clear());
    assert_eq!(info.turn, Symbol::O);
    assert_eq!(info.game_starter, Symbol::O);
    assert_eq!(info.state, RoomState::Active);

    // O opens; an X move now is out of turn.
    assert!(registry.make_move(&code, cid(1), 0, Symbol::X).await.is_err());
    registry.make_move(&code, cid(2), 0, Symbol::O).await.unwrap();
}

#[tokio::test]
async fn test_restart_in_unknown_room_is_not_found() {
    let registry = RoomRegistry::default();
    let result = registry.restart(&RoomCode::new("NOPE1")).await;
    assert!(matches!(result, Err(RoomError::NotFound(_))));
}

// =========================================================================
// Leave
// =========================================================================

#[tokio::test]
async fn test_leave_notifies_other_and_keeps_room() {
    let (registry, code, mut rx1, mut rx2) = active_room().await;

    let outcome = registry.leave(&code, cid(2)).await.unwrap();

    assert_eq!(
        outcome,
        LeaveOutcome {
            removed: true,
            remaining: 1
        }
    );
    assert_eq!(next(&mut rx1).await, ServerMessage::UserLeft);
    assert!(drain(&mut rx2).is_empty());
    assert!(registry.contains(&code).await);
    assert_eq!(
        registry.info(&code).await.unwrap().state,
        RoomState::Waiting
    );
}

#[tokio::test]
async fn test_room_removed_when_last_member_leaves() {
    let (registry, code, _rx1, _rx2) = active_room().await;

    registry.leave(&code, cid(1)).await.unwrap();
    registry.leave(&code, cid(2)).await.unwrap();

    assert!(!registry.contains(&code).await);
    assert!(registry.is_empty().await);
    let (tx, _rx) = mpsc::unbounded_channel();
    assert!(matches!(
        registry.join(&code, cid(3), tx).await,
        Err(RoomError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_leave_by_non_member_is_quiet() {
    let (registry, code, mut rx1, mut rx2) = active_room().await;

    let outcome = registry.leave(&code, cid(9)).await.unwrap();

    assert!(!outcome.removed);
    assert_eq!(outcome.remaining, 2);
    assert!(drain(&mut rx1).is_empty());
    assert!(drain(&mut rx2).is_empty());
}

#[tokio::test]
async fn test_seat_reopens_after_leave() {
    let (registry, code, mut rx1, _rx2) = active_room().await;
    registry.leave(&code, cid(2)).await.unwrap();
    drain(&mut rx1);

    let (tx3, mut rx3) = mpsc::unbounded_channel();
    assert_eq!(
        registry.join(&code, cid(3), tx3).await.unwrap(),
        RoomState::Active
    );
    let start = ServerMessage::GameStart {
        room_id: code.clone(),
    };
    assert_eq!(next(&mut rx1).await, start);
    assert_eq!(next(&mut rx3).await, start);
}

// =========================================================================
// Idle sweep
// =========================================================================

#[tokio::test]
async fn test_sweep_closes_idle_rooms() {
    let (registry, code, mut rx1, mut rx2) = active_room().await;

    let expired = registry.sweep_idle(Duration::ZERO).await;

    assert_eq!(expired, vec![code.clone()]);
    assert!(!registry.contains(&code).await);
    assert_eq!(next(&mut rx1).await, ServerMessage::UserLeft);
    assert_eq!(next(&mut rx2).await, ServerMessage::UserLeft);
}

#[tokio::test]
async fn test_sweep_keeps_recent_rooms() {
    let (registry, code, _rx1, _rx2) = active_room().await;

    let expired = registry.sweep_idle(Duration::from_secs(3600)).await;

    assert!(expired.is_empty());
    assert!(registry.contains(&code).await);
}

#[tokio::test]
async fn test_registry_uses_configured_code_length() {
    let registry = RoomRegistry::new(RoomConfig {
        code_length: 8,
        ..RoomConfig::default()
    });
    let (tx, _rx) = mpsc::unbounded_channel();
    let code = registry.create(cid(1), tx).await.unwrap();
    assert_eq!(code.as_str().len(), 8);
    assert_eq!(registry.codes().await, vec![code]);
}

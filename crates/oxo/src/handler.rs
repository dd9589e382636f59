//! Per-connection handler: decode, dispatch, and write back.
//!
//! Each accepted connection gets its own Tokio task running this handler.
//! The task waits on two things at once:
//!   1. inbound frames from the socket, decoded and dispatched to rooms
//!   2. outbound messages that rooms pushed into this connection's channel

use std::sync::Arc;

use oxo_protocol::{ClientMessage, Codec, RoomCode, ServerMessage};
use oxo_room::{MemberSender, RoomError};
use oxo_transport::{Connection, ConnectionId, WebSocketConnection};
use tokio::sync::mpsc;

use crate::OxoError;
use crate::server::ServerState;

/// Drop guard that tears down a connection's session when the handler
/// exits, and takes the connection out of its room.
///
/// This runs even if the handler returns early with an error. Since
/// `Drop` is synchronous, we spawn a fire-and-forget task for the async
/// locks.
struct SessionGuard<C: Codec> {
    conn_id: ConnectionId,
    state: Arc<ServerState<C>>,
}

impl<C: Codec> Drop for SessionGuard<C> {
    fn drop(&mut self) {
        let conn_id = self.conn_id;
        let state = Arc::clone(&self.state);
        tokio::spawn(async move {
            let bound = state.sessions.lock().await.disconnect(conn_id);
            match bound {
                Ok(Some(code)) => {
                    if let Err(e) = state.rooms.leave(&code, conn_id).await {
                        tracing::debug!(%conn_id, %code, error = %e, "leave on disconnect failed");
                    }
                }
                Ok(None) => {}
                Err(e) => tracing::debug!(%conn_id, error = %e, "no session to disconnect"),
            }
        });
    }
}

/// Handles a single connection from accept to close.
pub(crate) async fn handle_connection<C: Codec>(
    conn: WebSocketConnection,
    state: Arc<ServerState<C>>,
) -> Result<(), OxoError> {
    let conn_id = conn.id();

    // Create session and guard together. If creation fails no guard is
    // needed; if it succeeds the guard is immediately active.
    state.sessions.lock().await.create(conn_id)?;
    let _guard = SessionGuard {
        conn_id,
        state: Arc::clone(&state),
    };

    let (tx, mut rx) = mpsc::unbounded_channel::<ServerMessage>();

    loop {
        tokio::select! {
            inbound = conn.recv() => {
                let data = match inbound {
                    Ok(Some(data)) => data,
                    Ok(None) => {
                        tracing::info!(%conn_id, "connection closed");
                        break;
                    }
                    Err(e) => {
                        tracing::debug!(%conn_id, error = %e, "recv error");
                        break;
                    }
                };

                let msg: ClientMessage = match state.codec.decode(&data) {
                    Ok(msg) => msg,
                    Err(e) => {
                        tracing::warn!(
                            %conn_id,
                            error = %e,
                            bytes = data.len(),
                            "dropping malformed message"
                        );
                        continue;
                    }
                };

                tracing::debug!(%conn_id, kind = msg.kind(), "message received");
                dispatch(&state, conn_id, &tx, msg).await;
            }

            // `tx` lives in this scope, so the channel never closes here.
            Some(outbound) = rx.recv() => {
                let bytes = state.codec.encode(&outbound)?;
                conn.send(&bytes).await?;
            }
        }
    }

    // _guard drops here → session disconnect and room leave fire.
    Ok(())
}

/// Applies one client message.
///
/// Refused moves and restarts are logged and dropped. Refused creates and
/// joins answer the sender with an `error` message.
async fn dispatch<C: Codec>(
    state: &ServerState<C>,
    conn_id: ConnectionId,
    tx: &MemberSender,
    msg: ClientMessage,
) {
    match msg {
        ClientMessage::CreateRoom => {
            if let Err(e) = ensure_unbound(state, conn_id).await {
                reply_error(tx, &e);
                return;
            }
            match state.rooms.create(conn_id, tx.clone()).await {
                Ok(code) => bind(state, conn_id, code).await,
                Err(e) => {
                    tracing::warn!(%conn_id, error = %e, "create room failed");
                    reply_error(tx, &e);
                }
            }
        }

        ClientMessage::JoinRoom { room_id } => {
            if let Err(e) = ensure_unbound(state, conn_id).await {
                reply_error(tx, &e);
                return;
            }
            match state.rooms.join(&room_id, conn_id, tx.clone()).await {
                Ok(_) => bind(state, conn_id, room_id).await,
                Err(e) => {
                    tracing::info!(%conn_id, code = %room_id, error = %e, "join refused");
                    reply_error(tx, &e);
                }
            }
        }

        ClientMessage::MakeMove {
            room_id,
            index,
            symbol,
        } => {
            if let Err(e) = state.rooms.make_move(&room_id, conn_id, index, symbol).await {
                tracing::debug!(%conn_id, code = %room_id, index, ?symbol, error = %e, "move dropped");
            }
        }

        ClientMessage::Restart { room_id } => {
            if let Err(e) = state.rooms.restart(&room_id).await {
                tracing::debug!(%conn_id, code = %room_id, error = %e, "restart dropped");
            }
        }

        ClientMessage::LeaveRoom { room_id } => {
            if let Err(e) = state.rooms.leave(&room_id, conn_id).await {
                tracing::debug!(%conn_id, code = %room_id, error = %e, "leave dropped");
            }
            state.sessions.lock().await.unbind(conn_id, &room_id);
        }
    }
}

/// Fails if the connection already sits in a live room. A binding to a
/// room that no longer exists (emptied or swept) is cleared.
async fn ensure_unbound<C: Codec>(
    state: &ServerState<C>,
    conn_id: ConnectionId,
) -> Result<(), RoomError> {
    let Some(code) = current_room(state, conn_id).await else {
        return Ok(());
    };

    if state.rooms.contains(&code).await {
        return Err(RoomError::AlreadyInRoom(conn_id, code));
    }

    tracing::debug!(%conn_id, %code, "clearing binding to closed room");
    state.sessions.lock().await.unbind(conn_id, &code);
    Ok(())
}

async fn current_room<C: Codec>(state: &ServerState<C>, conn_id: ConnectionId) -> Option<RoomCode> {
    state.sessions.lock().await.bound_room(conn_id).cloned()
}

async fn bind<C: Codec>(state: &ServerState<C>, conn_id: ConnectionId, code: RoomCode) {
    if let Err(e) = state.sessions.lock().await.bind(conn_id, code) {
        tracing::warn!(%conn_id, error = %e, "could not bind session");
    }
}

/// Queues an `error` message for this connection only.
fn reply_error(tx: &MemberSender, err: &RoomError) {
    let _ = tx.send(ServerMessage::Error {
        message: err.client_message().to_string(),
    });
}

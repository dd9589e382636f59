//! The session manager: tracks every live connection and its room binding.
//!
//! # Concurrency note
//!
//! `SessionManager` is not thread-safe by itself. The server keeps it
//! behind a mutex and never holds that lock across a room command.

use std::collections::HashMap;
use std::collections::hash_map::Entry;

use oxo_protocol::RoomCode;
use oxo_transport::ConnectionId;

use crate::{Session, SessionError};

/// Manages all live connection sessions.
///
/// ## Lifecycle
///
/// ```text
/// create() ──→ bind() ──→ unbind() ──→ bind() ... ──→ disconnect()
///   [unbound]   [bound]    [unbound]                  (removed, returns
///                                                      the bound room)
/// ```
#[derive(Debug, Default)]
pub struct SessionManager {
    sessions: HashMap<ConnectionId, Session>,
}

impl SessionManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts tracking a freshly accepted connection.
    ///
    /// # Errors
    /// Returns [`SessionError::AlreadyConnected`] if the id is in use.
    pub fn create(&mut self, conn_id: ConnectionId) -> Result<&Session, SessionError> {
        match self.sessions.entry(conn_id) {
            Entry::Occupied(_) => Err(SessionError::AlreadyConnected(conn_id)),
            Entry::Vacant(slot) => {
                tracing::debug!(%conn_id, "session created");
                Ok(slot.insert(Session::new(conn_id)))
            }
        }
    }

    /// Records that `conn_id` now sits in room `code`.
    ///
    /// # Errors
    /// - [`SessionError::NotFound`] if the connection has no session
    /// - [`SessionError::AlreadyBound`] if it is bound to another room
    pub fn bind(&mut self, conn_id: ConnectionId, code: RoomCode) -> Result<(), SessionError> {
        let session = self
            .sessions
            .get_mut(&conn_id)
            .ok_or(SessionError::NotFound(conn_id))?;

        match &session.bound_room {
            Some(current) if *current == code => Ok(()),
            Some(current) => Err(SessionError::AlreadyBound(conn_id, current.clone())),
            None => {
                tracing::debug!(%conn_id, %code, "session bound");
                session.bound_room = Some(code);
                Ok(())
            }
        }
    }

    /// Clears the binding if it points at `code`. Returns whether anything
    /// was cleared.
    pub fn unbind(&mut self, conn_id: ConnectionId, code: &RoomCode) -> bool {
        let Some(session) = self.sessions.get_mut(&conn_id) else {
            return false;
        };
        if session.bound_room.as_ref() != Some(code) {
            return false;
        }
        session.bound_room = None;
        tracing::debug!(%conn_id, %code, "session unbound");
        true
    }

    /// The room `conn_id` is bound to, if any.
    pub fn bound_room(&self, conn_id: ConnectionId) -> Option<&RoomCode> {
        self.sessions.get(&conn_id)?.bound_room.as_ref()
    }

    /// Removes the session and returns the room it was bound to, so the
    /// caller can leave it.
    ///
    /// # Errors
    /// Returns [`SessionError::NotFound`] if no session exists.
    pub fn disconnect(&mut self, conn_id: ConnectionId) -> Result<Option<RoomCode>, SessionError> {
        let session = self
            .sessions
            .remove(&conn_id)
            .ok_or(SessionError::NotFound(conn_id))?;

        tracing::debug!(
            %conn_id,
            room = ?session.bound_room,
            age_ms = session.age().as_millis() as u64,
            "session removed"
        );
        Ok(session.bound_room)
    }

    /// Returns the number of live sessions.
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

// =========================================================================
// Tests
// =========================================================================

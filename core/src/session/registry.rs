//! Owner for many independent sessions.
//!
//! The registry does no locking. An embedding server that shares it between
//! tasks wraps it in its own lock, or keeps one registry per worker.

use std::collections::HashMap;

use tracing::debug;

use super::{Session, SessionError, SessionId};

#[derive(Debug, Default)]
pub struct SessionRegistry {
    sessions: HashMap<SessionId, Session>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a fresh session and return its id
    pub fn create(&mut self) -> SessionId {
        let session = Session::new();
        let id = session.id();
        self.sessions.insert(id, session);
        debug!(session = %id, "session created");
        id
    }

    /// Add an existing session, replacing any session with the same id
    pub fn insert(&mut self, session: Session) -> Option<Session> {
        self.sessions.insert(session.id(), session)
    }

    pub fn get(&self, id: SessionId) -> Option<&Session> {
        self.sessions.get(&id)
    }

    pub fn get_mut(&mut self, id: SessionId) -> Option<&mut Session> {
        self.sessions.get_mut(&id)
    }

    /// Like `get_mut`, but a missing session is an error
    pub fn session_mut(&mut self, id: SessionId) -> Result<&mut Session, SessionError> {
        self.sessions
            .get_mut(&id)
            .ok_or(SessionError::UnknownSession(id))
    }

    pub fn remove(&mut self, id: SessionId) -> Option<Session> {
        let removed = self.sessions.remove(&id);
        if removed.is_some() {
            debug!(session = %id, "session removed");
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

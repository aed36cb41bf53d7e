//! Session registry: the sidebar's list of known sessions.

use serde::Serialize;
use tracing::{debug, warn};

use crate::api::{ApiError, Session, SessionId};
use crate::controller::{Controller, Effect};

/// Ordered list of sessions shown in the sidebar.
#[derive(Clone, Debug, Default, Serialize)]
pub struct SessionRegistry {
    sessions: Vec<Session>,
}

impl SessionRegistry {
    /// Sessions in display order.
    #[must_use]
    pub fn sessions(&self) -> &[Session] {
        &self.sessions
    }

    /// Number of sessions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    /// Whether the sidebar is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Look up a session by identifier.
    #[must_use]
    pub fn get(&self, id: &SessionId) -> Option<&Session> {
        self.sessions.iter().find(|session| &session.id == id)
    }

    /// Session at a sidebar position (0-based).
    #[must_use]
    pub fn at(&self, index: usize) -> Option<&Session> {
        self.sessions.get(index)
    }

    /// Replace the list with the backend's, keeping its order.
    pub fn load(&mut self, sessions: Vec<Session>) {
        self.sessions = sessions;
    }

    /// Put a newly created session at the top.
    ///
    /// A session already listed is moved rather than duplicated.
    pub fn prepend(&mut self, session: Session) {
        self.sessions.retain(|existing| existing.id != session.id);
        self.sessions.insert(0, session);
    }
}

impl Controller {
    pub(crate) fn refresh_sessions(&self) -> Vec<Effect> {
        if !self.mode().has_sessions() {
            debug!("no session list in legacy mode");
            return Vec::new();
        }
        vec![Effect::ListSessions]
    }

    pub(crate) fn on_sessions_listed(&mut self, result: Result<Vec<Session>, ApiError>) {
        match result {
            Ok(sessions) => {
                debug!("loaded {} sessions", sessions.len());
                self.registry.load(sessions);
            }
            // Not surfaced to the user, the sidebar keeps what it had.
            Err(err) => warn!("failed to list sessions: {err}"),
        }
    }
}

//! In-memory session store of the stub backend.

use tokio::sync::RwLock;
use url::Url;

use crate::api::types::{ConversationTurn, SessionDocument};
use crate::api::{Session, SessionId};

/// Maximum number of sessions returned by `GET /sessions`.
pub const SESSION_LIST_LIMIT: usize = 100;

/// A crawled site and its transcript.
#[derive(Clone, Debug)]
pub struct StoredSession {
    /// Identifier and title.
    pub session: Session,
    /// Crawled URL.
    pub url: String,
    /// Question/answer history.
    pub conversation: Vec<ConversationTurn>,
}

impl StoredSession {
    fn document(&self) -> SessionDocument {
        SessionDocument {
            session_id: Some(self.session.id.clone()),
            title: Some(self.session.title.clone()),
            url: Some(self.url.clone()),
            conversation: self.conversation.clone(),
        }
    }
}

/// Why a stub operation was refused.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StubError {
    /// URL did not parse or has no host.
    InvalidUrl(String),
    /// No session with that identifier.
    SessionNotFound,
    /// Legacy `/ask` before any `/load-url`.
    NothingLoaded,
}

/// Shared state of the stub backend.
#[derive(Debug, Default)]
pub struct StubState {
    /// Sessions, oldest first.
    sessions: RwLock<Vec<StoredSession>>,
    /// The one session of the legacy endpoints.
    legacy: RwLock<Option<StoredSession>>,
}

impl StubState {
    /// Empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Crawl `url` into a new session.
    ///
    /// # Errors
    /// Returns an error if the URL is invalid.
    pub async fn create_session(&self, url: &str) -> Result<Session, StubError> {
        let stored = crawl(url)?;
        let session = stored.session.clone();
        self.sessions.write().await.push(stored);
        tracing::info!("stub created session {} for {url}", session.id);
        Ok(session)
    }

    /// Sessions newest first, capped at [`SESSION_LIST_LIMIT`].
    pub async fn list_sessions(&self) -> Vec<Session> {
        self.sessions
            .read()
            .await
            .iter()
            .rev()
            .take(SESSION_LIST_LIMIT)
            .map(|stored| stored.session.clone())
            .collect()
    }

    /// Full document of a session.
    ///
    /// # Errors
    /// Returns an error if the session does not exist.
    pub async fn session_document(&self, id: &SessionId) -> Result<SessionDocument, StubError> {
        self.sessions
            .read()
            .await
            .iter()
            .find(|stored| &stored.session.id == id)
            .map(StoredSession::document)
            .ok_or(StubError::SessionNotFound)
    }

    /// Answer a question within a session and record the turn.
    ///
    /// # Errors
    /// Returns an error if the session does not exist.
    pub async fn ask(&self, id: &SessionId, question: &str) -> Result<String, StubError> {
        let mut sessions = self.sessions.write().await;
        let stored = sessions
            .iter_mut()
            .find(|stored| &stored.session.id == id)
            .ok_or(StubError::SessionNotFound)?;
        Ok(record_answer(stored, question))
    }

    /// Replace the legacy session by a crawl of `url`.
    ///
    /// # Errors
    /// Returns an error if the URL is invalid.
    pub async fn load_legacy(&self, url: &str) -> Result<(), StubError> {
        let stored = crawl(url)?;
        *self.legacy.write().await = Some(stored);
        Ok(())
    }

    /// Answer a question against the legacy session.
    ///
    /// # Errors
    /// Returns an error if no URL has been loaded.
    pub async fn ask_legacy(&self, question: &str) -> Result<String, StubError> {
        let mut legacy = self.legacy.write().await;
        let stored = legacy.as_mut().ok_or(StubError::NothingLoaded)?;
        Ok(record_answer(stored, question))
    }
}

/// Stand-in for the crawler: validates the URL and titles it by host.
fn crawl(url: &str) -> Result<StoredSession, StubError> {
    let parsed = Url::parse(url.trim()).map_err(|e| StubError::InvalidUrl(e.to_string()))?;
    let host = parsed
        .host_str()
        .ok_or_else(|| StubError::InvalidUrl("URL has no host".to_string()))?;

    Ok(StoredSession {
        session: Session::new(uuid::Uuid::new_v4().to_string(), host),
        url: parsed.to_string(),
        conversation: Vec::new(),
    })
}

/// Stand-in for the answering engine.
fn record_answer(stored: &mut StoredSession, question: &str) -> String {
    let answer = format!(
        "Based on {} ({} earlier questions): you asked \"{question}\".",
        stored.session.title,
        stored.conversation.len()
    );
    stored
        .conversation
        .push(ConversationTurn::new(question, answer.clone()));
    answer
}

//! Domain types exchanged with the chat backend, plus their wire shapes.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Opaque, backend-assigned session identifier.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    /// Wrap a raw identifier.
    #[inline]
    #[must_use]
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Borrow the raw identifier.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SessionId {
    #[inline]
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for SessionId {
    #[inline]
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// One crawl+chat context, as listed in the sidebar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Backend identifier.
    #[serde(rename = "session_id")]
    pub id: SessionId,
    /// Display title (usually the crawled page title).
    pub title: String,
}

impl Session {
    /// Build a session from its parts.
    #[must_use]
    pub fn new(id: impl Into<SessionId>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
        }
    }
}

/// One question/answer pair of a transcript.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationTurn {
    /// Question asked by the user.
    pub question: String,
    /// Answer produced by the backend.
    pub answer: String,
}

impl ConversationTurn {
    /// Build a turn from its parts.
    #[must_use]
    pub fn new(question: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            answer: answer.into(),
        }
    }
}

/// A session together with its full transcript.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionDetail {
    /// The session itself.
    pub session: Session,
    /// URL the session was crawled from, when the backend reports it.
    pub source_url: Option<String>,
    /// Transcript in chronological order.
    pub conversation: Vec<ConversationTurn>,
}

/// Body of `POST /process-url` and `POST /load-url`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UrlRequest {
    /// URL to crawl.
    pub url: String,
}

/// Body of `POST /ask`.
///
/// The legacy single-session backend does not know about sessions, so the
/// identifier is omitted from the payload entirely in that mode.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AskRequest {
    /// Target session, absent in legacy mode.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<SessionId>,
    /// Question text.
    pub question: String,
}

/// Success body of `POST /ask`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AskResponse {
    /// Answer text.
    pub answer: String,
}

/// Success body of `POST /process-url`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessResponse {
    /// Human readable status from the backend.
    #[serde(default)]
    pub message: Option<String>,
    /// Identifier of the created session.
    pub session_id: SessionId,
    /// Title of the created session.
    pub title: String,
}

impl From<ProcessResponse> for Session {
    fn from(value: ProcessResponse) -> Self {
        Self {
            id: value.session_id,
            title: value.title,
        }
    }
}

/// Success body of `GET /session/{id}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionDocument {
    /// Identifier, echoed by the full backend.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<SessionId>,
    /// Title, echoed by the full backend.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Crawled URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Transcript.
    #[serde(default)]
    pub conversation: Vec<ConversationTurn>,
}

impl SessionDocument {
    /// Resolve into a [`SessionDetail`] for the session that was requested.
    ///
    /// The requested identifier wins over whatever the document echoes back.
    #[must_use]
    pub fn into_detail(self, requested: &SessionId) -> SessionDetail {
        SessionDetail {
            session: Session {
                id: requested.clone(),
                title: self.title.unwrap_or_default(),
            },
            source_url: self.url,
            conversation: self.conversation,
        }
    }
}

/// Error body carried by every non-2xx response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Either a plain message or a structured validation report.
    #[serde(default)]
    pub detail: Option<serde_json::Value>,
}

impl ErrorBody {
    /// Build an error body with a plain message.
    #[must_use]
    pub fn new(detail: impl Into<String>) -> Self {
        Self {
            detail: Some(serde_json::Value::String(detail.into())),
        }
    }

    /// Render the detail as user-facing text.
    #[must_use]
    pub fn detail_text(&self) -> Option<String> {
        match self.detail.as_ref()? {
            serde_json::Value::Null => None,
            serde_json::Value::String(s) if s.is_empty() => None,
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }
}

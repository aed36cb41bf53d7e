//! Values flowing in and out of the controller.

use crate::api::{ApiError, Session, SessionDetail, SessionId};
use crate::controller::state::Generation;
use crate::controller::transcript::EntryId;

/// A discrete user action.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// Submit the URL form.
    SubmitUrl(String),
    /// Click a sidebar entry.
    SelectSession(SessionId),
    /// Submit the message form.
    SubmitQuestion(String),
    /// Go back to the URL form.
    NewChat,
    /// Re-read the session list.
    RefreshSessions,
}

/// Correlates an `/ask` call with the placeholder it must resolve.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct QuestionTicket {
    /// View generation the question was asked in.
    pub generation: Generation,
    /// Thinking placeholder.
    pub entry: EntryId,
}

/// A backend call requested by the controller.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Effect {
    /// `GET /sessions`.
    ListSessions,
    /// `GET /session/{id}`.
    FetchSession {
        /// Session to fetch.
        session_id: SessionId,
        /// View generation that asked for it.
        generation: Generation,
    },
    /// `POST /process-url`.
    ProcessUrl {
        /// URL to crawl.
        url: String,
    },
    /// `POST /load-url`.
    LoadUrl {
        /// URL to crawl.
        url: String,
    },
    /// `POST /ask`.
    Ask {
        /// Placeholder correlation.
        ticket: QuestionTicket,
        /// Target session, `None` in legacy mode.
        session_id: Option<SessionId>,
        /// Question text.
        question: String,
    },
}

/// Outcome of an [`Effect`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Completion {
    /// Result of [`Effect::ListSessions`].
    SessionsListed(Result<Vec<Session>, ApiError>),
    /// Result of [`Effect::FetchSession`].
    SessionFetched {
        /// Session that was fetched.
        session_id: SessionId,
        /// Generation copied from the effect.
        generation: Generation,
        /// Transcript or failure.
        result: Result<SessionDetail, ApiError>,
    },
    /// Result of [`Effect::ProcessUrl`].
    UrlProcessed(Result<Session, ApiError>),
    /// Result of [`Effect::LoadUrl`].
    UrlLoaded(Result<(), ApiError>),
    /// Result of [`Effect::Ask`].
    Answered {
        /// Ticket copied from the effect.
        ticket: QuestionTicket,
        /// Answer text or failure.
        result: Result<String, ApiError>,
    },
}

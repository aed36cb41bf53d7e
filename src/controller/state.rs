//! Process-wide UI state owned by the controller.

use serde::Serialize;

use crate::api::SessionId;

/// Which of the two mutually exclusive panels is visible.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub enum Panel {
    /// URL form.
    #[default]
    UrlIntake,
    /// Transcript and message form.
    Chat,
}

/// Input that currently has keyboard focus.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum Focus {
    /// URL field of the intake panel.
    UrlInput,
    /// Message field of the chat panel.
    MessageInput,
}

/// Tone of the status line under the URL form.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum StatusTone {
    /// Progress notice.
    Info,
    /// Failure.
    Error,
}

/// Status line under the URL form.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct StatusLine {
    /// Text shown.
    pub text: String,
    /// How it is styled.
    pub tone: StatusTone,
}

impl StatusLine {
    /// Progress notice.
    #[must_use]
    pub fn info(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            tone: StatusTone::Info,
        }
    }

    /// Failure message.
    #[must_use]
    pub fn error(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            tone: StatusTone::Error,
        }
    }
}

/// Monotonic counter identifying one incarnation of the transcript view.
///
/// Bumped whenever the view is replaced; responses tagged with an older
/// generation belong to a view that no longer exists.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Generation(u64);

impl Generation {
    /// The following generation.
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0 + 1)
    }

    /// Raw counter value.
    #[must_use]
    pub const fn value(self) -> u64 {
        self.0
    }
}

/// Mutable UI state shared by every flow.
#[derive(Clone, Debug, Serialize)]
pub struct UiState {
    pub(crate) active_session_id: Option<SessionId>,
    pub(crate) panel: Panel,
    pub(crate) heading: String,
    pub(crate) source_url: Option<String>,
    pub(crate) url_input_enabled: bool,
    pub(crate) url_submit_enabled: bool,
    pub(crate) status: Option<StatusLine>,
    pub(crate) pending_url_submission: bool,
    pub(crate) pending_questions: usize,
    pub(crate) focus: Option<Focus>,
    pub(crate) generation: Generation,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            active_session_id: None,
            panel: Panel::UrlIntake,
            heading: String::new(),
            source_url: None,
            url_input_enabled: true,
            url_submit_enabled: true,
            status: None,
            pending_url_submission: false,
            pending_questions: 0,
            focus: Some(Focus::UrlInput),
            generation: Generation::default(),
        }
    }
}

impl UiState {
    /// Session whose transcript is shown and which receives questions.
    #[must_use]
    pub const fn active_session_id(&self) -> Option<&SessionId> {
        self.active_session_id.as_ref()
    }

    /// Visible panel.
    #[must_use]
    pub const fn panel(&self) -> Panel {
        self.panel
    }

    /// Heading of the chat panel.
    #[must_use]
    pub fn heading(&self) -> &str {
        &self.heading
    }

    /// Crawled URL of the active session, once known.
    #[must_use]
    pub fn source_url(&self) -> Option<&str> {
        self.source_url.as_deref()
    }

    /// Whether the URL text field accepts input.
    #[must_use]
    pub const fn url_input_enabled(&self) -> bool {
        self.url_input_enabled
    }

    /// Whether the URL submit button is clickable.
    #[must_use]
    pub const fn url_submit_enabled(&self) -> bool {
        self.url_submit_enabled
    }

    /// Status line under the URL form.
    #[must_use]
    pub const fn status(&self) -> Option<&StatusLine> {
        self.status.as_ref()
    }

    /// A URL submission is awaiting the backend.
    #[must_use]
    pub const fn pending_url_submission(&self) -> bool {
        self.pending_url_submission
    }

    /// At least one question is awaiting its answer.
    #[must_use]
    pub const fn pending_question(&self) -> bool {
        self.pending_questions > 0
    }

    /// Number of questions awaiting their answer.
    #[must_use]
    pub const fn pending_questions(&self) -> usize {
        self.pending_questions
    }

    /// Focused input, if any.
    #[must_use]
    pub const fn focus(&self) -> Option<Focus> {
        self.focus
    }

    /// Current view generation.
    #[must_use]
    pub const fn generation(&self) -> Generation {
        self.generation
    }

    /// Whether `session_id` is the active session.
    #[must_use]
    pub fn is_active(&self, session_id: &SessionId) -> bool {
        self.active_session_id.as_ref() == Some(session_id)
    }

    pub(crate) fn bump_generation(&mut self) -> Generation {
        self.generation = self.generation.next();
        self.generation
    }
}

//! Session/chat controller.
//!
//! The controller is a synchronous state machine:
//! - [`Controller::handle`] consumes a user [`Command`],
//! - [`Controller::apply`] consumes a backend [`Completion`],
//!
//! and both return the [`Effect`]s (backend calls) to run next. It never
//! performs I/O itself; see [`crate::runtime`] for the executor.
//!
//! Flows:
//! - session registry (`registry`)
//! - view coordination (`view`)
//! - session activation (`activation`)
//! - URL submission (`submission`)
//! - message exchange (`exchange`)

pub mod activation;
pub mod command;
pub mod exchange;
pub mod registry;
pub mod state;
pub mod submission;
pub mod transcript;
pub mod view;

pub use command::{Command, Completion, Effect, QuestionTicket};
pub use registry::SessionRegistry;
pub use state::{Focus, Generation, Panel, StatusLine, StatusTone, UiState};
pub use submission::SubmissionPolicy;
pub use transcript::{EntryId, EntryKind, Transcript, TranscriptEntry};

use crate::config::{DeploymentMode, UrlChatConfig};

/// How a controller behaves.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ControllerSettings {
    /// Backend flavour.
    pub mode: DeploymentMode,
    /// URL submission policy.
    pub policy: SubmissionPolicy,
}

impl ControllerSettings {
    /// Settings for a mode, with that mode's default policy.
    #[must_use]
    pub const fn for_mode(mode: DeploymentMode) -> Self {
        let policy = match mode {
            DeploymentMode::Multi => SubmissionPolicy::conservative(),
            DeploymentMode::Legacy => SubmissionPolicy::optimistic(),
        };
        Self { mode, policy }
    }

    /// Replace the submission policy.
    #[must_use]
    pub const fn with_policy(mut self, policy: SubmissionPolicy) -> Self {
        self.policy = policy;
        self
    }
}

impl Default for ControllerSettings {
    fn default() -> Self {
        Self::for_mode(DeploymentMode::default())
    }
}

impl From<&UrlChatConfig> for ControllerSettings {
    fn from(config: &UrlChatConfig) -> Self {
        let mut settings = Self::for_mode(config.mode);
        if let Some(suppress) = config.suppress_transport_errors {
            settings.policy.suppress_transport_errors = suppress;
        }
        settings
    }
}

/// The single controller instance of a chat page.
#[derive(Debug)]
pub struct Controller {
    settings: ControllerSettings,
    pub(crate) state: UiState,
    pub(crate) registry: SessionRegistry,
    pub(crate) transcript: Transcript,
    pub(crate) pending_url: Option<submission::PendingUrl>,
}

impl Default for Controller {
    fn default() -> Self {
        Self::new(ControllerSettings::default())
    }
}

impl Controller {
    /// Create a controller showing the URL form.
    #[must_use]
    pub fn new(settings: ControllerSettings) -> Self {
        Self {
            settings,
            state: UiState::default(),
            registry: SessionRegistry::default(),
            transcript: Transcript::default(),
            pending_url: None,
        }
    }

    /// Effects to run when the page opens.
    #[must_use]
    pub fn start(&self) -> Vec<Effect> {
        if self.settings.mode.has_sessions() {
            vec![Effect::ListSessions]
        } else {
            Vec::new()
        }
    }

    /// Consume a user action.
    pub fn handle(&mut self, command: Command) -> Vec<Effect> {
        match command {
            Command::SubmitUrl(url) => self.submit_url(&url),
            Command::SelectSession(session_id) => self.select_session(&session_id),
            Command::SubmitQuestion(question) => self.submit_question(&question),
            Command::NewChat => self.new_chat(),
            Command::RefreshSessions => self.refresh_sessions(),
        }
    }

    /// Consume a backend result.
    pub fn apply(&mut self, completion: Completion) -> Vec<Effect> {
        match completion {
            Completion::SessionsListed(result) => {
                self.on_sessions_listed(result);
                Vec::new()
            }
            Completion::SessionFetched {
                session_id,
                generation,
                result,
            } => {
                self.on_session_fetched(&session_id, generation, result);
                Vec::new()
            }
            Completion::UrlProcessed(result) => self.on_url_processed(result),
            Completion::UrlLoaded(result) => self.on_url_loaded(result),
            Completion::Answered { ticket, result } => {
                self.on_answered(ticket, result);
                Vec::new()
            }
        }
    }

    /// Behaviour settings.
    #[must_use]
    pub const fn settings(&self) -> &ControllerSettings {
        &self.settings
    }

    /// Backend flavour.
    #[must_use]
    pub const fn mode(&self) -> DeploymentMode {
        self.settings.mode
    }

    /// UI state.
    #[must_use]
    pub const fn state(&self) -> &UiState {
        &self.state
    }

    /// Known sessions.
    #[must_use]
    pub const fn registry(&self) -> &SessionRegistry {
        &self.registry
    }

    /// Transcript of the chat panel.
    #[must_use]
    pub const fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    /// Whether a conservative URL submission currently freezes the UI.
    pub(crate) const fn ui_frozen(&self) -> bool {
        self.state.pending_url_submission && !self.settings.policy.optimistic
    }
}

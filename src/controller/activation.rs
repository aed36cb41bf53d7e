//! Session activation: show a session and load its transcript.

use tracing::{debug, info, warn};

use crate::api::{ApiError, Session, SessionDetail, SessionId};
use crate::controller::{Controller, Effect, EntryKind, Focus, Generation};

/// Fallback when a transcript fetch fails without detail.
pub const LOAD_FAILED: &str = "Failed to load session";

/// Greeting shown for a session with no turns yet.
#[must_use]
pub fn greeting(title: &str) -> String {
    format!("Hi! I'm ready to answer questions about \"{title}\". What would you like to know?")
}

impl Controller {
    pub(crate) fn select_session(&mut self, session_id: &SessionId) -> Vec<Effect> {
        if self.ui_frozen() {
            debug!("ignoring session selection while a URL is being processed");
            return Vec::new();
        }
        let Some(session) = self.registry.get(session_id).cloned() else {
            warn!("cannot activate unknown session {session_id}");
            return Vec::new();
        };
        self.activate(&session)
    }

    /// Make `session` the active one and request its transcript.
    pub(crate) fn activate(&mut self, session: &Session) -> Vec<Effect> {
        if self.state.is_active(&session.id) {
            return Vec::new();
        }

        info!("activating session {} ({})", session.id, session.title);
        self.state.active_session_id = Some(session.id.clone());
        let generation = self.show_chat(&session.title);

        vec![Effect::FetchSession {
            session_id: session.id.clone(),
            generation,
        }]
    }

    pub(crate) fn on_session_fetched(
        &mut self,
        session_id: &SessionId,
        generation: Generation,
        result: Result<SessionDetail, ApiError>,
    ) {
        if generation != self.state.generation {
            debug!("discarding stale transcript of session {session_id}");
            return;
        }

        let entries = match result {
            Ok(detail) => {
                self.state.source_url = detail.source_url;
                self.state.focus = Some(Focus::MessageInput);
                if detail.conversation.is_empty() {
                    vec![(EntryKind::Bot, greeting(&self.state.heading))]
                } else {
                    detail
                        .conversation
                        .into_iter()
                        .flat_map(|turn| {
                            [(EntryKind::User, turn.question), (EntryKind::Bot, turn.answer)]
                        })
                        .collect()
                }
            }
            Err(err) => {
                warn!("failed to load session {session_id}: {err}");
                let text = format!("Error loading session: {}", err.detail_or(LOAD_FAILED));
                vec![(EntryKind::Error, text)]
            }
        };

        // Questions asked while loading stay below the loaded transcript.
        if !self.transcript.fill_loading(entries) {
            debug!("no loading placeholder left for session {session_id}");
        }
    }
}

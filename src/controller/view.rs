//! View coordination between the URL-intake and chat panels.

use tracing::debug;

use crate::controller::{Controller, Effect, Focus, Generation, Panel};

impl Controller {
    /// Show the URL form and forget the active session.
    pub(crate) fn show_url_intake(&mut self) -> Generation {
        let state = &mut self.state;
        state.active_session_id = None;
        state.panel = Panel::UrlIntake;
        state.heading.clear();
        state.source_url = None;
        state.url_input_enabled = true;
        state.url_submit_enabled = true;
        state.status = None;
        state.focus = Some(Focus::UrlInput);
        self.transcript.clear();
        self.state.bump_generation()
    }

    /// Show the chat panel titled `title` with a loading transcript.
    ///
    /// The selected sidebar entry follows `active_session_id`, which the
    /// caller sets first.
    pub(crate) fn show_chat(&mut self, title: &str) -> Generation {
        let state = &mut self.state;
        state.panel = Panel::Chat;
        state.heading = title.to_string();
        state.source_url = None;
        state.focus = None;
        self.transcript.reset_loading();
        self.state.bump_generation()
    }

    pub(crate) fn new_chat(&mut self) -> Vec<Effect> {
        if self.ui_frozen() {
            debug!("ignoring new chat while a URL is being processed");
            return Vec::new();
        }
        self.show_url_intake();
        Vec::new()
    }
}

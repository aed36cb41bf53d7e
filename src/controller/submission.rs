//! URL submission: turn a URL into a chat.
//!
//! Two policies are supported. The conservative one freezes the URL form
//! until the backend answers and only then switches to the chat panel. The
//! optimistic one switches to the chat panel right away and treats the
//! request as fire-and-forget, reverting only on an HTTP-level failure.

use tracing::{debug, info, warn};

use crate::api::{ApiError, Session};
use crate::controller::activation::greeting;
use crate::controller::{Controller, Effect, EntryKind, Focus, Generation, Panel, StatusLine};

/// Status shown while an optimistic submission is in flight.
pub const OPTIMISTIC_NOTICE: &str =
    "Sending request to backend... The crawl will continue in the background.";
/// Fallback when `/process-url` fails without detail.
pub const PROCESS_FAILED: &str = "Failed to process URL";
/// Fallback when `/load-url` fails without detail.
pub const LOAD_URL_FAILED: &str = "Failed to start loading URL";

/// How the URL form reacts to a submission.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SubmissionPolicy {
    /// Switch to the chat panel before the backend confirms.
    pub optimistic: bool,
    /// Keep transport failures (unreachable, timeout) out of the UI.
    pub suppress_transport_errors: bool,
}

impl SubmissionPolicy {
    /// Hold the view until the backend responds, surface every failure.
    #[must_use]
    pub const fn conservative() -> Self {
        Self {
            optimistic: false,
            suppress_transport_errors: false,
        }
    }

    /// Switch immediately, surface only HTTP-level failures.
    #[must_use]
    pub const fn optimistic() -> Self {
        Self {
            optimistic: true,
            suppress_transport_errors: true,
        }
    }
}

/// Submission awaiting the backend.
#[derive(Clone, Debug)]
pub(crate) struct PendingUrl {
    url: String,
    /// View generation right after the submission was issued.
    generation: Generation,
}

fn crawling_notice(url: &str) -> String {
    format!("Crawling and indexing {url}. This can take a few minutes...")
}

fn background_notice(url: &str) -> String {
    format!("Crawling {url} in the background. Ask a question whenever you're ready.")
}

impl Controller {
    pub(crate) fn submit_url(&mut self, raw: &str) -> Vec<Effect> {
        let url = raw.trim();
        if url.is_empty() {
            return Vec::new();
        }
        if self.state.panel != Panel::UrlIntake
            || !self.state.url_submit_enabled
            || self.state.pending_url_submission
        {
            debug!("URL form is not accepting submissions");
            return Vec::new();
        }

        let effect = if self.mode().has_sessions() {
            Effect::ProcessUrl {
                url: url.to_string(),
            }
        } else {
            Effect::LoadUrl {
                url: url.to_string(),
            }
        };

        self.state.pending_url_submission = true;
        let generation = if self.settings().policy.optimistic {
            self.state.status = Some(StatusLine::info(OPTIMISTIC_NOTICE));
            self.state.url_submit_enabled = false;
            let generation = self.show_chat(url);
            self.transcript
                .replace_with(EntryKind::Bot, background_notice(url));
            self.state.focus = Some(Focus::MessageInput);
            generation
        } else {
            self.state.url_input_enabled = false;
            self.state.url_submit_enabled = false;
            self.state.status = Some(StatusLine::info(crawling_notice(url)));
            self.state.generation
        };

        info!("submitting {url}");
        self.pending_url = Some(PendingUrl {
            url: url.to_string(),
            generation,
        });
        vec![effect]
    }

    /// Clear the pending flag and, when conservative, unfreeze the form.
    fn finish_submission(&mut self) -> Option<PendingUrl> {
        self.state.pending_url_submission = false;
        if !self.settings().policy.optimistic {
            self.state.url_input_enabled = true;
            self.state.url_submit_enabled = true;
        }
        self.pending_url.take()
    }

    fn view_unchanged_since(&self, pending: Option<&PendingUrl>) -> bool {
        pending.is_some_and(|p| p.generation == self.state.generation)
    }

    pub(crate) fn on_url_processed(&mut self, result: Result<Session, ApiError>) -> Vec<Effect> {
        let pending = self.finish_submission();
        match result {
            Ok(session) => {
                info!("session {} created: {}", session.id, session.title);
                self.state.status = None;
                self.registry.prepend(session.clone());
                if self.view_unchanged_since(pending.as_ref()) {
                    self.activate(&session)
                } else {
                    debug!("view moved on, not activating {}", session.id);
                    Vec::new()
                }
            }
            Err(err) => {
                self.submission_failed(&err, pending.as_ref(), PROCESS_FAILED);
                Vec::new()
            }
        }
    }

    pub(crate) fn on_url_loaded(&mut self, result: Result<(), ApiError>) -> Vec<Effect> {
        let pending = self.finish_submission();
        match result {
            // Optimistic: the chat is already showing.
            Ok(()) if self.settings().policy.optimistic => {}
            Ok(()) => {
                self.state.status = None;
                if let Some(pending) = pending.filter(|p| p.generation == self.state.generation) {
                    self.show_chat(&pending.url);
                    self.transcript
                        .replace_with(EntryKind::Bot, greeting(&pending.url));
                    self.state.focus = Some(Focus::MessageInput);
                }
            }
            Err(err) => self.submission_failed(&err, pending.as_ref(), LOAD_URL_FAILED),
        }
        Vec::new()
    }

    fn submission_failed(&mut self, err: &ApiError, pending: Option<&PendingUrl>, fallback: &str) {
        let policy = self.settings().policy;
        if err.is_transport() && policy.suppress_transport_errors {
            // The user finds out on their next question.
            warn!("URL submission failed, not surfaced: {err}");
            if !policy.optimistic {
                self.state.status = None;
            }
            return;
        }

        warn!("URL submission failed: {err}");
        let detail = err.detail_or(fallback);
        if policy.optimistic {
            if self.view_unchanged_since(pending) {
                self.show_url_intake();
            }
            self.state.url_submit_enabled = true;
            self.state.status = Some(StatusLine::error(format!("Initial Error: {detail}")));
        } else {
            self.state.status = Some(StatusLine::error(format!("Error: {detail}")));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::SessionId;
    use crate::config::DeploymentMode;
    use crate::controller::testing::{legacy, multi, transport, with_sessions};
    use crate::controller::{Command, Completion, ControllerSettings, StatusTone};

    #[test]
    fn test_blank_url_is_silent_noop() {
        for mut controller in [multi(), legacy()] {
            let generation = controller.state().generation();
            for blank in ["", "   ", "\t\n"] {
                assert!(controller.handle(Command::SubmitUrl(blank.to_string())).is_empty());
            }
            let state = controller.state();
            assert_eq!(state.panel(), Panel::UrlIntake);
            assert!(state.status().is_none());
            assert!(state.url_submit_enabled());
            assert!(!state.pending_url_submission());
            assert_eq!(state.generation(), generation);
        }
    }

    #[test]
    fn test_conservative_submit_freezes_form() {
        let mut controller = multi();
        let effects = controller.handle(Command::SubmitUrl("  https://example.com ".to_string()));

        assert_eq!(
            effects,
            vec![Effect::ProcessUrl {
                url: "https://example.com".to_string()
            }]
        );
        let state = controller.state();
        assert_eq!(state.panel(), Panel::UrlIntake);
        assert!(!state.url_input_enabled());
        assert!(!state.url_submit_enabled());
        assert!(state.pending_url_submission());
        assert_eq!(state.status().map(|s| s.tone), Some(StatusTone::Info));

        // Frozen: nothing else gets through.
        assert!(controller.handle(Command::SubmitUrl("https://other.com".to_string())).is_empty());
        assert!(controller.handle(Command::NewChat).is_empty());
        assert!(controller.state().pending_url_submission());
    }

    #[test]
    fn test_conservative_freeze_blocks_sidebar() {
        let mut controller = with_sessions(&[("s1", "One")]);
        controller.handle(Command::SubmitUrl("https://example.com".to_string()));
        assert!(controller.handle(Command::SelectSession(SessionId::from("s1"))).is_empty());
        assert_eq!(controller.state().panel(), Panel::UrlIntake);
    }

    #[test]
    fn test_conservative_success_registers_and_activates() {
        let mut controller = with_sessions(&[("old", "Older")]);
        controller.handle(Command::SubmitUrl("https://example.com".to_string()));

        let effects =
            controller.apply(Completion::UrlProcessed(Ok(Session::new("s1", "Example"))));

        assert!(matches!(
            effects.as_slice(),
            [Effect::FetchSession { session_id, .. }] if session_id.as_str() == "s1"
        ));
        assert_eq!(controller.registry().len(), 2);
        assert_eq!(
            controller.registry().at(0).map(|s| s.title.as_str()),
            Some("Example")
        );
        let state = controller.state();
        assert_eq!(state.panel(), Panel::Chat);
        assert_eq!(state.heading(), "Example");
        assert_eq!(state.active_session_id(), Some(&SessionId::from("s1")));
        assert!(state.url_input_enabled() && state.url_submit_enabled());
        assert!(state.status().is_none());
        assert!(!state.pending_url_submission());
    }

    #[test]
    fn test_conservative_application_failure() {
        let mut controller = multi();
        controller.handle(Command::SubmitUrl("https://example.com".to_string()));

        let effects = controller.apply(Completion::UrlProcessed(Err(ApiError::application(
            400, "bad url",
        ))));

        assert!(effects.is_empty());
        let state = controller.state();
        assert!(state.url_input_enabled() && state.url_submit_enabled());
        assert_eq!(state.status().map(|s| s.text.as_str()), Some("Error: bad url"));
        assert_eq!(state.status().map(|s| s.tone), Some(StatusTone::Error));
        assert_eq!(state.panel(), Panel::UrlIntake);
        assert!(controller.registry().is_empty());
    }

    #[test]
    fn test_conservative_transport_failure_is_surfaced() {
        let mut controller = multi();
        controller.handle(Command::SubmitUrl("https://example.com".to_string()));
        controller.apply(Completion::UrlProcessed(Err(transport("connection refused"))));

        let state = controller.state();
        assert!(state.url_input_enabled() && state.url_submit_enabled());
        assert_eq!(
            state.status().map(|s| s.text.as_str()),
            Some("Error: network error: connection refused")
        );
    }

    #[test]
    fn test_conservative_fallback_detail() {
        let mut controller = multi();
        controller.handle(Command::SubmitUrl("https://example.com".to_string()));
        controller.apply(Completion::UrlProcessed(Err(ApiError::Application {
            status: 500,
            detail: None,
        })));
        assert_eq!(
            controller.state().status().map(|s| s.text.clone()),
            Some(format!("Error: {PROCESS_FAILED}"))
        );
    }

    #[test]
    fn test_optimistic_switches_before_backend_answers() {
        let mut controller = legacy();
        let effects = controller.handle(Command::SubmitUrl("https://example.com".to_string()));

        assert_eq!(
            effects,
            vec![Effect::LoadUrl {
                url: "https://example.com".to_string()
            }]
        );
        let state = controller.state();
        assert_eq!(state.panel(), Panel::Chat);
        assert!(!state.url_submit_enabled());
        assert_eq!(
            state.status().map(|s| s.text.as_str()),
            Some(OPTIMISTIC_NOTICE)
        );
        assert_eq!(controller.transcript().count(EntryKind::Loading), 0);
    }

    #[test]
    fn test_optimistic_transport_failure_keeps_chat() {
        let mut controller = legacy();
        controller.handle(Command::SubmitUrl("https://example.com".to_string()));
        controller.apply(Completion::UrlLoaded(Err(transport("timed out"))));

        assert_eq!(controller.state().panel(), Panel::Chat);
        assert!(!controller.state().pending_url_submission());
    }

    #[test]
    fn test_optimistic_http_failure_reverts_with_detail() {
        let mut controller = legacy();
        controller.handle(Command::SubmitUrl("https://example.com".to_string()));
        controller.apply(Completion::UrlLoaded(Err(ApiError::application(
            500,
            "crawler offline",
        ))));

        let state = controller.state();
        assert_eq!(state.panel(), Panel::UrlIntake);
        assert!(state.url_submit_enabled());
        assert_eq!(
            state.status().map(|s| s.text.as_str()),
            Some("Initial Error: crawler offline")
        );
        assert_eq!(state.status().map(|s| s.tone), Some(StatusTone::Error));
    }

    #[test]
    fn test_optimistic_success_changes_nothing() {
        let mut controller = legacy();
        controller.handle(Command::SubmitUrl("https://example.com".to_string()));
        let before = controller.transcript().entries().to_vec();
        controller.apply(Completion::UrlLoaded(Ok(())));
        assert_eq!(controller.state().panel(), Panel::Chat);
        assert_eq!(controller.transcript().entries(), before.as_slice());
    }

    #[test]
    fn test_optimistic_failure_after_navigation_does_not_revert() {
        let mut controller = legacy();
        controller.handle(Command::SubmitUrl("https://example.com".to_string()));
        controller.handle(Command::NewChat);
        controller.handle(Command::SubmitUrl("https://second.example".to_string()));
        // Second submission is ignored while the first is pending.
        assert_eq!(controller.state().panel(), Panel::UrlIntake);

        controller.apply(Completion::UrlLoaded(Err(ApiError::application(500, "boom"))));
        assert_eq!(controller.state().panel(), Panel::UrlIntake);
        assert_eq!(
            controller.state().status().map(|s| s.text.as_str()),
            Some("Initial Error: boom")
        );
    }

    #[test]
    fn test_transport_flag_can_be_turned_off_for_optimistic() {
        let settings = ControllerSettings::for_mode(DeploymentMode::Legacy).with_policy(
            SubmissionPolicy {
                optimistic: true,
                suppress_transport_errors: false,
            },
        );
        let mut controller = crate::controller::Controller::new(settings);
        controller.handle(Command::SubmitUrl("https://example.com".to_string()));
        controller.apply(Completion::UrlLoaded(Err(transport("timed out"))));

        assert_eq!(controller.state().panel(), Panel::UrlIntake);
        assert_eq!(
            controller.state().status().map(|s| s.text.as_str()),
            Some("Initial Error: network error: timed out")
        );
    }

    #[test]
    fn test_conservative_legacy_switches_on_success() {
        let settings = ControllerSettings::for_mode(DeploymentMode::Legacy)
            .with_policy(SubmissionPolicy::conservative());
        let mut controller = crate::controller::Controller::new(settings);
        controller.handle(Command::SubmitUrl("https://example.com".to_string()));
        assert_eq!(controller.state().panel(), Panel::UrlIntake);

        controller.apply(Completion::UrlLoaded(Ok(())));

        assert_eq!(controller.state().panel(), Panel::Chat);
        assert_eq!(controller.state().heading(), "https://example.com");
        assert_eq!(controller.transcript().count(EntryKind::Bot), 1);
        assert!(controller.state().url_submit_enabled());
    }
}

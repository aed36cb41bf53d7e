//! Message exchange: ask a question, show the answer.

use tracing::{debug, warn};

use crate::api::ApiError;
use crate::controller::transcript::THINKING_TEXT;
use crate::controller::{Controller, Effect, EntryKind, Panel, QuestionTicket};

/// Fallback when `/ask` fails without detail.
pub const ANSWER_FAILED: &str = "Failed to get answer";

impl Controller {
    pub(crate) fn submit_question(&mut self, raw: &str) -> Vec<Effect> {
        let question = raw.trim();
        if question.is_empty() || self.state.panel != Panel::Chat {
            return Vec::new();
        }

        let session_id = if self.mode().has_sessions() {
            let Some(active) = self.state.active_session_id.clone() else {
                debug!("no active session, question dropped");
                return Vec::new();
            };
            Some(active)
        } else {
            None
        };

        // Echoed right away, whatever the backend says later.
        self.transcript.push(EntryKind::User, question);
        let entry = self.transcript.push(EntryKind::Thinking, THINKING_TEXT);
        self.state.pending_questions += 1;

        vec![Effect::Ask {
            ticket: QuestionTicket {
                generation: self.state.generation,
                entry,
            },
            session_id,
            question: question.to_string(),
        }]
    }

    pub(crate) fn on_answered(&mut self, ticket: QuestionTicket, result: Result<String, ApiError>) {
        self.state.pending_questions = self.state.pending_questions.saturating_sub(1);

        if ticket.generation != self.state.generation {
            // The placeholder went away with the view it was shown in.
            debug!("discarding answer for a replaced view");
            return;
        }

        let text = match result {
            Ok(answer) => answer,
            Err(err) => {
                warn!("question failed: {err}");
                format!("Error: {}", err.detail_or(ANSWER_FAILED))
            }
        };
        if !self.transcript.resolve(ticket.entry, EntryKind::Bot, text) {
            debug!("answer placeholder already resolved");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::SessionId;
    use crate::controller::testing::{legacy, open, texts, transport, with_sessions};
    use crate::controller::{Command, Completion};

    fn ask(controller: &mut crate::controller::Controller, question: &str) -> QuestionTicket {
        match controller
            .handle(Command::SubmitQuestion(question.to_string()))
            .as_slice()
        {
            [Effect::Ask { ticket, .. }] => *ticket,
            other => panic!("expected one ask, got {other:?}"),
        }
    }

    #[test]
    fn test_blank_question_is_silent_noop() {
        let mut controller = with_sessions(&[("s1", "Example")]);
        open(&mut controller, "s1", &[]);
        let before = texts(&controller);

        for blank in ["", "  ", "\n"] {
            assert!(controller.handle(Command::SubmitQuestion(blank.to_string())).is_empty());
        }
        assert_eq!(texts(&controller), before);
        assert!(!controller.state().pending_question());
    }

    #[test]
    fn test_question_without_active_session_is_dropped() {
        let mut controller = with_sessions(&[("s1", "Example")]);
        assert!(controller.handle(Command::SubmitQuestion("hello?".to_string())).is_empty());
        assert!(controller.transcript().is_empty());
    }

    #[test]
    fn test_question_is_echoed_with_thinking_placeholder() {
        let mut controller = with_sessions(&[("s1", "Example")]);
        open(&mut controller, "s1", &[]);

        let effects = controller.handle(Command::SubmitQuestion(" what? ".to_string()));
        assert!(matches!(
            effects.as_slice(),
            [Effect::Ask { session_id: Some(id), question, .. }]
                if id == &SessionId::from("s1") && question == "what?"
        ));

        let rendered = texts(&controller);
        assert_eq!(rendered.len(), 3);
        assert_eq!(rendered[1], (EntryKind::User, "what?".to_string()));
        assert_eq!(rendered[2], (EntryKind::Thinking, THINKING_TEXT.to_string()));
        assert!(controller.state().pending_question());
    }

    #[test]
    fn test_answer_replaces_placeholder() {
        let mut controller = with_sessions(&[("s1", "Example")]);
        open(&mut controller, "s1", &[("A", "B")]);
        let ticket = ask(&mut controller, "meaning of life?");

        controller.apply(Completion::Answered {
            ticket,
            result: Ok("42".to_string()),
        });

        let rendered = texts(&controller);
        assert_eq!(
            rendered[2..],
            [
                (EntryKind::User, "meaning of life?".to_string()),
                (EntryKind::Bot, "42".to_string()),
            ]
        );
        assert_eq!(controller.transcript().count(EntryKind::Thinking), 0);
        assert!(!controller.state().pending_question());
    }

    #[test]
    fn test_failure_becomes_bot_error_message() {
        let mut controller = with_sessions(&[("s1", "Example")]);
        open(&mut controller, "s1", &[]);
        let first = ask(&mut controller, "one");
        let second = ask(&mut controller, "two");

        controller.apply(Completion::Answered {
            ticket: first,
            result: Err(ApiError::application(404, "Session not found.")),
        });
        controller.apply(Completion::Answered {
            ticket: second,
            result: Err(transport("reset by peer")),
        });

        let bots: Vec<String> = texts(&controller)
            .into_iter()
            .filter(|(kind, _)| *kind == EntryKind::Bot)
            .map(|(_, text)| text)
            .collect();
        assert_eq!(
            bots[1..],
            [
                "Error: Session not found.".to_string(),
                "Error: network error: reset by peer".to_string(),
            ]
        );
        assert_eq!(controller.transcript().count(EntryKind::Thinking), 0);
    }

    #[test]
    fn test_out_of_order_answers_land_next_to_their_question() {
        let mut controller = with_sessions(&[("s1", "Example")]);
        open(&mut controller, "s1", &[("A", "B")]);
        let first = ask(&mut controller, "first");
        let second = ask(&mut controller, "second");
        assert_eq!(controller.state().pending_questions(), 2);

        controller.apply(Completion::Answered {
            ticket: second,
            result: Ok("second answer".to_string()),
        });
        controller.apply(Completion::Answered {
            ticket: first,
            result: Ok("first answer".to_string()),
        });

        assert_eq!(
            texts(&controller)[2..],
            [
                (EntryKind::User, "first".to_string()),
                (EntryKind::Bot, "first answer".to_string()),
                (EntryKind::User, "second".to_string()),
                (EntryKind::Bot, "second answer".to_string()),
            ]
        );
    }

    #[test]
    fn test_answer_for_previous_session_is_discarded() {
        let mut controller = with_sessions(&[("a", "Alpha"), ("b", "Beta")]);
        open(&mut controller, "a", &[]);
        let ticket = ask(&mut controller, "about alpha");
        open(&mut controller, "b", &[("b-q", "b-a")]);

        controller.apply(Completion::Answered {
            ticket,
            result: Ok("alpha answer".to_string()),
        });

        assert_eq!(
            texts(&controller),
            vec![
                (EntryKind::User, "b-q".to_string()),
                (EntryKind::Bot, "b-a".to_string()),
            ]
        );
        assert!(!controller.state().pending_question());
    }

    #[test]
    fn test_legacy_question_has_no_session() {
        let mut controller = legacy();
        controller.handle(Command::SubmitUrl("https://example.com".to_string()));
        let effects = controller.handle(Command::SubmitQuestion("hi".to_string()));
        assert!(matches!(
            effects.as_slice(),
            [Effect::Ask { session_id: None, .. }]
        ));
    }
}

//! Executes controller effects against a [`Backend`].
//!
//! Each effect runs on its own tokio task and reports back through an
//! unbounded channel, so the event loop keeps serving user input while
//! calls are outstanding. Calls are never cancelled; every effect yields
//! exactly one completion.

use std::sync::Arc;

use tokio::sync::mpsc;

use crate::api::Backend;
use crate::controller::{Completion, Effect};

/// Run one effect to completion.
pub async fn execute<B>(backend: &B, effect: Effect) -> Completion
where
    B: Backend + ?Sized,
{
    match effect {
        Effect::ListSessions => Completion::SessionsListed(backend.list_sessions().await),
        Effect::FetchSession {
            session_id,
            generation,
        } => {
            let result = backend.session_detail(&session_id).await;
            Completion::SessionFetched {
                session_id,
                generation,
                result,
            }
        }
        Effect::ProcessUrl { url } => Completion::UrlProcessed(backend.process_url(&url).await),
        Effect::LoadUrl { url } => Completion::UrlLoaded(backend.load_url(&url).await),
        Effect::Ask {
            ticket,
            session_id,
            question,
        } => {
            let result = backend.ask(session_id.as_ref(), &question).await;
            Completion::Answered { ticket, result }
        }
    }
}

/// Spawns effects and funnels their completions into one channel.
pub struct EffectRunner<B: ?Sized> {
    backend: Arc<B>,
    completions: mpsc::UnboundedSender<Completion>,
}

impl<B> EffectRunner<B>
where
    B: Backend + ?Sized + 'static,
{
    /// Create a runner and the receiving end of its completions.
    #[must_use]
    pub fn new(backend: Arc<B>) -> (Self, mpsc::UnboundedReceiver<Completion>) {
        let (completions, receiver) = mpsc::unbounded_channel();
        (
            Self {
                backend,
                completions,
            },
            receiver,
        )
    }

    /// Start every effect in the background and return how many were started.
    ///
    /// Must be called from within a tokio runtime.
    pub fn dispatch(&self, effects: Vec<Effect>) -> usize {
        let started = effects.len();
        for effect in effects {
            let backend = Arc::clone(&self.backend);
            let completions = self.completions.clone();
            tokio::spawn(async move {
                let completion = execute(backend.as_ref(), effect).await;
                if completions.send(completion).is_err() {
                    tracing::debug!("event loop gone, completion dropped");
                }
            });
        }
        started
    }
}


#[cfg(test)]
mod tests {
    use super::fake::FakeBackend;
    use super::*;
    use crate::api::Session;
    use crate::controller::{Command, Controller, EntryKind, Panel};

    /// Feed completions back until no effect is outstanding.
    async fn settle(
        controller: &mut Controller,
        runner: &EffectRunner<FakeBackend>,
        receiver: &mut mpsc::UnboundedReceiver<Completion>,
        mut outstanding: usize,
    ) {
        while outstanding > 0 {
            let Some(completion) = receiver.recv().await else {
                break;
            };
            outstanding -= 1;
            outstanding += runner.dispatch(controller.apply(completion));
        }
    }

    #[tokio::test]
    async fn test_execute_maps_effects_to_completions() {
        let backend = FakeBackend::default();
        let completion = execute(&backend, Effect::ListSessions).await;
        assert_eq!(
            completion,
            Completion::SessionsListed(Ok(vec![Session::new("s0", "Existing")]))
        );

        let completion = execute(
            &backend,
            Effect::LoadUrl {
                url: "https://example.com".to_string(),
            },
        )
        .await;
        assert_eq!(completion, Completion::UrlLoaded(Ok(())));
        assert_eq!(backend.calls(), vec!["list", "load https://example.com"]);
    }

    #[tokio::test]
    async fn test_full_round_trip_through_runner() {
        let backend = Arc::new(FakeBackend::default());
        let (runner, mut receiver) = EffectRunner::new(Arc::clone(&backend));
        let mut controller = Controller::default();

        let effects = controller.start();
        let outstanding = effects.len();
        runner.dispatch(effects);
        settle(&mut controller, &runner, &mut receiver, outstanding).await;
        assert_eq!(controller.registry().len(), 1);

        let effects = controller.handle(Command::SubmitUrl("https://example.com".to_string()));
        let outstanding = effects.len();
        runner.dispatch(effects);
        settle(&mut controller, &runner, &mut receiver, outstanding).await;

        assert_eq!(controller.state().panel(), Panel::Chat);
        assert_eq!(controller.state().heading(), "Example");
        assert_eq!(controller.registry().at(0).map(|s| s.id.as_str()), Some("s1"));
        assert_eq!(controller.transcript().count(EntryKind::User), 1);

        let effects = controller.handle(Command::SubmitQuestion("why?".to_string()));
        let outstanding = effects.len();
        runner.dispatch(effects);
        settle(&mut controller, &runner, &mut receiver, outstanding).await;

        let last = controller.transcript().entries().last().map(|e| e.text.clone());
        assert_eq!(last.as_deref(), Some("answer to why?"));
        assert!(
            backend
                .calls()
                .contains(&"ask Some(SessionId(\"s1\")) why?".to_string())
        );
    }

    #[tokio::test]
    async fn test_failed_processing_reenables_form() {
        let backend = Arc::new(FakeBackend::failing_process());
        let (runner, mut receiver) = EffectRunner::new(backend);
        let mut controller = Controller::default();

        let effects = controller.handle(Command::SubmitUrl("https://example.com".to_string()));
        let outstanding = effects.len();
        runner.dispatch(effects);
        settle(&mut controller, &runner, &mut receiver, outstanding).await;

        assert_eq!(controller.state().panel(), Panel::UrlIntake);
        assert!(controller.state().url_submit_enabled());
        assert_eq!(
            controller.state().status().map(|s| s.text.as_str()),
            Some("Error: bad url")
        );
    }
}

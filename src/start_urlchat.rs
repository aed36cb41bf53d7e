//! Startup helpers for the terminal client and the stub backend.

use std::io::Write;
use std::process::ExitCode;
use std::sync::Arc;

use tokio::io::{AsyncBufRead, AsyncBufReadExt};

use crate::api::{Backend, HttpBackend};
use crate::config::{self, UrlChatConfig};
use crate::controller::{Controller, ControllerSettings};
use crate::render::render;
use crate::runtime::EffectRunner;
use crate::server::{self, StubState};
use crate::terminal::{self, HELP, Input};

/// Install the tracing subscriber, logging to stderr at `default_level`
/// unless `RUST_LOG` says otherwise.
fn init_tracing(default_level: tracing::Level) {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(default_level.into()),
        )
        .init();
}

fn build_runtime() -> Option<tokio::runtime::Runtime> {
    match tokio::runtime::Runtime::new() {
        Ok(rt) => Some(rt),
        Err(e) => {
            tracing::error!("Failed to create runtime: {e}");
            None
        }
    }
}

/// Run the terminal client (used by the `urlchat` binary).
///
/// # Returns
/// `ExitCode::SUCCESS` when the user quits, `1` on failure.
#[must_use]
pub fn run() -> ExitCode {
    init_tracing(tracing::Level::WARN);

    let config = match UrlChatConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Invalid configuration: {e}");
            return ExitCode::from(1);
        }
    };
    tracing::info!(
        "urlchat v{} talking to {} ({:?} mode)",
        env!("CARGO_PKG_VERSION"),
        config.api.base_url,
        config.mode
    );

    let backend = match HttpBackend::new(&config.api) {
        Ok(backend) => Arc::new(backend),
        Err(e) => {
            tracing::error!("Failed to create backend client: {e}");
            return ExitCode::from(1);
        }
    };

    let Some(rt) = build_runtime() else {
        return ExitCode::from(1);
    };

    let mut controller = Controller::new(ControllerSettings::from(&config));
    let stdin = tokio::io::BufReader::new(tokio::io::stdin());
    let result = rt.block_on(event_loop(
        &mut controller,
        backend,
        stdin,
        std::io::stdout(),
    ));

    if let Err(e) = result {
        tracing::error!("Terminal error: {e}");
        return ExitCode::from(1);
    }
    ExitCode::SUCCESS
}

/// Run the stub backend (used by the `urlchat-stub` binary) until Ctrl+C.
///
/// # Returns
/// `ExitCode::SUCCESS` on graceful shutdown, `1` on failure.
#[must_use]
pub fn run_stub() -> ExitCode {
    init_tracing(tracing::Level::INFO);

    tracing::info!("Starting urlchat stub backend v{}", env!("CARGO_PKG_VERSION"));

    let port = match config::stub_port() {
        Ok(port) => port,
        Err(e) => {
            tracing::error!("Invalid configuration: {e}");
            return ExitCode::from(1);
        }
    };

    let Some(rt) = build_runtime() else {
        return ExitCode::from(1);
    };

    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!("Ctrl+C handler failed: {e}");
            std::future::pending::<()>().await;
        }
        tracing::info!("Shutting down...");
    };

    if let Err(e) = rt.block_on(server::run_server(Arc::new(StubState::new()), port, shutdown)) {
        tracing::error!("Server error: {e}");
        return ExitCode::from(1);
    }

    ExitCode::SUCCESS
}

/// Drive a controller from typed lines until `/quit` or end of input.
///
/// The display is redrawn after every user action and every backend
/// completion. At end of input, outstanding backend calls are still awaited
/// so piped scripts see their results.
///
/// # Errors
/// Returns an error if reading input or writing output fails.
pub async fn event_loop<B, R, W>(
    controller: &mut Controller,
    backend: Arc<B>,
    input: R,
    mut output: W,
) -> std::io::Result<()>
where
    B: Backend + ?Sized + 'static,
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let (runner, mut completions) = EffectRunner::new(backend);
    let mut outstanding = runner.dispatch(controller.start());
    let mut lines = input.lines();
    let mut input_open = true;

    write!(output, "{}", terminal::draw(&render(controller)))?;
    output.flush()?;

    while input_open || outstanding > 0 {
        tokio::select! {
            line = lines.next_line(), if input_open => {
                let Some(line) = line? else {
                    input_open = false;
                    continue;
                };
                match terminal::parse_input(&line, controller) {
                    Input::Quit => break,
                    Input::Help => {
                        writeln!(output, "{HELP}")?;
                        continue;
                    }
                    Input::Unknown(command) => {
                        writeln!(output, "unknown command `{command}`, try /help")?;
                        continue;
                    }
                    Input::Command(command) => {
                        outstanding += runner.dispatch(controller.handle(command));
                    }
                }
            }
            Some(completion) = completions.recv() => {
                outstanding = outstanding.saturating_sub(1);
                outstanding += runner.dispatch(controller.apply(completion));
            }
            else => break,
        }

        writeln!(output)?;
        write!(output, "{}", terminal::draw(&render(controller)))?;
        output.flush()?;
    }

    Ok(())
}

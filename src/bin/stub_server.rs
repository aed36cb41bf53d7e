//! Binary entrypoint for the in-memory stub backend.

use std::process::ExitCode;

use urlchat::start_urlchat;

/// Serve the stub backend until Ctrl+C.
fn main() -> ExitCode {
    start_urlchat::run_stub()
}

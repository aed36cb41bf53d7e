//! Binary entrypoint for the terminal client.

use std::process::ExitCode;

use urlchat::start_urlchat;

/// Connect to the configured backend and read commands from stdin.
fn main() -> ExitCode {
    start_urlchat::run()
}

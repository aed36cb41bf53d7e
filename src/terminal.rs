//! Line-oriented terminal front end.
//!
//! Lines typed on the URL panel are URLs, lines typed on the chat panel are
//! questions. Lines starting with `/` are commands (see [`HELP`]).

use std::fmt;

use crate::api::SessionId;
use crate::controller::{Command, Controller, Panel, StatusLine, StatusTone};
use crate::render::{Display, MessageStyle, PanelView};

/// Help text listing the slash commands.
pub const HELP: &str = "\
commands:
  /new            go back to the URL form
  /sessions       reload the session list
  /open <n|id>    open a session by sidebar number or identifier
  /help           show this help
  /quit           exit";

/// What a typed line means.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Input {
    /// Forward to the controller.
    Command(Command),
    /// Print [`HELP`].
    Help,
    /// Leave the client.
    Quit,
    /// Unrecognised slash command.
    Unknown(String),
}

/// Interpret a typed line in the context of the visible panel.
#[must_use]
pub fn parse_input(line: &str, controller: &Controller) -> Input {
    let trimmed = line.trim();
    let Some(rest) = trimmed.strip_prefix('/') else {
        return Input::Command(match controller.state().panel() {
            Panel::UrlIntake => Command::SubmitUrl(line.to_string()),
            Panel::Chat => Command::SubmitQuestion(line.to_string()),
        });
    };

    let (name, argument) = rest
        .split_once(char::is_whitespace)
        .map_or((rest, ""), |(name, arg)| (name, arg.trim()));

    match name {
        "quit" | "exit" | "q" => Input::Quit,
        "help" | "h" | "?" => Input::Help,
        "new" => Input::Command(Command::NewChat),
        "sessions" | "ls" => Input::Command(Command::RefreshSessions),
        "open" if !argument.is_empty() => {
            Input::Command(Command::SelectSession(resolve_session(argument, controller)))
        }
        _ => Input::Unknown(trimmed.to_string()),
    }
}

/// A 1-based sidebar number, or else a raw identifier.
fn resolve_session(argument: &str, controller: &Controller) -> SessionId {
    argument
        .parse::<usize>()
        .ok()
        .and_then(|n| n.checked_sub(1))
        .and_then(|index| controller.registry().at(index))
        .map_or_else(|| SessionId::from(argument), |session| session.id.clone())
}

/// Draw a display description as plain text.
#[must_use]
pub fn draw(display: &Display) -> String {
    Screen(display).to_string()
}

/// Plain-text view of a [`Display`]: the sidebar, then the visible panel.
pub struct Screen<'a>(pub &'a Display);

impl fmt::Display for Screen<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_sidebar(f, self.0)?;
        match &self.0.panel {
            PanelView::UrlIntake {
                input_enabled,
                submit_enabled,
                status,
                ..
            } => write_url_intake(f, *input_enabled && *submit_enabled, status.as_ref()),
            PanelView::Chat {
                heading,
                source_url,
                messages,
                pending_answers,
                ..
            } => {
                writeln!(f, "== {heading} ==")?;
                if let Some(url) = source_url {
                    writeln!(f, "   {url}")?;
                }
                for message in messages {
                    let label = match message.style {
                        MessageStyle::User => "you",
                        MessageStyle::Bot => "bot",
                        MessageStyle::Pending => "...",
                        MessageStyle::Error => "err",
                    };
                    writeln!(f, "{label:>3} | {}", message.text)?;
                }
                if *pending_answers > 1 {
                    writeln!(f, "({pending_answers} answers pending)")?;
                }
                Ok(())
            }
        }
    }
}

fn write_sidebar(out: &mut impl fmt::Write, display: &Display) -> fmt::Result {
    if display.sidebar.is_empty() {
        return Ok(());
    }
    writeln!(out, "== sessions ==")?;
    for (index, item) in display.sidebar.iter().enumerate() {
        let marker = if item.selected { '>' } else { ' ' };
        writeln!(out, "{marker} [{}] {}", index + 1, item.title)?;
    }
    writeln!(out)
}

fn write_url_intake(
    out: &mut impl fmt::Write,
    ready: bool,
    status: Option<&StatusLine>,
) -> fmt::Result {
    writeln!(out, "== enter a URL to chat with ==")?;
    if !ready {
        writeln!(out, "(busy, please wait)")?;
    }
    if let Some(status) = status {
        let prefix = match status.tone {
            StatusTone::Info => "..",
            StatusTone::Error => "!!",
        };
        writeln!(out, "{prefix} {}", status.text)?;
    }
    Ok(())
}

//! Pure projection of controller state into a display description.

use serde::Serialize;

use crate::controller::{Controller, EntryKind, Focus, Panel, StatusLine};

/// Everything a front end needs to draw one frame.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Display {
    /// Sidebar entries, empty in legacy mode.
    pub sidebar: Vec<SidebarItem>,
    /// The visible panel.
    pub panel: PanelView,
}

/// One sidebar entry.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SidebarItem {
    /// Session identifier.
    pub session_id: String,
    /// Session title.
    pub title: String,
    /// Whether this is the active session.
    pub selected: bool,
}

/// Visible panel with its content.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "panel", rename_all = "snake_case")]
pub enum PanelView {
    /// URL form.
    UrlIntake {
        /// Text field accepts input.
        input_enabled: bool,
        /// Submit button is clickable.
        submit_enabled: bool,
        /// Status line.
        status: Option<StatusLine>,
        /// Text field has focus.
        focused: bool,
    },
    /// Chat panel.
    Chat {
        /// Heading (session title or URL).
        heading: String,
        /// Crawled URL, when known.
        source_url: Option<String>,
        /// Messages in order.
        messages: Vec<MessageView>,
        /// Message field has focus.
        focused: bool,
        /// Answers still pending.
        pending_answers: usize,
    },
}

/// How a message is styled.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageStyle {
    /// User-authored.
    User,
    /// Bot-authored.
    Bot,
    /// Transient placeholder.
    Pending,
    /// Failure notice.
    Error,
}

impl From<EntryKind> for MessageStyle {
    fn from(kind: EntryKind) -> Self {
        match kind {
            EntryKind::User => Self::User,
            EntryKind::Bot => Self::Bot,
            EntryKind::Loading | EntryKind::Thinking => Self::Pending,
            EntryKind::Error => Self::Error,
        }
    }
}

/// One rendered message.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct MessageView {
    /// Style.
    pub style: MessageStyle,
    /// Text.
    pub text: String,
}

/// Project the controller into a [`Display`].
#[must_use]
pub fn render(controller: &Controller) -> Display {
    let state = controller.state();

    let sidebar = controller
        .registry()
        .sessions()
        .iter()
        .map(|session| SidebarItem {
            session_id: session.id.to_string(),
            title: session.title.clone(),
            selected: state.is_active(&session.id),
        })
        .collect();

    let panel = match state.panel() {
        Panel::UrlIntake => PanelView::UrlIntake {
            input_enabled: state.url_input_enabled(),
            submit_enabled: state.url_submit_enabled(),
            status: state.status().cloned(),
            focused: state.focus() == Some(Focus::UrlInput),
        },
        Panel::Chat => PanelView::Chat {
            heading: state.heading().to_string(),
            source_url: state.source_url().map(str::to_string),
            messages: controller
                .transcript()
                .entries()
                .iter()
                .map(|entry| MessageView {
                    style: entry.kind.into(),
                    text: entry.text.clone(),
                })
                .collect(),
            focused: state.focus() == Some(Focus::MessageInput),
            pending_answers: state.pending_questions(),
        },
    };

    Display { sidebar, panel }
}

//! Rendered transcript of the chat panel.
//!
//! Entries are append-only while a view lives. The only entries that ever
//! change are placeholders (`Loading`, `Thinking`), which are resolved in
//! place into a final message.

use serde::Serialize;

/// Text of the placeholder shown while a transcript is fetched.
pub const LOADING_TEXT: &str = "Loading conversation...";
/// Text of the placeholder shown while an answer is pending.
pub const THINKING_TEXT: &str = "Thinking...";

/// Stable handle on one transcript entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct EntryId(u64);

/// What an entry is and who wrote it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum EntryKind {
    /// Question typed by the user.
    User,
    /// Answer or greeting from the bot.
    Bot,
    /// Transcript is being fetched.
    Loading,
    /// Answer is being generated.
    Thinking,
    /// Transcript could not be loaded.
    Error,
}

impl EntryKind {
    /// Whether entries of this kind are still waiting to be resolved.
    #[must_use]
    pub const fn is_placeholder(self) -> bool {
        matches!(self, Self::Loading | Self::Thinking)
    }
}

/// One rendered message.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TranscriptEntry {
    /// Handle.
    pub id: EntryId,
    /// Kind.
    pub kind: EntryKind,
    /// Text content.
    pub text: String,
}

/// Ordered messages of the chat panel.
#[derive(Clone, Debug, Default, Serialize)]
pub struct Transcript {
    entries: Vec<TranscriptEntry>,
    next_id: u64,
}

impl Transcript {
    /// Entries in display order.
    #[must_use]
    pub fn entries(&self) -> &[TranscriptEntry] {
        &self.entries
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing is shown.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Look up an entry.
    #[must_use]
    pub fn get(&self, id: EntryId) -> Option<&TranscriptEntry> {
        self.entries.iter().find(|entry| entry.id == id)
    }

    /// Append an entry and return its handle.
    pub fn push(&mut self, kind: EntryKind, text: impl Into<String>) -> EntryId {
        let entry = self.allocate(kind, text);
        let id = entry.id;
        self.entries.push(entry);
        id
    }

    fn allocate(&mut self, kind: EntryKind, text: impl Into<String>) -> TranscriptEntry {
        let id = EntryId(self.next_id);
        self.next_id += 1;
        TranscriptEntry {
            id,
            kind,
            text: text.into(),
        }
    }

    /// Drop every entry. Handles are never reused afterwards.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Replace the whole view by a single loading placeholder.
    pub fn reset_loading(&mut self) -> EntryId {
        self.clear();
        self.push(EntryKind::Loading, LOADING_TEXT)
    }

    /// Swap the loading placeholder for `entries`.
    ///
    /// Entries pushed after the placeholder (questions asked while the
    /// transcript was loading) stay after it. Returns `false` if no loading
    /// placeholder is shown.
    pub fn fill_loading<I, S>(&mut self, entries: I) -> bool
    where
        I: IntoIterator<Item = (EntryKind, S)>,
        S: Into<String>,
    {
        let Some(index) = self
            .entries
            .iter()
            .position(|entry| entry.kind == EntryKind::Loading)
        else {
            return false;
        };

        let filled: Vec<TranscriptEntry> = entries
            .into_iter()
            .map(|(kind, text)| self.allocate(kind, text))
            .collect();
        let tail = self.entries.split_off(index);
        self.entries.extend(filled);
        self.entries.extend(tail.into_iter().skip(1));
        true
    }

    /// Replace the whole view by one entry.
    pub fn replace_with(&mut self, kind: EntryKind, text: impl Into<String>) -> EntryId {
        self.clear();
        self.push(kind, text)
    }

    /// Turn a placeholder into a final entry, keeping its position.
    ///
    /// Returns `false` if the entry is gone or was already resolved.
    pub fn resolve(&mut self, id: EntryId, kind: EntryKind, text: impl Into<String>) -> bool {
        match self
            .entries
            .iter_mut()
            .find(|entry| entry.id == id && entry.kind.is_placeholder())
        {
            Some(entry) => {
                entry.kind = kind;
                entry.text = text.into();
                true
            }
            None => false,
        }
    }

    /// Count entries of a given kind.
    #[must_use]
    pub fn count(&self, kind: EntryKind) -> usize {
        self.entries.iter().filter(|entry| entry.kind == kind).count()
    }
}

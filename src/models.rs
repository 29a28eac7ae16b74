use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub title: String,
    pub description: String,
}

impl Note {
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Note {
            title: title.into(),
            description: description.into(),
        }
    }
}

/// Identifies a note for the lifetime of the process. Never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NoteId(u64);

impl NoteId {
    pub(crate) fn new(raw: u64) -> Self {
        NoteId(raw)
    }
}

impl fmt::Display for NoteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub id: NoteId,
    pub note: Note,
}

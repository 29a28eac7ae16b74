//! Error types for the note store and its storage backends

use thiserror::Error;

use crate::models::NoteId;

/// Failures raised by a key-value backend
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// Any other backend fault
    #[error("storage backend error: {0}")]
    Backend(String),
}

/// Errors surfaced by [`crate::store::NoteStore`]
#[derive(Debug, Error)]
pub enum NoteError {
    /// The backend could not be read
    #[error("failed to read `{key}` from storage")]
    StorageRead {
        key: String,
        #[source]
        source: StorageError,
    },

    /// The backend rejected the write; the in-memory list is unchanged
    #[error("failed to write `{key}` to storage")]
    StorageWrite {
        key: String,
        #[source]
        source: StorageError,
    },

    /// A value exists under the key but is not a note list
    #[error("value stored under `{key}` is not a valid note list")]
    Deserialization {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to serialize note list")]
    Serialization(#[source] serde_json::Error),

    #[error("no note at index {index} (list holds {len})")]
    InvalidIndex { index: usize, len: usize },

    #[error("no note with id {0}")]
    UnknownNote(NoteId),
}

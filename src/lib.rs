pub mod app;
pub mod cli;
pub mod codec;
pub mod confirm;
pub mod db;
pub mod error;
pub mod logging;
pub mod models;
pub mod storage;
pub mod store;

pub use error::{NoteError, StorageError};
pub use models::{Entry, Note, NoteId};
pub use storage::{KeyValueStore, MemoryStore};
pub use store::NoteStore;

use tracing::{debug, info};

use crate::{
    codec,
    confirm::{DELETE_MESSAGE, DELETE_TITLE, Prompt},
    error::NoteError,
    models::{Entry, Note, NoteId},
    storage::KeyValueStore,
};

pub const DEFAULT_KEY: &str = "notes";

pub struct NoteStore<S> {
    storage: S,
    key: String,
    entries: Vec<Entry>,
    next_id: u64,
}

impl<S: KeyValueStore> NoteStore<S> {
    /// Reads the list stored under `key`. A missing or empty value is an
    /// empty list; anything that does not decode is an error.
    pub fn load(storage: S, key: impl Into<String>) -> Result<Self, NoteError> {
        let key = key.into();
        let raw = storage.get(&key).map_err(|source| NoteError::StorageRead {
            key: key.clone(),
            source,
        })?;

        let notes = match raw.as_deref() {
            None | Some("") => Vec::new(),
            Some(raw) => codec::decode(raw).map_err(|source| NoteError::Deserialization {
                key: key.clone(),
                source,
            })?,
        };
        debug!(key = %key, count = notes.len(), "loaded notes");

        let mut store = NoteStore {
            storage,
            key,
            entries: Vec::new(),
            next_id: 0,
        };
        let entries: Vec<Entry> = notes.into_iter().map(|note| store.entry(note)).collect();
        store.entries = entries;
        Ok(store)
    }

    pub fn append(&mut self, note: Note) -> Result<&[Entry], NoteError> {
        let mut next = self.entries.clone();
        let entry = self.entry(note);
        let id = entry.id;
        next.push(entry);

        self.commit(next)?;
        info!(%id, count = self.entries.len(), "note saved");
        Ok(&self.entries)
    }

    pub fn remove_at(&mut self, index: usize) -> Result<Note, NoteError> {
        let len = self.entries.len();
        if index >= len {
            return Err(NoteError::InvalidIndex { index, len });
        }

        let mut next = self.entries.clone();
        let removed = next.remove(index);

        self.commit(next)?;
        info!(id = %removed.id, index, "note deleted");
        Ok(removed.note)
    }

    pub fn remove(&mut self, id: NoteId) -> Result<Note, NoteError> {
        let index = self.position(id).ok_or(NoteError::UnknownNote(id))?;
        self.remove_at(index)
    }

    /// Asks `prompt` before removing the note at `index`. Returns `None` when
    /// the user cancels, in which case nothing is written.
    pub fn confirm_and_remove<P>(
        &mut self,
        index: usize,
        prompt: &mut P,
    ) -> Result<Option<Note>, NoteError>
    where
        P: Prompt + ?Sized,
    {
        let len = self.entries.len();
        if index >= len {
            return Err(NoteError::InvalidIndex { index, len });
        }

        if prompt.confirm(DELETE_TITLE, DELETE_MESSAGE).is_affirm() {
            return self.remove_at(index).map(Some);
        }

        debug!(index, "delete cancelled");
        Ok(None)
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn notes(&self) -> Vec<Note> {
        self.entries.iter().map(|entry| entry.note.clone()).collect()
    }

    pub fn get(&self, index: usize) -> Option<&Entry> {
        self.entries.get(index)
    }

    pub fn position(&self, id: NoteId) -> Option<usize> {
        self.entries.iter().position(|entry| entry.id == id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    fn entry(&mut self, note: Note) -> Entry {
        let id = NoteId::new(self.next_id);
        self.next_id += 1;
        Entry { id, note }
    }

    // Storage first; memory only changes once the write has landed.
    fn commit(&mut self, next: Vec<Entry>) -> Result<(), NoteError> {
        let raw = codec::encode(next.iter().map(|entry| &entry.note))
            .map_err(NoteError::Serialization)?;
        self.storage
            .set(&self.key, &raw)
            .map_err(|source| NoteError::StorageWrite {
                key: self.key.clone(),
                source,
            })?;

        self.entries = next;
        Ok(())
    }
}

use std::{io::Write, path::PathBuf};

use clap::{Parser, Subcommand};
use color_eyre::Result;

use crate::{
    confirm::{Confirmation, Fixed, Prompt},
    db::SqliteStore,
    error::StorageError,
    models::Note,
    storage::{KeyValueStore, MemoryStore},
    store::{DEFAULT_KEY, NoteStore},
};

#[derive(Debug, Parser)]
#[command(name = "jotter")]
#[command(about = "Jot down notes in the terminal", long_about = None)]
#[command(version)]
pub struct Cli {
    /// SQLite database holding the notes
    #[arg(long, default_value = "notes.db")]
    pub db: PathBuf,

    /// Storage key the note list lives under
    #[arg(long, default_value = DEFAULT_KEY)]
    pub key: String,

    /// Keep notes in memory only; nothing survives exit
    #[arg(long)]
    pub in_memory: bool,

    /// Write logs to this file (filtered by RUST_LOG)
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Without a command the interactive screen is opened
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand, PartialEq, Eq)]
pub enum Command {
    /// Print every note with its index
    List,

    /// Save a new note at the end of the list
    Add {
        #[arg(short, long)]
        title: String,

        #[arg(short, long, default_value = "")]
        description: String,
    },

    /// Delete the note at INDEX after confirmation
    Delete {
        index: usize,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

impl Cli {
    pub fn open_storage(&self) -> Result<Box<dyn KeyValueStore>, StorageError> {
        if self.in_memory {
            return Ok(Box::new(MemoryStore::new()));
        }
        Ok(Box::new(SqliteStore::open(&self.db)?))
    }
}

pub fn run<S: KeyValueStore>(
    command: Command,
    store: &mut NoteStore<S>,
    out: &mut impl Write,
    prompt: &mut dyn Prompt,
) -> Result<()> {
    match command {
        Command::List => list(store, out)?,
        Command::Add { title, description } => {
            let len = store.append(Note::new(title, description))?.len();
            writeln!(out, "Saved note [{}]", len - 1)?;
        }
        Command::Delete { index, yes } => {
            let removed = if yes {
                store.confirm_and_remove(index, &mut Fixed(Confirmation::Affirm))?
            } else {
                store.confirm_and_remove(index, prompt)?
            };
            match removed {
                Some(note) => writeln!(out, "Deleted \"{}\"", note.title)?,
                None => writeln!(out, "Cancelled")?,
            }
        }
    }

    Ok(())
}

fn list<S: KeyValueStore>(store: &NoteStore<S>, out: &mut impl Write) -> Result<()> {
    if store.is_empty() {
        writeln!(out, "No notes found")?;
        return Ok(());
    }

    for (index, entry) in store.entries().iter().enumerate() {
        writeln!(out, "{index}. {}", entry.note.title)?;
        for line in entry.note.description.lines() {
            writeln!(out, "    {line}")?;
        }
    }

    Ok(())
}

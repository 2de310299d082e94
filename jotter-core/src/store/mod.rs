//! Durable key-value storage for the note collection and the theme flag.
//!
//! Two logical keys exist: [`NOTES_KEY`] holds the collection as a JSON
//! array, [`DARK_MODE_KEY`] holds the literal text `true`/`false`. The
//! [`Store`] trait keeps the backend swappable; [`SqliteStore`] is the
//! durable backend and [`MemoryStore`] the in-memory fake for tests.

mod memory;
mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

use thiserror::Error;

use crate::models::Note;

pub const NOTES_KEY: &str = "notes";
pub const DARK_MODE_KEY: &str = "darkMode";

#[derive(Debug, Error)]
pub enum StoreError {
    /// A persisted value exists but does not parse as its schema.
    #[error("persisted value for `{key}` is corrupt")]
    Corrupt {
        key: &'static str,
        #[source]
        source: serde_json::Error,
    },
    #[error("could not serialize value for `{key}`")]
    Serialize {
        key: &'static str,
        #[source]
        source: serde_json::Error,
    },
    #[error("storage backend failure")]
    Backend(#[from] rusqlite::Error),
    #[error("storage i/o failure")]
    Io(#[from] std::io::Error),
    #[error("could not determine a data directory for this platform")]
    NoDataDir,
}

/// Minimal key-value contract every backend implements.
pub trait Store: Send {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError>;
}

/// Typed persistence layer over a [`Store`] backend.
pub struct NoteStore {
    backend: Box<dyn Store>,
}

impl NoteStore {
    pub fn new(backend: impl Store + 'static) -> Self {
        NoteStore {
            backend: Box::new(backend),
        }
    }

    /// The saved collection, `None` if nothing was ever written. A value
    /// that exists but fails to parse is `StoreError::Corrupt`.
    pub fn load_notes(&self) -> Result<Option<Vec<Note>>, StoreError> {
        let Some(raw) = self.backend.get(NOTES_KEY)? else {
            return Ok(None);
        };
        let notes = serde_json::from_str(&raw).map_err(|source| StoreError::Corrupt {
            key: NOTES_KEY,
            source,
        })?;
        Ok(Some(notes))
    }

    /// Overwrites the entire stored collection.
    pub fn save_notes(&mut self, notes: &[Note]) -> Result<(), StoreError> {
        let raw = serde_json::to_string(notes).map_err(|source| StoreError::Serialize {
            key: NOTES_KEY,
            source,
        })?;
        self.backend.set(NOTES_KEY, &raw)
    }

    /// The saved theme flag. `ambient_default` applies when no flag was
    /// ever written (or the stored text is unrecognized).
    pub fn load_dark_mode(&self, ambient_default: bool) -> Result<bool, StoreError> {
        Ok(match self.backend.get(DARK_MODE_KEY)?.as_deref() {
            Some("true") => true,
            Some("false") => false,
            _ => ambient_default,
        })
    }

    pub fn save_dark_mode(&mut self, enabled: bool) -> Result<(), StoreError> {
        self.backend
            .set(DARK_MODE_KEY, if enabled { "true" } else { "false" })
    }
}

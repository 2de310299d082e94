//! Core library for Jotter.
//!
//! This crate provides the note model, key-value persistence, and the
//! notes state manager, independent of any transport or presentation
//! layer (HTTP, CLI, etc.).
//!
//! # Usage
//!
//! ```no_run
//! use jotter_core::state::Notebook;
//! use jotter_core::store::{NoteStore, SqliteStore};
//!
//! let store = NoteStore::new(SqliteStore::open_default()?);
//! let mut notebook = Notebook::initialize(store, false)?;
//! let _id = notebook.add_note()?;
//! # Ok::<(), jotter_core::store::StoreError>(())
//! ```

pub mod models;
pub mod state;
pub mod store;
pub mod summarize;

// Re-export the state container at crate root
pub use state::Notebook;

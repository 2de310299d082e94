use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::now_ms;

pub const DEFAULT_TITLE: &str = "Untitled Note";

/// A titled text document with timestamps and an optional AI-generated
/// summary. Serialized field names and millisecond timestamps are part of
/// the persisted format; see `store`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    /// Set while a summarization request for this note is in flight.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_summarizing: Option<bool>,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub updated_at: DateTime<Utc>,
}

impl Note {
    pub fn new() -> Self {
        let now = now_ms();
        Note {
            id: Uuid::new_v4(),
            title: DEFAULT_TITLE.to_string(),
            content: String::new(),
            summary: None,
            is_summarizing: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// The note synthesized on first run, when no collection was saved.
    pub fn welcome() -> Self {
        let mut note = Note::new();
        note.title = "Welcome to Notes".to_string();
        note.content = "Start writing your notes here. Run `jot summarize` \
                        to generate an AI summary of your note."
            .to_string();
        note
    }
}

impl Default for Note {
    fn default() -> Self {
        Note::new()
    }
}

/// Partial fields merged into a note by `Notebook::update_note`. Fields
/// left as `None` are untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NoteUpdate {
    pub title: Option<String>,
    pub content: Option<String>,
    pub summary: Option<String>,
    pub is_summarizing: Option<bool>,
}

//! The notes state manager: single owner of the in-memory collection,
//! the selection, and the theme flag. Every mutation restamps the note's
//! `updated_at` and persists the full collection.

use uuid::Uuid;

use crate::models::{now_ms, Note, NoteUpdate};
use crate::store::{NoteStore, StoreError};
use crate::summarize::{SummarizeError, Summarizer};

pub struct Notebook {
    notes: Vec<Note>,
    active_note_id: Option<Uuid>,
    dark_mode: bool,
    store: NoteStore,
}

impl Notebook {
    /// One-time bootstrap. Adopts the saved collection when it loads and
    /// parses, selecting the most recently updated note. A corrupt payload
    /// is logged and treated as absent. When nothing was ever saved, a
    /// welcome note is synthesized and selected.
    pub fn initialize(store: NoteStore, ambient_dark: bool) -> Result<Self, StoreError> {
        let (notes, adopted) = match store.load_notes() {
            Ok(Some(notes)) => (notes, true),
            Ok(None) => (Vec::new(), false),
            Err(err @ StoreError::Corrupt { .. }) => {
                tracing::warn!(error = %err, "discarding unreadable saved notes");
                (Vec::new(), false)
            }
            Err(err) => return Err(err),
        };
        let dark_mode = store.load_dark_mode(ambient_dark)?;

        let mut notebook = Notebook {
            notes,
            active_note_id: None,
            dark_mode,
            store,
        };

        // No summarization request survives a restart; a persisted
        // in-flight flag is settled the same way a failed call is.
        let mut cleared = false;
        for note in &mut notebook.notes {
            if note.is_summarizing == Some(true) {
                note.is_summarizing = Some(false);
                cleared = true;
            }
        }
        if cleared {
            notebook.persist()?;
        }

        if notebook.notes.is_empty() && !adopted {
            let welcome = Note::welcome();
            notebook.active_note_id = Some(welcome.id);
            notebook.notes.push(welcome);
            notebook.persist()?;
        } else {
            notebook.active_note_id = notebook.most_recent_id();
        }

        Ok(notebook)
    }

    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    /// Derived view ordered by `updated_at` descending; never stored.
    pub fn notes_by_recency(&self) -> Vec<&Note> {
        let mut ordered: Vec<&Note> = self.notes.iter().collect();
        ordered.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        ordered
    }

    pub fn get(&self, id: Uuid) -> Option<&Note> {
        self.notes.iter().find(|note| note.id == id)
    }

    pub fn active_note_id(&self) -> Option<Uuid> {
        self.active_note_id
    }

    pub fn active_note(&self) -> Option<&Note> {
        self.active_note_id.and_then(|id| self.get(id))
    }

    pub fn dark_mode(&self) -> bool {
        self.dark_mode
    }

    /// Inserts a fresh note with default fields at the front of the
    /// collection and selects it.
    pub fn add_note(&mut self) -> Result<Uuid, StoreError> {
        let note = Note::new();
        let id = note.id;
        self.notes.insert(0, note);
        self.active_note_id = Some(id);
        self.persist()?;
        Ok(id)
    }

    /// Merges `update` into the matching note and restamps `updated_at`.
    /// Unknown ids are a no-op; a summarization that resolves after its
    /// note was deleted lands here harmlessly.
    pub fn update_note(&mut self, id: Uuid, update: NoteUpdate) -> Result<(), StoreError> {
        let Some(note) = self.notes.iter_mut().find(|note| note.id == id) else {
            return Ok(());
        };
        let NoteUpdate {
            title,
            content,
            summary,
            is_summarizing,
        } = update;
        if let Some(title) = title {
            note.title = title;
        }
        if let Some(content) = content {
            note.content = content;
        }
        if let Some(summary) = summary {
            note.summary = Some(summary);
        }
        if let Some(flag) = is_summarizing {
            note.is_summarizing = Some(flag);
        }
        note.updated_at = now_ms();
        self.persist()
    }

    /// Removes the note. When it was selected, selection moves to the most
    /// recently updated remaining note, or clears. Unknown ids are a no-op.
    pub fn delete_note(&mut self, id: Uuid) -> Result<(), StoreError> {
        let before = self.notes.len();
        self.notes.retain(|note| note.id != id);
        if self.notes.len() == before {
            return Ok(());
        }
        if self.active_note_id == Some(id) {
            self.active_note_id = self.most_recent_id();
        }
        self.persist()
    }

    /// Changes selection only. A stale id is tolerated; note lookups then
    /// yield nothing until selection changes again.
    pub fn set_active_note(&mut self, id: Option<Uuid>) {
        self.active_note_id = id;
    }

    /// Flips the theme flag and persists it independently of the notes.
    pub fn toggle_dark_mode(&mut self) -> Result<bool, StoreError> {
        self.dark_mode = !self.dark_mode;
        self.store.save_dark_mode(self.dark_mode)?;
        Ok(self.dark_mode)
    }

    /// First half of the summarization flow: marks the note as in flight
    /// and hands back the text to send. Returns `None` (and changes
    /// nothing) when the note is unknown or its content is blank.
    ///
    /// A note already in flight is marked again rather than rejected:
    /// overlapping requests race and the last resolution wins.
    pub fn begin_summarize(&mut self, id: Uuid) -> Result<Option<String>, StoreError> {
        let Some(note) = self.get(id) else {
            return Ok(None);
        };
        if note.content.trim().is_empty() {
            return Ok(None);
        }
        let text = note.content.clone();
        self.update_note(
            id,
            NoteUpdate {
                is_summarizing: Some(true),
                ..Default::default()
            },
        )?;
        Ok(Some(text))
    }

    /// Second half: applies the resolved summary, or on failure clears the
    /// in-flight flag and leaves any prior summary in place. The failure
    /// is logged here and not propagated.
    pub fn finish_summarize(
        &mut self,
        id: Uuid,
        outcome: Result<String, SummarizeError>,
    ) -> Result<(), StoreError> {
        match outcome {
            Ok(summary) => self.update_note(
                id,
                NoteUpdate {
                    summary: Some(summary),
                    is_summarizing: Some(false),
                    ..Default::default()
                },
            ),
            Err(err) => {
                tracing::warn!(note_id = %id, error = %err, "summarization failed");
                self.update_note(
                    id,
                    NoteUpdate {
                        is_summarizing: Some(false),
                        ..Default::default()
                    },
                )
            }
        }
    }

    /// The full flow: mark in flight, await the client, apply the result.
    /// The only suspending operation on the notebook.
    pub async fn summarize_note(
        &mut self,
        id: Uuid,
        summarizer: &dyn Summarizer,
    ) -> Result<(), StoreError> {
        let Some(text) = self.begin_summarize(id)? else {
            return Ok(());
        };
        let outcome = summarizer.summarize(&text).await;
        self.finish_summarize(id, outcome)
    }

    fn most_recent_id(&self) -> Option<Uuid> {
        self.notes
            .iter()
            .max_by_key(|note| note.updated_at)
            .map(|note| note.id)
    }

    fn persist(&mut self) -> Result<(), StoreError> {
        self.store.save_notes(&self.notes)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::thread::sleep;
    use std::time::Duration;

    use async_trait::async_trait;

    use super::*;
    use crate::store::{MemoryStore, Store, NOTES_KEY};

    struct FixedSummarizer(&'static str);

    #[async_trait]
    impl Summarizer for FixedSummarizer {
        async fn summarize(&self, _text: &str) -> Result<String, SummarizeError> {
            Ok(self.0.to_string())
        }
    }

    struct FailingSummarizer;

    #[async_trait]
    impl Summarizer for FailingSummarizer {
        async fn summarize(&self, _text: &str) -> Result<String, SummarizeError> {
            Err(SummarizeError::Status {
                status: 429,
                message: "rate limited".to_string(),
            })
        }
    }

    /// A notebook whose store already held an (empty) collection, so no
    /// welcome note is synthesized.
    fn empty_notebook() -> Notebook {
        let mut backend = MemoryStore::new();
        backend.set(NOTES_KEY, "[]").unwrap();
        Notebook::initialize(NoteStore::new(backend), false).unwrap()
    }

    fn notebook_with_content(content: &str) -> (Notebook, Uuid) {
        let mut notebook = empty_notebook();
        let id = notebook.add_note().unwrap();
        notebook
            .update_note(
                id,
                NoteUpdate {
                    content: Some(content.to_string()),
                    ..Default::default()
                },
            )
            .unwrap();
        (notebook, id)
    }

    #[test]
    fn first_run_bootstraps_a_selected_welcome_note() {
        let notebook =
            Notebook::initialize(NoteStore::new(MemoryStore::new()), false).unwrap();
        assert_eq!(notebook.notes().len(), 1);
        let welcome = &notebook.notes()[0];
        assert_eq!(welcome.title, "Welcome to Notes");
        assert_eq!(notebook.active_note_id(), Some(welcome.id));
    }

    #[test]
    fn corrupt_payload_is_treated_as_absent() {
        let mut backend = MemoryStore::new();
        backend.set(NOTES_KEY, "{not json").unwrap();
        let notebook = Notebook::initialize(NoteStore::new(backend), false).unwrap();
        assert_eq!(notebook.notes().len(), 1);
        assert_eq!(notebook.notes()[0].title, "Welcome to Notes");
    }

    #[test]
    fn adopted_empty_collection_stays_empty() {
        let notebook = empty_notebook();
        assert!(notebook.notes().is_empty());
        assert_eq!(notebook.active_note_id(), None);
    }

    #[test]
    fn initialize_selects_the_most_recently_updated_note() {
        let mut notebook = empty_notebook();
        let first = notebook.add_note().unwrap();
        sleep(Duration::from_millis(5));
        let _second = notebook.add_note().unwrap();
        sleep(Duration::from_millis(5));
        notebook
            .update_note(
                first,
                NoteUpdate {
                    title: Some("touched last".to_string()),
                    ..Default::default()
                },
            )
            .unwrap();

        let raw = serde_json::to_string(notebook.notes()).unwrap();
        let mut backend = MemoryStore::new();
        backend.set(NOTES_KEY, &raw).unwrap();
        let reopened = Notebook::initialize(NoteStore::new(backend), false).unwrap();
        assert_eq!(reopened.active_note_id(), Some(first));
    }

    #[test]
    fn initialize_settles_a_stale_in_flight_flag() {
        let mut note = Note::new();
        note.is_summarizing = Some(true);
        let raw = serde_json::to_string(&vec![note.clone()]).unwrap();
        let mut backend = MemoryStore::new();
        backend.set(NOTES_KEY, &raw).unwrap();

        let notebook = Notebook::initialize(NoteStore::new(backend), false).unwrap();
        let reloaded = notebook.get(note.id).unwrap();
        assert_eq!(reloaded.is_summarizing, Some(false));
        // Settling the flag is not a user edit
        assert_eq!(reloaded.updated_at, note.updated_at);
    }

    #[test]
    fn added_notes_are_unique_first_and_selected() {
        let mut notebook = empty_notebook();
        let mut last = None;
        for _ in 0..5 {
            last = Some(notebook.add_note().unwrap());
        }

        assert_eq!(notebook.notes().len(), 5);
        let ids: HashSet<Uuid> = notebook.notes().iter().map(|note| note.id).collect();
        assert_eq!(ids.len(), 5);
        assert_eq!(Some(notebook.notes()[0].id), last);
        assert_eq!(notebook.active_note_id(), last);
    }

    #[test]
    fn update_touches_only_the_matching_note() {
        let mut notebook = empty_notebook();
        let target = notebook.add_note().unwrap();
        let other = notebook.add_note().unwrap();
        let before_target = notebook.get(target).unwrap().clone();
        let before_other = notebook.get(other).unwrap().clone();

        sleep(Duration::from_millis(5));
        notebook
            .update_note(
                target,
                NoteUpdate {
                    title: Some("X".to_string()),
                    ..Default::default()
                },
            )
            .unwrap();

        let after = notebook.get(target).unwrap();
        assert_eq!(after.title, "X");
        assert_eq!(after.content, before_target.content);
        assert_eq!(after.created_at, before_target.created_at);
        assert!(after.updated_at > before_target.updated_at);
        assert_eq!(notebook.get(other).unwrap(), &before_other);
    }

    #[test]
    fn update_with_unknown_id_changes_nothing() {
        let mut notebook = empty_notebook();
        notebook.add_note().unwrap();
        let snapshot: Vec<Note> = notebook.notes().to_vec();

        notebook
            .update_note(
                Uuid::new_v4(),
                NoteUpdate {
                    title: Some("ghost".to_string()),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(notebook.notes(), snapshot.as_slice());
    }

    #[test]
    fn deleting_the_active_note_selects_the_most_recent_remaining() {
        let mut notebook = empty_notebook();
        let oldest = notebook.add_note().unwrap();
        sleep(Duration::from_millis(5));
        let middle = notebook.add_note().unwrap();
        sleep(Duration::from_millis(5));
        let newest = notebook.add_note().unwrap();

        sleep(Duration::from_millis(5));
        notebook
            .update_note(
                oldest,
                NoteUpdate {
                    title: Some("bumped".to_string()),
                    ..Default::default()
                },
            )
            .unwrap();

        notebook.set_active_note(Some(newest));
        notebook.delete_note(newest).unwrap();
        assert_eq!(notebook.active_note_id(), Some(oldest));

        notebook.delete_note(oldest).unwrap();
        assert_eq!(notebook.active_note_id(), Some(middle));

        notebook.delete_note(middle).unwrap();
        assert_eq!(notebook.active_note_id(), None);
        assert!(notebook.notes().is_empty());
    }

    #[test]
    fn deleting_an_unknown_id_changes_nothing() {
        let mut notebook = empty_notebook();
        let id = notebook.add_note().unwrap();
        notebook.delete_note(Uuid::new_v4()).unwrap();
        assert_eq!(notebook.notes().len(), 1);
        assert_eq!(notebook.active_note_id(), Some(id));
    }

    #[test]
    fn deleting_an_inactive_note_keeps_the_selection() {
        let mut notebook = empty_notebook();
        let first = notebook.add_note().unwrap();
        let second = notebook.add_note().unwrap();
        notebook.delete_note(first).unwrap();
        assert_eq!(notebook.active_note_id(), Some(second));
    }

    #[test]
    fn recency_view_is_derived_not_stored() {
        let mut notebook = empty_notebook();
        let first = notebook.add_note().unwrap();
        sleep(Duration::from_millis(5));
        let second = notebook.add_note().unwrap();
        sleep(Duration::from_millis(5));
        notebook
            .update_note(
                first,
                NoteUpdate {
                    content: Some("bump".to_string()),
                    ..Default::default()
                },
            )
            .unwrap();

        let ordered: Vec<Uuid> = notebook
            .notes_by_recency()
            .iter()
            .map(|note| note.id)
            .collect();
        assert_eq!(ordered, vec![first, second]);
        // Stored order still has the newest insertion first
        assert_eq!(notebook.notes()[0].id, second);
    }

    #[test]
    fn begin_summarize_skips_blank_content() {
        let (mut notebook, id) = notebook_with_content("   \n\t");
        let before = notebook.get(id).unwrap().clone();

        assert!(notebook.begin_summarize(id).unwrap().is_none());
        assert_eq!(notebook.get(id).unwrap(), &before);
    }

    #[test]
    fn begin_summarize_skips_unknown_notes() {
        let mut notebook = empty_notebook();
        assert!(notebook.begin_summarize(Uuid::new_v4()).unwrap().is_none());
    }

    #[test]
    fn begin_summarize_marks_the_note_in_flight() {
        let (mut notebook, id) = notebook_with_content("hello world");
        let text = notebook.begin_summarize(id).unwrap();
        assert_eq!(text.as_deref(), Some("hello world"));

        let note = notebook.get(id).unwrap();
        assert_eq!(note.is_summarizing, Some(true));
        // The summary must not change until the request resolves
        assert_eq!(note.summary, None);
    }

    #[test]
    fn finish_summarize_after_delete_is_a_no_op() {
        let (mut notebook, id) = notebook_with_content("hello world");
        notebook.begin_summarize(id).unwrap();
        notebook.delete_note(id).unwrap();

        notebook
            .finish_summarize(id, Ok("too late".to_string()))
            .unwrap();
        assert!(notebook.get(id).is_none());
    }

    #[tokio::test]
    async fn summarize_applies_the_client_result() {
        let (mut notebook, id) = notebook_with_content("hello world");
        notebook
            .summarize_note(id, &FixedSummarizer("test summary"))
            .await
            .unwrap();

        let note = notebook.get(id).unwrap();
        assert_eq!(note.summary.as_deref(), Some("test summary"));
        assert_eq!(note.is_summarizing, Some(false));
    }

    #[tokio::test]
    async fn summarize_failure_clears_the_flag_and_keeps_the_summary() {
        let (mut notebook, id) = notebook_with_content("hello world");
        notebook
            .update_note(
                id,
                NoteUpdate {
                    summary: Some("earlier summary".to_string()),
                    ..Default::default()
                },
            )
            .unwrap();

        notebook
            .summarize_note(id, &FailingSummarizer)
            .await
            .unwrap();

        let note = notebook.get(id).unwrap();
        assert_eq!(note.summary.as_deref(), Some("earlier summary"));
        assert_eq!(note.is_summarizing, Some(false));
    }

    #[tokio::test]
    async fn summarize_on_empty_content_never_calls_the_client() {
        struct PanickingSummarizer;

        #[async_trait]
        impl Summarizer for PanickingSummarizer {
            async fn summarize(&self, _text: &str) -> Result<String, SummarizeError> {
                panic!("the client must not be called for empty content");
            }
        }

        let mut notebook = empty_notebook();
        let id = notebook.add_note().unwrap();
        let before = notebook.get(id).unwrap().clone();

        notebook
            .summarize_note(id, &PanickingSummarizer)
            .await
            .unwrap();
        assert_eq!(notebook.get(id).unwrap(), &before);
    }

    #[test]
    fn toggle_dark_mode_flips_and_reports() {
        let mut notebook = empty_notebook();
        assert!(!notebook.dark_mode());
        assert!(notebook.toggle_dark_mode().unwrap());
        assert!(notebook.dark_mode());
        assert!(!notebook.toggle_dark_mode().unwrap());
    }

    #[test]
    fn selecting_a_missing_id_yields_no_active_note() {
        let mut notebook = empty_notebook();
        notebook.add_note().unwrap();
        notebook.set_active_note(Some(Uuid::new_v4()));
        assert!(notebook.active_note().is_none());
    }
}

//! In-memory note store used when the remote service cannot be reached.
//! Contents live only as long as the process.

use rand::Rng;

use crate::{
    dto::{CreateNoteRequest, UpdateNoteRequest},
    models::{self, Note},
};

const WELCOME_TITLE: &str = "Welcome";
const WELCOME_CONTENT: &str = "This note lives in memory while the notes server is unreachable. \
Create, edit and delete notes as usual; changes are kept until the program exits.";

#[derive(Debug, Default)]
pub struct LocalStore {
    notes: Vec<Note>,
}

impl LocalStore {
    pub const fn new() -> Self {
        Self { notes: Vec::new() }
    }

    /// Store holding a single welcome note.
    pub fn seeded() -> Self {
        let now = models::timestamp_after(None);
        Self {
            notes: vec![Note {
                id: "welcome".to_string(),
                title: WELCOME_TITLE.to_string(),
                content: WELCOME_CONTENT.to_string(),
                created_at: now.clone(),
                updated_at: now,
            }],
        }
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    pub fn list(&self) -> Vec<Note> {
        let mut notes = self.notes.clone();
        models::sort_newest_first(&mut notes);
        notes
    }

    pub fn create(&mut self, request: CreateNoteRequest) -> Note {
        let now = self.next_timestamp();
        let note = Note {
            id: self.fresh_id(),
            title: request.title,
            content: request.content,
            created_at: now.clone(),
            updated_at: now,
        };

        self.notes.insert(0, note.clone());
        models::sort_newest_first(&mut self.notes);
        note
    }

    pub fn update(&mut self, id: &str, request: UpdateNoteRequest) -> Option<Note> {
        let now = self.next_timestamp();
        let note = self.notes.iter_mut().find(|n| n.id == id)?;

        if let Some(title) = request.title {
            note.title = title;
        }
        if let Some(content) = request.content {
            note.content = content;
        }
        note.updated_at = now;

        let updated = note.clone();
        models::sort_newest_first(&mut self.notes);
        Some(updated)
    }

    /// Removing an id that is not present still counts as success.
    pub fn delete(&mut self, id: &str) -> bool {
        self.notes.retain(|n| n.id != id);
        true
    }

    fn next_timestamp(&self) -> String {
        let newest = self.notes.iter().map(|n| n.updated_at.as_str()).max();
        models::timestamp_after(newest)
    }

    fn fresh_id(&self) -> String {
        let mut rng = rand::rng();
        loop {
            let id = format!("local-{:016x}", rng.random::<u64>());
            if !self.notes.iter().any(|n| n.id == id) {
                return id;
            }
        }
    }
}

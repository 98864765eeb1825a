//! State behind the notes screen: the list, the selection, and the
//! unsaved draft of the selected note.

use crate::{
    dto::{CreateNoteRequest, UpdateNoteRequest},
    layout::{Layout, Panels, ViewportSubscription},
    models::{self, Note},
    service::{NotesApi, ServiceError, Source, Sourced},
};

/// In-progress edit of the selected note.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Draft {
    pub title: String,
    pub content: String,
    pub dirty: bool,
}

impl Draft {
    fn from_note(note: &Note) -> Self {
        Self {
            title: note.title.clone(),
            content: note.content.clone(),
            dirty: false,
        }
    }
}

/// Issued by [`ScreenController::begin_load`]. Becomes stale on
/// [`ScreenController::teardown`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub struct LoadTicket {
    generation: u64,
}

/// Answers the destructive-action prompt shown before a delete.
pub trait Confirm {
    fn confirm(&mut self, prompt: &str) -> bool;
}

impl<F: FnMut(&str) -> bool> Confirm for F {
    fn confirm(&mut self, prompt: &str) -> bool {
        self(prompt)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListItem<'a> {
    pub id: &'a str,
    pub title: &'a str,
    pub updated_at: &'a str,
    pub selected: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScreenView<'a> {
    pub items: Vec<ListItem<'a>>,
    pub selected: Option<&'a Note>,
    pub draft: &'a Draft,
    pub can_save: bool,
    pub loading: bool,
    pub saving: bool,
    pub deleting: bool,
    pub creating: bool,
    pub error: Option<&'a str>,
    pub offline: bool,
    pub panels: Panels,
}

/// Display list and selected note for a raw list and selection.
pub fn project<'a>(
    notes: &'a [Note],
    selected_id: Option<&str>,
) -> (Vec<ListItem<'a>>, Option<&'a Note>) {
    let items = notes
        .iter()
        .map(|note| ListItem {
            id: &note.id,
            title: note.display_title(),
            updated_at: &note.updated_at,
            selected: selected_id == Some(note.id.as_str()),
        })
        .collect();
    let selected = selected_id.and_then(|id| notes.iter().find(|n| n.id == id));
    (items, selected)
}

pub struct ScreenController<A> {
    api: A,
    notes: Vec<Note>,
    selected_id: Option<String>,
    draft: Draft,
    loading: bool,
    saving: bool,
    deleting: bool,
    creating: bool,
    error: Option<String>,
    offline: bool,
    layout: Layout,
    viewport: Option<ViewportSubscription>,
    generation: u64,
}

impl<A: NotesApi> ScreenController<A> {
    pub const fn new(api: A, layout: Layout) -> Self {
        Self {
            api,
            notes: Vec::new(),
            selected_id: None,
            draft: Draft {
                title: String::new(),
                content: String::new(),
                dirty: false,
            },
            loading: false,
            saving: false,
            deleting: false,
            creating: false,
            error: None,
            offline: false,
            layout,
            viewport: None,
            generation: 0,
        }
    }

    pub const fn api(&self) -> &A {
        &self.api
    }

    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    pub fn selected_id(&self) -> Option<&str> {
        self.selected_id.as_deref()
    }

    pub fn selected(&self) -> Option<&Note> {
        let id = self.selected_id.as_deref()?;
        self.notes.iter().find(|n| n.id == id)
    }

    pub const fn draft(&self) -> &Draft {
        &self.draft
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub const fn is_loading(&self) -> bool {
        self.loading
    }

    pub const fn is_saving(&self) -> bool {
        self.saving
    }

    pub const fn is_deleting(&self) -> bool {
        self.deleting
    }

    pub const fn is_creating(&self) -> bool {
        self.creating
    }

    /// Whether the last completed operation was answered by the local store.
    pub const fn is_offline(&self) -> bool {
        self.offline
    }

    pub const fn layout(&self) -> &Layout {
        &self.layout
    }

    pub fn can_save(&self) -> bool {
        self.selected().is_some() && self.draft.dirty && !self.saving && !self.loading
    }

    pub fn view(&self) -> ScreenView<'_> {
        let (items, selected) = project(&self.notes, self.selected_id());
        ScreenView {
            items,
            selected,
            draft: &self.draft,
            can_save: self.can_save(),
            loading: self.loading,
            saving: self.saving,
            deleting: self.deleting,
            creating: self.creating,
            error: self.error(),
            offline: self.offline,
            panels: self.layout.panels(),
        }
    }

    pub fn dismiss_error(&mut self) {
        self.error = None;
    }

    fn fail(&mut self, message: String) {
        tracing::error!("{}", message);
        self.error = Some(message);
    }

    fn track_source<T>(&mut self, result: &Result<Sourced<T>, ServiceError>) {
        if let Ok(sourced) = result {
            self.offline = sourced.is_fallback();
        }
    }

    fn reset_selection(&mut self, id: Option<String>) {
        self.draft = id
            .as_deref()
            .and_then(|id| self.notes.iter().find(|n| n.id == id))
            .map(Draft::from_note)
            .unwrap_or_default();
        self.selected_id = id;
    }

    pub const fn begin_load(&mut self) -> LoadTicket {
        self.loading = true;
        LoadTicket {
            generation: self.generation,
        }
    }

    /// Applies a list result unless `ticket` went stale in the meantime.
    /// Returns whether anything was applied.
    pub fn finish_load(
        &mut self,
        ticket: LoadTicket,
        result: Result<Sourced<Vec<Note>>, ServiceError>,
    ) -> bool {
        if ticket.generation != self.generation {
            tracing::debug!("Dropping list result that arrived after teardown");
            return false;
        }

        self.loading = false;
        self.track_source(&result);

        match result {
            Ok(sourced) => {
                self.notes = sourced.value;
                models::sort_newest_first(&mut self.notes);

                if self.selected().is_none() {
                    let first = self.notes.first().map(|n| n.id.clone());
                    self.reset_selection(first);
                }
            }
            Err(e) => self.fail(e.to_string()),
        }
        true
    }

    pub async fn load(&mut self) -> bool {
        let ticket = self.begin_load();
        let result = self.api.list().await;
        self.finish_load(ticket, result)
    }

    /// Invalidates outstanding load tickets and drops the viewport listener.
    pub fn teardown(&mut self) {
        self.generation += 1;
        self.detach_viewport();
    }

    /// Selects a note, discarding any unsaved draft of the previous one.
    pub fn select(&mut self, id: &str) {
        if self.notes.iter().any(|n| n.id == id) {
            self.reset_selection(Some(id.to_string()));
            self.layout.open_editor();
        } else {
            self.reset_selection(None);
        }
    }

    pub fn edit_title(&mut self, title: impl Into<String>) {
        if self.selected_id.is_some() {
            self.draft.title = title.into();
            self.draft.dirty = true;
        }
    }

    pub fn edit_content(&mut self, content: impl Into<String>) {
        if self.selected_id.is_some() {
            self.draft.content = content.into();
            self.draft.dirty = true;
        }
    }

    pub async fn save(&mut self) -> bool {
        if !self.can_save() {
            return false;
        }
        let Some(id) = self.selected_id.clone() else {
            return false;
        };

        self.error = None;
        self.saving = true;
        let request = UpdateNoteRequest {
            title: Some(self.draft.title.clone()),
            content: Some(self.draft.content.clone()),
        };
        let result = self.api.update(&id, request).await;
        self.saving = false;
        self.track_source(&result);

        let note = match result {
            Ok(Sourced {
                value: Some(note), ..
            }) => note,
            Ok(Sourced {
                value: None,
                source: Source::Remote,
            }) => {
                // Accepted without an echo: keep what was sent.
                let Some(current) = self.notes.iter().find(|n| n.id == id) else {
                    self.fail(format!("Note {id} not found"));
                    return false;
                };
                Note {
                    title: self.draft.title.clone(),
                    content: self.draft.content.clone(),
                    updated_at: models::timestamp_after(Some(&current.updated_at)),
                    ..current.clone()
                }
            }
            Ok(Sourced { value: None, .. }) => {
                self.fail(format!("Note {id} not found"));
                return false;
            }
            Err(e) => {
                self.fail(e.to_string());
                return false;
            }
        };

        if let Some(entry) = self.notes.iter_mut().find(|n| n.id == id) {
            *entry = note.clone();
        }
        models::sort_newest_first(&mut self.notes);
        if self.selected_id.as_deref() == Some(id.as_str()) {
            self.reset_selection(Some(note.id));
        }
        true
    }

    pub async fn create(&mut self) -> bool {
        if self.creating {
            return false;
        }

        self.error = None;
        self.creating = true;
        let result = self.api.create(CreateNoteRequest::default()).await;
        self.creating = false;
        self.track_source(&result);

        match result {
            Ok(sourced) => {
                let note = sourced.value;
                self.notes.retain(|n| n.id != note.id);
                let id = note.id.clone();
                self.notes.insert(0, note);
                self.select(&id);
                true
            }
            Err(e) => {
                self.fail(e.to_string());
                false
            }
        }
    }

    /// Confirmation text for deleting the selected note.
    pub fn delete_prompt(&self) -> Option<String> {
        self.selected()
            .map(|note| format!("Delete \"{}\"?", note.display_title()))
    }

    pub async fn delete(&mut self, mut confirm: impl Confirm) -> bool {
        if self.deleting {
            return false;
        }
        let Some(prompt) = self.delete_prompt() else {
            return false;
        };
        if !confirm.confirm(&prompt) {
            return false;
        }
        let Some(id) = self.selected_id.clone() else {
            return false;
        };

        self.error = None;
        self.deleting = true;
        let result = self.api.delete(&id).await;
        self.deleting = false;
        self.track_source(&result);

        match result {
            Ok(Sourced { value: true, .. }) => {
                let position = self.notes.iter().position(|n| n.id == id);
                self.notes.retain(|n| n.id != id);

                if self.selected_id.as_deref() == Some(id.as_str()) {
                    let next = position
                        .and_then(|p| self.notes.get(p).or_else(|| self.notes.last()))
                        .map(|n| n.id.clone());
                    self.reset_selection(next);
                }
                true
            }
            Ok(Sourced { value: false, .. }) => {
                self.fail(format!("Failed to delete note {id}"));
                false
            }
            Err(e) => {
                self.fail(e.to_string());
                false
            }
        }
    }

    pub const fn back(&mut self) {
        self.layout.back();
    }

    pub fn attach_viewport(&mut self, mut subscription: ViewportSubscription) {
        if let Some(width) = subscription.changed_width() {
            self.layout.resize(width);
        }
        self.viewport = Some(subscription);
    }

    /// Applies a pending width change from the attached viewport.
    pub fn sync_viewport(&mut self) {
        if let Some(width) = self.viewport.as_mut().and_then(ViewportSubscription::changed_width) {
            self.layout.resize(width);
        }
    }

    pub fn detach_viewport(&mut self) {
        self.viewport = None;
    }
}

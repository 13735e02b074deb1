//! Ticket notes with a single inline editor.

use std::sync::Arc;

use crate::error::ApiError;
use crate::types::{EntityId, Note};
use crate::util::format_date_time;
use crate::views::LoadState;

pub const EMPTY: &str = "No notes yet";

/// Note currently open in the inline editor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteEdit {
    pub note_id: EntityId,
    pub text: String,
}

pub struct NotesView {
    pub ticket_id: EntityId,
    pub state: LoadState,
    notes: Vec<Note>,
    editing: Option<NoteEdit>,
}

impl NotesView {
    pub fn new(ticket_id: EntityId) -> Self {
        Self {
            ticket_id,
            state: LoadState::Loading,
            notes: Vec::new(),
            editing: None,
        }
    }

    /// Install a load result. An open editor whose note disappeared is closed.
    pub fn apply(&mut self, result: Result<Arc<Vec<Note>>, ApiError>) {
        match result {
            Ok(notes) => {
                self.state = LoadState::loaded(notes.len(), EMPTY);
                self.notes = notes.as_ref().clone();
                if let Some(edit) = &self.editing {
                    if !self.notes.iter().any(|n| n.id == edit.note_id) {
                        self.editing = None;
                    }
                }
            }
            Err(err) => self.state = LoadState::failed("Notes", &err),
        }
    }

    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    pub fn editing(&self) -> Option<&NoteEdit> {
        self.editing.as_ref()
    }

    /// Open the editor on `note_id`, seeded with its current text.
    pub fn begin_edit(&mut self, note_id: &EntityId) -> bool {
        match self.notes.iter().find(|n| &n.id == note_id) {
            Some(note) => {
                self.editing = Some(NoteEdit {
                    note_id: note.id.clone(),
                    text: note.text.clone(),
                });
                true
            }
            None => false,
        }
    }

    pub fn set_edit_text(&mut self, text: impl Into<String>) {
        if let Some(edit) = &mut self.editing {
            edit.text = text.into();
        }
    }

    pub fn cancel_edit(&mut self) {
        self.editing = None;
    }

    /// Close the editor and hand back the trimmed edit. Blank text keeps the
    /// editor open and returns `None`.
    pub fn commit_edit(&mut self) -> Option<NoteEdit> {
        let trimmed = self.editing.as_ref()?.text.trim().to_string();
        if trimmed.is_empty() {
            return None;
        }
        self.editing.take().map(|edit| NoteEdit {
            note_id: edit.note_id,
            text: trimmed,
        })
    }

    pub fn render(&self) -> String {
        if let Some(message) = self.state.message() {
            return message.to_string();
        }
        self.notes
            .iter()
            .map(|note| {
                let marker = match &self.editing {
                    Some(edit) if edit.note_id == note.id => " (editing)",
                    _ => "",
                };
                format!(
                    "[{}] {}  {}{}",
                    note.id,
                    format_date_time(note.timestamp.as_deref()),
                    note.text,
                    marker
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

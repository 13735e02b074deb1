//! List plus detail panel over one collection.
//!
//! The selection is an id, never a copy: the detail panel always reads the
//! current object out of the latest collection, so a refresh can never leave
//! it showing a deleted or outdated record.

use crate::types::{Agent, Call, EntityId, Note, Ticket, User};

/// Records that can be selected by id.
pub trait Identified {
    fn id(&self) -> &EntityId;
}

macro_rules! identified {
    ($($ty:ty),+ $(,)?) => {
        $(impl Identified for $ty {
            fn id(&self) -> &EntityId {
                &self.id
            }
        })+
    };
}

identified!(Ticket, Call, User, Agent, Note);

#[derive(Debug, PartialEq)]
pub enum DetailPanel<'a, T> {
    Selected(&'a T),
    Empty(&'static str),
}

#[derive(Debug, Clone)]
pub struct ListDetail<T> {
    items: Vec<T>,
    selected: Option<EntityId>,
    loaded: bool,
    prompt: &'static str,
}

impl<T: Identified> ListDetail<T> {
    /// `prompt` is shown in the detail panel when nothing is selected.
    pub fn new(prompt: &'static str) -> Self {
        Self {
            items: Vec::new(),
            selected: None,
            loaded: false,
            prompt,
        }
    }

    /// Install a freshly fetched collection and re-derive the selection.
    ///
    /// First load selects the first item. Later loads keep the selection if
    /// its id is still present, otherwise fall back to the first item, or to
    /// nothing when the collection is empty.
    pub fn replace_items(&mut self, items: Vec<T>) {
        let keep = self
            .selected
            .as_ref()
            .filter(|id| items.iter().any(|item| item.id() == *id))
            .cloned();

        self.selected = keep.or_else(|| items.first().map(|item| item.id().clone()));
        self.items = items;
        self.loaded = true;
    }

    /// Select by id. Unknown ids are ignored. Returns whether the selection changed.
    pub fn select(&mut self, id: &EntityId) -> bool {
        if self.selected.as_ref() == Some(id) {
            return false;
        }
        if !self.items.iter().any(|item| item.id() == id) {
            return false;
        }
        self.selected = Some(id.clone());
        true
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    pub fn selected_id(&self) -> Option<&EntityId> {
        self.selected.as_ref()
    }

    pub fn selected(&self) -> Option<&T> {
        let id = self.selected.as_ref()?;
        self.items.iter().find(|item| item.id() == id)
    }

    pub fn detail(&self) -> DetailPanel<'_, T> {
        match self.selected() {
            Some(item) => DetailPanel::Selected(item),
            None => DetailPanel::Empty(self.prompt),
        }
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }
}

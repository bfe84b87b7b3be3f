//! Whole-dashboard read model returned by `load_all`.

use crate::model::category::CategoryItem;
use crate::model::event::{sort_events, EventItem};
use crate::model::link::LinkItem;
use crate::model::note::NoteItem;
use crate::model::ordering::sort_by_order;

/// All four collections, each pre-sorted for rendering.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
    pub links: Vec<LinkItem>,
    pub notes: Vec<NoteItem>,
    pub events: Vec<EventItem>,
    pub categories: Vec<CategoryItem>,
}

impl Snapshot {
    /// Builds a snapshot and applies the ordering rules to every list.
    pub fn sorted(
        mut links: Vec<LinkItem>,
        mut notes: Vec<NoteItem>,
        mut events: Vec<EventItem>,
        mut categories: Vec<CategoryItem>,
    ) -> Self {
        sort_by_order(&mut links);
        sort_by_order(&mut notes);
        sort_events(&mut events);
        sort_by_order(&mut categories);
        Self {
            links,
            notes,
            events,
            categories,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
            && self.notes.is_empty()
            && self.events.is_empty()
            && self.categories.is_empty()
    }

    /// Total number of entities across all collections.
    pub fn len(&self) -> usize {
        self.links.len() + self.notes.len() + self.events.len() + self.categories.len()
    }
}

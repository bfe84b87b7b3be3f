//! Free-form note model.

use crate::model::entity::{
    new_entity_id, now_epoch_ms, require_id, Entity, EntityId, EntityKind, ModelValidationError,
};
use crate::model::ordering::Ordered;
use serde::{Deserialize, Serialize};

/// One note card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteItem {
    pub id: EntityId,
    pub title: String,
    #[serde(default)]
    pub content: String,
    pub created_at: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<i64>,
}

impl NoteItem {
    /// Creates a note with a generated id and the current timestamp.
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: new_entity_id(),
            title: title.into(),
            content: content.into(),
            created_at: now_epoch_ms(),
            order: None,
        }
    }
}

impl Entity for NoteItem {
    const KIND: EntityKind = EntityKind::Note;

    fn id(&self) -> &str {
        &self.id
    }

    fn created_at(&self) -> i64 {
        self.created_at
    }

    fn validate(&self) -> Result<(), ModelValidationError> {
        require_id(Self::KIND, &self.id)
    }
}

impl Ordered for NoteItem {
    fn order(&self) -> Option<i64> {
        self.order
    }

    fn set_order(&mut self, order: Option<i64>) {
        self.order = order;
    }
}

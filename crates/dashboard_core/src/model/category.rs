//! Link category model.
//!
//! # Invariants
//! - `name` is unique case-insensitively within the categories collection.
//! - The category named "General" cannot be deleted or renamed.

use crate::model::entity::{
    new_entity_id, now_epoch_ms, require_id, require_text, Entity, EntityId, EntityKind,
    ModelValidationError,
};
use crate::model::link::{is_general, same_category};
use crate::model::ordering::Ordered;
use serde::{Deserialize, Serialize};

/// One named link category, rendered as a collapsible folder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryItem {
    pub id: EntityId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    pub created_at: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<i64>,
}

impl CategoryItem {
    /// Creates a category with a generated id and the current timestamp.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: new_entity_id(),
            name: name.into().trim().to_string(),
            color: None,
            created_at: now_epoch_ms(),
            order: None,
        }
    }

    pub fn is_general(&self) -> bool {
        is_general(&self.name)
    }

    pub fn has_name(&self, name: &str) -> bool {
        same_category(&self.name, name)
    }
}

/// Finds a category by case-insensitive name.
pub fn find_by_name<'a>(categories: &'a [CategoryItem], name: &str) -> Option<&'a CategoryItem> {
    categories.iter().find(|category| category.has_name(name))
}

impl Entity for CategoryItem {
    const KIND: EntityKind = EntityKind::Category;

    fn id(&self) -> &str {
        &self.id
    }

    fn created_at(&self) -> i64 {
        self.created_at
    }

    fn validate(&self) -> Result<(), ModelValidationError> {
        require_id(Self::KIND, &self.id)?;
        require_text(Self::KIND, "name", &self.name)
    }
}

impl Ordered for CategoryItem {
    fn order(&self) -> Option<i64> {
        self.order
    }

    fn set_order(&mut self, order: Option<i64>) {
        self.order = order;
    }
}

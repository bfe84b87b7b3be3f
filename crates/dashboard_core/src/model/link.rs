//! Bookmark link model.
//!
//! # Invariants
//! - `category` is never blank; blank or missing values become "General".
//! - `category` should name an existing `CategoryItem` (case-insensitive),
//!   except "General" which always exists implicitly.

use crate::model::entity::{
    new_entity_id, now_epoch_ms, require_id, require_text, Entity, EntityId, EntityKind,
    ModelValidationError,
};
use crate::model::ordering::Ordered;
use serde::{Deserialize, Deserializer, Serialize};

/// Name of the implicit default category.
pub const GENERAL_CATEGORY: &str = "General";

/// Returns whether `name` denotes the implicit "General" category.
pub fn is_general(name: &str) -> bool {
    name.trim().eq_ignore_ascii_case(GENERAL_CATEGORY)
}

/// Maps a raw category value to its stored form.
///
/// Blank values fall back to "General"; other values are trimmed.
pub fn normalize_category(raw: Option<&str>) -> String {
    match raw.map(str::trim) {
        Some(value) if !value.is_empty() => value.to_string(),
        _ => GENERAL_CATEGORY.to_string(),
    }
}

/// Case-insensitive category name comparison.
pub fn same_category(left: &str, right: &str) -> bool {
    left.trim().to_lowercase() == right.trim().to_lowercase()
}

/// One saved bookmark.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkItem {
    pub id: EntityId,
    pub url: String,
    pub title: String,
    #[serde(default = "default_category", deserialize_with = "deserialize_category")]
    pub category: String,
    pub created_at: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<i64>,
}

impl LinkItem {
    /// Creates a link with a generated id and the current timestamp.
    pub fn new(url: impl Into<String>, title: impl Into<String>, category: Option<&str>) -> Self {
        Self {
            id: new_entity_id(),
            url: url.into(),
            title: title.into(),
            category: normalize_category(category),
            created_at: now_epoch_ms(),
            order: None,
        }
    }

    /// Returns whether this link belongs to the named category.
    pub fn in_category(&self, name: &str) -> bool {
        same_category(&self.category, name)
    }
}

impl Entity for LinkItem {
    const KIND: EntityKind = EntityKind::Link;

    fn id(&self) -> &str {
        &self.id
    }

    fn created_at(&self) -> i64 {
        self.created_at
    }

    fn validate(&self) -> Result<(), ModelValidationError> {
        require_id(Self::KIND, &self.id)?;
        require_text(Self::KIND, "url", &self.url)?;
        require_text(Self::KIND, "category", &self.category)
    }
}

impl Ordered for LinkItem {
    fn order(&self) -> Option<i64> {
        self.order
    }

    fn set_order(&mut self, order: Option<i64>) {
        self.order = order;
    }
}

fn default_category() -> String {
    GENERAL_CATEGORY.to_string()
}

fn deserialize_category<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(normalize_category(raw.as_deref()))
}

//! Shared entity identity and validation contracts.
//!
//! # Responsibility
//! - Name the four entity kinds and their persisted collection names.
//! - Provide id/timestamp generation used by add operations.
//!
//! # Invariants
//! - Generated ids are UUID v4 text; imported ids are kept verbatim.
//! - Timestamps are Unix epoch milliseconds.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Opaque entity identifier, unique within one collection.
pub type EntityId = String;

/// Entity kind, one per persisted collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Link,
    Note,
    Event,
    Category,
}

impl EntityKind {
    pub const ALL: [EntityKind; 4] = [Self::Link, Self::Note, Self::Event, Self::Category];

    /// Name of the sub-collection holding entities of this kind.
    pub fn collection_name(self) -> &'static str {
        match self {
            Self::Link => "links",
            Self::Note => "notes",
            Self::Event => "events",
            Self::Category => "categories",
        }
    }
}

impl Display for EntityKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::Link => "link",
            Self::Note => "note",
            Self::Event => "event",
            Self::Category => "category",
        };
        f.write_str(label)
    }
}

/// Validation failures for entity records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelValidationError {
    /// `id` is empty or whitespace.
    BlankId(EntityKind),
    /// A required text field is empty or whitespace.
    BlankField {
        kind: EntityKind,
        field: &'static str,
    },
}

impl Display for ModelValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankId(kind) => write!(f, "{kind} id must not be blank"),
            Self::BlankField { kind, field } => {
                write!(f, "{kind} field `{field}` must not be blank")
            }
        }
    }
}

impl Error for ModelValidationError {}

/// Common contract for every persisted entity kind.
pub trait Entity: Clone + Send + Sync + 'static {
    /// Collection this entity belongs to.
    const KIND: EntityKind;

    fn id(&self) -> &str;

    fn created_at(&self) -> i64;

    /// Checks record-level invariants before persistence.
    fn validate(&self) -> Result<(), ModelValidationError>;
}

/// Generates a fresh entity id.
pub fn new_entity_id() -> EntityId {
    Uuid::new_v4().to_string()
}

/// Current wall-clock time in epoch milliseconds.
pub fn now_epoch_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

pub(crate) fn require_id(kind: EntityKind, id: &str) -> Result<(), ModelValidationError> {
    if id.trim().is_empty() {
        return Err(ModelValidationError::BlankId(kind));
    }
    Ok(())
}

pub(crate) fn require_text(
    kind: EntityKind,
    field: &'static str,
    value: &str,
) -> Result<(), ModelValidationError> {
    if value.trim().is_empty() {
        return Err(ModelValidationError::BlankField { kind, field });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{new_entity_id, require_text, EntityKind, ModelValidationError};

    #[test]
    fn generated_ids_are_unique() {
        assert_ne!(new_entity_id(), new_entity_id());
    }

    #[test]
    fn collection_names_match_store_layout() {
        let names: Vec<_> = EntityKind::ALL
            .iter()
            .map(|kind| kind.collection_name())
            .collect();
        assert_eq!(names, ["links", "notes", "events", "categories"]);
    }

    #[test]
    fn blank_text_is_rejected() {
        let err = require_text(EntityKind::Link, "url", "  ").unwrap_err();
        assert_eq!(
            err,
            ModelValidationError::BlankField {
                kind: EntityKind::Link,
                field: "url"
            }
        );
    }
}

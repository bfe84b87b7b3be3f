//! JSON backup document.
//!
//! # Invariants
//! - A document is accepted only when `links` and `notes` are arrays.
//! - Every entry deserializes and passes `validate()`, ids are unique per
//!   collection and category names are unique case-insensitively; otherwise
//!   the whole document is rejected.

use crate::import::{ImportError, ImportResult};
use crate::model::category::CategoryItem;
use crate::model::entity::Entity;
use crate::model::event::EventItem;
use crate::model::link::LinkItem;
use crate::model::note::NoteItem;
use crate::model::settings::{Settings, SettingsPatch};
use crate::model::snapshot::Snapshot;
use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::HashSet;

/// Full-state backup as exported and imported.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackupDocument {
    pub links: Vec<LinkItem>,
    pub notes: Vec<NoteItem>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub events: Vec<EventItem>,
    /// `None` (or empty) triggers category back-fill on import.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub categories: Option<Vec<CategoryItem>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub settings: Option<SettingsPatch>,
}

impl BackupDocument {
    /// Builds a backup of `snapshot`, embedding `settings` when given.
    pub fn from_snapshot(snapshot: Snapshot, settings: Option<&Settings>) -> Self {
        Self {
            links: snapshot.links,
            notes: snapshot.notes,
            events: snapshot.events,
            categories: Some(snapshot.categories),
            settings: settings.map(SettingsPatch::from),
        }
    }

    /// Returns whether the document carries no category list to restore.
    pub fn needs_category_backfill(&self) -> bool {
        self.categories
            .as_ref()
            .map_or(true, |categories| categories.is_empty())
    }

    /// Checks every entry and the per-collection uniqueness rules.
    pub fn validate(&self) -> ImportResult<()> {
        validate_entries("links", &self.links)?;
        validate_entries("notes", &self.notes)?;
        validate_entries("events", &self.events)?;

        if let Some(categories) = &self.categories {
            validate_entries("categories", categories)?;
            let mut names = HashSet::new();
            for category in categories {
                if !names.insert(category.name.trim().to_lowercase()) {
                    return Err(ImportError::Validation(format!(
                        "duplicate category name `{}`",
                        category.name
                    )));
                }
            }
        }
        Ok(())
    }

    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// Parses and validates a backup document.
///
/// # Errors
/// - `ImportError::Validation` when the text is not JSON, when `links` or
///   `notes` is missing or not an array, or when any entry is invalid.
pub fn parse_backup(raw: &str) -> ImportResult<BackupDocument> {
    let value: Value = serde_json::from_str(raw)
        .map_err(|err| ImportError::Validation(format!("not valid JSON: {err}")))?;

    let Some(object) = value.as_object() else {
        return Err(ImportError::Validation(
            "backup must be a JSON object".to_string(),
        ));
    };
    for key in ["links", "notes"] {
        if !object.get(key).is_some_and(Value::is_array) {
            return Err(ImportError::Validation(format!(
                "`{key}` must be present and an array"
            )));
        }
    }

    let document: BackupDocument =
        serde_json::from_value(value).map_err(|err| ImportError::Validation(err.to_string()))?;
    document.validate()?;
    Ok(document)
}

/// Download name for a backup taken on `date`.
pub fn backup_file_name(product: &str, date: NaiveDate, extension: &str) -> String {
    format!(
        "{}-backup-{}.{}",
        product.trim(),
        date.format("%Y-%m-%d"),
        extension.trim().trim_start_matches('.')
    )
}

fn validate_entries<T: Entity>(collection: &str, entries: &[T]) -> ImportResult<()> {
    let mut ids = HashSet::with_capacity(entries.len());
    for (index, entry) in entries.iter().enumerate() {
        entry
            .validate()
            .map_err(|err| ImportError::Validation(format!("{collection}[{index}]: {err}")))?;
        if !ids.insert(entry.id()) {
            return Err(ImportError::Validation(format!(
                "{collection}[{index}]: duplicate id `{}`",
                entry.id()
            )));
        }
    }
    Ok(())
}

fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::{backup_file_name, parse_backup};
    use crate::import::ImportError;
    use chrono::NaiveDate;

    #[test]
    fn missing_notes_array_is_rejected() {
        let err = parse_backup(r#"{"links":[]}"#).unwrap_err();
        assert!(matches!(err, ImportError::Validation(message) if message.contains("notes")));

        let err = parse_backup(r#"{"links":{},"notes":[]}"#).unwrap_err();
        assert!(matches!(err, ImportError::Validation(message) if message.contains("links")));
    }

    #[test]
    fn optional_sections_default_when_absent_or_null() {
        let document = parse_backup(r#"{"links":[],"notes":[],"events":null}"#).unwrap();
        assert!(document.events.is_empty());
        assert!(document.categories.is_none());
        assert!(document.settings.is_none());
        assert!(document.needs_category_backfill());
    }

    #[test]
    fn invalid_entry_rejects_whole_document() {
        let raw = r#"{
            "links": [{"id":"a","url":"","title":"A","createdAt":1}],
            "notes": []
        }"#;
        let err = parse_backup(raw).unwrap_err();
        assert!(matches!(err, ImportError::Validation(message) if message.starts_with("links[0]")));
    }

    #[test]
    fn fractional_order_is_rejected() {
        let raw = r#"{
            "links": [],
            "notes": [{"id":"n1","title":"N","content":"","createdAt":1,"order":1.5}]
        }"#;
        assert!(matches!(parse_backup(raw), Err(ImportError::Validation(_))));

        let whole = r#"{
            "links": [],
            "notes": [{"id":"n1","title":"N","content":"","createdAt":1,"order":-2}]
        }"#;
        assert_eq!(parse_backup(whole).unwrap().notes[0].order, Some(-2));
    }

    #[test]
    fn duplicate_category_names_are_rejected() {
        let raw = r#"{
            "links": [],
            "notes": [],
            "categories": [
                {"id":"c1","name":"Work","createdAt":1},
                {"id":"c2","name":"work","createdAt":2}
            ]
        }"#;
        assert!(parse_backup(raw).is_err());
    }

    #[test]
    fn file_name_uses_iso_date() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
        assert_eq!(
            backup_file_name("dashboard", date, ".json"),
            "dashboard-backup-2024-03-09.json"
        );
    }
}

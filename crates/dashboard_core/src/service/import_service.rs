//! Import/merge use-case service.
//!
//! # Responsibility
//! - Apply parsed backup and bookmark documents to the repository in
//!   destructive-replace or additive-merge mode.
//! - Back-fill categories referenced by imported links.
//! - Merge embedded settings over the caller's current settings.
//!
//! # Invariants
//! - Input is fully validated before the first write.
//! - Writes are dispatched concurrently and never rolled back; a partial
//!   failure surfaces as `RepoError::PartialFailure`.
//! - Additive merge never overwrites: entities whose id (or category name)
//!   already exists are skipped.
//! - After a merge every imported link's category exists in the store.

use crate::import::backup::{parse_backup, BackupDocument};
use crate::import::bookmarks::parse_bookmarks;
use crate::import::{ImportError, ImportFormat, ImportResult, MergeMode};
use crate::model::category::{find_by_name, CategoryItem};
use crate::model::entity::{now_epoch_ms, Entity};
use crate::model::link::{is_general, LinkItem};
use crate::model::ordering::append_order;
use crate::model::settings::Settings;
use crate::model::snapshot::Snapshot;
use crate::repo::collection_repo::DashboardRepository;
use crate::repo::store::DashboardStore;
use log::{error, info};
use std::collections::HashSet;
use std::time::Instant;

/// Outcome of one import.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportReport {
    pub format: ImportFormat,
    pub mode: MergeMode,
    /// Entities written, per kind.
    pub links: usize,
    pub notes: usize,
    pub events: usize,
    pub categories: usize,
    /// Entities left out because they already existed.
    pub skipped: usize,
    /// Current settings with the document's settings merged in, when the
    /// document carried any.
    pub settings: Option<Settings>,
}

impl ImportReport {
    fn new(format: ImportFormat, mode: MergeMode) -> Self {
        Self {
            format,
            mode,
            links: 0,
            notes: 0,
            events: 0,
            categories: 0,
            skipped: 0,
            settings: None,
        }
    }

    /// Total entities written.
    pub fn written(&self) -> usize {
        self.links + self.notes + self.events + self.categories
    }
}

/// Import entry points over a borrowed repository.
pub struct ImportService<'a, S: DashboardStore> {
    repo: &'a DashboardRepository<S>,
}

impl<'a, S: DashboardStore> ImportService<'a, S> {
    pub fn new(repo: &'a DashboardRepository<S>) -> Self {
        Self { repo }
    }

    /// Parses `raw` as `format` and imports it.
    ///
    /// # Errors
    /// - `ImportError::Validation` for malformed input (nothing written).
    /// - `ImportError::UnsupportedMode` for a bookmark replace.
    /// - `ImportError::Repo` when writes fail.
    pub async fn import_document(
        &self,
        raw: &str,
        format: ImportFormat,
        mode: MergeMode,
        current_settings: &Settings,
    ) -> ImportResult<ImportReport> {
        let started_at = Instant::now();
        let result = match format {
            ImportFormat::Backup => match parse_backup(raw) {
                Ok(document) => self.import_backup(document, mode, current_settings).await,
                Err(err) => Err(err),
            },
            ImportFormat::Bookmarks => self.import_bookmarks(raw, mode).await,
        };

        match &result {
            Ok(report) => info!(
                "event=import module=import status=ok format={} mode={} links={} notes={} events={} categories={} skipped={} duration_ms={}",
                format,
                mode,
                report.links,
                report.notes,
                report.events,
                report.categories,
                report.skipped,
                started_at.elapsed().as_millis()
            ),
            Err(err) => error!(
                "event=import module=import status=error format={} mode={} duration_ms={} error={}",
                format,
                mode,
                started_at.elapsed().as_millis(),
                err
            ),
        }
        result
    }

    /// Imports a validated backup document.
    pub async fn import_backup(
        &self,
        document: BackupDocument,
        mode: MergeMode,
        current_settings: &Settings,
    ) -> ImportResult<ImportReport> {
        document.validate()?;

        let mut report = ImportReport::new(ImportFormat::Backup, mode);
        report.settings = document
            .settings
            .as_ref()
            .map(|patch| current_settings.merged(patch));

        let categories = backfill_categories(&document);
        let mut snapshot = Snapshot {
            links: document.links,
            notes: document.notes,
            events: document.events,
            categories,
        };

        match mode {
            MergeMode::Replace => {
                self.repo.clear_all().await?;
            }
            MergeMode::Merge => {
                let existing = self.repo.load_all().await?;
                report.skipped = retain_new(&mut snapshot, &existing);
                add_missing_link_categories(&mut snapshot, &existing.categories);
            }
        }

        self.repo.add_snapshot(&snapshot).await?;
        report.links = snapshot.links.len();
        report.notes = snapshot.notes.len();
        report.events = snapshot.events.len();
        report.categories = snapshot.categories.len();
        Ok(report)
    }

    /// Imports browser bookmark HTML additively.
    ///
    /// Links get fresh ids; urls already saved are skipped. Folder names
    /// without a category are created after the existing ones.
    pub async fn import_bookmarks(&self, html: &str, mode: MergeMode) -> ImportResult<ImportReport> {
        if mode != MergeMode::Merge {
            return Err(ImportError::UnsupportedMode {
                format: ImportFormat::Bookmarks,
                mode,
            });
        }

        let entries = parse_bookmarks(html, now_epoch_ms());
        let mut report = ImportReport::new(ImportFormat::Bookmarks, mode);
        if entries.is_empty() {
            return Ok(report);
        }

        let existing_links = self.repo.links().await?;
        let mut categories = self.repo.categories().await?;
        let mut known_urls: HashSet<String> =
            existing_links.iter().map(|link| link.url.clone()).collect();

        let mut links: Vec<LinkItem> = Vec::with_capacity(entries.len());
        let mut new_categories: Vec<CategoryItem> = Vec::new();
        for entry in entries {
            if !known_urls.insert(entry.url.clone()) {
                report.skipped += 1;
                continue;
            }
            if !is_general(&entry.category) && find_by_name(&categories, &entry.category).is_none()
            {
                let mut category = CategoryItem::new(entry.category.as_str());
                category.order = Some(append_order(&categories));
                categories.push(category.clone());
                new_categories.push(category);
            }
            links.push(entry.into_link());
        }

        let snapshot = Snapshot {
            links,
            categories: new_categories,
            ..Snapshot::default()
        };
        self.repo.add_snapshot(&snapshot).await?;
        report.links = snapshot.links.len();
        report.categories = snapshot.categories.len();
        Ok(report)
    }
}

/// Category list to restore from a backup.
///
/// Without a category list, one category per distinct link category is
/// synthesized (General included). With one, categories named by links but
/// missing from the list are appended.
fn backfill_categories(document: &BackupDocument) -> Vec<CategoryItem> {
    let backfill = document.needs_category_backfill();
    let mut categories = document.categories.clone().unwrap_or_default();

    for link in &document.links {
        if find_by_name(&categories, &link.category).is_some() {
            continue;
        }
        if !backfill && is_general(&link.category) {
            continue;
        }
        let mut category = CategoryItem::new(link.category.as_str());
        if !backfill {
            category.order = Some(append_order(&categories));
        }
        categories.push(category);
    }
    categories
}

/// Drops entities already present in `existing`; returns how many.
fn retain_new(snapshot: &mut Snapshot, existing: &Snapshot) -> usize {
    let before = snapshot.len();

    retain_unknown_ids(&mut snapshot.links, &existing.links);
    retain_unknown_ids(&mut snapshot.notes, &existing.notes);
    retain_unknown_ids(&mut snapshot.events, &existing.events);
    retain_unknown_ids(&mut snapshot.categories, &existing.categories);
    snapshot
        .categories
        .retain(|category| find_by_name(&existing.categories, &category.name).is_none());

    before - snapshot.len()
}

/// Appends a category for every link category that neither the store nor
/// the incoming snapshot defines.
fn add_missing_link_categories(snapshot: &mut Snapshot, existing: &[CategoryItem]) {
    let mut known: Vec<CategoryItem> = existing
        .iter()
        .chain(&snapshot.categories)
        .cloned()
        .collect();

    for link in &snapshot.links {
        if is_general(&link.category) || find_by_name(&known, &link.category).is_some() {
            continue;
        }
        let mut category = CategoryItem::new(link.category.as_str());
        category.order = Some(append_order(&known));
        known.push(category.clone());
        snapshot.categories.push(category);
    }
}

fn retain_unknown_ids<T: Entity>(incoming: &mut Vec<T>, existing: &[T]) {
    let known: HashSet<&str> = existing.iter().map(Entity::id).collect();
    incoming.retain(|entity| !known.contains(entity.id()));
}

#[cfg(test)]
mod tests {
    use super::backfill_categories;
    use crate::import::backup::parse_backup;

    #[test]
    fn backfill_synthesizes_one_category_per_distinct_name() {
        let document = parse_backup(
            r#"{
                "links": [
                    {"id":"a","url":"https://a.test","title":"A","createdAt":1,"category":"Work"},
                    {"id":"b","url":"https://b.test","title":"B","createdAt":2,"category":"work"},
                    {"id":"c","url":"https://c.test","title":"C","createdAt":3}
                ],
                "notes": []
            }"#,
        )
        .unwrap();

        let names: Vec<_> = backfill_categories(&document)
            .into_iter()
            .map(|category| category.name)
            .collect();
        assert_eq!(names, ["Work", "General"]);
    }

    #[test]
    fn existing_category_list_only_gains_missing_names() {
        let document = parse_backup(
            r#"{
                "links": [
                    {"id":"a","url":"https://a.test","title":"A","createdAt":1,"category":"Work"},
                    {"id":"b","url":"https://b.test","title":"B","createdAt":2,"category":"Home"},
                    {"id":"c","url":"https://c.test","title":"C","createdAt":3}
                ],
                "notes": [],
                "categories": [{"id":"w","name":"Work","createdAt":1,"order":4}]
            }"#,
        )
        .unwrap();

        let categories = backfill_categories(&document);
        assert_eq!(categories.len(), 2);
        assert_eq!(categories[1].name, "Home");
        assert_eq!(categories[1].order, Some(5));
    }
}

//! Dashboard use-case service.
//!
//! # Responsibility
//! - Provide the add/update/delete entry points used by front ends.
//! - Keep links and categories consistent (auto-created categories,
//!   cascading category delete, re-tagging on rename).
//! - Produce backup documents from the persisted state.
//!
//! # Invariants
//! - New links and notes are placed first (`order = min - 1`).
//! - New categories are placed last (`order = max + 1`).
//! - The "General" category cannot be deleted or renamed.
//! - Category names stay unique case-insensitively.

use crate::import::backup::BackupDocument;
use crate::model::category::{find_by_name, CategoryItem};
use crate::model::entity::{EntityId, EntityKind};
use crate::model::event::EventItem;
use crate::model::link::{is_general, normalize_category, LinkItem};
use crate::model::note::NoteItem;
use crate::model::ordering::{append_order, prepend_order};
use crate::model::settings::Settings;
use crate::model::snapshot::Snapshot;
use crate::repo::collection_repo::{merge_batches, DashboardRepository, RepoError, RepoResult};
use crate::repo::sqlite_store::SqliteStore;
use crate::repo::store::DashboardStore;
use crate::service::import_service::ImportService;
use chrono::{NaiveDate, NaiveTime};
use log::info;

/// Request model for scheduling an event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewEvent {
    pub title: String,
    pub date: NaiveDate,
    pub time: Option<NaiveTime>,
    /// Optional related url.
    pub link: Option<String>,
    pub description: Option<String>,
}

/// Use-case service over one dashboard repository.
pub struct DashboardService<S: DashboardStore = SqliteStore> {
    repo: DashboardRepository<S>,
}

impl<S: DashboardStore> DashboardService<S> {
    pub fn new(repo: DashboardRepository<S>) -> Self {
        Self { repo }
    }

    pub fn repo(&self) -> &DashboardRepository<S> {
        &self.repo
    }

    /// Import entry points bound to this service's repository.
    pub fn importer(&self) -> ImportService<'_, S> {
        ImportService::new(&self.repo)
    }

    /// All collections, each pre-sorted for rendering.
    pub async fn load_all(&self) -> RepoResult<Snapshot> {
        self.repo.load_all().await
    }

    /// Saves a new link at the top of the list.
    ///
    /// A category name without a `CategoryItem` is created on the fly.
    pub async fn add_link(
        &self,
        url: &str,
        title: &str,
        category: Option<&str>,
    ) -> RepoResult<LinkItem> {
        let mut link = LinkItem::new(url.trim(), title.trim(), category);
        if link.title.is_empty() {
            link.title = link.url.clone();
        }
        let links = self.repo.links().await?;
        link.order = Some(prepend_order(&links));

        self.ensure_category(&link.category).await?;
        self.repo.add(&link).await?;
        Ok(link)
    }

    /// Saves a new note at the top of the list.
    pub async fn add_note(&self, title: &str, content: &str) -> RepoResult<NoteItem> {
        let mut note = NoteItem::new(title.trim(), content);
        let notes = self.repo.notes().await?;
        note.order = Some(prepend_order(&notes));
        self.repo.add(&note).await?;
        Ok(note)
    }

    pub async fn add_event(&self, request: NewEvent) -> RepoResult<EventItem> {
        let mut event = EventItem::new(request.title.trim(), request.date, request.time);
        event.link = request.link.filter(|link| !link.trim().is_empty());
        event.description = request
            .description
            .filter(|description| !description.trim().is_empty());
        self.repo.add(&event).await?;
        Ok(event)
    }

    /// Creates a category after every existing one.
    ///
    /// # Errors
    /// - `RepoError::DuplicateCategory` when the name is already used.
    pub async fn add_category(&self, name: &str) -> RepoResult<CategoryItem> {
        let categories = self.repo.categories().await?;
        if find_by_name(&categories, name).is_some() {
            return Err(RepoError::DuplicateCategory(name.trim().to_string()));
        }

        let mut category = CategoryItem::new(name);
        category.order = Some(append_order(&categories));
        self.repo.add(&category).await?;
        Ok(category)
    }

    /// Renames a category and re-tags every link filed under it.
    pub async fn rename_category(&self, id: &str, new_name: &str) -> RepoResult<CategoryItem> {
        let categories = self.repo.categories().await?;
        let mut category = find_by_id(&categories, id)?.clone();
        if category.is_general() {
            return Err(RepoError::ProtectedCategory(category.name));
        }

        let new_name = new_name.trim();
        let collides = is_general(new_name)
            || categories
                .iter()
                .any(|other| other.id != category.id && other.has_name(new_name));
        if collides {
            return Err(RepoError::DuplicateCategory(new_name.to_string()));
        }

        let old_name = std::mem::replace(&mut category.name, new_name.to_string());
        self.repo.update(&category).await?;

        let retagged: Vec<LinkItem> = self
            .repo
            .links()
            .await?
            .into_iter()
            .filter(|link| link.in_category(&old_name))
            .map(|mut link| {
                link.category = new_name.to_string();
                link
            })
            .collect();
        self.repo.update_many(&retagged).await?;

        info!(
            "event=category_rename module=service status=ok links_retagged={}",
            retagged.len()
        );
        Ok(category)
    }

    /// Sets or clears a category's color.
    pub async fn recolor_category(&self, id: &str, color: Option<&str>) -> RepoResult<CategoryItem> {
        let categories = self.repo.categories().await?;
        let mut category = find_by_id(&categories, id)?.clone();
        category.color = color
            .map(str::trim)
            .filter(|color| !color.is_empty())
            .map(str::to_string);
        self.repo.update(&category).await?;
        Ok(category)
    }

    /// Replaces a link; a new category name is created on the fly.
    pub async fn update_link(&self, link: &LinkItem) -> RepoResult<()> {
        let mut link = link.clone();
        link.category = normalize_category(Some(&link.category));
        self.ensure_category(&link.category).await?;
        self.repo.update(&link).await
    }

    pub async fn update_note(&self, note: &NoteItem) -> RepoResult<()> {
        self.repo.update(note).await
    }

    pub async fn update_event(&self, event: &EventItem) -> RepoResult<()> {
        self.repo.update(event).await
    }

    pub async fn delete_link(&self, id: &str) -> RepoResult<()> {
        self.repo.remove::<LinkItem>(id).await
    }

    pub async fn delete_note(&self, id: &str) -> RepoResult<()> {
        self.repo.remove::<NoteItem>(id).await
    }

    pub async fn delete_event(&self, id: &str) -> RepoResult<()> {
        self.repo.remove::<EventItem>(id).await
    }

    /// Deletes a category together with every link filed under it.
    ///
    /// Returns the number of deleted links.
    ///
    /// # Errors
    /// - `RepoError::NotFound` when `id` names no category.
    /// - `RepoError::ProtectedCategory` for "General".
    /// - `RepoError::PartialFailure` when some deletes failed.
    pub async fn delete_category(&self, id: &str) -> RepoResult<usize> {
        let categories = self.repo.categories().await?;
        let category = find_by_id(&categories, id)?;
        if category.is_general() {
            return Err(RepoError::ProtectedCategory(category.name.clone()));
        }

        let link_ids: Vec<EntityId> = self
            .repo
            .links()
            .await?
            .into_iter()
            .filter(|link| link.in_category(&category.name))
            .map(|link| link.id)
            .collect();

        let (links, removed) = futures_util::join!(
            self.repo.remove_many::<LinkItem>(&link_ids),
            self.repo.remove_many::<CategoryItem>(std::slice::from_ref(&category.id)),
        );
        merge_batches([links, removed])?;

        info!(
            "event=category_delete module=service status=ok links_deleted={}",
            link_ids.len()
        );
        Ok(link_ids.len())
    }

    /// Clears every collection.
    pub async fn delete_all(&self) -> RepoResult<()> {
        self.repo.clear_all().await
    }

    /// Serializable backup of the persisted state.
    ///
    /// Unpersisted drag previews are never part of the snapshot.
    pub async fn export_snapshot(&self, settings: Option<&Settings>) -> RepoResult<BackupDocument> {
        let snapshot = self.repo.load_all().await?;
        info!(
            "event=export_snapshot module=service status=ok entities={}",
            snapshot.len()
        );
        Ok(BackupDocument::from_snapshot(snapshot, settings))
    }

    /// Events scheduled on `date`, untimed first.
    pub async fn events_on(&self, date: NaiveDate) -> RepoResult<Vec<EventItem>> {
        let mut events = self.repo.events().await?;
        events.retain(|event| event.date == date);
        Ok(events)
    }

    /// Events on or after `today`, soonest first.
    pub async fn upcoming_events(&self, today: NaiveDate) -> RepoResult<Vec<EventItem>> {
        let mut events = self.repo.events().await?;
        events.retain(|event| event.date >= today);
        Ok(events)
    }

    async fn ensure_category(&self, name: &str) -> RepoResult<()> {
        if is_general(name) {
            return Ok(());
        }
        let categories = self.repo.categories().await?;
        if find_by_name(&categories, name).is_some() {
            return Ok(());
        }
        let mut category = CategoryItem::new(name);
        category.order = Some(append_order(&categories));
        self.repo.add(&category).await
    }
}

fn find_by_id<'a>(categories: &'a [CategoryItem], id: &str) -> RepoResult<&'a CategoryItem> {
    categories
        .iter()
        .find(|category| category.id == id)
        .ok_or_else(|| RepoError::NotFound {
            kind: EntityKind::Category,
            id: id.to_string(),
        })
}

//! Typed collection repository over a dashboard store.
//!
//! # Responsibility
//! - Provide typed get-all/add/update/remove/clear per entity kind.
//! - Validate records before every write.
//! - Dispatch bulk writes concurrently and aggregate their failures.
//!
//! # Invariants
//! - Bulk operations never roll back sibling writes; a failed batch is
//!   reported as `PartialFailure` and callers reconcile with a reload.
//! - `update`/`remove` of a missing id fail with `NotFound`.

use crate::model::category::CategoryItem;
use crate::model::entity::{Entity, EntityKind, ModelValidationError};
use crate::model::event::{sort_events, EventItem};
use crate::model::link::LinkItem;
use crate::model::note::NoteItem;
use crate::model::ordering::sort_by_order;
use crate::model::snapshot::Snapshot;
use crate::repo::sqlite_store::SqliteStore;
use crate::repo::store::{DashboardStore, StoreAdapter, StoreError};
use futures_util::future::{join_all, try_join4};
use log::{error, info};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

pub type RepoResult<T> = Result<T, RepoError>;

/// Aggregate of the failed calls inside one concurrent batch.
#[derive(Debug)]
pub struct BatchFailure {
    /// Number of calls dispatched in the batch.
    pub attempted: usize,
    /// Every call that failed, in dispatch order.
    pub failures: Vec<StoreError>,
}

impl BatchFailure {
    pub fn succeeded(&self) -> usize {
        self.attempted.saturating_sub(self.failures.len())
    }

    fn absorb(&mut self, other: BatchFailure) {
        self.attempted += other.attempted;
        self.failures.extend(other.failures);
    }
}

/// Repository error for collection operations.
#[derive(Debug)]
pub enum RepoError {
    /// Record failed model validation; nothing was written.
    Validation(ModelValidationError),
    /// Referenced id is absent from its collection.
    NotFound { kind: EntityKind, id: String },
    /// The implicit "General" category cannot be deleted or renamed.
    ProtectedCategory(String),
    /// Another category already uses this name (case-insensitive).
    DuplicateCategory(String),
    /// Single store call failed.
    Store(StoreError),
    /// Some calls of a concurrent batch failed.
    PartialFailure(BatchFailure),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::NotFound { kind, id } => write!(f, "{kind} not found: {id}"),
            Self::ProtectedCategory(name) => {
                write!(f, "category `{name}` is built in and cannot be changed")
            }
            Self::DuplicateCategory(name) => write!(f, "category `{name}` already exists"),
            Self::Store(err) => write!(f, "{err}"),
            Self::PartialFailure(batch) => write!(
                f,
                "{} of {} store writes failed; reload to reconcile",
                batch.failures.len(),
                batch.attempted
            ),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Store(err) => Some(err),
            Self::PartialFailure(batch) => batch.failures.first().map(|err| err as _),
            _ => None,
        }
    }
}

impl From<ModelValidationError> for RepoError {
    fn from(value: ModelValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<StoreError> for RepoError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::NotFound { kind, id } => Self::NotFound { kind, id },
            other => Self::Store(other),
        }
    }
}

/// Typed repository over all four dashboard collections.
///
/// Owns its store; the default store opens its SQLite connection lazily on
/// the first call.
pub struct DashboardRepository<S = SqliteStore> {
    store: S,
}

impl DashboardRepository<SqliteStore> {
    /// Creates a repository persisting into the database file at `path`.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self::new(SqliteStore::open(path))
    }

    /// Creates a repository over a private in-memory database.
    pub fn in_memory() -> Self {
        Self::new(SqliteStore::in_memory())
    }
}

impl<S: DashboardStore> DashboardRepository<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Lists one collection as stored, unsorted.
    pub async fn get_all<T: Entity>(&self) -> RepoResult<Vec<T>>
    where
        S: StoreAdapter<T>,
    {
        Ok(StoreAdapter::<T>::get_all(&self.store).await?)
    }

    /// Validates and inserts one entity.
    pub async fn add<T: Entity>(&self, entity: &T) -> RepoResult<()>
    where
        S: StoreAdapter<T>,
    {
        entity.validate()?;
        Ok(StoreAdapter::<T>::add(&self.store, entity).await?)
    }

    /// Validates and replaces one entity by id.
    pub async fn update<T: Entity>(&self, entity: &T) -> RepoResult<()>
    where
        S: StoreAdapter<T>,
    {
        entity.validate()?;
        Ok(StoreAdapter::<T>::update(&self.store, entity).await?)
    }

    /// Removes one entity by id.
    pub async fn remove<T: Entity>(&self, id: &str) -> RepoResult<()>
    where
        S: StoreAdapter<T>,
    {
        Ok(StoreAdapter::<T>::remove(&self.store, id).await?)
    }

    /// Removes every entity of one kind.
    pub async fn clear<T: Entity>(&self) -> RepoResult<()>
    where
        S: StoreAdapter<T>,
    {
        Ok(StoreAdapter::<T>::clear(&self.store).await?)
    }

    /// Inserts many entities concurrently.
    ///
    /// Every record is validated before any write is dispatched. Returns
    /// the number of inserted entities.
    pub async fn add_many<T: Entity>(&self, entities: &[T]) -> RepoResult<usize>
    where
        S: StoreAdapter<T>,
    {
        for entity in entities {
            entity.validate()?;
        }
        let results = join_all(
            entities
                .iter()
                .map(|entity| StoreAdapter::<T>::add(&self.store, entity)),
        )
        .await;
        collect_batch(T::KIND.collection_name(), "add", results)
    }

    /// Replaces many entities concurrently.
    pub async fn update_many<T: Entity>(&self, entities: &[T]) -> RepoResult<usize>
    where
        S: StoreAdapter<T>,
    {
        for entity in entities {
            entity.validate()?;
        }
        let results = join_all(
            entities
                .iter()
                .map(|entity| StoreAdapter::<T>::update(&self.store, entity)),
        )
        .await;
        collect_batch(T::KIND.collection_name(), "update", results)
    }

    /// Removes many entities concurrently.
    pub async fn remove_many<T: Entity>(&self, ids: &[String]) -> RepoResult<usize>
    where
        S: StoreAdapter<T>,
    {
        let results = join_all(
            ids.iter()
                .map(|id| StoreAdapter::<T>::remove(&self.store, id.as_str())),
        )
        .await;
        collect_batch(T::KIND.collection_name(), "remove", results)
    }

    /// Links sorted by the ordering rules.
    pub async fn links(&self) -> RepoResult<Vec<LinkItem>> {
        let mut links = self.get_all::<LinkItem>().await?;
        sort_by_order(&mut links);
        Ok(links)
    }

    /// Notes sorted by the ordering rules.
    pub async fn notes(&self) -> RepoResult<Vec<NoteItem>> {
        let mut notes = self.get_all::<NoteItem>().await?;
        sort_by_order(&mut notes);
        Ok(notes)
    }

    /// Events sorted by date and time.
    pub async fn events(&self) -> RepoResult<Vec<EventItem>> {
        let mut events = self.get_all::<EventItem>().await?;
        sort_events(&mut events);
        Ok(events)
    }

    /// Categories sorted by the ordering rules.
    pub async fn categories(&self) -> RepoResult<Vec<CategoryItem>> {
        let mut categories = self.get_all::<CategoryItem>().await?;
        sort_by_order(&mut categories);
        Ok(categories)
    }

    /// Loads all four collections concurrently, each pre-sorted.
    pub async fn load_all(&self) -> RepoResult<Snapshot> {
        let (links, notes, events, categories) = try_join4(
            self.get_all::<LinkItem>(),
            self.get_all::<NoteItem>(),
            self.get_all::<EventItem>(),
            self.get_all::<CategoryItem>(),
        )
        .await?;
        Ok(Snapshot::sorted(links, notes, events, categories))
    }

    /// Clears all four collections concurrently.
    pub async fn clear_all(&self) -> RepoResult<()> {
        let (links, notes, events, categories) = futures_util::join!(
            StoreAdapter::<LinkItem>::clear(&self.store),
            StoreAdapter::<NoteItem>::clear(&self.store),
            StoreAdapter::<EventItem>::clear(&self.store),
            StoreAdapter::<CategoryItem>::clear(&self.store),
        );
        collect_batch("all", "clear", vec![links, notes, events, categories])?;
        info!("event=collections_clear module=repo status=ok");
        Ok(())
    }

    /// Inserts every entity of `snapshot` concurrently.
    ///
    /// Returns the number of inserted entities. Failures of all four
    /// collections are merged into one `PartialFailure`.
    pub async fn add_snapshot(&self, snapshot: &Snapshot) -> RepoResult<usize> {
        let (links, notes, events, categories) = futures_util::join!(
            self.add_many(&snapshot.links),
            self.add_many(&snapshot.notes),
            self.add_many(&snapshot.events),
            self.add_many(&snapshot.categories),
        );
        merge_batches([links, notes, events, categories])
    }
}

fn collect_batch(
    scope: &str,
    operation: &'static str,
    results: Vec<Result<(), StoreError>>,
) -> RepoResult<usize> {
    let attempted = results.len();
    let failures: Vec<StoreError> = results.into_iter().filter_map(Result::err).collect();
    if failures.is_empty() {
        return Ok(attempted);
    }

    error!(
        "event=batch_write module=repo status=error scope={} op={} attempted={} failed={}",
        scope,
        operation,
        attempted,
        failures.len()
    );
    Err(RepoError::PartialFailure(BatchFailure {
        attempted,
        failures,
    }))
}

/// Merges per-collection batch results into one count or one failure.
///
/// A validation error in any collection wins, since it is raised before
/// that collection's writes are dispatched.
pub(crate) fn merge_batches<const N: usize>(
    results: [RepoResult<usize>; N],
) -> RepoResult<usize> {
    let mut written = 0;
    let mut merged: Option<BatchFailure> = None;

    for result in results {
        match result {
            Ok(count) => {
                written += count;
                if let Some(batch) = merged.as_mut() {
                    batch.attempted += count;
                }
            }
            Err(RepoError::PartialFailure(batch)) => match merged.as_mut() {
                Some(existing) => existing.absorb(batch),
                None => {
                    let mut batch = batch;
                    batch.attempted += written;
                    merged = Some(batch);
                }
            },
            Err(other) => return Err(other),
        }
    }

    match merged {
        Some(batch) => Err(RepoError::PartialFailure(batch)),
        None => Ok(written),
    }
}

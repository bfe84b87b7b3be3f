//! Persistent store adapter contract.
//!
//! # Responsibility
//! - Define asynchronous CRUD over one named sub-collection per entity kind.
//! - Classify store failures into semantic errors.
//!
//! # Invariants
//! - Every call resolves independently; there is no cross-call transaction.
//! - `add` on an existing id fails with `DuplicateId`.
//! - `update`/`remove` on a missing id fail with `NotFound`; they never upsert.
//! - A successful write is visible to every later `get_all` on the same store.

use crate::db::DbError;
use crate::model::category::CategoryItem;
use crate::model::entity::{Entity, EntityKind};
use crate::model::event::EventItem;
use crate::model::link::LinkItem;
use crate::model::note::NoteItem;
use async_trait::async_trait;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type StoreResult<T> = Result<T, StoreError>;

/// Failure of one call against the persistent store.
#[derive(Debug)]
pub enum StoreError {
    /// Connection bootstrap or SQL execution failed.
    Db(DbError),
    /// `add` referenced an id already present in the collection.
    DuplicateId { kind: EntityKind, id: String },
    /// `update`/`remove` referenced an id absent from the collection.
    NotFound { kind: EntityKind, id: String },
    /// Persisted row cannot be converted into a valid entity.
    InvalidData(String),
    /// The blocking worker running the call failed.
    Unavailable(String),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::DuplicateId { kind, id } => write!(f, "{kind} already exists: {id}"),
            Self::NotFound { kind, id } => write!(f, "{kind} not found: {id}"),
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
            Self::Unavailable(message) => write!(f, "store unavailable: {message}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for StoreError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Asynchronous CRUD over the sub-collection holding entities of kind `T`.
#[async_trait]
pub trait StoreAdapter<T: Entity>: Send + Sync {
    /// Lists every entity in the collection, in no particular order.
    async fn get_all(&self) -> StoreResult<Vec<T>>;

    /// Inserts a new entity.
    async fn add(&self, entity: &T) -> StoreResult<()>;

    /// Replaces the entity with the same id.
    async fn update(&self, entity: &T) -> StoreResult<()>;

    /// Deletes one entity by id.
    async fn remove(&self, id: &str) -> StoreResult<()>;

    /// Deletes every entity in the collection.
    async fn clear(&self) -> StoreResult<()>;
}

/// A store holding all four dashboard collections.
pub trait DashboardStore:
    StoreAdapter<LinkItem>
    + StoreAdapter<NoteItem>
    + StoreAdapter<EventItem>
    + StoreAdapter<CategoryItem>
{
}

impl<S> DashboardStore for S where
    S: StoreAdapter<LinkItem>
        + StoreAdapter<NoteItem>
        + StoreAdapter<EventItem>
        + StoreAdapter<CategoryItem>
{
}

//! Repository layer: store contract, SQLite adapter and typed collections.
//!
//! # Responsibility
//! - Define the asynchronous store contract per entity kind.
//! - Isolate SQLite details from service orchestration.
//!
//! # Invariants
//! - Repository writes call `Entity::validate()` before persistence.
//! - Repository APIs return semantic errors (`NotFound`, `PartialFailure`)
//!   in addition to store transport errors.

pub mod collection_repo;
pub mod sqlite_store;
pub mod store;

pub use collection_repo::{BatchFailure, DashboardRepository, RepoError, RepoResult};
pub use sqlite_store::{SqlRecord, SqliteStore};
pub use store::{DashboardStore, StoreAdapter, StoreError, StoreResult};

//! Core domain logic for the personal dashboard.
//! Links, notes, events and categories live here together with their
//! ordering, grouping, drag/drop and import rules.

pub mod config;
pub mod db;
pub mod import;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use config::{ConfigError, CoreConfig};
pub use import::backup::{backup_file_name, parse_backup, BackupDocument};
pub use import::{ImportError, ImportFormat, ImportResult, MergeMode};
pub use logging::{
    default_log_level, init_logging, init_logging_from_config, start_logging, LogSettings,
    LoggingError,
};
pub use model::category::CategoryItem;
pub use model::entity::{Entity, EntityId, EntityKind, ModelValidationError};
pub use model::event::EventItem;
pub use model::link::{LinkItem, GENERAL_CATEGORY};
pub use model::note::NoteItem;
pub use model::settings::{AccentColor, BackgroundName, Settings, SettingsPatch};
pub use model::snapshot::Snapshot;
pub use repo::{
    BatchFailure, DashboardRepository, DashboardStore, RepoError, RepoResult, SqliteStore,
    StoreAdapter, StoreError,
};
pub use service::dashboard_service::{DashboardService, NewEvent};
pub use service::grouping::{group_links, partition_groups, GroupPartition, LinkGroup};
pub use service::import_service::{ImportReport, ImportService};
pub use service::reorder::{
    Board, CommitOutcome, DragState, DragSubject, DropTarget, ReorderEngine, ReorderError,
};

/// Minimal health-check API for front-end wiring.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into use-case level APIs.
//! - Host the pure grouping view and the drag/drop reorder engine.

pub mod dashboard_service;
pub mod grouping;
pub mod import_service;
pub mod reorder;

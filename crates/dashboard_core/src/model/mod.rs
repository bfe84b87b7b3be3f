//! Dashboard domain model.
//!
//! # Responsibility
//! - Define the four persisted entity kinds (links, notes, events,
//!   categories) and the presentation settings carried by backups.
//! - Define the ordering rules shared by every order-managed list.
//!
//! # Invariants
//! - Every entity is identified by an id that is unique within its own
//!   collection and never reused or mutated after creation.
//! - "General" exists implicitly as a category even when no
//!   `CategoryItem` carries that name.

pub mod category;
pub mod entity;
pub mod event;
pub mod link;
pub mod note;
pub mod ordering;
pub mod settings;
pub mod snapshot;

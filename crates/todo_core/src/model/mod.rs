//! Todo domain model.
//!
//! # Responsibility
//! - Define the canonical todo record and its request shapes.
//! - Own validation rules for create/update inputs.
//! - Define calendar windows used by list filters and dashboard counts.
//!
//! # Invariants
//! - Every todo is identified by a store-assigned `TodoId` that is never reused.
//! - Deletion is a hard delete; there are no tombstones.

pub mod dashboard;
pub mod date;
pub mod todo;
pub mod window;

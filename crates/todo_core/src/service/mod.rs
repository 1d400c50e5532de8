//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate validation and repository calls into use-case level APIs.
//! - Keep CLI/presentation layers decoupled from storage details.

pub mod rewards;
pub mod todo_service;

//! Core domain logic for the todo tracker.
//! This crate is the single source of truth for todo invariants.

pub mod clock;
pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use clock::{Clock, FixedClock, SystemClock};
pub use config::AppConfig;
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::dashboard::{Dashboard, RECENT_LIMIT};
pub use model::date::{format_date, parse_date};
pub use model::todo::{
    NewTodo, Priority, Todo, TodoChanges, TodoDraft, TodoId, TodoPatch, TodoStatus,
    TodoValidationError, DEFAULT_CATEGORY,
};
pub use model::window::{DateRange, TimeWindow};
pub use repo::todo_repo::{
    RepoError, RepoResult, SqliteTodoRepository, TodoListQuery, TodoRepository,
};
pub use service::rewards::{evaluate_rewards, AchievementProgress, RewardsSummary};
pub use service::todo_service::{ServiceResult, TodoService, TodoServiceError};
pub use time::Date;

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

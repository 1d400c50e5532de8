//! Todo use-case service.
//!
//! # Responsibility
//! - Provide list/get/create/update/toggle/delete, dashboard, rewards and
//!   category entry points for presentation callers.
//! - Validate request shapes before they reach the repository.
//! - Resolve "today" and creation timestamps from an injected clock.
//!
//! # Invariants
//! - Service APIs never bypass repository validation/persistence contracts.
//! - A rejected request leaves the store unchanged.
//! - Every failure is reported to the caller; nothing is retried.

use crate::clock::{Clock, SystemClock};
use crate::model::dashboard::Dashboard;
use crate::model::todo::{NewTodo, Todo, TodoId, TodoPatch, TodoValidationError};
use crate::repo::todo_repo::{RepoError, TodoListQuery, TodoRepository};
use crate::service::rewards::{evaluate_rewards, RewardsSummary};
use log::{error, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type ServiceResult<T> = Result<T, TodoServiceError>;

/// Service error for todo use-cases.
#[derive(Debug)]
pub enum TodoServiceError {
    /// Request failed input validation.
    Validation(TodoValidationError),
    /// Target todo does not exist.
    NotFound(TodoId),
    /// Storage unavailable or query failure.
    Store(RepoError),
}

impl TodoServiceError {
    /// Text safe to show end users.
    ///
    /// Validation failures keep their field-specific guidance; not-found and
    /// storage failures are reported generically.
    pub fn user_message(&self) -> String {
        match self {
            Self::Validation(err) => match err {
                TodoValidationError::InvalidStatus(_) => {
                    "Status must be either \"pending\" or \"completed\"".to_string()
                }
                other => other.to_string(),
            },
            Self::NotFound(_) => "Todo not found".to_string(),
            Self::Store(_) => "Something went wrong, please try again".to_string(),
        }
    }
}

impl Display for TodoServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "todo not found: {id}"),
            Self::Store(err) => write!(f, "{err}"),
        }
    }
}

impl Error for TodoServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::NotFound(_) => None,
            Self::Store(err) => Some(err),
        }
    }
}

impl From<TodoValidationError> for TodoServiceError {
    fn from(value: TodoValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<RepoError> for TodoServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound(id) => Self::NotFound(id),
            RepoError::Validation(err) => Self::Validation(err),
            other => Self::Store(other),
        }
    }
}

/// Todo service facade over repository implementations.
pub struct TodoService<R: TodoRepository, C: Clock = SystemClock> {
    repo: R,
    clock: C,
}

impl<R: TodoRepository> TodoService<R> {
    /// Creates a service using the wall clock.
    pub fn new(repo: R) -> Self {
        Self::with_clock(repo, SystemClock)
    }
}

impl<R: TodoRepository, C: Clock> TodoService<R, C> {
    /// Creates a service with an explicit clock.
    pub fn with_clock(repo: R, clock: C) -> Self {
        Self { repo, clock }
    }

    /// Lists todos matching every present filter, most urgent first.
    pub fn list_todos(&self, query: &TodoListQuery) -> ServiceResult<Vec<Todo>> {
        let todos = self
            .repo
            .list_todos(query, self.clock.today())
            .map_err(|err| store_failure("todo_list", None, err))?;
        info!(
            "event=todo_list module=service status=ok count={} window={}",
            todos.len(),
            query.window.map_or("none", |window| window.as_str())
        );
        Ok(todos)
    }

    /// Gets one todo, or `NotFound`.
    pub fn get_todo(&self, id: TodoId) -> ServiceResult<Todo> {
        self.repo
            .get_todo(id)
            .map_err(|err| store_failure("todo_get", Some(id), err))?
            .ok_or(TodoServiceError::NotFound(id))
    }

    /// Creates a todo with defaults applied; status always starts `pending`.
    pub fn create_todo(&self, request: NewTodo) -> ServiceResult<Todo> {
        let draft = request.into_draft(self.clock.now_ms()).map_err(|err| {
            warn!("event=todo_create module=service status=rejected reason={err}");
            TodoServiceError::Validation(err)
        })?;

        let created = self
            .repo
            .create_todo(&draft)
            .map_err(|err| store_failure("todo_create", None, err))?;
        info!("event=todo_create module=service status=ok id={}", created.id);
        Ok(created)
    }

    /// Applies a partial update and returns the full post-update record.
    pub fn update_todo(&self, id: TodoId, patch: TodoPatch) -> ServiceResult<Todo> {
        let changes = patch.into_changes().map_err(|err| {
            warn!("event=todo_update module=service status=rejected id={id} reason={err}");
            TodoServiceError::Validation(err)
        })?;

        let updated = self
            .repo
            .update_todo(id, &changes)
            .map_err(|err| store_failure("todo_update", Some(id), err))?;
        info!("event=todo_update module=service status=ok id={id}");
        Ok(updated)
    }

    /// Flips status between `pending` and `completed` as one store write.
    pub fn toggle_status(&self, id: TodoId) -> ServiceResult<Todo> {
        let toggled = self
            .repo
            .toggle_status(id)
            .map_err(|err| store_failure("todo_toggle", Some(id), err))?;
        info!(
            "event=todo_toggle module=service status=ok id={id} todo_status={}",
            toggled.status
        );
        Ok(toggled)
    }

    /// Permanently deletes a todo.
    pub fn delete_todo(&self, id: TodoId) -> ServiceResult<()> {
        self.repo
            .delete_todo(id)
            .map_err(|err| store_failure("todo_delete", Some(id), err))?;
        info!("event=todo_delete module=service status=ok id={id}");
        Ok(())
    }

    /// Aggregate statistics over all todos, from one snapshot.
    pub fn dashboard(&self) -> ServiceResult<Dashboard> {
        let dashboard = self
            .repo
            .dashboard(self.clock.today())
            .map_err(|err| store_failure("todo_dashboard", None, err))?;
        info!(
            "event=todo_dashboard module=service status=ok total={}",
            dashboard.total
        );
        Ok(dashboard)
    }

    /// Achievement progress derived from the current dashboard.
    pub fn rewards(&self) -> ServiceResult<RewardsSummary> {
        let dashboard = self.dashboard()?;
        Ok(evaluate_rewards(&dashboard))
    }

    /// Distinct categories in use, ascending.
    pub fn list_categories(&self) -> ServiceResult<Vec<String>> {
        self.repo
            .list_categories()
            .map_err(|err| store_failure("todo_categories", None, err))
    }
}

/// Maps a repository error, logging storage failures.
///
/// Not-found and validation outcomes are expected results and are not
/// logged as errors.
fn store_failure(event: &str, id: Option<TodoId>, err: RepoError) -> TodoServiceError {
    let mapped = TodoServiceError::from(err);
    match &mapped {
        TodoServiceError::Store(inner) => error!(
            "event={} module=service status=error id={} error={}",
            event,
            id.map_or_else(|| "none".to_string(), |id| id.to_string()),
            inner
        ),
        TodoServiceError::NotFound(id) => {
            info!("event={event} module=service status=not_found id={id}")
        }
        TodoServiceError::Validation(inner) => {
            warn!("event={event} module=service status=rejected reason={inner}")
        }
    }
    mapped
}

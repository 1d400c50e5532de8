//! Todo domain model.
//!
//! # Responsibility
//! - Define the canonical todo record returned by every read path.
//! - Define create/update request shapes and turn them into validated
//!   write models (`TodoDraft`, `TodoChanges`).
//!
//! # Invariants
//! - `title` is never blank once validation passes.
//! - `status` is always `pending` or `completed`.
//! - New todos always start as `pending`.
//! - `created_at` is set once and never rewritten.

use crate::model::date;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use time::Date;

/// Store-assigned identifier. Never reused after deletion.
pub type TodoId = i64;

/// Category applied when a create request leaves it blank.
pub const DEFAULT_CATEGORY: &str = "general";

/// Completion state of a todo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TodoStatus {
    /// Not done yet. Initial state of every todo.
    Pending,
    /// Done.
    Completed,
}

impl TodoStatus {
    /// Parses the strict wire literal (`pending` or `completed`).
    pub fn parse(value: &str) -> Result<Self, TodoValidationError> {
        match value {
            "pending" => Ok(Self::Pending),
            "completed" => Ok(Self::Completed),
            other => Err(TodoValidationError::InvalidStatus(other.to_string())),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Completed => "completed",
        }
    }
}

impl Display for TodoStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Todo priority.
///
/// `low|medium|high` are the known levels. Priority is not validated on
/// update, so any other label is kept verbatim as `Custom` and ranks below
/// every known level.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
    Custom(String),
}

impl Priority {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Custom(value) => value.as_str(),
        }
    }

    /// Ordinal used for sorting: `high=3, medium=2, low=1`, anything else 0.
    pub fn rank(&self) -> i64 {
        match self {
            Self::High => 3,
            Self::Medium => 2,
            Self::Low => 1,
            Self::Custom(_) => 0,
        }
    }
}

impl From<String> for Priority {
    fn from(value: String) -> Self {
        match value.as_str() {
            "low" => Self::Low,
            "medium" => Self::Medium,
            "high" => Self::High,
            _ => Self::Custom(value),
        }
    }
}

impl From<&str> for Priority {
    fn from(value: &str) -> Self {
        Self::from(value.to_string())
    }
}

impl From<Priority> for String {
    fn from(value: Priority) -> Self {
        match value {
            Priority::Custom(value) => value,
            known => known.as_str().to_string(),
        }
    }
}

impl Display for Priority {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Canonical todo record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Todo {
    pub id: TodoId,
    pub title: String,
    pub description: String,
    /// Calendar day only; serialized as `YYYY-MM-DD` or `null`.
    #[serde(with = "date::optional")]
    pub due_date: Option<Date>,
    pub category: String,
    pub priority: Priority,
    pub status: TodoStatus,
    /// Unix epoch milliseconds.
    pub created_at: i64,
}

impl Todo {
    /// Validates invariants that must hold for every stored todo.
    pub fn validate(&self) -> Result<(), TodoValidationError> {
        if self.title.trim().is_empty() {
            return Err(TodoValidationError::MissingTitle);
        }
        Ok(())
    }
}

/// Validation failures for todo create/update input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TodoValidationError {
    /// Create request without a non-blank title.
    MissingTitle,
    /// Update request that tries to clear the title.
    EmptyTitle,
    /// Status literal other than `pending`/`completed`.
    InvalidStatus(String),
    /// Update request without any recognized field.
    EmptyUpdate,
}

impl TodoValidationError {
    /// Name of the offending input field, if the error is tied to one.
    pub fn field(&self) -> Option<&'static str> {
        match self {
            Self::MissingTitle | Self::EmptyTitle => Some("title"),
            Self::InvalidStatus(_) => Some("status"),
            Self::EmptyUpdate => None,
        }
    }
}

impl Display for TodoValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingTitle => write!(f, "Title is required"),
            Self::EmptyTitle => write!(f, "Title cannot be empty"),
            Self::InvalidStatus(value) => write!(
                f,
                "Status must be either \"pending\" or \"completed\", got `{value}`"
            ),
            Self::EmptyUpdate => write!(f, "No fields to update"),
        }
    }
}

impl Error for TodoValidationError {}

/// Create request.
///
/// Only `title` is required. Blank `category`/`priority` fall back to
/// defaults; there is no `status` field because new todos always start
/// `pending`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct NewTodo {
    pub title: String,
    pub description: Option<String>,
    #[serde(with = "date::optional")]
    pub due_date: Option<Date>,
    pub category: Option<String>,
    pub priority: Option<String>,
}

impl NewTodo {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    /// Validates the request and applies creation defaults.
    pub fn into_draft(self, created_at: i64) -> Result<TodoDraft, TodoValidationError> {
        let title = normalize_title(&self.title).ok_or(TodoValidationError::MissingTitle)?;
        let category = self
            .category
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| DEFAULT_CATEGORY.to_string());
        let priority = self
            .priority
            .filter(|value| !value.is_empty())
            .map(Priority::from)
            .unwrap_or_default();

        Ok(TodoDraft {
            title,
            description: self.description.unwrap_or_default(),
            due_date: self.due_date,
            category,
            priority,
            status: TodoStatus::Pending,
            created_at,
        })
    }
}

/// Validated insert model produced by [`NewTodo::into_draft`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TodoDraft {
    pub title: String,
    pub description: String,
    pub due_date: Option<Date>,
    pub category: String,
    pub priority: Priority,
    pub status: TodoStatus,
    pub created_at: i64,
}

impl TodoDraft {
    pub fn validate(&self) -> Result<(), TodoValidationError> {
        if self.title.trim().is_empty() {
            return Err(TodoValidationError::MissingTitle);
        }
        Ok(())
    }
}

/// Partial update request.
///
/// Each `None` field is left unchanged. In JSON a missing key is `None`,
/// while an explicit `null` counts as present: text fields become `""`
/// (so a `null` title is rejected and a `null` description clears it) and
/// `due_date` becomes `Some(None)`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct TodoPatch {
    #[serde(deserialize_with = "nullable_text::deserialize")]
    pub title: Option<String>,
    #[serde(deserialize_with = "nullable_text::deserialize")]
    pub description: Option<String>,
    #[serde(deserialize_with = "date::patch::deserialize")]
    pub due_date: Option<Option<Date>>,
    #[serde(deserialize_with = "nullable_text::deserialize")]
    pub category: Option<String>,
    #[serde(deserialize_with = "nullable_text::deserialize")]
    pub priority: Option<String>,
    #[serde(deserialize_with = "nullable_text::deserialize")]
    pub status: Option<String>,
}

/// Patch text field: only called for present keys, `null` reads as `""`.
mod nullable_text {
    use serde::{Deserialize, Deserializer};

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Option::<String>::deserialize(deserializer)?;
        Ok(Some(value.unwrap_or_default()))
    }
}

impl TodoPatch {
    /// Patch that only changes `status`.
    pub fn status(status: TodoStatus) -> Self {
        Self {
            status: Some(status.as_str().to_string()),
            ..Self::default()
        }
    }

    /// Validates the patch. Either every field applies or none does.
    ///
    /// Check order: title, then status, then emptiness.
    pub fn into_changes(self) -> Result<TodoChanges, TodoValidationError> {
        let title = match self.title {
            Some(raw) => Some(normalize_title(&raw).ok_or(TodoValidationError::EmptyTitle)?),
            None => None,
        };
        let status = self.status.as_deref().map(TodoStatus::parse).transpose()?;

        let changes = TodoChanges {
            title,
            description: self.description,
            due_date: self.due_date,
            category: self.category,
            priority: self.priority.map(Priority::from),
            status,
        };
        if changes.is_empty() {
            return Err(TodoValidationError::EmptyUpdate);
        }
        Ok(changes)
    }
}

/// Validated update model produced by [`TodoPatch::into_changes`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TodoChanges {
    pub title: Option<String>,
    pub description: Option<String>,
    pub due_date: Option<Option<Date>>,
    pub category: Option<String>,
    pub priority: Option<Priority>,
    pub status: Option<TodoStatus>,
}

impl TodoChanges {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.due_date.is_none()
            && self.category.is_none()
            && self.priority.is_none()
            && self.status.is_none()
    }

    pub fn validate(&self) -> Result<(), TodoValidationError> {
        if self.is_empty() {
            return Err(TodoValidationError::EmptyUpdate);
        }
        match self.title.as_deref() {
            Some(title) if title.trim().is_empty() => Err(TodoValidationError::EmptyTitle),
            _ => Ok(()),
        }
    }
}

fn normalize_title(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

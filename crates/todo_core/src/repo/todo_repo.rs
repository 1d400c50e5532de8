//! Todo repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide filtered listing, lookup, create/update/delete and category
//!   listing over the `todos` table.
//! - Keep SQL details inside the persistence boundary.
//!
//! # Invariants
//! - Write paths validate drafts/changes before SQL mutations.
//! - Read paths reject invalid persisted state instead of masking it.
//! - Filter values and update values are always bound, never interpolated.
//! - List order is priority rank DESC, `created_at` DESC, `id` DESC.

use crate::db::migrations::{latest_version, schema_version};
use crate::db::DbError;
use crate::model::dashboard::Dashboard;
use crate::model::date::{format_date, parse_date};
use crate::model::todo::{
    Priority, Todo, TodoChanges, TodoDraft, TodoId, TodoStatus, TodoValidationError,
};
use crate::model::window::TimeWindow;
use crate::repo::aggregate::load_dashboard;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row, Transaction, TransactionBehavior};
use std::error::Error;
use std::fmt::{Display, Formatter};
use time::Date;

pub(crate) const TODO_SELECT_SQL: &str = "SELECT
    id,
    title,
    description,
    due_date,
    category,
    priority,
    status,
    created_at
FROM todos";

/// Mirrors [`Priority::rank`] so SQLite can sort by severity instead of text.
pub(crate) const PRIORITY_RANK_SQL: &str =
    "CASE priority WHEN 'high' THEN 3 WHEN 'medium' THEN 2 WHEN 'low' THEN 1 ELSE 0 END";

const TODO_COLUMNS: [&str; 8] = [
    "id",
    "title",
    "description",
    "due_date",
    "category",
    "priority",
    "status",
    "created_at",
];

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for todo persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Validation(TodoValidationError),
    Db(DbError),
    NotFound(TodoId),
    InvalidData(String),
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    MissingRequiredTable(&'static str),
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "todo not found: {id}"),
            Self::InvalidData(message) => write!(f, "invalid persisted todo data: {message}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "connection schema version {actual_version} does not match expected {expected_version}; open it through db::open_db"
            ),
            Self::MissingRequiredTable(table) => write!(f, "required table `{table}` is missing"),
            Self::MissingRequiredColumn { table, column } => {
                write!(f, "required column `{table}.{column}` is missing")
            }
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<TodoValidationError> for RepoError {
    fn from(value: TodoValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Optional filters for listing todos. `None` means "no constraint".
///
/// All present filters are combined with AND. `category`, `status` and
/// `priority` are exact-match; a status other than `pending`/`completed`
/// simply matches nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TodoListQuery {
    pub category: Option<String>,
    pub status: Option<String>,
    pub priority: Option<Priority>,
    pub window: Option<TimeWindow>,
}

impl TodoListQuery {
    fn predicates(&self, today: Date) -> Predicates {
        let mut predicates = Predicates::default();
        if let Some(category) = self.category.as_ref() {
            predicates.push("category = ?", [Value::Text(category.clone())]);
        }
        if let Some(status) = self.status.as_ref() {
            predicates.push("status = ?", [Value::Text(status.clone())]);
        }
        if let Some(priority) = self.priority.as_ref() {
            predicates.push("priority = ?", [Value::Text(priority.as_str().to_string())]);
        }
        if let Some(window) = self.window {
            let range = window.range(today);
            predicates.push(
                "due_date IS NOT NULL AND due_date BETWEEN ? AND ?",
                [
                    Value::Text(format_date(range.start)),
                    Value::Text(format_date(range.end)),
                ],
            );
        }
        predicates
    }
}

/// Bound SQL predicates joined with AND.
#[derive(Debug, Default)]
struct Predicates {
    clauses: Vec<&'static str>,
    values: Vec<Value>,
}

impl Predicates {
    fn push(&mut self, clause: &'static str, values: impl IntoIterator<Item = Value>) {
        self.clauses.push(clause);
        self.values.extend(values);
    }

    fn where_sql(&self) -> String {
        if self.clauses.is_empty() {
            return String::new();
        }
        let joined = self
            .clauses
            .iter()
            .map(|clause| format!("({clause})"))
            .collect::<Vec<_>>()
            .join(" AND ");
        format!(" WHERE {joined}")
    }
}

/// Repository interface for todo storage.
pub trait TodoRepository {
    /// Inserts a todo and returns the stored record.
    fn create_todo(&self, draft: &TodoDraft) -> RepoResult<Todo>;
    fn get_todo(&self, id: TodoId) -> RepoResult<Option<Todo>>;
    /// Lists todos matching every present filter; windows resolve against `today`.
    fn list_todos(&self, query: &TodoListQuery, today: Date) -> RepoResult<Vec<Todo>>;
    /// Applies present changes atomically and returns the post-update record.
    fn update_todo(&self, id: TodoId, changes: &TodoChanges) -> RepoResult<Todo>;
    /// Flips `pending` <-> `completed` in one statement and returns the record.
    fn toggle_status(&self, id: TodoId) -> RepoResult<Todo>;
    /// Permanently removes one todo.
    fn delete_todo(&self, id: TodoId) -> RepoResult<()>;
    /// Distinct categories in use, ascending.
    fn list_categories(&self) -> RepoResult<Vec<String>>;
    /// Aggregates over the whole table from one read snapshot.
    fn dashboard(&self, today: Date) -> RepoResult<Dashboard>;
}

/// SQLite-backed todo repository.
pub struct SqliteTodoRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteTodoRepository<'conn> {
    /// Wraps a connection opened through [`crate::db::open_db`].
    ///
    /// Rejects connections whose schema is not at the latest version or
    /// lacks the `todos` table/columns.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_todo_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl TodoRepository for SqliteTodoRepository<'_> {
    fn create_todo(&self, draft: &TodoDraft) -> RepoResult<Todo> {
        draft.validate()?;

        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        tx.execute(
            "INSERT INTO todos (
                title,
                description,
                due_date,
                category,
                priority,
                status,
                created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7);",
            params![
                draft.title.as_str(),
                draft.description.as_str(),
                draft.due_date.map(format_date),
                draft.category.as_str(),
                draft.priority.as_str(),
                draft.status.as_str(),
                draft.created_at,
            ],
        )?;
        let id = tx.last_insert_rowid();
        let created = fetch_todo(&tx, id)?.ok_or_else(|| {
            RepoError::InvalidData(format!("inserted todo {id} missing in read-back"))
        })?;
        tx.commit()?;

        Ok(created)
    }

    fn get_todo(&self, id: TodoId) -> RepoResult<Option<Todo>> {
        fetch_todo(self.conn, id)
    }

    fn list_todos(&self, query: &TodoListQuery, today: Date) -> RepoResult<Vec<Todo>> {
        let predicates = query.predicates(today);
        let sql = format!(
            "{TODO_SELECT_SQL}{} ORDER BY {PRIORITY_RANK_SQL} DESC, created_at DESC, id DESC",
            predicates.where_sql()
        );

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(predicates.values))?;
        let mut todos = Vec::new();
        while let Some(row) = rows.next()? {
            todos.push(parse_todo_row(row)?);
        }

        Ok(todos)
    }

    fn update_todo(&self, id: TodoId, changes: &TodoChanges) -> RepoResult<Todo> {
        changes.validate()?;

        let (assignments, mut values) = update_assignments(changes);
        values.push(Value::Integer(id));
        let sql = format!("UPDATE todos SET {} WHERE id = ?;", assignments.join(", "));

        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let changed = tx.execute(&sql, params_from_iter(values))?;
        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }
        let updated = fetch_todo(&tx, id)?.ok_or(RepoError::NotFound(id))?;
        tx.commit()?;

        Ok(updated)
    }

    fn toggle_status(&self, id: TodoId) -> RepoResult<Todo> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let changed = tx.execute(
            "UPDATE todos
             SET status = CASE status WHEN 'pending' THEN 'completed' ELSE 'pending' END
             WHERE id = ?1;",
            [id],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }
        let toggled = fetch_todo(&tx, id)?.ok_or(RepoError::NotFound(id))?;
        tx.commit()?;

        Ok(toggled)
    }

    fn delete_todo(&self, id: TodoId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM todos WHERE id = ?1;", [id])?;

        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }

        Ok(())
    }

    fn list_categories(&self) -> RepoResult<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT DISTINCT category FROM todos ORDER BY category ASC;")?;
        let mut rows = stmt.query([])?;
        let mut categories = Vec::new();
        while let Some(row) = rows.next()? {
            categories.push(row.get("category")?);
        }
        Ok(categories)
    }

    fn dashboard(&self, today: Date) -> RepoResult<Dashboard> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Deferred)?;
        let dashboard = load_dashboard(&tx, today)?;
        tx.commit()?;
        Ok(dashboard)
    }
}

/// One `column = ?` assignment per present change, with matching values.
fn update_assignments(changes: &TodoChanges) -> (Vec<&'static str>, Vec<Value>) {
    let mut assignments = Vec::new();
    let mut values = Vec::new();

    if let Some(title) = changes.title.as_ref() {
        assignments.push("title = ?");
        values.push(Value::Text(title.clone()));
    }
    if let Some(description) = changes.description.as_ref() {
        assignments.push("description = ?");
        values.push(Value::Text(description.clone()));
    }
    if let Some(due_date) = changes.due_date {
        assignments.push("due_date = ?");
        values.push(match due_date {
            Some(date) => Value::Text(format_date(date)),
            None => Value::Null,
        });
    }
    if let Some(category) = changes.category.as_ref() {
        assignments.push("category = ?");
        values.push(Value::Text(category.clone()));
    }
    if let Some(priority) = changes.priority.as_ref() {
        assignments.push("priority = ?");
        values.push(Value::Text(priority.as_str().to_string()));
    }
    if let Some(status) = changes.status {
        assignments.push("status = ?");
        values.push(Value::Text(status.as_str().to_string()));
    }

    (assignments, values)
}

fn fetch_todo(conn: &Connection, id: TodoId) -> RepoResult<Option<Todo>> {
    let mut stmt = conn.prepare(&format!("{TODO_SELECT_SQL} WHERE id = ?1;"))?;
    let mut rows = stmt.query([id])?;
    if let Some(row) = rows.next()? {
        return Ok(Some(parse_todo_row(row)?));
    }
    Ok(None)
}

pub(crate) fn parse_todo_row(row: &Row<'_>) -> RepoResult<Todo> {
    let id: TodoId = row.get("id")?;

    let due_date = match row.get::<_, Option<String>>("due_date")? {
        Some(text) => Some(parse_date(&text).ok_or_else(|| {
            RepoError::InvalidData(format!("invalid due date `{text}` in todos.due_date"))
        })?),
        None => None,
    };

    let status_text: String = row.get("status")?;
    let status = TodoStatus::parse(&status_text).map_err(|_| {
        RepoError::InvalidData(format!("invalid status `{status_text}` in todos.status"))
    })?;

    let todo = Todo {
        id,
        title: row.get("title")?,
        description: row.get("description")?,
        due_date,
        category: row.get("category")?,
        priority: Priority::from(row.get::<_, String>("priority")?),
        status,
        created_at: row.get("created_at")?,
    };
    todo.validate().map_err(|err| {
        RepoError::InvalidData(format!("todo {id} violates model invariants: {err}"))
    })?;
    Ok(todo)
}

fn ensure_todo_connection_ready(conn: &Connection) -> RepoResult<()> {
    let expected_version = latest_version();
    let actual_version = schema_version(conn)?;
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    if !table_exists(conn, "todos")? {
        return Err(RepoError::MissingRequiredTable("todos"));
    }
    for column in TODO_COLUMNS {
        if !table_has_column(conn, "todos", column)? {
            return Err(RepoError::MissingRequiredColumn {
                table: "todos",
                column,
            });
        }
    }

    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn table_has_column(conn: &Connection, table: &str, column: &str) -> RepoResult<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let current: String = row.get(1)?;
        if current == column {
            return Ok(true);
        }
    }
    Ok(false)
}

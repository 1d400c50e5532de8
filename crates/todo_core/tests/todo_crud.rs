use rusqlite::Connection;
use time::macros::date;
use todo_core::db::migrations::latest_version;
use todo_core::db::{open_db, open_db_in_memory};
use todo_core::{
    NewTodo, Priority, RepoError, SqliteTodoRepository, TodoChanges, TodoDraft, TodoRepository,
    TodoStatus, TodoValidationError,
};

const CREATED_AT: i64 = 1_715_760_000_000;

#[test]
fn create_and_get_roundtrip() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTodoRepository::try_new(&conn).unwrap();

    let request = NewTodo {
        description: Some("two litres".to_string()),
        due_date: Some(date!(2024 - 05 - 20)),
        category: Some("shopping".to_string()),
        priority: Some("high".to_string()),
        ..NewTodo::new("Buy milk")
    };
    let created = repo
        .create_todo(&request.into_draft(CREATED_AT).unwrap())
        .unwrap();

    let loaded = repo.get_todo(created.id).unwrap().unwrap();
    assert_eq!(loaded, created);
    assert_eq!(loaded.title, "Buy milk");
    assert_eq!(loaded.description, "two litres");
    assert_eq!(loaded.due_date, Some(date!(2024 - 05 - 20)));
    assert_eq!(loaded.category, "shopping");
    assert_eq!(loaded.priority, Priority::High);
    assert_eq!(loaded.status, TodoStatus::Pending);
    assert_eq!(loaded.created_at, CREATED_AT);
}

#[test]
fn ids_are_never_reused_after_delete() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTodoRepository::try_new(&conn).unwrap();

    let first = repo.create_todo(&draft("first")).unwrap();
    let second = repo.create_todo(&draft("second")).unwrap();
    repo.delete_todo(second.id).unwrap();
    let third = repo.create_todo(&draft("third")).unwrap();

    assert!(second.id > first.id);
    assert!(third.id > second.id);
}

#[test]
fn update_changes_only_present_fields() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTodoRepository::try_new(&conn).unwrap();

    let request = NewTodo {
        description: Some("keep me".to_string()),
        due_date: Some(date!(2024 - 05 - 20)),
        ..NewTodo::new("draft")
    };
    let created = repo
        .create_todo(&request.into_draft(CREATED_AT).unwrap())
        .unwrap();

    let changes = TodoChanges {
        status: Some(TodoStatus::Completed),
        priority: Some(Priority::from("someday")),
        ..TodoChanges::default()
    };
    let updated = repo.update_todo(created.id, &changes).unwrap();

    assert_eq!(updated.status, TodoStatus::Completed);
    assert_eq!(updated.priority, Priority::Custom("someday".to_string()));
    assert_eq!(updated.title, created.title);
    assert_eq!(updated.description, "keep me");
    assert_eq!(updated.due_date, created.due_date);
    assert_eq!(updated.category, created.category);
    assert_eq!(updated.created_at, created.created_at);
    assert_eq!(repo.get_todo(created.id).unwrap().unwrap(), updated);
}

#[test]
fn update_can_clear_due_date() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTodoRepository::try_new(&conn).unwrap();

    let request = NewTodo {
        due_date: Some(date!(2024 - 05 - 20)),
        ..NewTodo::new("dated")
    };
    let created = repo
        .create_todo(&request.into_draft(CREATED_AT).unwrap())
        .unwrap();

    let changes = TodoChanges {
        due_date: Some(None),
        ..TodoChanges::default()
    };
    let updated = repo.update_todo(created.id, &changes).unwrap();
    assert_eq!(updated.due_date, None);
}

#[test]
fn update_not_found_returns_not_found() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTodoRepository::try_new(&conn).unwrap();

    let changes = TodoChanges {
        title: Some("ghost".to_string()),
        ..TodoChanges::default()
    };
    let err = repo.update_todo(42, &changes).unwrap_err();
    assert!(matches!(err, RepoError::NotFound(42)));
}

#[test]
fn validation_failure_blocks_create_and_update() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTodoRepository::try_new(&conn).unwrap();

    let mut invalid = draft("valid for now");
    invalid.title = "   ".to_string();
    let create_err = repo.create_todo(&invalid).unwrap_err();
    assert!(matches!(create_err, RepoError::Validation(_)));
    assert_eq!(row_count(&conn), 0);

    let created = repo.create_todo(&draft("real")).unwrap();
    let blank_title = TodoChanges {
        title: Some(String::new()),
        ..TodoChanges::default()
    };
    let update_err = repo.update_todo(created.id, &blank_title).unwrap_err();
    assert!(matches!(
        update_err,
        RepoError::Validation(TodoValidationError::EmptyTitle)
    ));

    let empty_err = repo
        .update_todo(created.id, &TodoChanges::default())
        .unwrap_err();
    assert!(matches!(
        empty_err,
        RepoError::Validation(TodoValidationError::EmptyUpdate)
    ));
    assert_eq!(repo.get_todo(created.id).unwrap().unwrap(), created);
}

#[test]
fn toggle_flips_the_stored_status_not_a_stale_read() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("todo.sqlite3");
    let conn = open_db(&path).unwrap();
    let other_conn = open_db(&path).unwrap();
    let repo = SqliteTodoRepository::try_new(&conn).unwrap();
    let other_repo = SqliteTodoRepository::try_new(&other_conn).unwrap();

    let created = repo.create_todo(&draft("shared")).unwrap();
    let seen_pending = repo.get_todo(created.id).unwrap().unwrap();
    assert_eq!(seen_pending.status, TodoStatus::Pending);

    // Another writer completes it after this side last read it.
    let changes = TodoChanges {
        status: Some(TodoStatus::Completed),
        ..TodoChanges::default()
    };
    other_repo.update_todo(created.id, &changes).unwrap();

    let toggled = repo.toggle_status(created.id).unwrap();
    assert_eq!(toggled.status, TodoStatus::Pending);
    assert_eq!(toggled.title, "shared");
    assert_eq!(
        other_repo.toggle_status(created.id).unwrap().status,
        TodoStatus::Completed
    );

    assert!(matches!(
        repo.toggle_status(404).unwrap_err(),
        RepoError::NotFound(404)
    ));
}

#[test]
fn delete_is_permanent_and_missing_ids_are_reported() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTodoRepository::try_new(&conn).unwrap();

    let kept = repo.create_todo(&draft("kept")).unwrap();
    let removed = repo.create_todo(&draft("removed")).unwrap();

    repo.delete_todo(removed.id).unwrap();
    assert!(repo.get_todo(removed.id).unwrap().is_none());

    let err = repo.delete_todo(removed.id).unwrap_err();
    assert!(matches!(err, RepoError::NotFound(id) if id == removed.id));
    assert_eq!(row_count(&conn), 1);
    assert!(repo.get_todo(kept.id).unwrap().is_some());
}

#[test]
fn read_rejects_corrupted_rows() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTodoRepository::try_new(&conn).unwrap();
    let created = repo.create_todo(&draft("dated")).unwrap();

    conn.execute(
        "UPDATE todos SET due_date = 'next tuesday' WHERE id = ?1;",
        [created.id],
    )
    .unwrap();

    let err = repo.get_todo(created.id).unwrap_err();
    assert!(matches!(err, RepoError::InvalidData(_)));
}

#[test]
fn repository_rejects_uninitialized_connection() {
    let conn = Connection::open_in_memory().unwrap();

    match SqliteTodoRepository::try_new(&conn) {
        Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version: 0,
        }) => assert_eq!(expected_version, latest_version()),
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("expected uninitialized connection error"),
    }
}

#[test]
fn repository_rejects_connection_without_todos_table() {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(&format!("PRAGMA user_version = {};", latest_version()))
        .unwrap();

    let result = SqliteTodoRepository::try_new(&conn);
    assert!(matches!(result, Err(RepoError::MissingRequiredTable("todos"))));
}

#[test]
fn repository_rejects_connection_missing_required_column() {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(
        "CREATE TABLE todos (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            title TEXT NOT NULL,
            description TEXT NOT NULL DEFAULT '',
            due_date TEXT,
            category TEXT NOT NULL,
            priority TEXT NOT NULL,
            status TEXT NOT NULL
        );",
    )
    .unwrap();
    conn.execute_batch(&format!("PRAGMA user_version = {};", latest_version()))
        .unwrap();

    let result = SqliteTodoRepository::try_new(&conn);
    assert!(matches!(
        result,
        Err(RepoError::MissingRequiredColumn {
            table: "todos",
            column: "created_at"
        })
    ));
}

fn draft(title: &str) -> TodoDraft {
    NewTodo::new(title).into_draft(CREATED_AT).unwrap()
}

fn row_count(conn: &Connection) -> i64 {
    conn.query_row("SELECT COUNT(*) FROM todos;", [], |row| row.get(0))
        .unwrap()
}

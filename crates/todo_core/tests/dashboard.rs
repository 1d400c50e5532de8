use rusqlite::Connection;
use std::collections::BTreeMap;
use time::macros::date;
use todo_core::db::open_db_in_memory;
use todo_core::{
    Date, FixedClock, NewTodo, SqliteTodoRepository, TodoPatch, TodoService, TodoStatus,
    RECENT_LIMIT,
};

const TODAY: Date = date!(2024 - 05 - 15);

fn service(conn: &Connection) -> TodoService<SqliteTodoRepository<'_>, FixedClock> {
    TodoService::with_clock(
        SqliteTodoRepository::try_new(conn).unwrap(),
        FixedClock::new(TODAY, 1_715_760_000_000),
    )
}

fn create(
    service: &TodoService<SqliteTodoRepository<'_>, FixedClock>,
    title: &str,
    due_date: Option<Date>,
    category: &str,
    priority: &str,
) -> i64 {
    service
        .create_todo(NewTodo {
            due_date,
            category: Some(category.to_string()),
            priority: Some(priority.to_string()),
            ..NewTodo::new(title)
        })
        .unwrap()
        .id
}

#[test]
fn empty_store_has_zero_counts() {
    let conn = open_db_in_memory().unwrap();
    let dashboard = service(&conn).dashboard().unwrap();

    assert_eq!(dashboard.total, 0);
    assert_eq!(dashboard.completed, 0);
    assert_eq!(dashboard.pending, 0);
    assert_eq!(dashboard.today, 0);
    assert_eq!(dashboard.this_week, 0);
    assert_eq!(dashboard.this_month, 0);
    assert!(dashboard.by_category.is_empty());
    assert!(dashboard.by_priority.is_empty());
    assert!(dashboard.recent.is_empty());
    assert_eq!(dashboard.completion_rate, 0);
}

#[test]
fn counts_cover_whole_store() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);

    let today = create(&service, "today", Some(TODAY), "work", "high");
    create(&service, "monday", Some(date!(2024 - 05 - 13)), "work", "low");
    create(&service, "later this month", Some(date!(2024 - 05 - 28)), "home", "high");
    create(&service, "next year", Some(date!(2025 - 05 - 15)), "home", "medium");
    create(&service, "undated", None, "general", "medium");
    service
        .update_todo(today, TodoPatch::status(TodoStatus::Completed))
        .unwrap();

    let dashboard = service.dashboard().unwrap();
    assert_eq!(dashboard.total, 5);
    assert_eq!(dashboard.completed, 1);
    assert_eq!(dashboard.pending, 4);
    assert_eq!(dashboard.total, dashboard.completed + dashboard.pending);
    assert_eq!(dashboard.today, 1);
    assert_eq!(dashboard.this_week, 2);
    assert_eq!(dashboard.this_month, 3);
    assert_eq!(dashboard.completion_rate, 20);
    assert_eq!(
        dashboard.by_category,
        BTreeMap::from([
            ("general".to_string(), 1),
            ("home".to_string(), 2),
            ("work".to_string(), 2),
        ])
    );
    assert_eq!(
        dashboard.by_priority,
        BTreeMap::from([
            ("high".to_string(), 2),
            ("low".to_string(), 1),
            ("medium".to_string(), 2),
        ])
    );
}

#[test]
fn recent_is_capped_and_newest_first() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);

    let mut ids = Vec::new();
    for idx in 0..8 {
        ids.push(create(&service, &format!("todo {idx}"), None, "general", "medium"));
    }
    // Reverse creation order for the oldest ids so ordering must follow created_at.
    for (offset, id) in ids.iter().enumerate() {
        let created_at = if offset < 2 { 10_000 - offset as i64 } else { offset as i64 };
        conn.execute(
            "UPDATE todos SET created_at = ?1 WHERE id = ?2;",
            [created_at, *id],
        )
        .unwrap();
    }

    let dashboard = service.dashboard().unwrap();
    assert_eq!(dashboard.recent.len(), RECENT_LIMIT);
    let recent_ids: Vec<i64> = dashboard.recent.iter().map(|todo| todo.id).collect();
    assert_eq!(recent_ids, vec![ids[0], ids[1], ids[7], ids[6], ids[5]]);
    assert!(dashboard
        .recent
        .windows(2)
        .all(|pair| pair[0].created_at >= pair[1].created_at));
}

#[test]
fn custom_priority_labels_are_grouped_verbatim() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);
    let id = create(&service, "x", None, "general", "medium");
    service
        .update_todo(
            id,
            TodoPatch {
                priority: Some("urgent".to_string()),
                ..TodoPatch::default()
            },
        )
        .unwrap();

    let dashboard = service.dashboard().unwrap();
    assert_eq!(
        dashboard.by_priority,
        BTreeMap::from([("urgent".to_string(), 1)])
    );
}

#[test]
fn dashboard_serializes_with_camel_case_keys() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);
    create(&service, "x", Some(TODAY), "general", "medium");

    let json = serde_json::to_value(service.dashboard().unwrap()).unwrap();
    for key in [
        "total",
        "completed",
        "pending",
        "today",
        "thisWeek",
        "thisMonth",
        "byCategory",
        "byPriority",
        "recent",
        "completionRate",
    ] {
        assert!(json.get(key).is_some(), "missing key {key}");
    }
    assert_eq!(json["recent"][0]["due_date"], "2024-05-15");
}

#[test]
fn rewards_follow_dashboard_counts() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);
    let id = create(&service, "only", None, "general", "medium");

    let before = service.rewards().unwrap();
    assert_eq!(before.total_points, 10);
    assert_eq!(before.completion_rate, 0);

    service.toggle_status(id).unwrap();
    let after = service.rewards().unwrap();
    assert_eq!(after.total_points, 210);
    assert_eq!(after.completion_rate, 100);
    assert!(after
        .achievements
        .iter()
        .any(|item| item.id == "perfectionist" && item.unlocked));
}

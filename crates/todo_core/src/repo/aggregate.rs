//! Dashboard aggregation queries.
//!
//! Callers run [`load_dashboard`] inside one transaction so every
//! sub-aggregate observes the same snapshot of `todos`.

use crate::model::dashboard::{completion_rate, Dashboard, RECENT_LIMIT};
use crate::model::date::format_date;
use crate::model::todo::Todo;
use crate::model::window::TimeWindow;
use crate::repo::todo_repo::{parse_todo_row, RepoError, RepoResult, TODO_SELECT_SQL};
use rusqlite::{params, Connection};
use std::collections::BTreeMap;
use time::Date;

const GROUPABLE_COLUMNS: [&str; 2] = ["category", "priority"];

struct Counts {
    total: u64,
    completed: u64,
    pending: u64,
    today: u64,
    this_week: u64,
    this_month: u64,
}

pub(crate) fn load_dashboard(conn: &Connection, today: Date) -> RepoResult<Dashboard> {
    let counts = load_counts(conn, today)?;
    let by_category = load_grouped_counts(conn, "category")?;
    let by_priority = load_grouped_counts(conn, "priority")?;
    let recent = load_recent(conn)?;

    Ok(Dashboard {
        total: counts.total,
        completed: counts.completed,
        pending: counts.pending,
        today: counts.today,
        this_week: counts.this_week,
        this_month: counts.this_month,
        by_category,
        by_priority,
        recent,
        completion_rate: completion_rate(counts.completed, counts.total),
    })
}

fn load_counts(conn: &Connection, today: Date) -> RepoResult<Counts> {
    let day = TimeWindow::Today.range(today);
    let week = TimeWindow::ThisWeek.range(today);
    let month = TimeWindow::ThisMonth.range(today);

    let raw: [i64; 6] = conn.query_row(
        "SELECT
            COUNT(*),
            COUNT(CASE WHEN status = 'completed' THEN 1 END),
            COUNT(CASE WHEN status = 'pending' THEN 1 END),
            COUNT(CASE WHEN due_date BETWEEN ?1 AND ?2 THEN 1 END),
            COUNT(CASE WHEN due_date BETWEEN ?3 AND ?4 THEN 1 END),
            COUNT(CASE WHEN due_date BETWEEN ?5 AND ?6 THEN 1 END)
         FROM todos;",
        params![
            format_date(day.start),
            format_date(day.end),
            format_date(week.start),
            format_date(week.end),
            format_date(month.start),
            format_date(month.end),
        ],
        |row| {
            Ok([
                row.get(0)?,
                row.get(1)?,
                row.get(2)?,
                row.get(3)?,
                row.get(4)?,
                row.get(5)?,
            ])
        },
    )?;

    Ok(Counts {
        total: count_from_db(raw[0])?,
        completed: count_from_db(raw[1])?,
        pending: count_from_db(raw[2])?,
        today: count_from_db(raw[3])?,
        this_week: count_from_db(raw[4])?,
        this_month: count_from_db(raw[5])?,
    })
}

fn load_grouped_counts(
    conn: &Connection,
    column: &'static str,
) -> RepoResult<BTreeMap<String, u64>> {
    if !GROUPABLE_COLUMNS.contains(&column) {
        return Err(RepoError::InvalidData(format!(
            "column `{column}` cannot be grouped"
        )));
    }

    let mut stmt = conn.prepare(&format!(
        "SELECT {column}, COUNT(*) FROM todos GROUP BY {column};"
    ))?;
    let mut rows = stmt.query([])?;
    let mut grouped = BTreeMap::new();
    while let Some(row) = rows.next()? {
        let key: String = row.get(0)?;
        grouped.insert(key, count_from_db(row.get(1)?)?);
    }
    Ok(grouped)
}

fn load_recent(conn: &Connection) -> RepoResult<Vec<Todo>> {
    let mut stmt = conn.prepare(&format!(
        "{TODO_SELECT_SQL} ORDER BY created_at DESC, id DESC LIMIT ?1;"
    ))?;
    let limit = i64::try_from(RECENT_LIMIT).unwrap_or(i64::MAX);
    let mut rows = stmt.query([limit])?;
    let mut recent = Vec::with_capacity(RECENT_LIMIT);
    while let Some(row) = rows.next()? {
        recent.push(parse_todo_row(row)?);
    }
    Ok(recent)
}

fn count_from_db(value: i64) -> RepoResult<u64> {
    u64::try_from(value)
        .map_err(|_| RepoError::InvalidData(format!("negative aggregate count `{value}`")))
}

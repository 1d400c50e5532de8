//! Subcommand handlers: argument shapes in, JSON values out.

use crate::{AddArgs, Command, ListArgs, UpdateArgs};
use anyhow::{bail, Context, Result};
use log::warn;
use serde_json::{json, Value};
use todo_core::{
    parse_date, Clock, Date, NewTodo, Priority, TimeWindow, TodoListQuery, TodoPatch,
    TodoRepository, TodoService,
};

pub fn execute<R: TodoRepository, C: Clock>(
    service: &TodoService<R, C>,
    command: Command,
) -> Result<Value> {
    let value = match command {
        Command::List(args) => serde_json::to_value(service.list_todos(&list_query(args))?)?,
        Command::Get { id } => serde_json::to_value(service.get_todo(id)?)?,
        Command::Add(args) => serde_json::to_value(service.create_todo(new_todo(args)?)?)?,
        Command::Update(args) => {
            let id = args.id;
            serde_json::to_value(service.update_todo(id, patch(args)?)?)?
        }
        Command::Toggle { id } => serde_json::to_value(service.toggle_status(id)?)?,
        Command::Delete { id } => {
            service.delete_todo(id)?;
            json!({ "deleted": id })
        }
        Command::Dashboard => serde_json::to_value(service.dashboard()?)?,
        Command::Rewards => serde_json::to_value(service.rewards()?)?,
        Command::Categories => serde_json::to_value(service.list_categories()?)?,
    };
    Ok(value)
}

fn list_query(args: ListArgs) -> TodoListQuery {
    let window = present(args.filter).and_then(|raw| {
        let window = TimeWindow::parse(&raw);
        if window.is_none() {
            warn!("event=todo_list module=cli status=ignored filter={raw}");
        }
        window
    });

    TodoListQuery {
        category: present(args.category),
        status: present(args.status),
        priority: present(args.priority).map(Priority::from),
        window,
    }
}

fn new_todo(args: AddArgs) -> Result<NewTodo> {
    let due_date = match args.due.as_deref() {
        Some(raw) => due_date(raw)?,
        None => None,
    };
    Ok(NewTodo {
        title: args.title,
        description: args.description,
        due_date,
        category: args.category,
        priority: args.priority,
    })
}

fn patch(args: UpdateArgs) -> Result<TodoPatch> {
    if let Some(raw) = args.json {
        return serde_json::from_str(&raw).context("patch must be a JSON object");
    }
    Ok(TodoPatch {
        title: args.title,
        description: args.description,
        due_date: args.due.as_deref().map(due_date).transpose()?,
        category: args.category,
        priority: args.priority,
        status: args.status,
    })
}

/// Empty input means "no due date".
fn due_date(raw: &str) -> Result<Option<Date>> {
    if raw.trim().is_empty() {
        return Ok(None);
    }
    match parse_date(raw) {
        Some(date) => Ok(Some(date)),
        None => bail!("invalid due date `{raw}`, expected YYYY-MM-DD"),
    }
}

fn present(value: Option<String>) -> Option<String> {
    value.filter(|value| !value.is_empty())
}

//! `todo` command-line entry point.
//!
//! # Responsibility
//! - Resolve configuration from `TODO_*` variables and global flags.
//! - Open the store, run one subcommand through `TodoService`, print JSON.
//! - Report failures with user-safe text and a non-zero exit code.

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use todo_core::db::{close_db, open_db};
use todo_core::{
    init_logging, AppConfig, SqliteTodoRepository, SystemClock, TodoId, TodoService,
    TodoServiceError,
};

mod commands;

#[derive(Parser, Debug)]
#[command(
    name = "todo",
    version,
    about = "Personal todo tracker",
    arg_required_else_help = true
)]
pub struct Cli {
    /// SQLite database file (overrides TODO_DB_PATH).
    #[arg(long, global = true, value_name = "PATH")]
    pub db: Option<PathBuf>,

    /// trace|debug|info|warn|error (overrides TODO_LOG_LEVEL).
    #[arg(long, global = true, value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Rolling log directory, must be absolute (overrides TODO_LOG_DIR).
    #[arg(long, global = true, value_name = "DIR")]
    pub log_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List todos, most urgent first.
    #[command(alias = "ls")]
    List(ListArgs),
    /// Show one todo.
    Get { id: TodoId },
    /// Create a todo.
    #[command(alias = "new")]
    Add(AddArgs),
    /// Change some fields of a todo.
    Update(UpdateArgs),
    /// Flip a todo between pending and completed.
    Toggle { id: TodoId },
    /// Permanently delete a todo.
    #[command(alias = "rm")]
    Delete { id: TodoId },
    /// Aggregate statistics over every todo.
    Dashboard,
    /// Achievement progress.
    Rewards,
    /// Distinct categories in use.
    Categories,
}

/// Empty values are treated as "no filter".
#[derive(Args, Debug, Default)]
pub struct ListArgs {
    #[arg(long)]
    pub category: Option<String>,
    /// pending|completed
    #[arg(long)]
    pub status: Option<String>,
    #[arg(long)]
    pub priority: Option<String>,
    /// today|thisweek|thismonth
    #[arg(long, value_name = "WINDOW")]
    pub filter: Option<String>,
}

#[derive(Args, Debug, Default)]
pub struct AddArgs {
    pub title: String,
    #[arg(long)]
    pub description: Option<String>,
    /// Due date as YYYY-MM-DD.
    #[arg(long, value_name = "DATE")]
    pub due: Option<String>,
    #[arg(long)]
    pub category: Option<String>,
    /// low|medium|high, or any custom label.
    #[arg(long)]
    pub priority: Option<String>,
}

#[derive(Args, Debug, Default)]
pub struct UpdateArgs {
    pub id: TodoId,
    #[arg(long)]
    pub title: Option<String>,
    #[arg(long)]
    pub description: Option<String>,
    /// YYYY-MM-DD, or an empty string to clear.
    #[arg(long, value_name = "DATE")]
    pub due: Option<String>,
    #[arg(long)]
    pub category: Option<String>,
    #[arg(long)]
    pub priority: Option<String>,
    /// pending|completed
    #[arg(long)]
    pub status: Option<String>,
    /// Full patch as a JSON object, e.g. '{"status":"completed","due_date":null}'.
    #[arg(
        long,
        value_name = "PATCH",
        conflicts_with_all = ["title", "description", "due", "category", "priority", "status"]
    )]
    pub json: Option<String>,
}

impl Cli {
    /// Applies flag overrides on top of environment configuration.
    fn resolve_config(&self, mut config: AppConfig) -> AppConfig {
        if let Some(db) = &self.db {
            config.db_path = db.clone();
        }
        if let Some(level) = &self.log_level {
            config.log_level = level.clone();
        }
        if let Some(log_dir) = &self.log_dir {
            config.log_dir = Some(log_dir.clone());
        }
        config
    }
}

fn main() -> ExitCode {
    // The local offset is only readable while the process is single-threaded.
    SystemClock::capture_local_offset();
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {}", describe(&err));
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let config = cli.resolve_config(AppConfig::from_env());
    if let Some(log_dir) = config.log_dir.as_deref() {
        init_logging(&config.log_level, log_dir)?;
    }

    let output = run_on_store(&config.db_path, cli.command)?;
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

/// Runs one command against the store at `db_path`, closing it on every path.
///
/// A command failure takes precedence over a close failure; the latter is
/// still logged by `close_db`.
fn run_on_store(db_path: &Path, command: Command) -> anyhow::Result<Value> {
    let conn = open_db(db_path)
        .with_context(|| format!("cannot open database `{}`", db_path.display()))?;
    let output = SqliteTodoRepository::try_new(&conn)
        .map_err(anyhow::Error::from)
        .and_then(|repo| commands::execute(&TodoService::new(repo), command));
    let closed = close_db(conn);

    let output = output?;
    closed?;
    Ok(output)
}

/// Service failures use their user-safe text; anything else prints its chain.
fn describe(err: &anyhow::Error) -> String {
    match err.downcast_ref::<TodoServiceError>() {
        Some(service_err) => service_err.user_message(),
        None => format!("{err:#}"),
    }
}

//! Command-line front end for the task list.
//!
//! # Responsibility
//! - Parse commands and forward them to `TaskStore` entry points.
//! - Render core outputs; never touch tasks directly.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use getitdone_core::db::open_db;
use getitdone_core::{
    character_count_label, init_logging, CoreConfig, FilterMode, KeyValueStore, SortKey,
    SortOrder, SqliteKeyValueStore, Task, TaskId, TaskPersistence, TaskStore, ViewOptions,
    ViewSnapshot,
};
use log::warn;
use std::path::PathBuf;

const APP_DIR_NAME: &str = "getitdone";

#[derive(Debug, Parser)]
#[command(name = "getitdone", about = "Personal task list", version)]
struct Cli {
    /// Directory holding the task database and logs.
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Log level: trace|debug|info|warn|error.
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Add a new task.
    Add { text: String },
    /// Validate task text without adding it.
    Check { text: String },
    /// Delete a task by id.
    Remove { id: u64 },
    /// Flip a task between pending and completed.
    Toggle { id: u64 },
    /// Delete every completed task.
    ClearCompleted,
    /// Show tasks with optional filter and ordering.
    List {
        #[arg(long, default_value = "all")]
        filter: FilterMode,
        #[arg(long, default_value = "date")]
        sort: SortKey,
        #[arg(long, default_value = "desc")]
        order: SortOrder,
    },
    /// Show total/completed/pending counts.
    Stats,
    /// Print the core library version.
    Version,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Command::Version = cli.command {
        println!("getitdone_core version={}", getitdone_core::core_version());
        return Ok(());
    }

    let config = resolve_config(&cli)?;
    config
        .ensure_data_dir()
        .with_context(|| format!("failed to create data dir {}", config.data_dir.display()))?;
    if let Err(err) = init_logging(&config.log_level, &config.log_dir.to_string_lossy()) {
        eprintln!("warning: logging disabled: {err}");
    }

    let conn = match open_db(&config.db_path) {
        Ok(conn) => conn,
        Err(err) if err.is_from_newer_release() => {
            bail!("{err}; upgrade getitdone to read {}", config.db_path.display())
        }
        Err(err) => {
            return Err(err).with_context(|| format!("failed to open {}", config.db_path.display()))
        }
    };
    let mut store = TaskStore::open(TaskPersistence::new(SqliteKeyValueStore::new(&conn)));

    match cli.command {
        Command::Add { text } => {
            let task = add_task(&mut store, &text)?;
            println!("Added #{}: {}", task.id, task.text);
        }
        Command::Check { text } => {
            check_task(&store, &text)?;
            println!("OK");
            println!("{}", character_count_label(&text));
        }
        Command::Remove { id } => {
            if !store.remove(TaskId(id)) {
                warn!("event=cli_remove module=cli status=noop id={id}");
            }
            print_snapshot(&store.snapshot());
        }
        Command::Toggle { id } => {
            if store.toggle(TaskId(id)).is_none() {
                warn!("event=cli_toggle module=cli status=noop id={id}");
            }
            print_snapshot(&store.snapshot());
        }
        Command::ClearCompleted => {
            let removed = store.clear_completed();
            println!("Cleared {removed} completed task(s).");
        }
        Command::List {
            filter,
            sort,
            order,
        } => {
            store.set_view_options(ViewOptions {
                filter,
                sort_key: sort,
                sort_order: order,
            });
            print_snapshot(&store.snapshot());
        }
        Command::Stats => {
            let stats = store.compute_stats();
            println!(
                "Total: {}  Completed: {}  Pending: {}",
                stats.total, stats.completed, stats.pending
            );
        }
        Command::Version => unreachable!("handled before opening the store"),
    }

    Ok(())
}

/// Inserts `text`; a rejection becomes an error so the process exits non-zero.
fn add_task<S: KeyValueStore>(store: &mut TaskStore<S>, text: &str) -> Result<Task> {
    match store.insert(text) {
        Ok(task) => Ok(task),
        Err(err) => {
            eprintln!("{}", character_count_label(text));
            bail!("{err}")
        }
    }
}

fn check_task<S: KeyValueStore>(store: &TaskStore<S>, text: &str) -> Result<()> {
    if let Err(err) = store.validate_candidate(text) {
        eprintln!("{}", character_count_label(text));
        bail!("{err}");
    }
    Ok(())
}

fn resolve_config(cli: &Cli) -> Result<CoreConfig> {
    let data_dir = match &cli.data_dir {
        Some(dir) => dir.clone(),
        None => dirs::data_local_dir()
            .context("no platform data directory; pass --data-dir")?
            .join(APP_DIR_NAME),
    };
    let data_dir = if data_dir.is_absolute() {
        data_dir
    } else {
        std::env::current_dir()
            .context("failed to resolve current directory")?
            .join(data_dir)
    };

    let config = CoreConfig::with_data_dir(data_dir);
    Ok(match &cli.log_level {
        Some(level) => config.log_level(level.as_str()),
        None => config,
    })
}

fn print_snapshot(snapshot: &ViewSnapshot) {
    let stats = snapshot.stats;
    println!(
        "Total: {}  Completed: {}  Pending: {}",
        stats.total, stats.completed, stats.pending
    );
    println!(
        "[filter={} sort={} order={}]",
        snapshot.options.filter.as_str(),
        snapshot.options.sort_key.as_str(),
        snapshot.options.sort_order.as_str()
    );

    if let Some(message) = snapshot.empty_message {
        println!("{message}");
    }
    for task in &snapshot.tasks {
        println!("{}", render_task(task));
    }
    if let Some(footer) = &snapshot.footer {
        println!("{footer}");
    }
    if let Some(label) = &snapshot.clear_completed_label {
        println!("{label}");
    }
}

fn render_task(task: &Task) -> String {
    format!(
        "[{}] #{} {}  ({})",
        if task.completed { "x" } else { " " },
        task.id,
        task.text,
        task.created_at.format("%Y-%m-%d")
    )
}

#[cfg(test)]
mod tests {
    use super::{add_task, check_task};
    use getitdone_core::{MemoryKeyValueStore, TaskPersistence, TaskStore};

    fn new_store() -> TaskStore<MemoryKeyValueStore> {
        TaskStore::open(TaskPersistence::new(MemoryKeyValueStore::new()))
    }

    #[test]
    fn rejected_add_is_an_error() {
        let mut store = new_store();

        let err = add_task(&mut store, "a").unwrap_err();
        assert_eq!(err.to_string(), "Task must be at least 2 characters long");
        assert!(store.is_empty());
    }

    #[test]
    fn duplicate_add_and_check_are_errors() {
        let mut store = new_store();
        add_task(&mut store, "Buy milk").unwrap();

        let err = add_task(&mut store, "buy milk").unwrap_err();
        assert_eq!(err.to_string(), "Task already exists");
        assert!(check_task(&store, "BUY MILK").is_err());
        assert!(check_task(&store, "Buy bread").is_ok());
        assert_eq!(store.len(), 1);
    }
}

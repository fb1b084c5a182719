//! Command implementations for the CLI interface.
//!
//! Every subcommand opens nothing itself: `main` resolves the database path,
//! opens the `Store` and hands it to one of the `cmd_*` functions below.
//! Errors bubble up as `CommandError` and are printed by `main`.

use std::fs;
use std::path::PathBuf;

use clap::Subcommand;
use clap_complete::{generate, Shell};
use serde::Serialize;
use tracing::info;

use crate::db::*;
use crate::error::{CommandError, ValidationError};
use crate::task::Task;
use crate::tui::run::run_tui;

#[derive(Subcommand)]
pub enum Commands {
    /// Launch the interactive UI (the default).
    Ui,

    /// Add a new task.
    Add {
        /// Short name for the task.
        name: String,
        /// Optional longer description.
        #[arg(long)]
        desc: Option<String>,
        /// Due date: YYYY-MM-DD, "today", "tomorrow", a weekday, or "in Nd".
        #[arg(long)]
        due: Option<String>,
        /// Ask to be notified when the task is due.
        #[arg(long)]
        notify: bool,
        /// Topic name. Created if it does not exist yet.
        #[arg(long)]
        topic: Option<String>,
    },

    /// List tasks. Open tasks only unless a flag says otherwise.
    List {
        /// Include completed tasks.
        #[arg(long)]
        all: bool,
        /// Show only completed tasks.
        #[arg(long, conflicts_with = "all")]
        done: bool,
    },

    /// Mark a task as done.
    Done { id: i64 },

    /// Mark a done task as open again.
    Reopen { id: i64 },

    /// Update fields on a task.
    Update {
        id: i64,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        desc: Option<String>,
        #[arg(long)]
        due: Option<String>,
        /// Remove the due date.
        #[arg(long, conflicts_with = "due")]
        clear_due: bool,
        /// true or false.
        #[arg(long)]
        notify: Option<bool>,
    },

    /// Delete a task.
    Delete { id: i64 },

    /// Manage tags.
    Tag {
        #[command(subcommand)]
        action: TagAction,
    },

    /// Manage topics.
    Topic {
        #[command(subcommand)]
        action: TopicAction,
    },

    /// Export every task, with its topic and tags, as JSON.
    Export {
        /// Write to this file instead of stdout.
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Generate shell completions.
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Subcommand)]
pub enum TagAction {
    /// List all tags.
    List,
    /// Create a tag.
    Add { name: String },
    /// Rename a tag.
    Rename { id: i64, name: String },
    /// Delete a tag and detach it from every task.
    Delete { id: i64 },
    /// Attach a tag to a task.
    Attach { task: i64, tag: i64 },
    /// Detach a tag from a task.
    Detach { task: i64, tag: i64 },
}

#[derive(Subcommand)]
pub enum TopicAction {
    /// List all topics.
    List,
    /// Create a topic.
    Add { name: String },
    /// Rename a topic.
    Rename { id: i64, name: String },
    /// Delete a topic. Its tasks keep existing without a topic.
    Delete { id: i64 },
    /// Put a task under a topic, creating the topic if needed.
    Set { task: i64, topic: String },
    /// Remove a task's topic.
    Clear { task: i64 },
}

/// A task as written by `export`.
#[derive(Debug, Serialize)]
pub struct ExportedTask {
    #[serde(flatten)]
    pub task: Task,
    pub topic: Option<String>,
    pub tags: Vec<String>,
}

fn require_task(store: &Store, id: i64) -> Result<Task, CommandError> {
    store
        .get_task(id)?
        .ok_or(CommandError::NotFound { kind: "task", id })
}

fn require_topic(store: &Store, id: i64) -> Result<(), CommandError> {
    store
        .get_topic(id)?
        .map(|_| ())
        .ok_or(CommandError::NotFound { kind: "topic", id })
}

fn require_tag(store: &Store, id: i64) -> Result<(), CommandError> {
    store
        .get_tag(id)?
        .map(|_| ())
        .ok_or(CommandError::NotFound { kind: "tag", id })
}

fn require_name(name: &str) -> Result<String, ValidationError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ValidationError::EmptyName);
    }
    Ok(name.to_string())
}

fn parse_due(input: &str) -> Result<chrono::NaiveDate, ValidationError> {
    parse_due_input(input).ok_or_else(|| ValidationError::InvalidDue(input.to_string()))
}

/// Look a topic up by name, creating it when missing.
fn topic_id_for(store: &Store, name: &str) -> Result<i64, CommandError> {
    let name = require_name(name)?;
    match store.find_topic(&name)? {
        Some(topic) => Ok(topic.id),
        None => {
            let id = store.create_topic(&name)?;
            println!("Created topic {} ({})", id, name);
            Ok(id)
        }
    }
}

/// Launch the interactive task manager.
pub fn cmd_ui(store: Store) -> Result<(), CommandError> {
    run_tui(store).map_err(CommandError::Terminal)
}

/// Create a task and print its new ID.
pub fn cmd_add(
    store: &Store,
    name: String,
    desc: Option<String>,
    due: Option<String>,
    notify: bool,
    topic: Option<String>,
) -> Result<i64, CommandError> {
    let mut task = Task::draft(&require_name(&name)?, desc.as_deref().unwrap_or(""));
    if let Some(due) = due {
        task.due_date = Some(parse_due(&due)?);
    }
    task.should_notify = notify;
    if let Some(topic) = topic {
        task.topic_id = Some(topic_id_for(store, &topic)?);
    }

    let id = store.create_task(&task)?;
    info!(id, "task created from cli");
    println!("Added task {}: {}", id, task.name);
    Ok(id)
}

/// Print tasks as a table.
pub fn cmd_list(store: &Store, all: bool, done: bool) -> Result<(), CommandError> {
    let tasks: Vec<Task> = store
        .list_tasks()?
        .into_iter()
        .filter(|t| all || t.is_done == done)
        .collect();
    if tasks.is_empty() {
        println!("No tasks.");
        return Ok(());
    }
    print_table(&tasks, &store.list_topics()?);
    Ok(())
}

/// Set the done flag on a task (`done` and `reopen`).
pub fn cmd_set_done(store: &Store, id: i64, done: bool) -> Result<(), CommandError> {
    let mut task = require_task(store, id)?;
    task.is_done = done;
    store.update_task(&task)?;
    info!(id, done, "task state changed from cli");
    if done {
        println!("Completed {}", id);
    } else {
        println!("Reopened {}", id);
    }
    Ok(())
}

pub fn cmd_update(
    store: &Store,
    id: i64,
    name: Option<String>,
    desc: Option<String>,
    due: Option<String>,
    clear_due: bool,
    notify: Option<bool>,
) -> Result<(), CommandError> {
    let mut task = require_task(store, id)?;
    if let Some(name) = name {
        task.name = require_name(&name)?;
    }
    if let Some(desc) = desc {
        task.description = desc;
    }
    if let Some(due) = due {
        task.due_date = Some(parse_due(&due)?);
    }
    if clear_due {
        task.due_date = None;
    }
    if let Some(notify) = notify {
        task.should_notify = notify;
    }

    store.update_task(&task)?;
    info!(id, "task updated from cli");
    println!("Updated {}", id);
    Ok(())
}

pub fn cmd_delete(store: &Store, id: i64) -> Result<(), CommandError> {
    let task = require_task(store, id)?;
    store.delete_task(id)?;
    info!(id, "task deleted from cli");
    println!("Deleted {}: {}", id, task.name);
    Ok(())
}

pub fn cmd_tag(store: &Store, action: TagAction) -> Result<(), CommandError> {
    match action {
        TagAction::List => {
            let tags = store.list_tags()?;
            if tags.is_empty() {
                println!("No tags.");
            }
            for tag in tags {
                println!("{:<5} {}", tag.id, tag.name);
            }
        }
        TagAction::Add { name } => {
            let id = store.create_tag(&require_name(&name)?)?;
            println!("Added tag {}: {}", id, name.trim());
        }
        TagAction::Rename { id, name } => {
            require_tag(store, id)?;
            store.rename_tag(id, &require_name(&name)?)?;
            println!("Renamed tag {}", id);
        }
        TagAction::Delete { id } => {
            require_tag(store, id)?;
            store.delete_tag(id)?;
            println!("Deleted tag {}", id);
        }
        TagAction::Attach { task, tag } => {
            require_task(store, task)?;
            require_tag(store, tag)?;
            store.attach_tag(task, tag)?;
            println!("Tagged {} with {}", task, tag);
        }
        TagAction::Detach { task, tag } => {
            store.detach_tag(task, tag)?;
            println!("Removed tag {} from {}", tag, task);
        }
    }
    Ok(())
}

pub fn cmd_topic(store: &Store, action: TopicAction) -> Result<(), CommandError> {
    match action {
        TopicAction::List => {
            let topics = store.list_topics()?;
            if topics.is_empty() {
                println!("No topics.");
            }
            for topic in topics {
                println!("{:<5} {}", topic.id, topic.name);
            }
        }
        TopicAction::Add { name } => {
            let id = store.create_topic(&require_name(&name)?)?;
            println!("Added topic {}: {}", id, name.trim());
        }
        TopicAction::Rename { id, name } => {
            require_topic(store, id)?;
            store.rename_topic(id, &require_name(&name)?)?;
            println!("Renamed topic {}", id);
        }
        TopicAction::Delete { id } => {
            require_topic(store, id)?;
            store.delete_topic(id)?;
            println!("Deleted topic {}", id);
        }
        TopicAction::Set { task, topic } => {
            let mut t = require_task(store, task)?;
            t.topic_id = Some(topic_id_for(store, &topic)?);
            store.update_task(&t)?;
            println!("Moved {} to {}", task, topic.trim());
        }
        TopicAction::Clear { task } => {
            let mut t = require_task(store, task)?;
            t.topic_id = None;
            store.update_task(&t)?;
            println!("Cleared topic of {}", task);
        }
    }
    Ok(())
}

/// Collect every task together with its topic name and tag names.
pub fn export_tasks(store: &Store) -> Result<Vec<ExportedTask>, CommandError> {
    let topics = store.list_topics()?;
    store
        .list_tasks()?
        .into_iter()
        .map(|task| {
            let topic = task
                .topic_id
                .and_then(|id| topics.iter().find(|t| t.id == id))
                .map(|t| t.name.clone());
            let tags = store.task_tags(task.id)?.into_iter().map(|t| t.name).collect();
            Ok(ExportedTask { task, topic, tags })
        })
        .collect()
}

pub fn cmd_export(store: &Store, output: Option<PathBuf>) -> Result<(), CommandError> {
    let tasks = export_tasks(store)?;
    let json = serde_json::to_string_pretty(&tasks)?;
    match output {
        Some(path) => {
            fs::write(&path, json + "\n").map_err(|source| CommandError::Write {
                path: path.clone(),
                source,
            })?;
            println!("Exported {} tasks to {}", tasks.len(), path.display());
        }
        None => println!("{}", json),
    }
    Ok(())
}

/// Generate shell completion scripts.
pub fn cmd_completions(shell: Shell) {
    use crate::cli::Cli;
    use clap::CommandFactory;

    let mut app = Cli::command();
    let app_name = app.get_name().to_string();
    generate(shell, &mut app, app_name, &mut std::io::stdout());
}

//! # Planner - terminal task manager
//!
//! A keyboard-driven task list backed by a local SQLite database, with a
//! full-screen terminal user interface and a scriptable command line.
//!
//! ## Quick Start
//!
//! ```bash
//! # Open the interactive UI
//! planner
//!
//! # Add a task from the shell
//! planner add "Buy milk" --desc "2%" --due tomorrow --topic home
//!
//! # List open tasks, then mark one done
//! planner list
//! planner done 1
//! ```
//!
//! ## Interface
//!
//! The UI shows two lists, in progress and completed, above an entry form.
//! `n` starts a new task, `e` edits the selected one, space toggles it done
//! and `d` deletes it. Moving down past the last row jumps into the form for
//! a quick add. Ctrl-Q quits.
//!
//! ## Storage
//!
//! Tasks live in `<data dir>/planner/planner.db` unless `--db` is given.
//! Setting `PLANNER_ENV=dev` uses `dev_db/planner.dev.db` in the working
//! directory instead. Setting `DEBUG` (or passing `--log`) writes a log file.

use clap::Parser;
use tracing::debug;

pub mod cli;
pub mod cmd;
pub mod config;
pub mod db;
pub mod error;
pub mod task;
pub mod tui {
    pub mod app;
    pub mod colors;
    pub mod enums;
    pub mod input;
    pub mod run;
    pub mod task_form;
    pub mod task_list;
    pub mod utils;
}

use cli::Cli;
use cmd::*;
use config::{init_logging, Config};
use db::Store;

fn main() {
    let cli = Cli::parse();

    // Completions need neither a database nor logging.
    if let Some(Commands::Completions { shell }) = &cli.command {
        cmd_completions(*shell);
        return;
    }

    let config = match Config::resolve(cli.db, cli.log) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };
    if let Err(e) = init_logging(config.log_path.as_deref()) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
    debug!(db = %config.db_path.display(), "opening store");

    let store = match Store::open(&config.db_path) {
        Ok(store) => store,
        Err(e) => {
            eprintln!("Failed to open database {}: {}", config.db_path.display(), e);
            std::process::exit(1);
        }
    };

    let result = match cli.command.unwrap_or(Commands::Ui) {
        Commands::Ui => cmd_ui(store),
        Commands::Add { name, desc, due, notify, topic } => {
            cmd_add(&store, name, desc, due, notify, topic).map(|_| ())
        }
        Commands::List { all, done } => cmd_list(&store, all, done),
        Commands::Done { id } => cmd_set_done(&store, id, true),
        Commands::Reopen { id } => cmd_set_done(&store, id, false),
        Commands::Update { id, name, desc, due, clear_due, notify } => {
            cmd_update(&store, id, name, desc, due, clear_due, notify)
        }
        Commands::Delete { id } => cmd_delete(&store, id),
        Commands::Tag { action } => cmd_tag(&store, action),
        Commands::Topic { action } => cmd_topic(&store, action),
        Commands::Export { output } => cmd_export(&store, output),
        Commands::Completions { shell } => {
            cmd_completions(shell);
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

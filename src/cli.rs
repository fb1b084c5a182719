use std::path::PathBuf;

use clap::Parser;

use crate::cmd::Commands;

/// Terminal task manager backed by SQLite.
/// Runs the interactive UI when no subcommand is given.
#[derive(Parser)]
#[command(name = "planner", version, about = "Terminal task manager")]
pub struct Cli {
    /// Path to the SQLite database file.
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    /// Write debug logs to this file.
    #[arg(long, global = true)]
    pub log: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

//! Runtime configuration: where the database lives and where logs go.
//!
//! Resolution order for the database: `--db`, then `PLANNER_ENV=dev`
//! (a throwaway database under `./dev_db`), then the platform's local data
//! directory. Logging is off unless `--log` is passed or `DEBUG` is set,
//! because the TUI owns stdout.

use std::path::{Path, PathBuf};

use crate::error::ConfigError;

pub const ENV_PLANNER: &str = "PLANNER_ENV";
pub const ENV_DEBUG: &str = "DEBUG";

const APP_DIR: &str = "planner";
const DB_FILE: &str = "planner.db";
const DEV_DB_DIR: &str = "dev_db";
const DEV_DB_FILE: &str = "planner.dev.db";
const DEBUG_LOG_FILE: &str = "debug.log";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub db_path: PathBuf,
    pub log_path: Option<PathBuf>,
}

impl Config {
    /// Resolve the configuration from command line flags and the process environment.
    pub fn resolve(db: Option<PathBuf>, log: Option<PathBuf>) -> Result<Self, ConfigError> {
        Self::resolve_with(db, log, |key| std::env::var(key).ok(), dirs::data_local_dir())
    }

    /// Resolution with the environment and data directory supplied by the caller.
    pub fn resolve_with(
        db: Option<PathBuf>,
        log: Option<PathBuf>,
        env: impl Fn(&str) -> Option<String>,
        data_dir: Option<PathBuf>,
    ) -> Result<Self, ConfigError> {
        let db_path = match db {
            Some(path) => path,
            None if env(ENV_PLANNER).as_deref() == Some("dev") => {
                Path::new(DEV_DB_DIR).join(DEV_DB_FILE)
            }
            None => data_dir.ok_or(ConfigError::NoDataDir)?.join(APP_DIR).join(DB_FILE),
        };

        let log_path = log.or_else(|| {
            env(ENV_DEBUG)
                .filter(|value| !value.is_empty())
                .map(|_| PathBuf::from(DEBUG_LOG_FILE))
        });

        Ok(Config { db_path, log_path })
    }
}

/// Route `tracing` output to the configured log file, if any.
pub fn init_logging(log_path: Option<&Path>) -> Result<(), ConfigError> {
    let Some(path) = log_path else {
        return Ok(());
    };

    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|source| ConfigError::LogFile {
            path: path.to_path_buf(),
            source,
        })?;

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with_ansi(false)
        .with_writer(std::sync::Mutex::new(log_file))
        .init();

    Ok(())
}

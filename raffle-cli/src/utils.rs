//! Utility functions for CLI operations.
//!
//! This module provides common utility functions used across CLI commands,
//! including configuration loading, database management, argument parsing
//! and output formatting.

use crate::error::CliError;
use raffle::config::OutputFormat;
use raffle::database::DATABASE_FILE;
use raffle::output::OutputFormatter;
use raffle::{Config, ConfigBuilder, Database, DatabaseConfig, EventSlug, Logger, OrderCode};
use std::path::PathBuf;
use std::time::Duration;

/// Global CLI options shared across all commands.
#[derive(Debug, Clone)]
#[allow(dead_code)] // Fields used via pattern matching in main.rs
pub struct GlobalOptions {
    /// Enable verbose output.
    pub verbose: bool,

    /// Suppress non-essential output.
    pub quiet: bool,

    /// Override the data directory location.
    pub data_dir: Option<PathBuf>,

    /// Override the default busy timeout (in seconds).
    pub busy_timeout: Option<u32>,

    /// Disable automatic database initialization.
    pub disable_autoinit: bool,

    /// Logger built from the verbosity flags.
    pub logger: Logger,
}

/// Load hierarchical configuration.
///
/// Configuration is merged from multiple sources with precedence:
/// 1. Environment variables
/// 2. Configuration files (project, then the data directory's `config.yaml`)
/// 3. Built-in defaults
pub fn load_configuration(global: &GlobalOptions) -> Result<Config, CliError> {
    let mut builder = ConfigBuilder::new();
    if let Some(ref data_dir) = global.data_dir {
        builder = builder.with_data_dir(data_dir);
    }

    builder.build().map_err(|e| CliError::Config(e.to_string()))
}

/// Resolve the database path from global options.
fn resolve_database_path(global: &GlobalOptions) -> Result<PathBuf, CliError> {
    // Priority: global option > RAFFLE_DATA_DIR > ~/.raffle
    if let Some(ref data_dir) = global.data_dir {
        return Ok(data_dir.join(DATABASE_FILE));
    }

    raffle::database::resolve_database_path().map_err(|e| CliError::Config(e.to_string()))
}

/// Open database with configuration.
///
/// # Errors
///
/// Returns `NoDataDirectory` if the database doesn't exist and auto-init is disabled.
pub fn open_database(global: &GlobalOptions, config: &Config) -> Result<Database, CliError> {
    let db_path = resolve_database_path(global)?;

    let autoinit_disabled = global.disable_autoinit || config.disable_autoinit.unwrap_or(false);
    if !db_path.exists() && autoinit_disabled {
        return Err(CliError::NoDataDirectory);
    }

    let mut db_config = DatabaseConfig::new(db_path);

    // Set busy timeout if specified
    if let Some(timeout_seconds) = global.busy_timeout {
        db_config = db_config.with_busy_timeout(Duration::from_secs(timeout_seconds.into()));
    } else if let Some(timeout_seconds) = config.maximum_lock_wait_seconds {
        db_config = db_config.with_busy_timeout(Duration::from_secs(timeout_seconds));
    }

    Database::open(db_config).map_err(CliError::from)
}

/// Parse an event slug argument.
pub fn parse_event(s: &str) -> Result<EventSlug, String> {
    EventSlug::new(s).map_err(|e| e.to_string())
}

/// Parse an order code argument.
pub fn parse_order(s: &str) -> Result<OrderCode, String> {
    OrderCode::new(s).map_err(|e| e.to_string())
}

/// Pick the formatter for a command: explicit flag first, then configuration.
pub fn formatter(flag: Option<OutputFormat>, config: &Config) -> Box<dyn OutputFormatter> {
    flag.unwrap_or_else(|| config.output_format())
        .create_formatter()
}

//! Database configuration and path resolution.

use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{Error, Result};

/// File name of the store inside the data directory.
pub const DATABASE_FILE: &str = "raffle.db";

/// Environment variable naming the data directory.
pub const DATA_DIR_ENV: &str = "RAFFLE_DATA_DIR";

/// Parameters for opening a [`super::Database`].
///
/// # Examples
///
/// ```
/// use raffle::database::DatabaseConfig;
/// use std::time::Duration;
///
/// let config = DatabaseConfig::new("/tmp/raffle.db")
///     .with_busy_timeout(Duration::from_secs(10));
/// assert!(config.auto_create);
///
/// let config = config.read_only();
/// assert!(!config.auto_create);
/// ```
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// Path to the database file.
    pub path: PathBuf,
    /// How long to wait on a locked database.
    pub busy_timeout: Duration,
    /// Create the file and its parent directory if missing.
    pub auto_create: bool,
    /// Open without write access.
    pub read_only: bool,
}

impl DatabaseConfig {
    /// Creates a configuration with a 5 second busy timeout and auto-create on.
    #[must_use]
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            busy_timeout: Duration::from_millis(5000),
            auto_create: true,
            read_only: false,
        }
    }

    /// Sets the busy timeout.
    #[must_use]
    pub const fn with_busy_timeout(mut self, timeout: Duration) -> Self {
        self.busy_timeout = timeout;
        self
    }

    /// Opens read-only; this also disables auto-create.
    #[must_use]
    pub const fn read_only(mut self) -> Self {
        self.read_only = true;
        self.auto_create = false;
        self
    }
}

/// Returns `~/.raffle`.
///
/// # Errors
///
/// Returns an error if the home directory cannot be determined.
pub fn default_data_dir() -> Result<PathBuf> {
    home::home_dir()
        .map(|home| home.join(".raffle"))
        .ok_or_else(|| Error::Validation {
            field: "home_directory".into(),
            message: "cannot determine home directory".into(),
        })
}

/// Resolves the data directory from `RAFFLE_DATA_DIR`, falling back to
/// [`default_data_dir`].
///
/// # Errors
///
/// Returns an error if the variable is unset and the home directory cannot
/// be determined.
pub fn resolve_data_dir() -> Result<PathBuf> {
    match std::env::var_os(DATA_DIR_ENV) {
        Some(dir) if !dir.is_empty() => Ok(PathBuf::from(dir)),
        _ => default_data_dir(),
    }
}

/// Resolves the database file path inside the data directory.
///
/// # Errors
///
/// See [`resolve_data_dir`].
pub fn resolve_database_path() -> Result<PathBuf> {
    Ok(resolve_data_dir()?.join(DATABASE_FILE))
}

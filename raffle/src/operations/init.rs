//! Data directory initialization.

use std::fs;
use std::path::PathBuf;

use serde::Serialize;

use crate::database::{Database, DatabaseConfig, DATABASE_FILE};
use crate::error::{Error, Result};

/// Options for initializing a data directory.
#[derive(Debug, Clone)]
pub struct InitOptions {
    /// Data directory to initialize.
    pub data_dir: PathBuf,
    /// Replace an existing database.
    pub overwrite: bool,
    /// Write a commented `config.yaml` next to the database.
    pub create_config: bool,
}

impl InitOptions {
    /// Creates options for `data_dir`.
    #[must_use]
    pub fn new(data_dir: PathBuf) -> Self {
        Self {
            data_dir,
            overwrite: false,
            create_config: false,
        }
    }

    /// Sets whether an existing database is replaced.
    #[must_use]
    pub fn with_overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }

    /// Sets whether a default configuration file is written.
    #[must_use]
    pub fn with_create_config(mut self, create_config: bool) -> Self {
        self.create_config = create_config;
        self
    }
}

/// What [`init_database`] did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InitResult {
    /// The directory had to be created.
    pub data_dir_created: bool,
    /// The database was created or recreated.
    pub database_created: bool,
    /// A configuration file was written.
    pub config_created: bool,
    /// The initialized directory.
    pub data_dir: PathBuf,
}

const DEFAULT_CONFIG_TEMPLATE: &str = r"# Raffle configuration

# Orders processed between progress reports (default: 50)
# progress_interval: 50

# Notify customers of approvals and denials (default: true)
# send_mail: true

# Maximum database lock wait in seconds (default: 5)
# maximum_lock_wait_seconds: 5

# Seed for reproducible draws (default: random)
# default_seed: 12345

# Output format: human or json (default: human)
# output_format: human
";

/// Creates the data directory and an empty database.
///
/// # Errors
///
/// Returns [`Error::Validation`] if a database exists and `overwrite` is
/// off, or an I/O or database error.
///
/// # Examples
///
/// ```no_run
/// use std::path::PathBuf;
/// use raffle::operations::{init_database, InitOptions};
///
/// let result = init_database(&InitOptions::new(PathBuf::from("/tmp/raffle"))).unwrap();
/// assert!(result.database_created);
/// ```
pub fn init_database(options: &InitOptions) -> Result<InitResult> {
    let mut result = InitResult {
        data_dir_created: false,
        database_created: false,
        config_created: false,
        data_dir: options.data_dir.clone(),
    };

    if !options.data_dir.exists() {
        fs::create_dir_all(&options.data_dir)?;
        result.data_dir_created = true;
    }

    let db_path = options.data_dir.join(DATABASE_FILE);
    if db_path.exists() {
        if !options.overwrite {
            return Err(Error::Validation {
                field: "database".into(),
                message: format!(
                    "Database already exists at {}. Use --overwrite to replace it.",
                    db_path.display()
                ),
            });
        }
        fs::remove_file(&db_path)?;
    }

    Database::open(DatabaseConfig::new(&db_path))?;
    result.database_created = true;

    if options.create_config {
        let config_path = options.data_dir.join("config.yaml");
        if !config_path.exists() {
            fs::write(&config_path, DEFAULT_CONFIG_TEMPLATE)?;
            result.config_created = true;
        }
    }

    log::info!("initialized {}", options.data_dir.display());
    Ok(result)
}

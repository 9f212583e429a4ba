//! `raffle init`: create the data directory and an empty database.

use crate::error::CliError;
use crate::utils::GlobalOptions;
use clap::Parser;
use raffle::database::{resolve_data_dir, DATABASE_FILE};
use raffle::operations::{init_database, InitOptions, InitResult};
use std::path::{Path, PathBuf};

const CONFIG_FILE: &str = "config.yaml";

/// Initialize the raffle data directory.
#[derive(Parser)]
pub struct InitCommand {
    /// Directory to create (defaults to the global data directory)
    #[arg(long, value_name = "PATH")]
    data_dir: Option<PathBuf>,

    /// Replace an existing database
    #[arg(long)]
    overwrite: bool,

    /// Also write a commented config.yaml
    #[arg(long)]
    with_config: bool,

    /// Show what would be created
    #[arg(long)]
    dry_run: bool,
}

impl InitCommand {
    /// Execute the init command.
    ///
    /// Unlike other commands, a missing data directory is what this one
    /// expects, so the global autoinit setting does not apply.
    pub fn execute(self, global: &GlobalOptions) -> Result<(), CliError> {
        let data_dir = match self.data_dir.clone().or_else(|| global.data_dir.clone()) {
            Some(dir) => dir,
            None => resolve_data_dir().map_err(|e| CliError::Config(e.to_string()))?,
        };

        if self.dry_run {
            println!("Dry-run mode: nothing is written");
            for step in self.preview(&data_dir) {
                println!("  - {step}");
            }
            return Ok(());
        }

        let options = InitOptions::new(data_dir)
            .with_overwrite(self.overwrite)
            .with_create_config(self.with_config);
        let result = init_database(&options)?;
        self.report(&result);
        Ok(())
    }

    fn preview(&self, data_dir: &Path) -> Vec<String> {
        let mut steps = Vec::new();
        if !data_dir.exists() {
            steps.push(format!("create directory {}", data_dir.display()));
        }

        let db_path = data_dir.join(DATABASE_FILE);
        steps.push(match (db_path.exists(), self.overwrite) {
            (false, _) => format!("create database {}", db_path.display()),
            (true, true) => format!("replace database {}", db_path.display()),
            (true, false) => format!(
                "refuse: {} exists (pass --overwrite)",
                db_path.display()
            ),
        });

        let config_path = data_dir.join(CONFIG_FILE);
        if self.with_config && !config_path.exists() {
            steps.push(format!("write {}", config_path.display()));
        }
        steps
    }

    fn report(&self, result: &InitResult) {
        println!("Initialized raffle in: {}", result.data_dir.display());
        if result.data_dir_created {
            println!("  - Created data directory");
        }
        if result.database_created {
            let verb = if self.overwrite { "Recreated" } else { "Created" };
            println!("  - {verb} database");
        }
        match (self.with_config, result.config_created) {
            (_, true) => println!("  - Created default configuration file"),
            (true, false) => println!("  - Kept existing {CONFIG_FILE}"),
            _ => {}
        }
    }
}

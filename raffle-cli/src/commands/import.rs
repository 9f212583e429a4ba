//! Import command implementation.
//!
//! Loads an event fixture (YAML, or JSON by `.json` extension) into the
//! store in a single transaction.

use crate::error::CliError;
use crate::utils::{load_configuration, open_database, GlobalOptions};
use clap::Args;
use raffle::config::OutputFormat;
use raffle::database::EventFixture;
use std::path::PathBuf;

/// Load orders, cliques, overrides and quotas from a fixture file.
#[derive(Args)]
pub struct ImportCommand {
    /// Fixture file to import
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Output format
    #[arg(long, value_name = "FORMAT")]
    pub format: Option<OutputFormat>,
}

impl ImportCommand {
    /// Execute the import command.
    pub fn execute(self, global: &GlobalOptions) -> Result<(), CliError> {
        let config = load_configuration(global)?;
        let fixture = EventFixture::from_path(&self.file).map_err(CliError::from)?;
        let db = open_database(global, &config)?;

        let result = db.import_snapshot(&fixture).map_err(CliError::from)?;

        match self.format.unwrap_or_else(|| config.output_format()) {
            OutputFormat::Json => {
                let json = serde_json::to_string_pretty(&result)
                    .map_err(|e| CliError::Library(e.into()))?;
                println!("{json}");
            }
            OutputFormat::Human => {
                println!(
                    "Imported {} orders into {}: {} cliques, {} memberships, {} overrides, {} quotas",
                    result.orders,
                    fixture.event,
                    result.cliques,
                    result.memberships,
                    result.overrides,
                    result.quotas
                );
            }
        }

        Ok(())
    }
}

//! Log command implementation.

use crate::error::CliError;
use crate::utils::{formatter, load_configuration, open_database, parse_order, GlobalOptions};
use clap::Args;
use raffle::config::OutputFormat;
use raffle::OrderCode;

/// Show the audit trail of an order.
#[derive(Args)]
pub struct LogCommand {
    /// Order code
    #[arg(value_name = "CODE", value_parser = parse_order)]
    pub order: OrderCode,

    /// Output format
    #[arg(long, value_name = "FORMAT")]
    pub format: Option<OutputFormat>,
}

impl LogCommand {
    /// Execute the log command.
    pub fn execute(self, global: &GlobalOptions) -> Result<(), CliError> {
        let config = load_configuration(global)?;
        let db = open_database(global, &config)?;

        db.require_order(&self.order).map_err(CliError::from)?;
        let entries = db.log_entries(&self.order).map_err(CliError::from)?;

        let output = formatter(self.format, &config)
            .format_log(&entries)
            .map_err(CliError::from)?;
        println!("{output}");
        Ok(())
    }
}

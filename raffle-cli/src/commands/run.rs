//! Run command implementation.
//!
//! Draws orders for one occurrence and approves them. Approvals the store
//! refuses are recorded against the order and do not stop the run.

use crate::error::CliError;
use crate::utils::{formatter, load_configuration, open_database, parse_event, GlobalOptions};
use clap::Args;
use raffle::config::OutputFormat;
use raffle::operations::{execute_raffle, RunSettings};
use raffle::service::LoggingProgress;
use raffle::{EventSlug, RaffleOptions, SubEventId, UserId};

/// Run a raffle and approve the drawn orders.
#[derive(Args)]
pub struct RunCommand {
    /// Event slug
    #[arg(long, value_name = "EVENT", value_parser = parse_event)]
    pub event: EventSlug,

    /// Occurrence id, for events with several dates
    #[arg(long, value_name = "ID")]
    pub subevent: Option<i64>,

    /// User the approvals are made on behalf of
    #[arg(long, value_name = "ID")]
    pub user: i64,

    /// Number of tickets to admit
    #[arg(long, value_name = "TICKETS", allow_negative_numbers = true)]
    pub size: i64,

    /// Add-on limit (accepted, not applied)
    #[arg(long, value_name = "N")]
    pub max_addons: Option<u32>,

    /// Seed for a reproducible draw
    #[arg(long, value_name = "SEED")]
    pub seed: Option<u64>,

    /// Do not notify customers
    #[arg(long)]
    pub no_mail: bool,

    /// Show the draw without approving anything
    #[arg(long)]
    pub dry_run: bool,

    /// Output format
    #[arg(long, value_name = "FORMAT")]
    pub format: Option<OutputFormat>,
}

impl RunCommand {
    /// Execute the run command.
    pub fn execute(self, global: &GlobalOptions) -> Result<(), CliError> {
        let config = load_configuration(global)?;
        let db = open_database(global, &config)?;

        let options = RaffleOptions::new(UserId::new(self.user), self.size)
            .with_subevent(self.subevent.map(SubEventId::new))
            .with_max_addons(self.max_addons)
            .with_seed(self.seed.or(config.default_seed));
        let settings = RunSettings {
            send_mail: config.send_mail() && !self.no_mail,
            progress_interval: config.progress_interval(),
            dry_run: self.dry_run,
        };

        let mut progress = LoggingProgress::new(global.logger, "raffle");
        let result = execute_raffle(&db, &self.event, options, settings, Some(&mut progress))
            .map_err(CliError::from)?;

        if !result.failed.is_empty() {
            global.logger.warn(&format!(
                "{} approvals were refused; see `raffle log <code>`",
                result.failed.len()
            ));
        }

        let output = formatter(self.format, &config)
            .format_result(&result)
            .map_err(CliError::from)?;
        println!("{output}");
        Ok(())
    }
}

//! Reject command implementation.

use crate::error::CliError;
use crate::utils::{formatter, load_configuration, open_database, parse_event, GlobalOptions};
use clap::Args;
use raffle::config::OutputFormat;
use raffle::operations::{execute_rejection, RunSettings};
use raffle::service::LoggingProgress;
use raffle::{EventSlug, RejectionOptions, SubEventId, UserId};

/// Deny every order of an occurrence that is still waiting for approval.
///
/// The first failed denial stops the run.
#[derive(Args)]
pub struct RejectCommand {
    /// Event slug
    #[arg(long, value_name = "EVENT", value_parser = parse_event)]
    pub event: EventSlug,

    /// Occurrence id, for events with several dates
    #[arg(long, value_name = "ID")]
    pub subevent: Option<i64>,

    /// User the denials are made on behalf of
    #[arg(long, value_name = "ID")]
    pub user: i64,

    /// Do not notify customers
    #[arg(long)]
    pub no_mail: bool,

    /// List the orders without denying them
    #[arg(long)]
    pub dry_run: bool,

    /// Output format
    #[arg(long, value_name = "FORMAT")]
    pub format: Option<OutputFormat>,
}

impl RejectCommand {
    /// Execute the reject command.
    pub fn execute(self, global: &GlobalOptions) -> Result<(), CliError> {
        let config = load_configuration(global)?;
        let db = open_database(global, &config)?;

        let options = RejectionOptions::new(UserId::new(self.user))
            .with_subevent(self.subevent.map(SubEventId::new));
        let settings = RunSettings {
            send_mail: config.send_mail() && !self.no_mail,
            progress_interval: config.progress_interval(),
            dry_run: self.dry_run,
        };

        let mut progress = LoggingProgress::new(global.logger, "reject");
        let result = execute_rejection(&db, &self.event, options, settings, Some(&mut progress))
            .map_err(CliError::from)?;

        let output = formatter(self.format, &config)
            .format_result(&result)
            .map_err(CliError::from)?;
        println!("{output}");
        Ok(())
    }
}

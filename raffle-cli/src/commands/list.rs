//! List command implementation.
//!
//! Shows every eligible order of an occurrence with the unit it is drawn
//! with, its override and whether its unit is preferred, excluded or drawn.

use crate::error::CliError;
use crate::utils::{formatter, load_configuration, open_database, parse_event, GlobalOptions};
use clap::Args;
use raffle::config::OutputFormat;
use raffle::operations::list_candidates;
use raffle::{EventSlug, SubEventId};

/// List the eligible orders of an occurrence.
#[derive(Args)]
pub struct ListCommand {
    /// Event slug
    #[arg(long, value_name = "EVENT", value_parser = parse_event)]
    pub event: EventSlug,

    /// Occurrence id, for events with several dates
    #[arg(long, value_name = "ID")]
    pub subevent: Option<i64>,

    /// Output format
    #[arg(long, value_name = "FORMAT")]
    pub format: Option<OutputFormat>,
}

impl ListCommand {
    /// Execute the list command.
    pub fn execute(self, global: &GlobalOptions) -> Result<(), CliError> {
        let config = load_configuration(global)?;
        let db = open_database(global, &config)?;

        let snapshot = db.load_snapshot(&self.event).map_err(CliError::from)?;
        let candidates = list_candidates(&snapshot, self.subevent.map(SubEventId::new));

        let output = formatter(self.format, &config)
            .format_candidates(&candidates)
            .map_err(CliError::from)?;
        println!("{output}");
        Ok(())
    }
}

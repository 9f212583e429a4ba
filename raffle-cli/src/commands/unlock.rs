//! Unlock command implementation.

use crate::error::CliError;
use crate::utils::{load_configuration, open_database, parse_event, GlobalOptions};
use clap::Args;
use raffle::{EventSlug, SubEventId};

/// Clear the run lock of an occurrence.
///
/// Only needed after a run was killed before it could release its lock.
/// Unlocking while a run is still working lets a second run start.
#[derive(Args)]
pub struct UnlockCommand {
    /// Event slug
    #[arg(long, value_name = "EVENT", value_parser = parse_event)]
    pub event: EventSlug,

    /// Occurrence id, for events with several dates
    #[arg(long, value_name = "ID")]
    pub subevent: Option<i64>,
}

impl UnlockCommand {
    /// Execute the unlock command.
    pub fn execute(self, global: &GlobalOptions) -> Result<(), CliError> {
        let config = load_configuration(global)?;
        let db = open_database(global, &config)?;

        let subevent = self.subevent.map(SubEventId::new);
        let target = match subevent {
            Some(id) => format!("{} (subevent {id})", self.event),
            None => self.event.to_string(),
        };

        let acquired_at = db.run_lock_acquired_at(&self.event, subevent)?;
        if db.force_release_run_lock(&self.event, subevent)? {
            match acquired_at {
                Some(time) => println!(
                    "Released run lock for {target}, held since {}",
                    time.format("%Y-%m-%d %H:%M:%S UTC")
                ),
                None => println!("Released run lock for {target}"),
            }
        } else {
            println!("No run lock held for {target}");
        }
        Ok(())
    }
}

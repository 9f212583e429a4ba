//! Override command implementation.

use crate::error::CliError;
use crate::utils::{load_configuration, open_database, parse_event, parse_order, GlobalOptions};
use clap::Args;
use raffle::{EventSlug, OrderCode, OverrideMode, UserId};

/// Force an order in or out of the next raffle.
///
/// Modes are `always`, `never` and `normal`; anything else resets the
/// order to `normal`.
#[derive(Args)]
pub struct OverrideCommand {
    /// Event slug the order belongs to
    #[arg(long, value_name = "EVENT", value_parser = parse_event)]
    pub event: EventSlug,

    /// Order code
    #[arg(value_name = "CODE", value_parser = parse_order)]
    pub order: OrderCode,

    /// Override mode
    #[arg(value_name = "MODE")]
    pub mode: String,

    /// User the change is recorded for
    #[arg(long, value_name = "ID")]
    pub user: Option<i64>,
}

impl OverrideCommand {
    /// Execute the override command.
    pub fn execute(self, global: &GlobalOptions) -> Result<(), CliError> {
        let config = load_configuration(global)?;
        let db = open_database(global, &config)?;

        let order = db.require_order(&self.order).map_err(CliError::from)?;
        if order.event() != &self.event {
            return Err(CliError::SemanticFailure(format!(
                "Order {} belongs to event {}, not {}",
                self.order,
                order.event(),
                self.event
            )));
        }

        let mode = db
            .set_override(&self.order, &self.mode, self.user.map(UserId::new))
            .map_err(CliError::from)?;
        if mode == OverrideMode::Normal && !self.mode.trim().eq_ignore_ascii_case("normal") {
            global
                .logger
                .warn(&format!("Unknown override mode '{}', using normal", self.mode));
        }

        if !global.quiet {
            println!("Override for {} set to {mode}", self.order);
        }
        Ok(())
    }
}

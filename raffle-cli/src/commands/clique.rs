//! Clique command implementation.
//!
//! Cliques are named groups of orders within one event that are drawn
//! together. The order that creates a clique administers it.

use crate::error::CliError;
use crate::utils::{load_configuration, open_database, parse_event, parse_order, GlobalOptions};
use clap::{Args, Subcommand};
use raffle::config::OutputFormat;
use raffle::{Database, EventSlug, OrderCode};
use serde::Serialize;

/// Manage cliques of orders that are admitted together.
#[derive(Args)]
pub struct CliqueCommand {
    #[command(subcommand)]
    pub action: CliqueAction,
}

/// Clique subcommands.
#[derive(Subcommand)]
pub enum CliqueAction {
    /// Create a clique and make the order its administrator
    Create {
        /// Order creating the clique
        #[arg(value_name = "CODE", value_parser = parse_order)]
        order: OrderCode,

        /// Clique name, unique within the event
        #[arg(long)]
        name: String,

        /// Password other orders need to join
        #[arg(long)]
        password: Option<String>,
    },

    /// Join an existing clique by name
    Join {
        /// Order joining the clique
        #[arg(value_name = "CODE", value_parser = parse_order)]
        order: OrderCode,

        /// Clique name
        #[arg(long)]
        name: String,

        /// Clique password
        #[arg(long)]
        password: Option<String>,
    },

    /// Leave the order's clique
    Leave {
        /// Order leaving its clique
        #[arg(value_name = "CODE", value_parser = parse_order)]
        order: OrderCode,
    },

    /// Change the password of the clique the order administers
    Password {
        /// Administering order
        #[arg(value_name = "CODE", value_parser = parse_order)]
        order: OrderCode,

        /// New password; omit to remove it
        #[arg(long)]
        password: Option<String>,
    },

    /// List the cliques of an event
    List {
        /// Event slug
        #[arg(long, value_name = "EVENT", value_parser = parse_event)]
        event: EventSlug,

        /// Output format
        #[arg(long, value_name = "FORMAT")]
        format: Option<OutputFormat>,
    },
}

#[derive(Serialize)]
struct CliqueRow<'a> {
    id: i64,
    name: &'a str,
    members: usize,
    protected: bool,
}

impl CliqueCommand {
    /// Execute the clique command.
    pub fn execute(self, global: &GlobalOptions) -> Result<(), CliError> {
        let config = load_configuration(global)?;
        let db = open_database(global, &config)?;

        match self.action {
            CliqueAction::Create {
                order,
                name,
                password,
            } => {
                let clique = db
                    .create_clique(&order, &name, password)
                    .map_err(CliError::from)?;
                report(global, &format!("Created clique '{}' ({})", clique.name(), clique.id()));
            }
            CliqueAction::Join {
                order,
                name,
                password,
            } => {
                let clique = db
                    .join_clique(&order, &name, password.as_deref())
                    .map_err(CliError::from)?;
                report(global, &format!("Order {order} joined clique '{}'", clique.name()));
            }
            CliqueAction::Leave { order } => {
                let id = db.leave_clique(&order).map_err(CliError::from)?;
                report(global, &format!("Order {order} left clique {id}"));
            }
            CliqueAction::Password { order, password } => {
                db.change_clique_password(&order, password)
                    .map_err(CliError::from)?;
                report(global, "Clique password changed");
            }
            CliqueAction::List { event, format } => {
                list(&db, &event, format.unwrap_or_else(|| config.output_format()))?;
            }
        }

        Ok(())
    }
}

fn report(global: &GlobalOptions, message: &str) {
    if !global.quiet {
        println!("{message}");
    }
}

fn list(db: &Database, event: &EventSlug, format: OutputFormat) -> Result<(), CliError> {
    let cliques = db.list_cliques(event).map_err(CliError::from)?;
    let rows: Vec<CliqueRow<'_>> = cliques
        .iter()
        .map(|(clique, members)| CliqueRow {
            id: clique.id().value(),
            name: clique.name(),
            members: *members,
            protected: clique.has_password(),
        })
        .collect();

    match format {
        OutputFormat::Json => {
            let json =
                serde_json::to_string_pretty(&rows).map_err(|e| CliError::Library(e.into()))?;
            println!("{json}");
        }
        OutputFormat::Human if rows.is_empty() => println!("No cliques."),
        OutputFormat::Human => {
            for row in rows {
                let lock = if row.protected { " (password)" } else { "" };
                println!("{}\t{}\t{} members{lock}", row.id, row.name, row.members);
            }
        }
    }
    Ok(())
}

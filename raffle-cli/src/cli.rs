//! CLI structure and command definitions.
//!
//! This module defines the main CLI structure using clap's derive macros,
//! including global options and subcommands.

use crate::commands::{
    CliqueCommand, ImportCommand, InitCommand, ListCommand, LogCommand, OverrideCommand,
    RejectCommand, RunCommand, UnlockCommand,
};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Command-line tool for running admission raffles.
#[derive(Parser)]
#[command(name = "raffle")]
#[command(version, about = "Allocate admission quota among approval-gated orders", long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(long, global = true)]
    pub verbose: bool,

    /// Suppress non-essential output
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Override the data directory location
    #[arg(long, value_name = "PATH", global = true, env = "RAFFLE_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Override the default busy timeout (in seconds)
    #[arg(long, value_name = "SECONDS", global = true, env = "RAFFLE_BUSY_TIMEOUT")]
    pub busy_timeout: Option<u32>,

    /// Disable automatic database initialization
    #[arg(long, global = true, env = "RAFFLE_DISABLE_AUTOINIT")]
    pub disable_autoinit: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI commands.
#[derive(Subcommand)]
pub enum Command {
    /// Initialize the data directory and database
    Init(InitCommand),

    /// Load orders, cliques and quotas from a fixture file
    Import(ImportCommand),

    /// List the eligible orders of an occurrence
    List(ListCommand),

    /// Force an order in or out of the next raffle
    Override(OverrideCommand),

    /// Manage cliques of orders that are admitted together
    Clique(CliqueCommand),

    /// Run a raffle and approve the drawn orders
    Run(RunCommand),

    /// Deny every order still waiting for approval
    Reject(RejectCommand),

    /// Show the audit trail of an order
    Log(LogCommand),

    /// Clear the run lock left behind by a killed run
    Unlock(UnlockCommand),
}

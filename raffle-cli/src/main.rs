//! Main entry point for the raffle CLI.
//!
//! This is the command-line interface for the raffle engine. It provides
//! commands for preparing and running raffles:
//! - `import`: Load orders from a fixture file
//! - `list`: Show who takes part in a raffle
//! - `override` and `clique`: Shape the draw
//! - `run`: Draw and approve orders
//! - `reject`: Deny the orders that were not drawn
//! - `unlock`: Recover an occurrence from a killed run

mod cli;
mod commands;
mod error;
mod utils;

use clap::error::ErrorKind;
use clap::Parser;
use cli::Cli;
use error::CliError;
use utils::GlobalOptions;

fn main() {
    // Parse CLI arguments; usage errors get their own exit code
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => e.exit(),
        Err(e) => {
            let _ = e.print();
            std::process::exit(CliError::InvalidArguments(String::new()).exit_code());
        }
    };

    // Initialize logging based on verbosity
    let logger = raffle::init_logger(cli.verbose, cli.quiet);

    // Convert CLI args to GlobalOptions
    let global = GlobalOptions {
        verbose: cli.verbose,
        quiet: cli.quiet,
        data_dir: cli.data_dir,
        busy_timeout: cli.busy_timeout,
        disable_autoinit: cli.disable_autoinit,
        logger,
    };

    // Execute the command
    let result = match cli.command {
        cli::Command::Init(cmd) => cmd.execute(&global),
        cli::Command::Import(cmd) => cmd.execute(&global),
        cli::Command::List(cmd) => cmd.execute(&global),
        cli::Command::Override(cmd) => cmd.execute(&global),
        cli::Command::Clique(cmd) => cmd.execute(&global),
        cli::Command::Run(cmd) => cmd.execute(&global),
        cli::Command::Reject(cmd) => cmd.execute(&global),
        cli::Command::Log(cmd) => cmd.execute(&global),
        cli::Command::Unlock(cmd) => cmd.execute(&global),
    };

    // Handle errors and set exit code
    match result {
        Ok(()) => std::process::exit(0),
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(e.exit_code());
        }
    }
}

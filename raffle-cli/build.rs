//! Generates the `raffle.1` man page into `OUT_DIR/man`.
//!
//! Build scripts cannot use the crate they build, so the command tree is
//! restated here. Keep it in step with `src/cli.rs`.

use clap::{Arg, ArgAction, Command};
use clap_mangen::Man;
use std::fs;
use std::path::PathBuf;

const COMMANDS: &[(&str, &str)] = &[
    ("init", "Initialize the data directory and database"),
    ("import", "Load orders, cliques and quotas from a fixture file"),
    ("list", "List the eligible orders of an occurrence"),
    ("override", "Force an order in or out of the next raffle"),
    ("clique", "Manage cliques of orders that are admitted together"),
    ("run", "Run a raffle and approve the drawn orders"),
    ("reject", "Deny every order still waiting for approval"),
    ("log", "Show the audit trail of an order"),
    ("unlock", "Clear the run lock left behind by a killed run"),
];

fn flag(name: &'static str, help: &'static str) -> Arg {
    Arg::new(name)
        .long(name)
        .help(help)
        .global(true)
        .action(ArgAction::SetTrue)
}

fn build_cli() -> Command {
    Command::new("raffle")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Allocate admission quota among approval-gated orders")
        .long_about(
            "Draws which approval-gated orders of an event occurrence are admitted, \
             keeping cliques together and honoring per-order overrides",
        )
        .arg(flag("verbose", "Enable verbose output"))
        .arg(flag("quiet", "Suppress non-essential output"))
        .arg(
            Arg::new("data-dir")
                .long("data-dir")
                .help("Override the data directory location")
                .value_name("PATH")
                .global(true)
                .env("RAFFLE_DATA_DIR"),
        )
        .arg(
            Arg::new("busy-timeout")
                .long("busy-timeout")
                .help("Override the default busy timeout (in seconds)")
                .value_name("SECONDS")
                .global(true)
                .env("RAFFLE_BUSY_TIMEOUT"),
        )
        .arg(
            flag("disable-autoinit", "Disable automatic database initialization")
                .env("RAFFLE_DISABLE_AUTOINIT"),
        )
        .subcommands(
            COMMANDS
                .iter()
                .map(|(name, about)| Command::new(*name).about(*about)),
        )
}

fn main() {
    let out_dir = PathBuf::from(std::env::var("OUT_DIR").unwrap());
    let man_dir = out_dir.join("man");
    fs::create_dir_all(&man_dir).unwrap();

    let mut buffer = Vec::new();
    Man::new(build_cli()).render(&mut buffer).unwrap();
    fs::write(man_dir.join("raffle.1"), buffer).unwrap();

    println!("cargo:rerun-if-changed=src/cli.rs");
    println!("cargo:rerun-if-changed=src/commands/");
}

//! Command layer of the `raffle` binary, exposed as a library so the
//! command definitions can be tested and documented.

pub mod cli;
pub mod commands;
pub mod error;
pub mod utils;

pub use cli::Cli;

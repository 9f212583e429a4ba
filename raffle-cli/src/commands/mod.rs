//! CLI command implementations.
//!
//! This module contains the implementations of all CLI commands:
//! - `init`: Create the data directory and database
//! - `import`: Load a fixture of orders, cliques and quotas
//! - `list`: Show the eligible orders of an occurrence
//! - `override`: Force an order in or out of the draw
//! - `clique`: Create, join, leave and list cliques
//! - `run`: Draw and approve orders
//! - `reject`: Deny the orders still waiting for approval
//! - `log`: Show an order's audit trail
//! - `unlock`: Clear the run lock left by a killed run

pub mod clique;
pub mod import;
pub mod init;
pub mod list;
pub mod log;
pub mod reject;
pub mod run;
pub mod set_override;
pub mod unlock;

pub use clique::CliqueCommand;
pub use import::ImportCommand;
pub use init::InitCommand;
pub use list::ListCommand;
pub use log::LogCommand;
pub use reject::RejectCommand;
pub use run::RunCommand;
pub use set_override::OverrideCommand;
pub use unlock::UnlockCommand;

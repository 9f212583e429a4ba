//! Configuration system for raffle runs.
//!
//! Configuration is merged from multiple sources with the following precedence
//! (highest to lowest):
//!
//! 1. Programmatic overrides (via `ConfigBuilder::with_config`)
//! 2. Environment variables (`RAFFLE_*`)
//! 3. Private project config (`raffle.local.yaml`)
//! 4. Project config (`raffle.yaml`)
//! 5. User config (`~/.raffle/config.yaml`)
//! 6. Built-in defaults
//!
//! # Examples
//!
//! Loading from a specific directory:
//!
//! ```no_run
//! use raffle::config::ConfigBuilder;
//! use std::path::Path;
//!
//! let config = ConfigBuilder::new()
//!     .with_working_dir(Path::new("/path/to/project"))
//!     .build()
//!     .unwrap();
//! println!("progress every {} orders", config.progress_interval());
//! ```
//!
//! Programmatic configuration:
//!
//! ```
//! use raffle::config::{Config, ConfigBuilder};
//!
//! let custom = Config {
//!     send_mail: Some(false),
//!     default_seed: Some(7),
//!     ..Default::default()
//! };
//!
//! let config = ConfigBuilder::new()
//!     .skip_files()
//!     .skip_env()
//!     .with_config(custom)
//!     .build()
//!     .unwrap();
//!
//! assert!(!config.send_mail());
//! assert_eq!(config.progress_interval(), 50);
//! ```

pub mod builder;
pub mod environment;
pub mod loader;
pub mod merger;
pub mod schema;
pub mod validator;

#[cfg(test)]
mod proptests;

pub use builder::ConfigBuilder;
pub use environment::EnvironmentConfig;
pub use loader::{ConfigLoader, ConfigSource};
pub use merger::ConfigMerger;
pub use schema::{Config, OutputFormat};
pub use validator::ConfigValidator;

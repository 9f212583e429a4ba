//! Configuration schema definitions.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::operations::DEFAULT_PROGRESS_INTERVAL;

/// Default lock wait in seconds.
pub const DEFAULT_LOCK_WAIT_SECONDS: u64 = 5;

/// Complete configuration structure.
///
/// Every field is optional so that sources can be layered; the accessor
/// methods apply the built-in defaults.
///
/// # Examples
///
/// ```
/// use raffle::config::{Config, OutputFormat};
///
/// let config = Config {
///     output_format: Some(OutputFormat::Json),
///     ..Default::default()
/// };
/// assert_eq!(config.output_format(), OutputFormat::Json);
/// assert!(config.send_mail());
/// ```
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Orders processed between progress reports.
    pub progress_interval: Option<usize>,

    /// Notify customers of approvals and denials.
    pub send_mail: Option<bool>,

    /// Maximum time to wait for database lock acquisition (seconds).
    pub maximum_lock_wait_seconds: Option<u64>,

    /// Seed used for draws when none is given on the command line.
    pub default_seed: Option<u64>,

    /// Output format for command results.
    pub output_format: Option<OutputFormat>,

    /// Disable automatic database initialization.
    pub disable_autoinit: Option<bool>,
}

impl Config {
    /// Orders between progress reports, 50 unless configured.
    #[must_use]
    pub fn progress_interval(&self) -> usize {
        self.progress_interval.unwrap_or(DEFAULT_PROGRESS_INTERVAL)
    }

    /// Whether customers are notified, `true` unless configured.
    #[must_use]
    pub fn send_mail(&self) -> bool {
        self.send_mail.unwrap_or(true)
    }

    /// Lock wait in seconds, 5 unless configured.
    #[must_use]
    pub fn lock_wait_seconds(&self) -> u64 {
        self.maximum_lock_wait_seconds
            .unwrap_or(DEFAULT_LOCK_WAIT_SECONDS)
    }

    /// Output format, human-readable unless configured.
    #[must_use]
    pub fn output_format(&self) -> OutputFormat {
        self.output_format.unwrap_or_default()
    }
}

/// Output format for command results.
///
/// # Examples
///
/// ```
/// use raffle::config::OutputFormat;
///
/// let format: OutputFormat = "JSON".parse().unwrap();
/// assert_eq!(format.to_string(), "json");
/// ```
#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable text.
    #[default]
    Human,
    /// JSON document.
    Json,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Human => write!(f, "human"),
            Self::Json => write!(f, "json"),
        }
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "human" => Ok(Self::Human),
            "json" => Ok(Self::Json),
            other => Err(format!("unknown output format '{other}' (expected human or json)")),
        }
    }
}

//! Output formatting for run results, candidate lists and audit trails.
//!
//! Each [`OutputFormat`] maps to one [`OutputFormatter`]; the CLI picks the
//! format from configuration and prints whatever the formatter returns.

mod formatters;

use crate::config::OutputFormat;
use crate::database::LogEntry;
use crate::operations::{Candidate, ExecutionResult};
use crate::Result;

pub use formatters::{HumanFormatter, JsonFormatter};

/// Trait for rendering library results as text.
pub trait OutputFormatter {
    /// Format the outcome of a raffle or rejection run.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    fn format_result(&self, result: &ExecutionResult) -> Result<String>;

    /// Format the candidates of an occurrence.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    fn format_candidates(&self, candidates: &[Candidate]) -> Result<String>;

    /// Format audit log entries.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    fn format_log(&self, entries: &[LogEntry]) -> Result<String>;
}

impl OutputFormat {
    /// Create a formatter for this output format.
    ///
    /// # Examples
    ///
    /// ```
    /// use raffle::config::OutputFormat;
    ///
    /// let formatter = OutputFormat::Human.create_formatter();
    /// assert_eq!(formatter.format_log(&[]).unwrap(), "No log entries.");
    /// ```
    #[must_use]
    pub fn create_formatter(self) -> Box<dyn OutputFormatter> {
        match self {
            Self::Human => Box::new(HumanFormatter),
            Self::Json => Box::new(JsonFormatter),
        }
    }
}

//! Operator-facing log output.
//!
//! Run summaries, failures and progress go to stderr through [`Logger`]. Finer
//! internal diagnostics use the `log` facade and are left to whatever backend
//! the host installs.

use std::env;
use std::fmt;

/// Environment variable that selects the log level when no flag is given.
pub const LOG_MODE_ENV: &str = "RAFFLE_LOG_MODE";

/// Output verbosity, ordered from least to most verbose.
///
/// # Examples
///
/// ```
/// use raffle::LogLevel;
///
/// assert!(LogLevel::Quiet < LogLevel::Normal);
/// assert!(LogLevel::Normal < LogLevel::Verbose);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum LogLevel {
    /// Only the command's own result.
    Quiet,
    /// Errors, warnings and run summaries.
    #[default]
    Normal,
    /// Everything, including per-order progress.
    Verbose,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Quiet => "quiet",
            Self::Normal => "normal",
            Self::Verbose => "verbose",
        };
        f.write_str(name)
    }
}

impl LogLevel {
    /// Parses a level name, ignoring case.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is not `quiet`, `normal` or `verbose`.
    ///
    /// # Examples
    ///
    /// ```
    /// use raffle::LogLevel;
    ///
    /// assert_eq!(LogLevel::parse("Verbose").unwrap(), LogLevel::Verbose);
    /// assert!(LogLevel::parse("loud").is_err());
    /// ```
    pub fn parse(s: &str) -> Result<Self, String> {
        match s.trim().to_lowercase().as_str() {
            "quiet" => Ok(Self::Quiet),
            "normal" => Ok(Self::Normal),
            "verbose" => Ok(Self::Verbose),
            _ => Err(format!("invalid log level: {s}")),
        }
    }
}

/// Stderr logger filtered by [`LogLevel`].
///
/// # Examples
///
/// ```
/// use raffle::{LogLevel, Logger};
///
/// let logger = Logger::new(LogLevel::Normal);
/// logger.warn("quota already exhausted");
/// logger.info("not shown below verbose");
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct Logger {
    level: LogLevel,
}

impl Logger {
    /// Creates a logger with the given level.
    #[must_use]
    pub const fn new(level: LogLevel) -> Self {
        Self { level }
    }

    /// Returns the configured level.
    #[must_use]
    pub const fn level(&self) -> LogLevel {
        self.level
    }

    /// Returns `true` if messages at `level` are printed.
    #[must_use]
    pub fn enabled(&self, level: LogLevel) -> bool {
        self.level >= level
    }

    /// Logs an error. Shown unless quiet.
    pub fn error(&self, message: &str) {
        if self.enabled(LogLevel::Normal) {
            eprintln!("ERROR: {message}");
        }
    }

    /// Logs a warning. Shown unless quiet.
    pub fn warn(&self, message: &str) {
        if self.enabled(LogLevel::Normal) {
            eprintln!("WARN: {message}");
        }
    }

    /// Logs an informational message. Verbose only.
    pub fn info(&self, message: &str) {
        if self.enabled(LogLevel::Verbose) {
            eprintln!("INFO: {message}");
        }
    }

    /// Logs a debug message. Verbose only.
    pub fn debug(&self, message: &str) {
        if self.enabled(LogLevel::Verbose) {
            eprintln!("DEBUG: {message}");
        }
    }
}

/// Builds a logger from CLI flags, falling back to `RAFFLE_LOG_MODE`.
///
/// `verbose` wins over `quiet`; both win over the environment. An
/// unparseable environment value is ignored.
///
/// # Examples
///
/// ```
/// use raffle::{init_logger, LogLevel};
///
/// assert_eq!(init_logger(true, true).level(), LogLevel::Verbose);
/// assert_eq!(init_logger(false, true).level(), LogLevel::Quiet);
/// ```
#[must_use]
pub fn init_logger(verbose: bool, quiet: bool) -> Logger {
    if verbose {
        return Logger::new(LogLevel::Verbose);
    }
    if quiet {
        return Logger::new(LogLevel::Quiet);
    }

    env::var(LOG_MODE_ENV)
        .ok()
        .and_then(|value| LogLevel::parse(&value).ok())
        .map_or_else(Logger::default, Logger::new)
}

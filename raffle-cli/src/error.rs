//! Command errors and their process exit codes.

use raffle::Error as LibError;
use thiserror::Error;

/// Errors surfaced by CLI commands, each with a stable exit code.
#[derive(Debug, Error)]
pub enum CliError {
    /// Library error (wrapped).
    #[error("{0}")]
    Library(#[source] LibError),

    /// Invalid command-line arguments.
    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Another run holds the occurrence, or the database stayed locked.
    #[error("{0}")]
    Busy(String),

    /// Data directory not found (and auto-init disabled).
    #[error("Data directory not found (run `raffle init` or drop --disable-autoinit)")]
    NoDataDirectory,

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Semantic failure (e.g., unknown order, wrong password).
    #[error("{0}")]
    SemanticFailure(String),
}

impl CliError {
    /// Get the appropriate exit code for this error.
    ///
    /// Exit codes:
    /// - 0: Success (not an error)
    /// - 1: Semantic failure (e.g., unknown order, refused approval)
    /// - 2: A run is already in progress or the database is locked
    /// - 3: No data directory found
    /// - 4: Invalid arguments
    /// - 5: I/O error
    /// - 6: Other library error
    /// - 7: Configuration error
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::SemanticFailure(_) => 1,
            CliError::Library(lib_err) => match lib_err {
                LibError::NotFound { .. }
                | LibError::Order { .. }
                | LibError::DuplicateClique { .. }
                | LibError::CliqueAuth { .. } => 1,
                LibError::Validation { .. } => 4,
                LibError::Io(_) => 5,
                _ => 6,
            },
            CliError::Busy(_) => 2,
            CliError::NoDataDirectory => 3,
            CliError::InvalidArguments(_) => 4,
            CliError::Io(_) => 5,
            CliError::Config(_) => 7,
        }
    }
}

impl From<LibError> for CliError {
    fn from(e: LibError) -> Self {
        // Check for specific error types that need special handling
        match e {
            LibError::RunInProgress { .. } | LibError::LockTimeout { .. } => {
                CliError::Busy(e.to_string())
            }
            LibError::DataDirectoryNotFound { .. } => CliError::NoDataDirectory,
            _ => CliError::Library(e),
        }
    }
}

impl From<raffle::order::ValidationError> for CliError {
    fn from(e: raffle::order::ValidationError) -> Self {
        CliError::Library(e.into())
    }
}

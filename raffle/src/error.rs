//! Error types for the raffle library.
//!
//! This module provides the error hierarchy for all operations in the
//! raffle library, using `thiserror` for ergonomic error handling.

use std::path::PathBuf;

use thiserror::Error;

use crate::order::{OrderCode, SubEventId};
use crate::service::OrderError;

/// Result type alias for operations that may fail with a raffle error.
///
/// # Examples
///
/// ```
/// use raffle::{Error, Result};
///
/// fn example_operation() -> Result<usize> {
///     Ok(3)
/// }
/// ```
pub type Result<T> = std::result::Result<T, Error>;

/// The main error type for the raffle library.
#[derive(Debug, Error)]
pub enum Error {
    /// A validation error occurred.
    #[error("validation error for '{field}': {message}")]
    Validation {
        /// The field that failed validation.
        field: String,
        /// A description of the validation failure.
        message: String,
    },

    /// A database error occurred.
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// A configuration error occurred.
    #[error("configuration error: {0}")]
    Configuration(#[from] serde_yaml::Error),

    /// A JSON (de)serialization error occurred.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The requested resource was not found.
    #[error("not found: {resource}")]
    NotFound {
        /// The resource that was not found.
        resource: String,
    },

    /// An order could not be approved or denied.
    ///
    /// This is the recoverable failure kind: the approval executor records it
    /// in the order's audit trail and moves on to the next order.
    #[error("order {code}: {source}")]
    Order {
        /// The order the side effect was attempted on.
        code: OrderCode,
        /// The domain reason.
        #[source]
        source: OrderError,
    },

    /// Another run already holds the lock for this occurrence.
    #[error("a run for event '{event}' ({}) is already in progress", display_subevent(*.subevent))]
    RunInProgress {
        /// The event slug.
        event: String,
        /// The occurrence, if the event has several.
        subevent: Option<SubEventId>,
    },

    /// A clique with the same name already exists for the event.
    #[error("duplicate clique name '{name}' for event '{event}'")]
    DuplicateClique {
        /// The event slug.
        event: String,
        /// The conflicting name.
        name: String,
    },

    /// The clique password did not match.
    #[error("password does not match for clique '{name}'")]
    CliqueAuth {
        /// The clique name.
        name: String,
    },

    /// A database lock timeout occurred.
    #[error("database lock timeout after {seconds}s")]
    LockTimeout {
        /// The number of seconds waited before timing out.
        seconds: u64,
    },

    /// The data directory was not found and auto-initialization is disabled.
    #[error("data directory not found: {}", path.display())]
    DataDirectoryNotFound {
        /// The expected path to the data directory.
        path: PathBuf,
    },

    /// An unsupported schema version was encountered.
    #[error("unsupported schema version: expected {expected}, found {found}")]
    UnsupportedSchemaVersion {
        /// The expected schema version.
        expected: u32,
        /// The schema version found in the database.
        found: u32,
    },
}

fn display_subevent(subevent: Option<SubEventId>) -> String {
    match subevent {
        Some(id) => format!("subevent {id}"),
        None => "no subevent".to_string(),
    }
}

impl From<crate::order::ValidationError> for Error {
    fn from(err: crate::order::ValidationError) -> Self {
        Self::Validation {
            field: err.field,
            message: err.message,
        }
    }
}

impl Error {
    /// Check if error is a recoverable per-order failure.
    ///
    /// # Examples
    ///
    /// ```
    /// use raffle::{Error, OrderCode};
    /// use raffle::service::OrderError;
    ///
    /// let err = Error::Order {
    ///     code: OrderCode::new("ABC12").unwrap(),
    ///     source: OrderError::NotPending,
    /// };
    /// assert!(err.is_order_failure());
    /// ```
    #[must_use]
    pub fn is_order_failure(&self) -> bool {
        matches!(self, Self::Order { .. })
    }

    /// Check if error means the resource does not exist.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error() {
        let err = Error::Validation {
            field: "raffle_size".to_string(),
            message: "must be an integer".to_string(),
        };
        let display = format!("{err}");
        assert!(display.contains("validation error"));
        assert!(display.contains("raffle_size"));
        assert!(display.contains("must be an integer"));
    }

    #[test]
    fn test_order_error_display() {
        let err = Error::Order {
            code: OrderCode::new("ab12c").unwrap(),
            source: OrderError::QuotaExceeded {
                subevent: Some(SubEventId::new(3)),
                requested: 4,
                available: 1,
            },
        };
        let display = format!("{err}");
        assert!(display.contains("AB12C"));
        assert!(display.contains("quota"));
        assert!(err.is_order_failure());
    }

    #[test]
    fn test_run_in_progress_error() {
        let err = Error::RunInProgress {
            event: "summer".to_string(),
            subevent: Some(SubEventId::new(7)),
        };
        let display = format!("{err}");
        assert!(display.contains("summer"));
        assert!(display.contains("subevent 7"));

        let err = Error::RunInProgress {
            event: "summer".to_string(),
            subevent: None,
        };
        assert!(format!("{err}").contains("no subevent"));
    }

    #[test]
    fn test_duplicate_clique_error() {
        let err = Error::DuplicateClique {
            event: "summer".to_string(),
            name: "crew".to_string(),
        };
        let display = format!("{err}");
        assert!(display.contains("duplicate clique name"));
        assert!(display.contains("crew"));
    }

    #[test]
    fn test_not_found_error() {
        let err = Error::NotFound {
            resource: "order XYZ".to_string(),
        };
        assert!(format!("{err}").contains("not found"));
        assert!(err.is_not_found());
        assert!(!err.is_order_failure());
    }

    #[test]
    fn test_unsupported_schema_version_error() {
        let err = Error::UnsupportedSchemaVersion {
            expected: 1,
            found: 2,
        };
        let display = format!("{err}");
        assert!(display.contains("expected 1"));
        assert!(display.contains("found 2"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(format!("{err}").contains("I/O error"));
    }

    #[test]
    fn test_validation_error_conversion() {
        let err: Error = crate::order::ValidationError {
            field: "code".into(),
            message: "must be non-empty".into(),
        }
        .into();
        assert!(matches!(err, Error::Validation { ref field, .. } if field == "code"));
    }
}

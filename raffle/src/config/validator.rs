//! Configuration validation.

use crate::config::schema::Config;
use crate::error::{Error, Result};

/// Validates merged configuration values.
///
/// # Examples
///
/// ```
/// use raffle::config::{Config, ConfigValidator};
///
/// ConfigValidator::validate(&Config::default()).unwrap();
///
/// let bad = Config { progress_interval: Some(0), ..Default::default() };
/// assert!(ConfigValidator::validate(&bad).is_err());
/// ```
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate a complete configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] naming the first invalid field.
    pub fn validate(config: &Config) -> Result<()> {
        if config.progress_interval == Some(0) {
            return Err(Error::Validation {
                field: "progress_interval".into(),
                message: "Interval must be greater than 0".into(),
            });
        }

        if config.maximum_lock_wait_seconds == Some(0) {
            return Err(Error::Validation {
                field: "maximum_lock_wait_seconds".into(),
                message: "Timeout must be greater than 0".into(),
            });
        }

        Ok(())
    }
}

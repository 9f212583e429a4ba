//! `RAFFLE_*` environment variable overrides.

use crate::config::schema::Config;
use crate::error::{Error, Result};
use std::env;
use std::str::FromStr;

/// Overrides `progress_interval`.
pub const PROGRESS_INTERVAL_ENV: &str = "RAFFLE_PROGRESS_INTERVAL";
/// Overrides `send_mail`.
pub const SEND_MAIL_ENV: &str = "RAFFLE_SEND_MAIL";
/// Overrides `maximum_lock_wait_seconds`.
pub const LOCK_WAIT_ENV: &str = "RAFFLE_MAXIMUM_LOCK_WAIT_SECONDS";
/// Overrides `default_seed`.
pub const SEED_ENV: &str = "RAFFLE_DEFAULT_SEED";
/// Overrides `output_format`.
pub const OUTPUT_FORMAT_ENV: &str = "RAFFLE_OUTPUT_FORMAT";
/// Overrides `disable_autoinit`.
pub const DISABLE_AUTOINIT_ENV: &str = "RAFFLE_DISABLE_AUTOINIT";

/// Handles environment variable overrides for configuration.
///
/// # Examples
///
/// ```no_run
/// use raffle::config::{Config, EnvironmentConfig};
///
/// let mut config = Config::default();
/// EnvironmentConfig::apply_overrides(&mut config).unwrap();
/// ```
pub struct EnvironmentConfig;

impl EnvironmentConfig {
    /// Apply environment variable overrides to config.
    ///
    /// # Errors
    ///
    /// Returns an error if any variable holds a value of the wrong type.
    pub fn apply_overrides(config: &mut Config) -> Result<()> {
        if let Ok(val) = env::var(PROGRESS_INTERVAL_ENV) {
            config.progress_interval = Some(Self::parse_number(PROGRESS_INTERVAL_ENV, &val)?);
        }

        if let Ok(val) = env::var(SEND_MAIL_ENV) {
            config.send_mail = Some(Self::parse_bool(SEND_MAIL_ENV, &val)?);
        }

        if let Ok(val) = env::var(LOCK_WAIT_ENV) {
            config.maximum_lock_wait_seconds = Some(Self::parse_number(LOCK_WAIT_ENV, &val)?);
        }

        if let Ok(val) = env::var(SEED_ENV) {
            config.default_seed = Some(Self::parse_number(SEED_ENV, &val)?);
        }

        if let Ok(val) = env::var(OUTPUT_FORMAT_ENV) {
            config.output_format = Some(val.parse().map_err(|message| Error::Validation {
                field: OUTPUT_FORMAT_ENV.into(),
                message,
            })?);
        }

        if let Ok(val) = env::var(DISABLE_AUTOINIT_ENV) {
            config.disable_autoinit = Some(Self::parse_bool(DISABLE_AUTOINIT_ENV, &val)?);
        }

        Ok(())
    }

    /// Parse a boolean value from a string.
    ///
    /// Accepts: true/1/yes/on for true, false/0/no/off for false (case-insensitive).
    fn parse_bool(field: &str, s: &str) -> Result<bool> {
        match s.to_lowercase().as_str() {
            "true" | "1" | "yes" | "on" => Ok(true),
            "false" | "0" | "no" | "off" => Ok(false),
            _ => Err(Error::Validation {
                field: field.into(),
                message: format!(
                    "Invalid boolean value: '{s}' (expected true/false/1/0/yes/no/on/off)"
                ),
            }),
        }
    }

    fn parse_number<T: FromStr>(field: &str, s: &str) -> Result<T> {
        s.trim().parse().map_err(|_| Error::Validation {
            field: field.into(),
            message: format!("Must be a non-negative integer, got '{s}'"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::OutputFormat;
    use serial_test::serial;

    const ALL: [&str; 6] = [
        PROGRESS_INTERVAL_ENV,
        SEND_MAIL_ENV,
        LOCK_WAIT_ENV,
        SEED_ENV,
        OUTPUT_FORMAT_ENV,
        DISABLE_AUTOINIT_ENV,
    ];

    struct EnvGuard;

    impl EnvGuard {
        fn set(vars: &[(&str, &str)]) -> Self {
            for (key, value) in vars {
                env::set_var(key, value);
            }
            Self
        }
    }

    impl Drop for EnvGuard {
        fn drop(&mut self) {
            for key in ALL {
                env::remove_var(key);
            }
        }
    }

    #[test]
    #[serial]
    fn test_no_variables_leaves_config() {
        let _guard = EnvGuard::set(&[]);
        let mut config = Config::default();
        EnvironmentConfig::apply_overrides(&mut config).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    #[serial]
    fn test_all_variables_apply() {
        let _guard = EnvGuard::set(&[
            (PROGRESS_INTERVAL_ENV, "25"),
            (SEND_MAIL_ENV, "off"),
            (LOCK_WAIT_ENV, "9"),
            (SEED_ENV, "1234"),
            (OUTPUT_FORMAT_ENV, "JSON"),
            (DISABLE_AUTOINIT_ENV, "yes"),
        ]);
        let mut config = Config::default();
        EnvironmentConfig::apply_overrides(&mut config).unwrap();

        assert_eq!(config.progress_interval, Some(25));
        assert_eq!(config.send_mail, Some(false));
        assert_eq!(config.maximum_lock_wait_seconds, Some(9));
        assert_eq!(config.default_seed, Some(1234));
        assert_eq!(config.output_format, Some(OutputFormat::Json));
        assert_eq!(config.disable_autoinit, Some(true));
    }

    #[test]
    #[serial]
    fn test_invalid_values_are_rejected() {
        let _guard = EnvGuard::set(&[(SEND_MAIL_ENV, "maybe")]);
        let mut config = Config::default();
        let err = EnvironmentConfig::apply_overrides(&mut config).unwrap_err();
        assert!(matches!(err, Error::Validation { ref field, .. } if field == SEND_MAIL_ENV));
    }

    #[test]
    #[serial]
    fn test_negative_interval_is_rejected() {
        let _guard = EnvGuard::set(&[(PROGRESS_INTERVAL_ENV, "-5")]);
        let mut config = Config::default();
        assert!(EnvironmentConfig::apply_overrides(&mut config).is_err());
    }
}

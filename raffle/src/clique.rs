//! Cliques and raffle overrides.
//!
//! A clique is a named set of orders that are admitted or rejected together.
//! An override forces an order into or out of a raffle run.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::order::{EventSlug, OrderCode, ValidationError};

/// Maximum length of clique names and passwords.
pub const MAX_FIELD_LENGTH: usize = 190;

/// Minimum length of a clique password.
pub const MIN_PASSWORD_LENGTH: usize = 3;

/// Identifier of a clique.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CliqueId(i64);

impl CliqueId {
    /// Wraps a raw clique id.
    #[must_use]
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    /// Returns the raw id.
    #[must_use]
    pub const fn value(self) -> i64 {
        self.0
    }
}

impl fmt::Display for CliqueId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A named group of orders within an event.
///
/// # Examples
///
/// ```
/// use raffle::{Clique, CliqueId, EventSlug};
///
/// let clique = Clique::new(
///     CliqueId::new(1),
///     EventSlug::new("gala").unwrap(),
///     "  the crew ",
///     Some("secret".to_string()),
/// ).unwrap();
/// assert_eq!(clique.name(), "the crew");
/// assert!(clique.password_matches(Some("secret")));
/// assert!(!clique.password_matches(None));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Clique {
    id: CliqueId,
    event: EventSlug,
    name: String,
    password: Option<String>,
}

impl Clique {
    /// Creates a clique after validating its name and password.
    ///
    /// An empty password is treated as no password.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is empty or too long, or if the password
    /// is shorter than 3 or longer than 190 characters.
    pub fn new(
        id: CliqueId,
        event: EventSlug,
        name: &str,
        password: Option<String>,
    ) -> Result<Self, ValidationError> {
        let name = validate_name(name)?;
        let password = validate_password(password)?;
        Ok(Self {
            id,
            event,
            name,
            password,
        })
    }

    /// Returns the clique id.
    #[must_use]
    pub const fn id(&self) -> CliqueId {
        self.id
    }

    /// Returns the event the clique belongs to.
    #[must_use]
    pub const fn event(&self) -> &EventSlug {
        &self.event
    }

    /// Returns the clique name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns `true` if the clique is protected by a password.
    #[must_use]
    pub const fn has_password(&self) -> bool {
        self.password.is_some()
    }

    /// Checks a join attempt against the clique password.
    ///
    /// A clique without a password accepts a missing or empty password.
    #[must_use]
    pub fn password_matches(&self, candidate: Option<&str>) -> bool {
        let candidate = candidate.filter(|c| !c.is_empty());
        self.password.as_deref() == candidate
    }
}

/// Validates and trims a clique name.
///
/// # Errors
///
/// Returns an error if the name is empty after trimming or too long.
pub fn validate_name(name: &str) -> Result<String, ValidationError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(ValidationError {
            field: "name".into(),
            message: "clique name is required".into(),
        });
    }
    if trimmed.chars().count() > MAX_FIELD_LENGTH {
        return Err(ValidationError {
            field: "name".into(),
            message: format!("clique name cannot exceed {MAX_FIELD_LENGTH} characters"),
        });
    }
    Ok(trimmed.to_string())
}

/// Validates an optional clique password.
///
/// # Errors
///
/// Returns an error if a non-empty password is outside the allowed length.
pub fn validate_password(password: Option<String>) -> Result<Option<String>, ValidationError> {
    let Some(password) = password.filter(|p| !p.is_empty()) else {
        return Ok(None);
    };
    let len = password.chars().count();
    if len < MIN_PASSWORD_LENGTH || len > MAX_FIELD_LENGTH {
        return Err(ValidationError {
            field: "password".into(),
            message: format!(
                "password must be between {MIN_PASSWORD_LENGTH} and {MAX_FIELD_LENGTH} characters"
            ),
        });
    }
    Ok(Some(password))
}

/// Links an order to its clique.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CliqueMembership {
    /// The member order.
    pub order: OrderCode,
    /// The clique the order belongs to.
    pub clique: CliqueId,
    /// Whether the order administers the clique (may change its password).
    #[serde(default)]
    pub is_admin: bool,
}

/// Per-order directive for raffle runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OverrideMode {
    /// Always admit the order's unit, regardless of the quota.
    Always,
    /// Never admit the order, and void its whole clique.
    Never,
    /// Take part in the random draw.
    #[default]
    Normal,
}

impl OverrideMode {
    /// Parses a mode, normalizing anything unrecognized to `Normal`.
    ///
    /// # Examples
    ///
    /// ```
    /// use raffle::OverrideMode;
    ///
    /// assert_eq!(OverrideMode::parse_lenient("ALWAYS"), OverrideMode::Always);
    /// assert_eq!(OverrideMode::parse_lenient("sometimes"), OverrideMode::Normal);
    /// ```
    #[must_use]
    pub fn parse_lenient(s: &str) -> Self {
        s.parse().unwrap_or_default()
    }

    /// Returns the storage representation of the mode.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Always => "always",
            Self::Never => "never",
            Self::Normal => "normal",
        }
    }
}

impl fmt::Display for OverrideMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OverrideMode {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "always" => Ok(Self::Always),
            "never" => Ok(Self::Never),
            "normal" => Ok(Self::Normal),
            other => Err(ValidationError {
                field: "mode".into(),
                message: format!("unknown override mode: {other}"),
            }),
        }
    }
}

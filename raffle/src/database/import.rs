//! Bulk loading of event data from YAML or JSON fixtures.
//!
//! A fixture describes one event:
//!
//! ```yaml
//! event: gala
//! quotas:
//!   - subevent: 1
//!     size: 10
//! orders:
//!   - code: A1
//!     positions:
//!       - subevent: 1
//!       - subevent: 1
//!         admission: false
//!     override: always
//!   - code: B2
//!     status: paid
//!     require_approval: false
//!     positions:
//!       - subevent: 1
//! cliques:
//!   - name: crew
//!     password: secret
//!     members: [A1, B2]
//! ```
//!
//! The first member listed for a clique becomes its administrator.

use std::path::Path;

use rusqlite::{params, Connection, OptionalExtension};
use serde::{Deserialize, Serialize};

use crate::clique::{validate_name, validate_password, OverrideMode};
use crate::error::{Error, Result};
use crate::order::{EventSlug, Order, OrderCode, OrderPosition, OrderStatus, SubEventId};

use super::connection::Database;
use super::operations::load_order;

/// An event's orders, cliques, overrides and quotas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventFixture {
    /// The event slug.
    pub event: String,
    /// Orders of the event.
    #[serde(default)]
    pub orders: Vec<OrderFixture>,
    /// Cliques of the event.
    #[serde(default)]
    pub cliques: Vec<CliqueFixture>,
    /// Ticket quotas per occurrence.
    #[serde(default)]
    pub quotas: Vec<QuotaFixture>,
}

/// One order of a fixture.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderFixture {
    /// Order code.
    pub code: String,
    /// Lifecycle status, `pending` if omitted.
    #[serde(default = "default_status")]
    pub status: OrderStatus,
    /// Whether the order awaits approval, `true` if omitted.
    #[serde(default = "default_true")]
    pub require_approval: bool,
    /// Line items.
    #[serde(default)]
    pub positions: Vec<OrderPosition>,
    /// Raffle override; unknown values are read as `normal`.
    #[serde(default, rename = "override")]
    pub override_mode: Option<String>,
}

/// One clique of a fixture.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CliqueFixture {
    /// Clique name.
    pub name: String,
    /// Optional join password.
    #[serde(default)]
    pub password: Option<String>,
    /// Codes of the member orders, administrator first.
    #[serde(default)]
    pub members: Vec<String>,
}

/// A quota line of a fixture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuotaFixture {
    /// The occurrence, absent for single-occurrence events.
    #[serde(default)]
    pub subevent: Option<SubEventId>,
    /// Number of admission tickets available.
    pub size: u32,
}

const fn default_status() -> OrderStatus {
    OrderStatus::Pending
}

const fn default_true() -> bool {
    true
}

impl EventFixture {
    /// Reads a fixture file; `.json` files are parsed as JSON, anything else
    /// as YAML.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;
        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        if is_json {
            Self::from_json_str(&contents)
        } else {
            Self::from_yaml_str(&contents)
        }
    }

    /// Parses a YAML fixture.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] if the document is malformed.
    pub fn from_yaml_str(contents: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(contents)?)
    }

    /// Parses a JSON fixture.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Serialization`] if the document is malformed.
    pub fn from_json_str(contents: &str) -> Result<Self> {
        Ok(serde_json::from_str(contents)?)
    }
}

/// Counts of what an import wrote.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ImportResult {
    /// Orders inserted or replaced.
    pub orders: usize,
    /// Cliques created; existing cliques of the same name are reused.
    pub cliques: usize,
    /// Memberships written.
    pub memberships: usize,
    /// Overrides written.
    pub overrides: usize,
    /// Quotas written.
    pub quotas: usize,
}

fn clique_id(conn: &Connection, event: &EventSlug, name: &str, password: Option<&str>) -> Result<(i64, bool)> {
    let existing: Option<i64> = conn
        .query_row(
            "SELECT id FROM cliques WHERE event = ? AND name = ?",
            params![event.as_str(), name],
            |row| row.get(0),
        )
        .optional()?;
    if let Some(id) = existing {
        conn.execute(
            "UPDATE cliques SET password = ? WHERE id = ?",
            params![password, id],
        )?;
        return Ok((id, false));
    }
    conn.execute(
        "INSERT INTO cliques (event, name, password) VALUES (?, ?, ?)",
        params![event.as_str(), name, password],
    )?;
    Ok((conn.last_insert_rowid(), true))
}

impl Database {
    /// Writes a fixture in a single transaction.
    ///
    /// Orders are replaced wholesale; clique members are moved out of any
    /// previous clique.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] if the fixture contains invalid values
    /// or a clique member belongs to another event, and [`Error::NotFound`]
    /// if a member is not a known order. Nothing is written on error.
    pub fn import_snapshot(&self, fixture: &EventFixture) -> Result<ImportResult> {
        let event = EventSlug::new(&fixture.event)?;
        let mut result = ImportResult::default();

        let tx = self.conn.unchecked_transaction()?;

        for spec in &fixture.orders {
            let order = Order::builder(event.clone(), OrderCode::new(&spec.code)?)
                .status(spec.status)
                .require_approval(spec.require_approval)
                .positions(spec.positions.iter().copied())
                .build()?;
            Self::upsert_order_simple(&tx, &order)?;
            result.orders += 1;

            if let Some(mode) = &spec.override_mode {
                Self::set_override_simple(&tx, order.code(), OverrideMode::parse_lenient(mode))?;
                result.overrides += 1;
            }
        }

        for quota in &fixture.quotas {
            Self::set_quota_simple(&tx, &event, quota.subevent, quota.size)?;
            result.quotas += 1;
        }

        for spec in &fixture.cliques {
            let name = validate_name(&spec.name)?;
            let password = validate_password(spec.password.clone())?;
            let (id, created) = clique_id(&tx, &event, &name, password.as_deref())?;
            if created {
                result.cliques += 1;
            }

            for (index, member) in spec.members.iter().enumerate() {
                let code = OrderCode::new(member)?;
                let order = load_order(&tx, &code)?.ok_or_else(|| Error::NotFound {
                    resource: format!("order {code}"),
                })?;
                if order.event() != &event {
                    return Err(Error::Validation {
                        field: "members".into(),
                        message: format!("order {code} belongs to event {}", order.event()),
                    });
                }
                tx.execute(
                    "INSERT INTO order_cliques (order_code, clique_id, is_admin) VALUES (?1, ?2, ?3) \
                     ON CONFLICT(order_code) DO UPDATE SET clique_id = ?2, is_admin = ?3",
                    params![code.as_str(), id, index == 0],
                )?;
                result.memberships += 1;
            }
        }

        tx.commit()?;
        log::info!(
            "imported {} orders and {} cliques into {event}",
            result.orders,
            result.cliques
        );
        Ok(result)
    }
}

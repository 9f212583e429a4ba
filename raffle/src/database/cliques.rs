//! Clique membership and raffle override management.

use rusqlite::{params, Connection, OptionalExtension};
use serde_json::json;

use crate::clique::{validate_name, validate_password, Clique, CliqueId, CliqueMembership, OverrideMode};
use crate::error::{Error, Result};
use crate::order::{EventSlug, Order, OrderCode, OrderStatus, UserId};
use crate::service::actions;

use super::connection::Database;
use super::operations::load_order;

const SELECT_CLIQUE_COLUMNS: &str = "SELECT id, event, name, password FROM cliques";

fn row_to_clique(row: &rusqlite::Row<'_>) -> rusqlite::Result<(i64, String, String, Option<String>)> {
    Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?))
}

fn build_clique(raw: (i64, String, String, Option<String>)) -> Result<Clique> {
    let (id, event, name, password) = raw;
    Ok(Clique::new(
        CliqueId::new(id),
        EventSlug::new(event)?,
        &name,
        password,
    )?)
}

fn not_found(resource: String) -> Error {
    Error::NotFound { resource }
}

/// Loads an order whose clique may still be changed.
///
/// Canceled orders are frozen.
fn load_editable(conn: &Connection, code: &OrderCode) -> Result<Order> {
    let order = load_order(conn, code)?.ok_or_else(|| not_found(format!("order {code}")))?;
    match order.status() {
        OrderStatus::Pending | OrderStatus::Expired | OrderStatus::Paid => Ok(order),
        OrderStatus::Canceled => Err(Error::Validation {
            field: "order".into(),
            message: format!("order {code} is canceled"),
        }),
    }
}

fn membership_of(conn: &Connection, code: &OrderCode) -> Result<Option<CliqueMembership>> {
    let membership = conn
        .query_row(
            "SELECT clique_id, is_admin FROM order_cliques WHERE order_code = ?",
            [code.as_str()],
            |row| {
                Ok(CliqueMembership {
                    order: code.clone(),
                    clique: CliqueId::new(row.get(0)?),
                    is_admin: row.get(1)?,
                })
            },
        )
        .optional()?;
    Ok(membership)
}

fn ensure_unattached(conn: &Connection, code: &OrderCode) -> Result<()> {
    if membership_of(conn, code)?.is_some() {
        return Err(Error::Validation {
            field: "order".into(),
            message: format!("order {code} already belongs to a clique"),
        });
    }
    Ok(())
}

fn find_clique_simple(conn: &Connection, event: &EventSlug, name: &str) -> Result<Option<Clique>> {
    let raw = conn
        .query_row(
            &format!("{SELECT_CLIQUE_COLUMNS} WHERE event = ? AND name = ?"),
            params![event.as_str(), name],
            row_to_clique,
        )
        .optional()?;
    raw.map(build_clique).transpose()
}

impl Database {
    /// Creates a clique and makes `order` its administrator.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicateClique`] if the event already has a clique of
    /// that name, [`Error::Validation`] if the name or password is invalid or
    /// the order is canceled or already grouped, and [`Error::NotFound`] if
    /// the order does not exist.
    pub fn create_clique(
        &self,
        order: &OrderCode,
        name: &str,
        password: Option<String>,
    ) -> Result<Clique> {
        let name = validate_name(name)?;
        let password = validate_password(password)?;

        let tx = self.conn.unchecked_transaction()?;
        let owner = load_editable(&tx, order)?;
        ensure_unattached(&tx, order)?;
        if find_clique_simple(&tx, owner.event(), &name)?.is_some() {
            return Err(Error::DuplicateClique {
                event: owner.event().to_string(),
                name,
            });
        }

        tx.execute(
            "INSERT INTO cliques (event, name, password) VALUES (?, ?, ?)",
            params![owner.event().as_str(), name, password],
        )?;
        let id = CliqueId::new(tx.last_insert_rowid());
        tx.execute(
            "INSERT INTO order_cliques (order_code, clique_id, is_admin) VALUES (?, ?, 1)",
            params![order.as_str(), id.value()],
        )?;
        Self::insert_log_entry(
            &tx,
            order,
            actions::CLIQUE_CREATED,
            &json!({ "clique": id.value() }),
            None,
        )?;
        tx.commit()?;

        log::debug!("order {order} created clique {id} '{name}'");
        Ok(Clique::new(id, owner.event().clone(), &name, password)?)
    }

    /// Adds `order` to the clique called `name` within its event.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if the order or clique does not exist,
    /// [`Error::CliqueAuth`] if the password does not match, and
    /// [`Error::Validation`] if the order is canceled or already grouped.
    pub fn join_clique(&self, order: &OrderCode, name: &str, password: Option<&str>) -> Result<Clique> {
        let tx = self.conn.unchecked_transaction()?;
        let member = load_editable(&tx, order)?;
        ensure_unattached(&tx, order)?;

        let clique = find_clique_simple(&tx, member.event(), name.trim())?
            .ok_or_else(|| not_found(format!("clique '{}'", name.trim())))?;
        if !clique.password_matches(password) {
            return Err(Error::CliqueAuth {
                name: clique.name().to_string(),
            });
        }

        tx.execute(
            "INSERT INTO order_cliques (order_code, clique_id, is_admin) VALUES (?, ?, 0)",
            params![order.as_str(), clique.id().value()],
        )?;
        Self::insert_log_entry(
            &tx,
            order,
            actions::CLIQUE_JOINED,
            &json!({ "clique": clique.id().value() }),
            None,
        )?;
        tx.commit()?;

        log::debug!("order {order} joined clique {}", clique.id());
        Ok(clique)
    }

    /// Removes `order` from its clique. The clique itself stays.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if the order does not exist or is not in a
    /// clique, and [`Error::Validation`] if it is canceled.
    pub fn leave_clique(&self, order: &OrderCode) -> Result<CliqueId> {
        let tx = self.conn.unchecked_transaction()?;
        load_editable(&tx, order)?;
        let membership = membership_of(&tx, order)?
            .ok_or_else(|| not_found(format!("clique membership of order {order}")))?;

        tx.execute(
            "DELETE FROM order_cliques WHERE order_code = ?",
            [order.as_str()],
        )?;
        Self::insert_log_entry(
            &tx,
            order,
            actions::CLIQUE_LEFT,
            &json!({ "clique": membership.clique.value() }),
            None,
        )?;
        tx.commit()?;

        log::debug!("order {order} left clique {}", membership.clique);
        Ok(membership.clique)
    }

    /// Replaces the password of the clique `order` administers.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] if the password is invalid or the order
    /// is not the clique's administrator, and [`Error::NotFound`] if the order
    /// does not exist.
    pub fn change_clique_password(&self, order: &OrderCode, password: Option<String>) -> Result<()> {
        let password = validate_password(password)?;

        let tx = self.conn.unchecked_transaction()?;
        load_editable(&tx, order)?;
        let membership = membership_of(&tx, order)?
            .filter(|m| m.is_admin)
            .ok_or_else(|| Error::Validation {
                field: "order".into(),
                message: format!("order {order} does not administer a clique"),
            })?;

        tx.execute(
            "UPDATE cliques SET password = ? WHERE id = ?",
            params![password, membership.clique.value()],
        )?;
        Self::insert_log_entry(
            &tx,
            order,
            actions::CLIQUE_CHANGED,
            &json!({ "clique": membership.clique.value() }),
            None,
        )?;
        tx.commit()?;
        Ok(())
    }

    /// Returns a clique by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn get_clique(&self, id: CliqueId) -> Result<Option<Clique>> {
        let raw = self
            .conn
            .query_row(
                &format!("{SELECT_CLIQUE_COLUMNS} WHERE id = ?"),
                [id.value()],
                row_to_clique,
            )
            .optional()?;
        raw.map(build_clique).transpose()
    }

    /// Looks up a clique by event and name.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn find_clique(&self, event: &EventSlug, name: &str) -> Result<Option<Clique>> {
        find_clique_simple(&self.conn, event, name.trim())
    }

    /// Lists an event's cliques with their member count, ordered by name.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_cliques(&self, event: &EventSlug) -> Result<Vec<(Clique, usize)>> {
        let mut stmt = self.conn.prepare(
            "SELECT c.id, c.event, c.name, c.password, COUNT(oc.order_code) FROM cliques c \
             LEFT JOIN order_cliques oc ON oc.clique_id = c.id \
             WHERE c.event = ? GROUP BY c.id ORDER BY c.name",
        )?;
        let rows = stmt
            .query_map([event.as_str()], |row| {
                let count: i64 = row.get(4)?;
                Ok((row_to_clique(row)?, count))
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        rows.into_iter()
            .map(|(raw, count)| Ok((build_clique(raw)?, usize::try_from(count).unwrap_or(0))))
            .collect()
    }

    /// Returns the clique membership of an order, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn clique_membership(&self, order: &OrderCode) -> Result<Option<CliqueMembership>> {
        membership_of(&self.conn, order)
    }

    /// Sets an order's raffle override.
    ///
    /// Unknown modes are stored as `normal`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if the order does not exist.
    pub fn set_override(&self, order: &OrderCode, mode: &str, user: Option<UserId>) -> Result<OverrideMode> {
        let mode = OverrideMode::parse_lenient(mode);

        let tx = self.conn.unchecked_transaction()?;
        if load_order(&tx, order)?.is_none() {
            return Err(not_found(format!("order {order}")));
        }
        Self::set_override_simple(&tx, order, mode)?;
        Self::insert_log_entry(
            &tx,
            order,
            actions::OVERRIDE_CHANGED,
            &json!({ "mode": mode.as_str() }),
            user,
        )?;
        tx.commit()?;

        log::debug!("override of {order} set to {mode}");
        Ok(mode)
    }

    pub(super) fn set_override_simple(conn: &Connection, order: &OrderCode, mode: OverrideMode) -> Result<()> {
        conn.execute(
            "INSERT INTO raffle_overrides (order_code, mode) VALUES (?1, ?2) \
             ON CONFLICT(order_code) DO UPDATE SET mode = ?2",
            params![order.as_str(), mode.as_str()],
        )?;
        Ok(())
    }
}

//! Order, quota and audit queries.

use chrono::{DateTime, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension};
use serde::Serialize;

use crate::clique::{CliqueId, OverrideMode};
use crate::error::{Error, Result};
use crate::order::{EventSlug, Order, OrderCode, OrderPosition, OrderStatus, SubEventId, UserId};
use crate::snapshot::EventSnapshot;

use super::connection::Database;
use super::schema::{INSERT_LOG_ENTRY, SELECT_ORDER, SELECT_POSITIONS};

/// An entry of an order's audit trail.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LogEntry {
    /// The order the entry belongs to.
    pub order: OrderCode,
    /// Action name, e.g. `raffle.approve_failed`.
    pub action: String,
    /// Structured detail.
    pub data: serde_json::Value,
    /// The acting user, if any.
    pub user: Option<UserId>,
    /// When the entry was written.
    pub created_at: DateTime<Utc>,
}

fn conversion_error(
    column: usize,
    err: impl std::error::Error + Send + Sync + 'static,
) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(column, Type::Text, Box::new(err))
}

pub(super) fn subevent_param(subevent: Option<SubEventId>) -> Option<i64> {
    subevent.map(SubEventId::value)
}

fn read_positions(conn: &Connection, code: &OrderCode) -> Result<Vec<OrderPosition>> {
    let mut stmt = conn.prepare_cached(SELECT_POSITIONS)?;
    let positions = stmt
        .query_map([code.as_str()], |row| {
            Ok(OrderPosition {
                subevent: row.get::<_, Option<i64>>(0)?.map(SubEventId::new),
                admission: row.get(1)?,
                canceled: row.get(2)?,
            })
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(positions)
}

fn read_order(conn: &Connection, header: OrderHeader) -> Result<Order> {
    let positions = read_positions(conn, &header.code)?;
    Ok(Order::builder(header.event, header.code)
        .status(header.status)
        .require_approval(header.require_approval)
        .positions(positions)
        .build()?)
}

struct OrderHeader {
    code: OrderCode,
    event: EventSlug,
    status: OrderStatus,
    require_approval: bool,
}

fn row_to_header(row: &rusqlite::Row<'_>) -> rusqlite::Result<OrderHeader> {
    let code: String = row.get(0)?;
    let event: String = row.get(1)?;
    let status: String = row.get(2)?;
    Ok(OrderHeader {
        code: OrderCode::new(code).map_err(|e| conversion_error(0, e))?,
        event: EventSlug::new(event).map_err(|e| conversion_error(1, e))?,
        status: status.parse().map_err(|e| conversion_error(2, e))?,
        require_approval: row.get(3)?,
    })
}

pub(super) fn load_order(conn: &Connection, code: &OrderCode) -> Result<Option<Order>> {
    let header = conn
        .query_row(SELECT_ORDER, [code.as_str()], row_to_header)
        .optional()?;
    header.map(|h| read_order(conn, h)).transpose()
}

impl Database {
    /// Looks up an order with its line items.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or stored data is invalid.
    pub fn get_order(&self, code: &OrderCode) -> Result<Option<Order>> {
        load_order(&self.conn, code)
    }

    /// Looks up an order, failing if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if there is no such order.
    pub fn require_order(&self, code: &OrderCode) -> Result<Order> {
        self.get_order(code)?.ok_or_else(|| Error::NotFound {
            resource: format!("order {code}"),
        })
    }

    /// Lists an event's orders, ordered by code.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or stored data is invalid.
    pub fn list_orders(&self, event: &EventSlug) -> Result<Vec<Order>> {
        let mut stmt = self.conn.prepare(
            "SELECT code, event, status, require_approval FROM orders \
             WHERE event = ? ORDER BY code",
        )?;
        let headers = stmt
            .query_map([event.as_str()], row_to_header)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        headers
            .into_iter()
            .map(|h| read_order(&self.conn, h))
            .collect()
    }

    /// Loads everything a run needs to know about an event.
    ///
    /// Orders come back ordered by code, so plans built from the same data
    /// and seed are identical.
    ///
    /// # Errors
    ///
    /// Returns an error if a query fails or stored data is invalid.
    pub fn load_snapshot(&self, event: &EventSlug) -> Result<EventSnapshot> {
        let mut snapshot = EventSnapshot::new(event.clone()).with_orders(self.list_orders(event)?);

        let mut stmt = self.conn.prepare(
            "SELECT oc.order_code, oc.clique_id FROM order_cliques oc \
             JOIN orders o ON o.code = oc.order_code WHERE o.event = ?",
        )?;
        let memberships = stmt
            .query_map([event.as_str()], |row| {
                let code: String = row.get(0)?;
                let clique: i64 = row.get(1)?;
                Ok((code, clique))
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        for (code, clique) in memberships {
            snapshot = snapshot.with_membership(OrderCode::new(code)?, CliqueId::new(clique));
        }

        let mut stmt = self.conn.prepare(
            "SELECT r.order_code, r.mode FROM raffle_overrides r \
             JOIN orders o ON o.code = r.order_code WHERE o.event = ?",
        )?;
        let overrides = stmt
            .query_map([event.as_str()], |row| {
                let code: String = row.get(0)?;
                let mode: String = row.get(1)?;
                Ok((code, mode))
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        for (code, mode) in overrides {
            snapshot = snapshot.with_override(OrderCode::new(code)?, OverrideMode::parse_lenient(&mode));
        }

        log::debug!(
            "loaded snapshot of {event}: {} orders",
            snapshot.orders().len()
        );
        Ok(snapshot)
    }

    /// Inserts or replaces an order and its line items.
    ///
    /// # Errors
    ///
    /// Returns an error if a statement fails.
    pub fn upsert_order(&self, order: &Order) -> Result<()> {
        let tx = self.conn.unchecked_transaction()?;
        Self::upsert_order_simple(&tx, order)?;
        tx.commit()?;
        Ok(())
    }

    /// Inserts or replaces an order within an existing transaction.
    ///
    /// # Errors
    ///
    /// Returns an error if a statement fails.
    pub fn upsert_order_simple(conn: &Connection, order: &Order) -> Result<()> {
        conn.execute(
            "INSERT INTO orders (code, event, status, require_approval) VALUES (?1, ?2, ?3, ?4) \
             ON CONFLICT(code) DO UPDATE SET event = ?2, status = ?3, require_approval = ?4",
            params![
                order.code().as_str(),
                order.event().as_str(),
                order.status().as_str(),
                order.require_approval(),
            ],
        )?;
        conn.execute(
            "DELETE FROM positions WHERE order_code = ?",
            [order.code().as_str()],
        )?;

        let mut stmt = conn.prepare_cached(
            "INSERT INTO positions (order_code, subevent, admission, canceled) VALUES (?, ?, ?, ?)",
        )?;
        for position in order.positions() {
            stmt.execute(params![
                order.code().as_str(),
                subevent_param(position.subevent),
                position.admission,
                position.canceled,
            ])?;
        }
        Ok(())
    }

    /// Sets the ticket quota of an occurrence, replacing any previous one.
    ///
    /// # Errors
    ///
    /// Returns an error if a statement fails.
    pub fn set_quota(&self, event: &EventSlug, subevent: Option<SubEventId>, size: u32) -> Result<()> {
        let tx = self.conn.unchecked_transaction()?;
        Self::set_quota_simple(&tx, event, subevent, size)?;
        tx.commit()?;
        Ok(())
    }

    pub(super) fn set_quota_simple(
        conn: &Connection,
        event: &EventSlug,
        subevent: Option<SubEventId>,
        size: u32,
    ) -> Result<()> {
        // NULL never equals NULL, so replace by hand instead of relying on a key.
        conn.execute(
            "DELETE FROM quotas WHERE event = ? AND subevent IS ?",
            params![event.as_str(), subevent_param(subevent)],
        )?;
        conn.execute(
            "INSERT INTO quotas (event, subevent, size) VALUES (?, ?, ?)",
            params![event.as_str(), subevent_param(subevent), size],
        )?;
        Ok(())
    }

    /// Returns the quota of an occurrence, if one is set.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn get_quota(&self, event: &EventSlug, subevent: Option<SubEventId>) -> Result<Option<u32>> {
        let size = self
            .conn
            .query_row(
                "SELECT size FROM quotas WHERE event = ? AND subevent IS ?",
                params![event.as_str(), subevent_param(subevent)],
                |row| row.get(0),
            )
            .optional()?;
        Ok(size)
    }

    /// Counts live admission tickets of approved orders for an occurrence.
    ///
    /// An order counts once it no longer awaits approval and is not
    /// canceled or expired.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn count_approved_tickets(
        &self,
        event: &EventSlug,
        subevent: Option<SubEventId>,
    ) -> Result<u32> {
        Self::count_approved_tickets_simple(&self.conn, event, subevent)
    }

    pub(super) fn count_approved_tickets_simple(
        conn: &Connection,
        event: &EventSlug,
        subevent: Option<SubEventId>,
    ) -> Result<u32> {
        let count: u32 = conn.query_row(
            "SELECT COUNT(*) FROM positions p JOIN orders o ON o.code = p.order_code \
             WHERE o.event = ? AND p.subevent IS ? AND p.admission = 1 AND p.canceled = 0 \
             AND o.require_approval = 0 AND o.status IN ('pending', 'paid')",
            params![event.as_str(), subevent_param(subevent)],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    /// Returns an order's audit trail, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or an entry cannot be decoded.
    pub fn log_entries(&self, order: &OrderCode) -> Result<Vec<LogEntry>> {
        let mut stmt = self.conn.prepare(
            "SELECT order_code, action, data, user_id, created_at FROM log_entries \
             WHERE order_code = ? ORDER BY id",
        )?;
        let entries = stmt
            .query_map([order.as_str()], |row| {
                let code: String = row.get(0)?;
                let data: String = row.get(2)?;
                let created_at: String = row.get(4)?;
                Ok(LogEntry {
                    order: OrderCode::new(code).map_err(|e| conversion_error(0, e))?,
                    action: row.get(1)?,
                    data: serde_json::from_str(&data).map_err(|e| conversion_error(2, e))?,
                    user: row.get::<_, Option<i64>>(3)?.map(UserId::new),
                    created_at: DateTime::parse_from_rfc3339(&created_at)
                        .map_err(|e| conversion_error(4, e))?
                        .with_timezone(&Utc),
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(entries)
    }

    pub(super) fn insert_log_entry(
        conn: &Connection,
        order: &OrderCode,
        action: &str,
        data: &serde_json::Value,
        user: Option<UserId>,
    ) -> Result<()> {
        conn.execute(
            INSERT_LOG_ENTRY,
            params![
                order.as_str(),
                action,
                serde_json::to_string(data)?,
                user.map(UserId::value),
                Utc::now().to_rfc3339(),
            ],
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::test_util::{create_test_database, pending_order};

    #[test]
    fn test_upsert_and_get_order() {
        let db = create_test_database();
        let order = pending_order("gala", "A1", &[Some(1), Some(1)]);
        db.upsert_order(&order).unwrap();

        let loaded = db.require_order(&order.code().clone()).unwrap();
        assert_eq!(loaded, order);
    }

    #[test]
    fn test_upsert_replaces_positions() {
        let db = create_test_database();
        db.upsert_order(&pending_order("gala", "A1", &[Some(1), Some(1)]))
            .unwrap();
        db.upsert_order(&pending_order("gala", "A1", &[Some(2)]))
            .unwrap();

        let loaded = db.require_order(&OrderCode::new("A1").unwrap()).unwrap();
        assert_eq!(loaded.positions().len(), 1);
        assert_eq!(loaded.tickets_for(Some(SubEventId::new(2))), 1);
    }

    #[test]
    fn test_missing_order() {
        let db = create_test_database();
        let code = OrderCode::new("NOPE").unwrap();
        assert!(db.get_order(&code).unwrap().is_none());
        assert!(db.require_order(&code).unwrap_err().is_not_found());
    }

    #[test]
    fn test_snapshot_is_scoped_to_event_and_sorted() {
        let db = create_test_database();
        db.upsert_order(&pending_order("gala", "B", &[None])).unwrap();
        db.upsert_order(&pending_order("gala", "A", &[None])).unwrap();
        db.upsert_order(&pending_order("other", "C", &[None])).unwrap();
        db.conn
            .execute(
                "INSERT INTO raffle_overrides (order_code, mode) VALUES ('A', 'bogus')",
                [],
            )
            .unwrap();

        let snapshot = db.load_snapshot(&EventSlug::new("gala").unwrap()).unwrap();
        let codes: Vec<&str> = snapshot.orders().iter().map(|o| o.code().as_str()).collect();
        assert_eq!(codes, vec!["A", "B"]);
        assert_eq!(
            snapshot.override_of(&OrderCode::new("A").unwrap()),
            OverrideMode::Normal
        );
    }

    #[test]
    fn test_quota_replace_with_null_subevent() {
        let db = create_test_database();
        let event = EventSlug::new("gala").unwrap();
        db.set_quota(&event, None, 10).unwrap();
        db.set_quota(&event, None, 4).unwrap();
        db.set_quota(&event, Some(SubEventId::new(1)), 7).unwrap();

        assert_eq!(db.get_quota(&event, None).unwrap(), Some(4));
        assert_eq!(db.get_quota(&event, Some(SubEventId::new(1))).unwrap(), Some(7));
        assert_eq!(db.get_quota(&event, Some(SubEventId::new(2))).unwrap(), None);
    }

    #[test]
    fn test_log_entries_round_trip() {
        let db = create_test_database();
        let code = OrderCode::new("A1").unwrap();
        Database::insert_log_entry(
            &db.conn,
            &code,
            "raffle.approve_failed",
            &serde_json::json!({"detail": "quota"}),
            Some(UserId::new(5)),
        )
        .unwrap();

        let entries = db.log_entries(&code).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].action, "raffle.approve_failed");
        assert_eq!(entries[0].data["detail"], "quota");
        assert_eq!(entries[0].user, Some(UserId::new(5)));
    }
}

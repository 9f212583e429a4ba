//! The SQLite store as order service and audit log.

use std::collections::BTreeSet;

use rusqlite::{params, Connection, OptionalExtension, Transaction, TransactionBehavior};
use serde_json::json;

use crate::error::{Error, Result};
use crate::order::{Order, OrderCode, OrderStatus, SubEventId, UserId};
use crate::service::{actions, AuditLog, OrderError, OrderService};

use super::connection::Database;
use super::operations::{load_order, subevent_param};

fn refuse(code: &OrderCode, source: OrderError) -> Error {
    Error::Order {
        code: code.clone(),
        source,
    }
}

/// Loads an order that is still waiting for a decision.
fn load_gated(conn: &Connection, code: &OrderCode) -> Result<Order> {
    let order = load_order(conn, code)?.ok_or_else(|| refuse(code, OrderError::UnknownOrder))?;
    if order.status() != OrderStatus::Pending {
        return Err(refuse(code, OrderError::NotPending));
    }
    if !order.require_approval() {
        return Err(refuse(code, OrderError::ApprovalNotRequired));
    }
    Ok(order)
}

fn quota_of(conn: &Connection, order: &Order, subevent: Option<SubEventId>) -> Result<Option<u32>> {
    let size = conn
        .query_row(
            "SELECT size FROM quotas WHERE event = ? AND subevent IS ?",
            params![order.event().as_str(), subevent_param(subevent)],
            |row| row.get(0),
        )
        .optional()?;
    Ok(size)
}

/// Fails if approving `order` would overbook any of its occurrences.
fn check_quotas(conn: &Connection, order: &Order) -> Result<()> {
    let occurrences: BTreeSet<Option<SubEventId>> = order
        .positions()
        .iter()
        .filter(|p| p.is_live_admission())
        .map(|p| p.subevent)
        .collect();

    for subevent in occurrences {
        let Some(size) = quota_of(conn, order, subevent)? else {
            continue;
        };
        let approved = Database::count_approved_tickets_simple(conn, order.event(), subevent)?;
        let available = size.saturating_sub(approved);
        let requested = order.tickets_for(subevent);
        if requested > available {
            return Err(refuse(
                order.code(),
                OrderError::QuotaExceeded {
                    subevent,
                    requested,
                    available,
                },
            ));
        }
    }
    Ok(())
}

impl OrderService for Database {
    fn approve(&self, order: &OrderCode, user: UserId, send_mail: bool) -> Result<()> {
        let tx = Transaction::new_unchecked(&self.conn, TransactionBehavior::Immediate)?;
        let loaded = load_gated(&tx, order)?;
        check_quotas(&tx, &loaded)?;

        tx.execute(
            "UPDATE orders SET require_approval = 0 WHERE code = ?",
            [order.as_str()],
        )?;
        Self::insert_log_entry(
            &tx,
            order,
            actions::ORDER_APPROVED,
            &json!({ "send_mail": send_mail }),
            Some(user),
        )?;
        tx.commit()?;

        log::debug!("approved {order}");
        Ok(())
    }

    fn deny(&self, order: &OrderCode, user: UserId, send_mail: bool) -> Result<()> {
        let tx = Transaction::new_unchecked(&self.conn, TransactionBehavior::Immediate)?;
        load_gated(&tx, order)?;

        tx.execute(
            "UPDATE orders SET status = ? WHERE code = ?",
            params![OrderStatus::Canceled.as_str(), order.as_str()],
        )?;
        Self::insert_log_entry(
            &tx,
            order,
            actions::ORDER_DENIED,
            &json!({ "send_mail": send_mail }),
            Some(user),
        )?;
        tx.commit()?;

        log::debug!("denied {order}");
        Ok(())
    }
}

impl AuditLog for Database {
    fn log_action(
        &self,
        order: &OrderCode,
        action: &str,
        data: serde_json::Value,
        user: Option<UserId>,
    ) -> Result<()> {
        Self::insert_log_entry(&self.conn, order, action, &data, user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::test_util::{create_test_database, pending_order};
    use crate::order::EventSlug;

    fn code(s: &str) -> OrderCode {
        OrderCode::new(s).unwrap()
    }

    fn order_error(err: Error) -> OrderError {
        match err {
            Error::Order { source, .. } => source,
            other => panic!("expected an order failure, got {other:?}"),
        }
    }

    #[test]
    fn test_approve_clears_gate_and_logs() {
        let db = create_test_database();
        db.upsert_order(&pending_order("gala", "A1", &[None])).unwrap();

        db.approve(&code("A1"), UserId::new(7), false).unwrap();

        let order = db.require_order(&code("A1")).unwrap();
        assert!(!order.require_approval());
        assert_eq!(order.status(), OrderStatus::Pending);

        let entries = db.log_entries(&code("A1")).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].action, actions::ORDER_APPROVED);
        assert_eq!(entries[0].user, Some(UserId::new(7)));
        assert_eq!(entries[0].data["send_mail"], false);
    }

    #[test]
    fn test_approve_twice_is_refused() {
        let db = create_test_database();
        db.upsert_order(&pending_order("gala", "A1", &[None])).unwrap();
        db.approve(&code("A1"), UserId::new(1), false).unwrap();

        let err = db.approve(&code("A1"), UserId::new(1), false).unwrap_err();
        assert_eq!(order_error(err), OrderError::ApprovalNotRequired);
    }

    #[test]
    fn test_unknown_order_is_an_order_failure() {
        let db = create_test_database();
        let err = db.approve(&code("NOPE"), UserId::new(1), false).unwrap_err();
        assert_eq!(order_error(err), OrderError::UnknownOrder);
    }

    #[test]
    fn test_quota_exceeded_leaves_order_untouched() {
        let db = create_test_database();
        let event = EventSlug::new("gala").unwrap();
        let sub = Some(SubEventId::new(1));
        db.set_quota(&event, sub, 3).unwrap();
        db.upsert_order(&pending_order("gala", "A", &[Some(1), Some(1)]))
            .unwrap();
        db.upsert_order(&pending_order("gala", "B", &[Some(1), Some(1)]))
            .unwrap();

        db.approve(&code("A"), UserId::new(1), false).unwrap();
        let err = db.approve(&code("B"), UserId::new(1), false).unwrap_err();
        assert_eq!(
            order_error(err),
            OrderError::QuotaExceeded {
                subevent: sub,
                requested: 2,
                available: 1,
            }
        );

        assert!(db.require_order(&code("B")).unwrap().require_approval());
        assert!(db.log_entries(&code("B")).unwrap().is_empty());
        assert_eq!(db.count_approved_tickets(&event, sub).unwrap(), 2);
    }

    #[test]
    fn test_deny_cancels_order() {
        let db = create_test_database();
        db.upsert_order(&pending_order("gala", "A1", &[None])).unwrap();

        db.deny(&code("A1"), UserId::new(2), true).unwrap();

        let order = db.require_order(&code("A1")).unwrap();
        assert_eq!(order.status(), OrderStatus::Canceled);
        let entries = db.log_entries(&code("A1")).unwrap();
        assert_eq!(entries[0].action, actions::ORDER_DENIED);

        let err = db.deny(&code("A1"), UserId::new(2), true).unwrap_err();
        assert_eq!(order_error(err), OrderError::NotPending);
    }

    #[test]
    fn test_audit_log_writes_entry() {
        let db = create_test_database();
        db.log_action(
            &code("A1"),
            actions::APPROVE_FAILED,
            json!({ "detail": "order is not pending" }),
            None,
        )
        .unwrap();

        let entries = db.log_entries(&code("A1")).unwrap();
        assert_eq!(entries[0].data["detail"], "order is not pending");
        assert_eq!(entries[0].user, None);
    }
}

//! Shared helpers for database unit tests.

use tempfile::tempdir;

use crate::database::{Database, DatabaseConfig};
use crate::order::{EventSlug, Order, OrderCode, OrderPosition, SubEventId};

/// Creates a database in a temporary directory that outlives the test.
///
/// # Panics
///
/// Panics if the directory or database cannot be created.
#[must_use]
pub fn create_test_database() -> Database {
    let dir = tempdir().unwrap();
    let db = Database::open(DatabaseConfig::new(dir.path().join("test.db"))).unwrap();

    // Keep the directory alive for as long as the connection.
    std::mem::forget(dir);

    db
}

/// Builds a pending, approval-gated order with one admission ticket per
/// entry of `subevents`.
///
/// # Panics
///
/// Panics if the event or code is invalid.
#[must_use]
pub fn pending_order(event: &str, code: &str, subevents: &[Option<i64>]) -> Order {
    Order::builder(EventSlug::new(event).unwrap(), OrderCode::new(code).unwrap())
        .require_approval(true)
        .positions(
            subevents
                .iter()
                .map(|s| OrderPosition::admission(s.map(SubEventId::new))),
        )
        .build()
        .unwrap()
}

//! Common test utilities for integration tests.
//!
//! Helpers for building stores and orders shared by the integration suites.

use raffle::database::{Database, DatabaseConfig, EventFixture, OrderFixture, QuotaFixture};
use raffle::{EventSlug, Order, OrderCode, OrderPosition, OrderStatus, SubEventId};

/// Creates a temporary test database that lives for the rest of the test.
#[allow(dead_code)]
pub fn create_test_database() -> Database {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("test.db");
    let db = Database::open(DatabaseConfig::new(path)).unwrap();

    // Prevent the TempDir from being dropped immediately
    std::mem::forget(dir);

    db
}

#[allow(dead_code)]
pub fn gala() -> EventSlug {
    EventSlug::new("gala").unwrap()
}

#[allow(dead_code)]
pub fn code(s: &str) -> OrderCode {
    OrderCode::new(s).unwrap()
}

/// A pending, approval-gated order with `tickets` admissions for `subevent`.
#[allow(dead_code)]
pub fn pending_order(code_str: &str, subevent: Option<i64>, tickets: usize) -> Order {
    Order::builder(gala(), code(code_str))
        .status(OrderStatus::Pending)
        .require_approval(true)
        .positions(vec![
            OrderPosition::admission(subevent.map(SubEventId::new));
            tickets
        ])
        .build()
        .unwrap()
}

/// A fixture of `count` single-ticket orders named `O000`, `O001`, ...
#[allow(dead_code)]
pub fn bulk_fixture(count: usize, subevent: i64, quota: Option<u32>) -> EventFixture {
    EventFixture {
        event: "gala".into(),
        orders: (0..count)
            .map(|i| OrderFixture {
                code: format!("O{i:03}"),
                status: OrderStatus::Pending,
                require_approval: true,
                positions: vec![OrderPosition::admission(Some(SubEventId::new(subevent)))],
                override_mode: None,
            })
            .collect(),
        cliques: Vec::new(),
        quotas: quota
            .map(|size| {
                vec![QuotaFixture {
                    subevent: Some(SubEventId::new(subevent)),
                    size,
                }]
            })
            .unwrap_or_default(),
    }
}

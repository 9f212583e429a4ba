//! SQLite storage for orders, cliques, overrides, quotas and the audit trail.
//!
//! [`Database`] is the default backend for raffle runs: it loads
//! [`EventSnapshot`](crate::EventSnapshot)s, applies approvals and denials as
//! an [`OrderService`](crate::service::OrderService), records audit entries as
//! an [`AuditLog`](crate::service::AuditLog), and serializes runs per
//! occurrence with run locks.
//!
//! # Examples
//!
//! ```no_run
//! use raffle::database::{Database, DatabaseConfig, EventFixture};
//! use raffle::EventSlug;
//!
//! let db = Database::open(DatabaseConfig::new("/tmp/raffle.db")).unwrap();
//! let fixture = EventFixture::from_path("gala.yaml").unwrap();
//! db.import_snapshot(&fixture).unwrap();
//!
//! let snapshot = db.load_snapshot(&EventSlug::new("gala").unwrap()).unwrap();
//! println!("{} orders", snapshot.orders().len());
//! ```

mod approval;
mod cliques;
mod config;
mod connection;
mod import;
mod locks;
pub mod migrations;
mod operations;
mod schema;

#[cfg(test)]
pub(crate) mod test_util;

pub use config::{
    default_data_dir, resolve_data_dir, resolve_database_path, DatabaseConfig, DATABASE_FILE,
    DATA_DIR_ENV,
};
pub use connection::Database;
pub use import::{CliqueFixture, EventFixture, ImportResult, OrderFixture, QuotaFixture};
pub use locks::RunLock;
pub use operations::LogEntry;

pub use migrations::{check_schema_compatibility, get_schema_version, initialize_schema};

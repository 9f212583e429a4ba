#![deny(missing_docs, unsafe_code)]
#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

//! # raffle
//!
//! A library for allocating a limited admission quota among orders that
//! wait for manual approval.
//!
//! Orders are grouped into units (a clique of orders that go together, or a
//! single order), per-order overrides force units in or out, and the rest
//! are admitted by a seeded random draw until the ticket quota is used up.
//! The losers can later be denied with a rejection run.
//!
//! ## Core Types
//!
//! - [`Order`], [`OrderCode`] and [`OrderPosition`]: the orders being raffled
//! - [`EventSnapshot`]: the read-only input of a run
//! - [`Clique`] and [`OverrideMode`]: grouping and forced outcomes
//! - [`RafflePlan`] and [`PlanExecutor`]: planning and applying a run
//! - [`Database`]: the SQLite store implementing the order service
//! - [`Error`] and [`Result`]: Error handling types
//! - [`Logger`] and [`LogLevel`]: Logging infrastructure
//!
//! ## Examples
//!
//! ```
//! use raffle::{EventSlug, EventSnapshot, Order, OrderCode, OrderPosition};
//! use raffle::{RaffleOptions, RafflePlan, UserId};
//!
//! let event = EventSlug::new("gala").unwrap();
//! let orders = ["A1", "A2", "A3"].into_iter().map(|code| {
//!     Order::builder(event.clone(), OrderCode::new(code).unwrap())
//!         .require_approval(true)
//!         .position(OrderPosition::admission(None))
//!         .build()
//!         .unwrap()
//! })
//! .collect::<Vec<_>>();
//! let snapshot = EventSnapshot::new(event).with_orders(orders);
//!
//! let plan = RafflePlan::new(RaffleOptions::new(UserId::new(1), 2).with_seed(Some(42)))
//!     .build_plan(&snapshot);
//! assert_eq!(plan.len(), 2);
//! ```

pub mod allocation;
pub mod clique;
pub mod config;
pub mod database;
pub mod error;
pub mod logging;
pub mod operations;
pub mod order;
pub mod output;
pub mod service;
pub mod snapshot;

// Re-export key types at crate root for convenience
pub use clique::{Clique, CliqueId, CliqueMembership, OverrideMode};
pub use config::{Config, ConfigBuilder};
pub use database::{Database, DatabaseConfig};
pub use error::{Error, Result};
pub use logging::{init_logger, LogLevel, Logger};
pub use operations::{
    Candidate, ExecutionResult, OperationPlan, PlanAction, PlanExecutor, RaffleOptions,
    RafflePlan, RejectionOptions, RejectionPlan,
};
pub use order::{EventSlug, Order, OrderCode, OrderPosition, OrderStatus, SubEventId, UserId};
pub use snapshot::EventSnapshot;

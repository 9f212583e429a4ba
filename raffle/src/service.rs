//! Collaborators the run executor drives.
//!
//! The engine never changes order state itself. Approving, denying, audit
//! logging and progress reporting all go through the traits in this module,
//! so the same executor runs against the SQLite store, a test double, or a
//! host application's own order service.

use std::cell::RefCell;
use std::collections::HashSet;
use std::fmt;

use serde::Serialize;
use thiserror::Error;

use crate::error::{Error, Result};
use crate::logging::Logger;
use crate::order::{OrderCode, SubEventId, UserId};

/// Audit trail action names written by this crate.
pub mod actions {
    /// An approval attempt failed; data carries `{"detail": <message>}`.
    pub const APPROVE_FAILED: &str = "raffle.approve_failed";
    /// An order's override was changed; data carries `{"mode": <mode>}`.
    pub const OVERRIDE_CHANGED: &str = "raffle.override.changed";
    /// The order was approved.
    pub const ORDER_APPROVED: &str = "order.approved";
    /// The order was denied.
    pub const ORDER_DENIED: &str = "order.denied";
    /// The order created a clique.
    pub const CLIQUE_CREATED: &str = "clique.order.created";
    /// The order joined a clique.
    pub const CLIQUE_JOINED: &str = "clique.order.joined";
    /// The order left its clique.
    pub const CLIQUE_LEFT: &str = "clique.order.left";
    /// The clique administered by the order was changed.
    pub const CLIQUE_CHANGED: &str = "clique.order.changed";
}

/// Why an order could not be approved or denied.
///
/// These are the recoverable failures: a raffle run records them against
/// the order and carries on.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OrderError {
    /// The order is no longer pending.
    #[error("order is not pending")]
    NotPending,

    /// The order does not require approval (already approved, or never gated).
    #[error("order does not require approval")]
    ApprovalNotRequired,

    /// Approving would exceed the occurrence's quota.
    #[error(
        "quota exceeded for {}: requested {requested}, available {available}",
        QuotaScope(*.subevent)
    )]
    QuotaExceeded {
        /// The occurrence whose quota is exhausted.
        subevent: Option<SubEventId>,
        /// Tickets the order needs.
        requested: u32,
        /// Tickets left in the quota.
        available: u32,
    },

    /// The order does not exist.
    #[error("order does not exist")]
    UnknownOrder,
}

struct QuotaScope(Option<SubEventId>);

impl fmt::Display for QuotaScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(id) => write!(f, "subevent {id}"),
            None => f.write_str("event"),
        }
    }
}

/// Applies approval and denial side effects to orders.
///
/// Implementations report domain refusals as [`Error::Order`]; any other
/// error is treated as infrastructure failure and stops a run.
pub trait OrderService {
    /// Approves an order, optionally notifying the customer.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Order`] if the order cannot be approved, or another
    /// error if the backing store fails.
    fn approve(&self, order: &OrderCode, user: UserId, send_mail: bool) -> Result<()>;

    /// Denies an order, optionally notifying the customer.
    ///
    /// # Errors
    ///
    /// Returns an error if the order cannot be denied.
    fn deny(&self, order: &OrderCode, user: UserId, send_mail: bool) -> Result<()>;
}

/// Appends entries to an order's audit trail.
pub trait AuditLog {
    /// Records `action` against `order`.
    ///
    /// # Errors
    ///
    /// Returns an error if the entry could not be stored.
    fn log_action(
        &self,
        order: &OrderCode,
        action: &str,
        data: serde_json::Value,
        user: Option<UserId>,
    ) -> Result<()>;
}

/// State of a running job as seen by whoever scheduled it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum RunState {
    /// The run is processing orders.
    InProgress {
        /// Share of orders processed, in `[0, 100]`, rounded to 2 decimals.
        percent: f64,
    },
    /// The run completed.
    Finished {
        /// Number of orders attempted.
        processed: usize,
    },
}

/// Receives progress updates from a run.
pub trait ProgressSink {
    /// Reports the current run state.
    fn report(&mut self, state: RunState);
}

/// Writes progress through a [`Logger`].
///
/// Messages are only visible at verbose level.
#[derive(Debug, Clone, Copy)]
pub struct LoggingProgress {
    logger: Logger,
    label: &'static str,
}

impl LoggingProgress {
    /// Creates a sink that prefixes messages with `label`.
    #[must_use]
    pub const fn new(logger: Logger, label: &'static str) -> Self {
        Self { logger, label }
    }
}

impl ProgressSink for LoggingProgress {
    fn report(&mut self, state: RunState) {
        match state {
            RunState::InProgress { percent } => {
                self.logger.info(&format!("{}: {percent:.2}%", self.label));
            }
            RunState::Finished { processed } => {
                self.logger
                    .info(&format!("{}: processed {processed} orders", self.label));
            }
        }
    }
}

/// Collects every reported state.
///
/// # Examples
///
/// ```
/// use raffle::service::{ProgressSink, RecordingProgress, RunState};
///
/// let mut progress = RecordingProgress::default();
/// progress.report(RunState::InProgress { percent: 0.0 });
/// progress.report(RunState::Finished { processed: 3 });
///
/// assert_eq!(progress.percentages(), vec![0.0]);
/// assert_eq!(progress.processed(), Some(3));
/// ```
#[derive(Debug, Clone, Default)]
pub struct RecordingProgress {
    states: Vec<RunState>,
}

impl RecordingProgress {
    /// Returns all states in report order.
    #[must_use]
    pub fn states(&self) -> &[RunState] {
        &self.states
    }

    /// Returns the in-progress percentages in report order.
    #[must_use]
    pub fn percentages(&self) -> Vec<f64> {
        self.states
            .iter()
            .filter_map(|s| match s {
                RunState::InProgress { percent } => Some(*percent),
                RunState::Finished { .. } => None,
            })
            .collect()
    }

    /// Returns the final count, if the run finished.
    #[must_use]
    pub fn processed(&self) -> Option<usize> {
        self.states.iter().rev().find_map(|s| match s {
            RunState::Finished { processed } => Some(*processed),
            RunState::InProgress { .. } => None,
        })
    }
}

impl ProgressSink for RecordingProgress {
    fn report(&mut self, state: RunState) {
        self.states.push(state);
    }
}

/// A call made against a [`RecordingService`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServiceCall {
    /// `approve` was called.
    Approve(OrderCode),
    /// `deny` was called.
    Deny(OrderCode),
}

/// An in-memory service that records calls and audit entries.
///
/// Orders marked with [`RecordingService::fail_approval`] are refused with
/// the given [`OrderError`]. Useful for exercising runs without a database.
#[derive(Debug, Default)]
pub struct RecordingService {
    calls: RefCell<Vec<ServiceCall>>,
    entries: RefCell<Vec<(OrderCode, String, serde_json::Value)>>,
    refused: Vec<(OrderCode, OrderError)>,
    broken: HashSet<OrderCode>,
}

impl RecordingService {
    /// Creates a service that accepts every call.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes approvals of `order` fail with `reason`.
    #[must_use]
    pub fn fail_approval(mut self, order: OrderCode, reason: OrderError) -> Self {
        self.refused.push((order, reason));
        self
    }

    /// Makes any call for `order` fail with a non-order error.
    #[must_use]
    pub fn break_on(mut self, order: OrderCode) -> Self {
        self.broken.insert(order);
        self
    }

    /// Returns the calls made so far.
    #[must_use]
    pub fn calls(&self) -> Vec<ServiceCall> {
        self.calls.borrow().clone()
    }

    /// Returns the codes passed to `approve`, in call order.
    #[must_use]
    pub fn approved(&self) -> Vec<OrderCode> {
        self.calls
            .borrow()
            .iter()
            .filter_map(|c| match c {
                ServiceCall::Approve(code) => Some(code.clone()),
                ServiceCall::Deny(_) => None,
            })
            .collect()
    }

    /// Returns the codes passed to `deny`, in call order.
    #[must_use]
    pub fn denied(&self) -> Vec<OrderCode> {
        self.calls
            .borrow()
            .iter()
            .filter_map(|c| match c {
                ServiceCall::Deny(code) => Some(code.clone()),
                ServiceCall::Approve(_) => None,
            })
            .collect()
    }

    /// Returns the audit entries logged so far.
    #[must_use]
    pub fn entries(&self) -> Vec<(OrderCode, String, serde_json::Value)> {
        self.entries.borrow().clone()
    }

    fn check_broken(&self, order: &OrderCode) -> Result<()> {
        if self.broken.contains(order) {
            return Err(Error::Io(std::io::Error::other(format!(
                "service unavailable for {order}"
            ))));
        }
        Ok(())
    }
}

impl OrderService for RecordingService {
    fn approve(&self, order: &OrderCode, _user: UserId, _send_mail: bool) -> Result<()> {
        self.calls
            .borrow_mut()
            .push(ServiceCall::Approve(order.clone()));
        self.check_broken(order)?;
        if let Some((_, reason)) = self.refused.iter().find(|(code, _)| code == order) {
            return Err(Error::Order {
                code: order.clone(),
                source: reason.clone(),
            });
        }
        Ok(())
    }

    fn deny(&self, order: &OrderCode, _user: UserId, _send_mail: bool) -> Result<()> {
        self.calls.borrow_mut().push(ServiceCall::Deny(order.clone()));
        self.check_broken(order)
    }
}

impl AuditLog for RecordingService {
    fn log_action(
        &self,
        order: &OrderCode,
        action: &str,
        data: serde_json::Value,
        _user: Option<UserId>,
    ) -> Result<()> {
        self.entries
            .borrow_mut()
            .push((order.clone(), action.to_string(), data));
        Ok(())
    }
}

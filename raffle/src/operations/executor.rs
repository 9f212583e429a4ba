//! Plan execution engine.
//!
//! The executor walks a plan's actions in order and applies each one through
//! an [`OrderService`]. Approvals are tolerant: an order the service refuses
//! is recorded in its audit trail and the run moves on. Denials are not: the
//! first failure aborts the run.

use serde::Serialize;
use serde_json::json;

use crate::error::{Error, Result};
use crate::order::OrderCode;
use crate::service::{actions, AuditLog, OrderService, ProgressSink, RunState};

use super::plan::{OperationPlan, PlanAction, RaffleSummary};

/// Default number of orders between progress reports.
pub const DEFAULT_PROGRESS_INTERVAL: usize = 50;

/// Result of executing a plan.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExecutionResult {
    /// Number of actions attempted, including refused ones.
    pub attempted: usize,

    /// Orders whose approval was refused.
    pub failed: Vec<OrderCode>,

    /// Whether this was a dry-run (no actual changes made).
    pub dry_run: bool,

    /// Descriptions of actions that were taken (or would be taken in dry-run).
    pub actions_taken: Vec<String>,

    /// Warnings from the plan.
    pub warnings: Vec<String>,

    /// Raffle figures, for raffle plans.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<RaffleSummary>,
}

impl ExecutionResult {
    fn from_plan(plan: &OperationPlan, dry_run: bool) -> Self {
        Self {
            attempted: 0,
            failed: Vec::new(),
            dry_run,
            actions_taken: Vec::new(),
            warnings: plan.warnings.clone(),
            summary: plan.summary.clone(),
        }
    }

    /// Returns the number of actions that took effect.
    #[must_use]
    pub fn succeeded(&self) -> usize {
        self.attempted - self.failed.len()
    }
}

/// Share of `done` in `total` as a percentage rounded to two decimals.
#[allow(clippy::cast_precision_loss)]
fn percent(done: usize, total: usize) -> f64 {
    if total == 0 {
        return 100.0;
    }
    (done as f64 / total as f64 * 10_000.0).round() / 100.0
}

/// Executes operation plans against an order service.
///
/// # Examples
///
/// ```
/// use raffle::operations::{OperationPlan, PlanAction, PlanExecutor};
/// use raffle::service::{RecordingProgress, RecordingService};
/// use raffle::{OrderCode, UserId};
///
/// let plan = OperationPlan::new("Approve", UserId::new(1))
///     .add_action(PlanAction::Approve(OrderCode::new("A1").unwrap()));
/// let service = RecordingService::new();
/// let mut progress = RecordingProgress::default();
///
/// let result = PlanExecutor::new(&service, &service)
///     .with_progress(&mut progress)
///     .execute(&plan)
///     .unwrap();
///
/// assert_eq!(result.attempted, 1);
/// assert_eq!(progress.processed(), Some(1));
/// ```
pub struct PlanExecutor<'a> {
    orders: &'a dyn OrderService,
    audit: &'a dyn AuditLog,
    progress: Option<&'a mut dyn ProgressSink>,
    send_mail: bool,
    interval: usize,
    dry_run: bool,
}

impl<'a> PlanExecutor<'a> {
    /// Creates an executor that sends mail and reports every 50 orders.
    #[must_use]
    pub fn new(orders: &'a dyn OrderService, audit: &'a dyn AuditLog) -> Self {
        Self {
            orders,
            audit,
            progress: None,
            send_mail: true,
            interval: DEFAULT_PROGRESS_INTERVAL,
            dry_run: false,
        }
    }

    /// Reports progress to `progress`.
    #[must_use]
    pub fn with_progress(mut self, progress: &'a mut dyn ProgressSink) -> Self {
        self.progress = Some(progress);
        self
    }

    /// Sets whether customers are notified.
    #[must_use]
    pub const fn with_send_mail(mut self, send_mail: bool) -> Self {
        self.send_mail = send_mail;
        self
    }

    /// Sets the number of orders between progress reports. Zero is read as one.
    #[must_use]
    pub fn with_progress_interval(mut self, interval: usize) -> Self {
        self.interval = interval.max(1);
        self
    }

    /// Sets the executor to dry-run mode.
    ///
    /// In dry-run mode the plan is reported but no service is called.
    #[must_use]
    pub const fn dry_run(mut self) -> Self {
        self.dry_run = true;
        self
    }

    /// Executes the given plan.
    ///
    /// # Errors
    ///
    /// Returns an error if a denial fails, or if an approval fails for any
    /// reason other than [`Error::Order`]. Actions before the failing one
    /// stay applied.
    pub fn execute(&mut self, plan: &OperationPlan) -> Result<ExecutionResult> {
        if self.dry_run {
            let mut result = ExecutionResult::from_plan(plan, true);
            result.attempted = plan.len();
            result.actions_taken = plan.actions.iter().map(PlanAction::description).collect();
            return Ok(result);
        }

        let total = plan.len();
        let mut result = ExecutionResult::from_plan(plan, false);
        self.report(RunState::InProgress { percent: 0.0 });

        for (i, action) in plan.actions.iter().enumerate() {
            match action {
                PlanAction::Approve(code) => {
                    if let Some(reason) = self.approve(plan, code)? {
                        self.record_failure(plan, code, &reason);
                        result.failed.push(code.clone());
                    } else {
                        result.actions_taken.push(action.description());
                    }
                }
                PlanAction::Deny(code) => {
                    self.orders.deny(code, plan.user, self.send_mail)?;
                    result.actions_taken.push(action.description());
                }
            }
            result.attempted += 1;

            if i % self.interval == 0 {
                self.report(RunState::InProgress {
                    percent: percent(i, total),
                });
            }
        }

        self.report(RunState::Finished {
            processed: result.attempted,
        });
        log::debug!(
            "executed {}: {} attempted, {} failed",
            plan.description,
            result.attempted,
            result.failed.len()
        );
        Ok(result)
    }

    /// Approves one order, returning the refusal message if the service
    /// refused it.
    fn approve(&self, plan: &OperationPlan, code: &OrderCode) -> Result<Option<String>> {
        match self.orders.approve(code, plan.user, self.send_mail) {
            Ok(()) => Ok(None),
            Err(Error::Order { source, .. }) => Ok(Some(source.to_string())),
            Err(e) => Err(e),
        }
    }

    fn record_failure(&self, plan: &OperationPlan, code: &OrderCode, reason: &str) {
        log::info!("approval of {code} failed: {reason}");
        if let Err(e) = self.audit.log_action(
            code,
            actions::APPROVE_FAILED,
            json!({ "detail": reason }),
            Some(plan.user),
        ) {
            log::warn!("could not record failed approval of {code}: {e}");
        }
    }

    fn report(&mut self, state: RunState) {
        if let Some(progress) = self.progress.as_deref_mut() {
            progress.report(state);
        }
    }
}

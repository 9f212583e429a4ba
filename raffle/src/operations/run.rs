//! Complete raffle and rejection runs against the SQLite store.
//!
//! A run takes the occurrence's run lock, loads a fresh snapshot, plans and
//! executes. The lock is held until the run returns.

use crate::database::Database;
use crate::error::Result;
use crate::order::{EventSlug, SubEventId, UserId};
use crate::service::ProgressSink;

use super::executor::{ExecutionResult, PlanExecutor, DEFAULT_PROGRESS_INTERVAL};
use super::plan::OperationPlan;
use super::raffle::{RaffleOptions, RafflePlan};
use super::rejection::{RejectionOptions, RejectionPlan};

/// Execution settings shared by both kinds of run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSettings {
    /// Whether customers are notified.
    pub send_mail: bool,
    /// Orders between progress reports.
    pub progress_interval: usize,
    /// Plan only; nothing is approved or denied.
    pub dry_run: bool,
}

impl Default for RunSettings {
    fn default() -> Self {
        Self {
            send_mail: true,
            progress_interval: DEFAULT_PROGRESS_INTERVAL,
            dry_run: false,
        }
    }
}

fn execute_plan(
    db: &Database,
    plan: &OperationPlan,
    settings: RunSettings,
    progress: Option<&mut dyn ProgressSink>,
) -> Result<ExecutionResult> {
    let mut executor = PlanExecutor::new(db, db)
        .with_send_mail(settings.send_mail)
        .with_progress_interval(settings.progress_interval);
    if let Some(progress) = progress {
        executor = executor.with_progress(progress);
    }
    if settings.dry_run {
        executor = executor.dry_run();
    }
    executor.execute(plan)
}

/// Draws and approves orders for one occurrence.
///
/// # Errors
///
/// Returns [`crate::Error::RunInProgress`] if another run holds the
/// occurrence, or any error that aborts execution.
pub fn execute_raffle(
    db: &Database,
    event: &EventSlug,
    options: RaffleOptions,
    settings: RunSettings,
    progress: Option<&mut dyn ProgressSink>,
) -> Result<ExecutionResult> {
    let lock = db.acquire_run_lock(event, options.subevent)?;
    let snapshot = db.load_snapshot(event)?;
    let plan = RafflePlan::new(options).build_plan(&snapshot);
    let result = execute_plan(db, &plan, settings, progress)?;
    lock.release()?;
    Ok(result)
}

/// Denies every order still waiting for approval on one occurrence.
///
/// # Errors
///
/// Returns [`crate::Error::RunInProgress`] if another run holds the
/// occurrence, or the first denial error.
pub fn execute_rejection(
    db: &Database,
    event: &EventSlug,
    options: RejectionOptions,
    settings: RunSettings,
    progress: Option<&mut dyn ProgressSink>,
) -> Result<ExecutionResult> {
    let lock = db.acquire_run_lock(event, options.subevent)?;
    let snapshot = db.load_snapshot(event)?;
    let plan = RejectionPlan::new(options).build_plan(&snapshot);
    let result = execute_plan(db, &plan, settings, progress)?;
    lock.release()?;
    Ok(result)
}

/// Runs a raffle with default settings and returns the number of orders
/// attempted.
///
/// # Errors
///
/// See [`execute_raffle`].
///
/// # Examples
///
/// ```no_run
/// use raffle::database::{Database, DatabaseConfig};
/// use raffle::operations::run_raffle;
/// use raffle::{EventSlug, SubEventId, UserId};
///
/// let db = Database::open(DatabaseConfig::new("/tmp/raffle.db")).unwrap();
/// let event = EventSlug::new("gala").unwrap();
/// let attempted = run_raffle(&db, &event, Some(SubEventId::new(1)), UserId::new(1), 100).unwrap();
/// println!("attempted {attempted} approvals");
/// ```
pub fn run_raffle(
    db: &Database,
    event: &EventSlug,
    subevent: Option<SubEventId>,
    user: UserId,
    raffle_size: i64,
) -> Result<usize> {
    let options = RaffleOptions::new(user, raffle_size).with_subevent(subevent);
    let result = execute_raffle(db, event, options, RunSettings::default(), None)?;
    Ok(result.attempted)
}

/// Runs a rejection with default settings and returns the number of orders
/// denied.
///
/// # Errors
///
/// See [`execute_rejection`].
pub fn run_rejection(
    db: &Database,
    event: &EventSlug,
    subevent: Option<SubEventId>,
    user: UserId,
) -> Result<usize> {
    let options = RejectionOptions::new(user).with_subevent(subevent);
    let result = execute_rejection(db, event, options, RunSettings::default(), None)?;
    Ok(result.attempted)
}

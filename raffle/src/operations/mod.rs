//! Raffle and rejection runs using the plan-execute pattern.
//!
//! Operations are split into two phases:
//! 1. **Planning**: reads an [`EventSnapshot`](crate::EventSnapshot) and
//!    decides which orders to approve or deny, without side effects
//! 2. **Execution**: applies the plan through an
//!    [`OrderService`](crate::service::OrderService)
//!
//! # Examples
//!
//! ```
//! use raffle::operations::{PlanExecutor, RaffleOptions, RafflePlan};
//! use raffle::service::RecordingService;
//! use raffle::{EventSlug, EventSnapshot, Order, OrderCode, OrderPosition, UserId};
//!
//! let event = EventSlug::new("gala").unwrap();
//! let order = Order::builder(event.clone(), OrderCode::new("A1").unwrap())
//!     .require_approval(true)
//!     .position(OrderPosition::admission(None))
//!     .build()
//!     .unwrap();
//! let snapshot = EventSnapshot::new(event).with_order(order);
//!
//! // Generate plan
//! let options = RaffleOptions::new(UserId::new(1), 10).with_seed(Some(7));
//! let plan = RafflePlan::new(options).build_plan(&snapshot);
//!
//! // Execute plan
//! let service = RecordingService::new();
//! let result = PlanExecutor::new(&service, &service).execute(&plan).unwrap();
//! assert_eq!(result.attempted, 1);
//! ```

pub mod executor;
pub mod init;
pub mod list;
pub mod plan;
pub mod raffle;
pub mod rejection;
pub mod run;

pub use executor::{ExecutionResult, PlanExecutor, DEFAULT_PROGRESS_INTERVAL};
pub use init::{init_database, InitOptions, InitResult};
pub use list::{list_candidates, Candidate, Standing};
pub use plan::{OperationPlan, PlanAction, RaffleSummary};
pub use raffle::{RaffleOptions, RafflePlan};
pub use rejection::{RejectionOptions, RejectionPlan};
pub use run::{execute_raffle, execute_rejection, run_raffle, run_rejection, RunSettings};

//! Plan types for raffle and rejection runs.
//!
//! A plan lists the side effects a run would apply, in order, without
//! applying any of them. It can be printed, serialized for a dry run, or
//! handed to a [`super::PlanExecutor`].

use serde::Serialize;

use crate::order::{OrderCode, SubEventId, UserId};

/// A single side effect of a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", content = "order", rename_all = "lowercase")]
pub enum PlanAction {
    /// Approve the order.
    Approve(OrderCode),
    /// Deny the order.
    Deny(OrderCode),
}

impl PlanAction {
    /// Returns the order the action applies to.
    #[must_use]
    pub const fn order(&self) -> &OrderCode {
        match self {
            Self::Approve(code) | Self::Deny(code) => code,
        }
    }

    /// Returns a human-readable description of this action.
    #[must_use]
    pub fn description(&self) -> String {
        match self {
            Self::Approve(code) => format!("Approve order {code}"),
            Self::Deny(code) => format!("Deny order {code}"),
        }
    }
}

/// Figures describing how a raffle plan came about.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RaffleSummary {
    /// Occurrence the raffle is for.
    pub subevent: Option<SubEventId>,
    /// Requested ticket quota.
    pub raffle_size: i64,
    /// Orders that passed the eligibility filter.
    pub eligible_orders: usize,
    /// Units left after overrides were applied.
    pub units: usize,
    /// Units with an `Always` member.
    pub preferred_units: usize,
    /// Units voided by a `Never` member: whole cliques plus singleton
    /// orders that are themselves `Never`.
    pub excluded_units: usize,
    /// Units admitted.
    pub admitted_units: usize,
    /// Orders admitted.
    pub admitted_orders: usize,
    /// Tickets across admitted orders.
    pub admitted_tickets: u64,
    /// Quota left after selection; negative when a unit overshot it.
    pub remaining: i64,
}

/// A complete run plan.
///
/// # Examples
///
/// ```
/// use raffle::operations::{OperationPlan, PlanAction};
/// use raffle::{OrderCode, UserId};
///
/// let plan = OperationPlan::new("Deny leftovers", UserId::new(1))
///     .add_action(PlanAction::Deny(OrderCode::new("A1").unwrap()))
///     .add_warning("nothing else pending");
///
/// assert_eq!(plan.len(), 1);
/// assert_eq!(plan.warnings.len(), 1);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OperationPlan {
    /// A human-readable description of the run.
    pub description: String,

    /// The user the side effects are applied on behalf of.
    pub user: UserId,

    /// The side effects, in execution order.
    pub actions: Vec<PlanAction>,

    /// Warnings to communicate to the operator.
    pub warnings: Vec<String>,

    /// Selection figures, for raffle plans.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<RaffleSummary>,
}

impl OperationPlan {
    /// Creates an empty plan.
    #[must_use]
    pub fn new(description: impl Into<String>, user: UserId) -> Self {
        Self {
            description: description.into(),
            user,
            actions: Vec::new(),
            warnings: Vec::new(),
            summary: None,
        }
    }

    /// Adds an action to the plan.
    #[must_use]
    pub fn add_action(mut self, action: PlanAction) -> Self {
        self.actions.push(action);
        self
    }

    /// Adds a warning to the plan.
    #[must_use]
    pub fn add_warning(mut self, warning: impl Into<String>) -> Self {
        self.warnings.push(warning.into());
        self
    }

    /// Attaches the selection summary.
    #[must_use]
    pub fn with_summary(mut self, summary: RaffleSummary) -> Self {
        self.summary = Some(summary);
        self
    }

    /// Checks if the plan has no actions.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Returns the number of actions in the plan.
    #[must_use]
    pub fn len(&self) -> usize {
        self.actions.len()
    }

    /// Returns the orders the plan touches, in execution order.
    #[must_use]
    pub fn orders(&self) -> Vec<&OrderCode> {
        self.actions.iter().map(PlanAction::order).collect()
    }
}

//! Rejection run planning.
//!
//! A rejection run denies every pending, approval-gated order holding a
//! ticket for the occurrence. Cliques and overrides play no part.

use crate::allocation::filter_rejectable;
use crate::order::{SubEventId, UserId};
use crate::snapshot::EventSnapshot;

use super::plan::{OperationPlan, PlanAction};

/// Options for a rejection run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RejectionOptions {
    /// Occurrence whose leftovers are denied, `None` for single-occurrence events.
    pub subevent: Option<SubEventId>,

    /// User the denials are made on behalf of.
    pub user: UserId,
}

impl RejectionOptions {
    /// Creates options for the given user.
    #[must_use]
    pub const fn new(user: UserId) -> Self {
        Self {
            subevent: None,
            user,
        }
    }

    /// Sets the occurrence.
    #[must_use]
    pub const fn with_subevent(mut self, subevent: Option<SubEventId>) -> Self {
        self.subevent = subevent;
        self
    }
}

/// A rejection plan generator.
pub struct RejectionPlan {
    options: RejectionOptions,
}

impl RejectionPlan {
    /// Creates a new rejection plan with the given options.
    #[must_use]
    pub const fn new(options: RejectionOptions) -> Self {
        Self { options }
    }

    /// Builds the plan: one deny action per rejectable order, in snapshot order.
    ///
    /// # Examples
    ///
    /// ```
    /// use raffle::operations::{RejectionOptions, RejectionPlan};
    /// use raffle::{EventSlug, EventSnapshot, UserId};
    ///
    /// let snapshot = EventSnapshot::new(EventSlug::new("gala").unwrap());
    /// let plan = RejectionPlan::new(RejectionOptions::new(UserId::new(1))).build_plan(&snapshot);
    /// assert!(plan.is_empty());
    /// ```
    #[must_use]
    pub fn build_plan(&self, snapshot: &EventSnapshot) -> OperationPlan {
        let event = snapshot.event().map_or("event", |e| e.as_str());
        let description = match self.options.subevent {
            Some(sub) => format!("Deny pending orders for {event} subevent {sub}"),
            None => format!("Deny pending orders for {event}"),
        };

        let rejectable = filter_rejectable(snapshot.orders(), self.options.subevent);
        let mut plan = OperationPlan::new(description, self.options.user);
        if rejectable.is_empty() {
            plan = plan.add_warning("No pending orders to deny for this occurrence");
        }

        rejectable.into_iter().fold(plan, |plan, candidate| {
            plan.add_action(PlanAction::Deny(candidate.order.code().clone()))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clique::{CliqueId, OverrideMode};
    use crate::order::{EventSlug, Order, OrderCode, OrderPosition, OrderStatus};

    fn code(s: &str) -> OrderCode {
        OrderCode::new(s).unwrap()
    }

    fn order(c: &str, positions: &[OrderPosition]) -> Order {
        Order::builder(EventSlug::new("gala").unwrap(), code(c))
            .require_approval(true)
            .positions(positions.iter().copied())
            .build()
            .unwrap()
    }

    #[test]
    fn test_denies_all_rejectable_orders_ignoring_overrides() {
        let sub = Some(SubEventId::new(5));
        let paid = Order::builder(EventSlug::new("gala").unwrap(), code("PAID"))
            .status(OrderStatus::Paid)
            .require_approval(true)
            .position(OrderPosition::admission(sub))
            .build()
            .unwrap();
        let snapshot = EventSnapshot::new(EventSlug::new("gala").unwrap())
            .with_orders([
                order("A", &[OrderPosition::admission(sub)]),
                order(
                    "B",
                    &[
                        OrderPosition::admission(sub),
                        OrderPosition::admission(Some(SubEventId::new(6))),
                    ],
                ),
                order("C", &[OrderPosition::admission(Some(SubEventId::new(6)))]),
                paid,
            ])
            .with_membership(code("A"), CliqueId::new(1))
            .with_override(code("A"), OverrideMode::Always)
            .with_override(code("B"), OverrideMode::Never);

        let plan = RejectionPlan::new(RejectionOptions::new(UserId::new(2)).with_subevent(sub))
            .build_plan(&snapshot);

        assert_eq!(
            plan.actions,
            vec![PlanAction::Deny(code("A")), PlanAction::Deny(code("B"))]
        );
        assert_eq!(plan.user, UserId::new(2));
        assert!(plan.summary.is_none());
        assert!(plan.warnings.is_empty());
    }

    #[test]
    fn test_empty_rejection_warns() {
        let snapshot = EventSnapshot::new(EventSlug::new("gala").unwrap());
        let plan = RejectionPlan::new(RejectionOptions::new(UserId::new(1))).build_plan(&snapshot);
        assert!(plan.is_empty());
        assert_eq!(plan.warnings.len(), 1);
    }
}

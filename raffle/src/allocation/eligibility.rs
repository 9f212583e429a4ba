//! Candidate selection for raffle and rejection runs.
//!
//! Both filters are pure functions over the orders of a snapshot. They keep
//! the snapshot order so that downstream grouping is reproducible.

use crate::order::{Order, SubEventId};

/// An order that takes part in a run, with its ticket count for the target
/// occurrence.
///
/// The ticket count is the unit of quota consumption.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EligibleOrder {
    /// The order.
    pub order: Order,
    /// Live admission tickets for the target occurrence (always >= 1).
    pub ticket_count: u32,
}

impl EligibleOrder {
    /// Returns the order code.
    #[must_use]
    pub fn code(&self) -> &crate::order::OrderCode {
        self.order.code()
    }
}

/// Selects the orders that may take part in a raffle for `target`.
///
/// An order is eligible when it is pending and requires approval, holds at
/// least one live admission ticket for `target`, and holds no live admission
/// ticket for any other occurrence.
///
/// # Examples
///
/// ```
/// use raffle::allocation::filter_eligible;
/// use raffle::{EventSlug, Order, OrderCode, OrderPosition, SubEventId};
///
/// let sub = Some(SubEventId::new(1));
/// let order = Order::builder(EventSlug::new("gala").unwrap(), OrderCode::new("A").unwrap())
///     .require_approval(true)
///     .positions([OrderPosition::admission(sub), OrderPosition::admission(sub)])
///     .build()
///     .unwrap();
///
/// let eligible = filter_eligible(&[order], sub);
/// assert_eq!(eligible.len(), 1);
/// assert_eq!(eligible[0].ticket_count, 2);
/// ```
#[must_use]
pub fn filter_eligible(orders: &[Order], target: Option<SubEventId>) -> Vec<EligibleOrder> {
    orders
        .iter()
        .filter(|order| order.awaits_approval() && order.tickets_elsewhere(target) == 0)
        .filter_map(|order| with_ticket_count(order, target))
        .collect()
}

/// Selects the orders a rejection run for `target` denies.
///
/// This is the raffle filter without the single-occurrence restriction: an
/// order that also holds tickets for other occurrences is still denied when
/// it holds a ticket for `target`.
#[must_use]
pub fn filter_rejectable(orders: &[Order], target: Option<SubEventId>) -> Vec<EligibleOrder> {
    orders
        .iter()
        .filter(|order| order.awaits_approval())
        .filter_map(|order| with_ticket_count(order, target))
        .collect()
}

fn with_ticket_count(order: &Order, target: Option<SubEventId>) -> Option<EligibleOrder> {
    let ticket_count = order.tickets_for(target);
    (ticket_count >= 1).then(|| EligibleOrder {
        order: order.clone(),
        ticket_count,
    })
}

//! Read-only view of an event's orders for one run.

use std::collections::HashMap;

use crate::clique::{CliqueId, OverrideMode};
use crate::order::{EventSlug, Order, OrderCode};

/// Everything the allocation engine reads about an event.
///
/// Memberships and overrides are keyed by order code. A code missing from
/// either map means the order has no clique or a `Normal` override; dangling
/// references are never an error.
///
/// # Examples
///
/// ```
/// use raffle::{CliqueId, EventSlug, EventSnapshot, OrderCode, OverrideMode};
///
/// let code = OrderCode::new("A1").unwrap();
/// let snapshot = EventSnapshot::new(EventSlug::new("gala").unwrap())
///     .with_membership(code.clone(), CliqueId::new(4))
///     .with_override(code.clone(), OverrideMode::Always);
///
/// assert_eq!(snapshot.clique_of(&code), Some(CliqueId::new(4)));
/// assert_eq!(snapshot.override_of(&OrderCode::new("B2").unwrap()), OverrideMode::Normal);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventSnapshot {
    event: Option<EventSlug>,
    orders: Vec<Order>,
    memberships: HashMap<OrderCode, CliqueId>,
    overrides: HashMap<OrderCode, OverrideMode>,
}

impl EventSnapshot {
    /// Creates an empty snapshot for an event.
    #[must_use]
    pub fn new(event: EventSlug) -> Self {
        Self {
            event: Some(event),
            ..Self::default()
        }
    }

    /// Adds an order.
    #[must_use]
    pub fn with_order(mut self, order: Order) -> Self {
        self.orders.push(order);
        self
    }

    /// Adds several orders, keeping their order.
    #[must_use]
    pub fn with_orders(mut self, orders: impl IntoIterator<Item = Order>) -> Self {
        self.orders.extend(orders);
        self
    }

    /// Records that `order` belongs to `clique`.
    #[must_use]
    pub fn with_membership(mut self, order: OrderCode, clique: CliqueId) -> Self {
        self.memberships.insert(order, clique);
        self
    }

    /// Records the override of `order`.
    #[must_use]
    pub fn with_override(mut self, order: OrderCode, mode: OverrideMode) -> Self {
        self.overrides.insert(order, mode);
        self
    }

    /// Returns the event, if the snapshot was created for one.
    #[must_use]
    pub const fn event(&self) -> Option<&EventSlug> {
        self.event.as_ref()
    }

    /// Returns all orders of the event in load order.
    #[must_use]
    pub fn orders(&self) -> &[Order] {
        &self.orders
    }

    /// Returns the clique `order` belongs to, if any.
    #[must_use]
    pub fn clique_of(&self, order: &OrderCode) -> Option<CliqueId> {
        self.memberships.get(order).copied()
    }

    /// Returns the effective override of `order`.
    #[must_use]
    pub fn override_of(&self, order: &OrderCode) -> OverrideMode {
        self.overrides.get(order).copied().unwrap_or_default()
    }
}

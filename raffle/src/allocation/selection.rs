//! Quota-consuming selection of raffle units.
//!
//! Selection runs in two phases. Phase A admits every preferred unit in key
//! order, whatever the quota. Phase B walks a uniform shuffle of the other
//! units and admits each whole unit while the remaining quota is positive.
//! Because units are never split, the final remainder may be negative by at
//! most the size of the last unit admitted (plus any preferred overshoot).

use rand::seq::SliceRandom;
use rand::Rng;

use super::eligibility::EligibleOrder;
use super::units::{RaffleUnits, UnitKey};
use crate::order::OrderCode;

/// Outcome of a selection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    /// Admitted orders, unit by unit, members in unit order.
    pub admitted: Vec<EligibleOrder>,
    /// Admitted units in admission order.
    pub admitted_units: Vec<UnitKey>,
    /// Quota left after the last admitted unit; may be negative.
    pub remaining: i64,
    /// Tickets across all admitted orders.
    pub admitted_tickets: u64,
}

impl Selection {
    /// Returns the admitted order codes in admission order.
    #[must_use]
    pub fn admitted_codes(&self) -> Vec<&OrderCode> {
        self.admitted.iter().map(EligibleOrder::code).collect()
    }

    fn admit(&mut self, key: &UnitKey, units: &RaffleUnits) {
        let Some(members) = units.members(key) else {
            return;
        };
        let tickets = units.ticket_count(key);
        self.remaining -= i64::from(tickets);
        self.admitted_tickets += u64::from(tickets);
        self.admitted.extend_from_slice(members);
        self.admitted_units.push(key.clone());
        log::debug!(
            "admitted {key} ({tickets} tickets), {} remaining",
            self.remaining
        );
    }
}

/// Selects units against a ticket quota.
///
/// A non-positive `raffle_size` admits preferred units only. The shuffle of
/// non-preferred units draws from `rng`, so a seeded generator reproduces a
/// run exactly.
///
/// # Examples
///
/// ```
/// use rand::rngs::StdRng;
/// use rand::SeedableRng;
/// use raffle::allocation::{filter_eligible, select, RaffleUnits};
/// use raffle::{EventSlug, EventSnapshot, Order, OrderCode, OrderPosition};
///
/// let event = EventSlug::new("gala").unwrap();
/// let orders = ["A", "B", "C"].map(|code| {
///     Order::builder(event.clone(), OrderCode::new(code).unwrap())
///         .require_approval(true)
///         .position(OrderPosition::admission(None))
///         .build()
///         .unwrap()
/// });
/// let snapshot = EventSnapshot::new(event).with_orders(orders);
/// let units = RaffleUnits::resolve(filter_eligible(snapshot.orders(), None), &snapshot);
///
/// let selection = select(&units, 2, &mut StdRng::seed_from_u64(7));
/// assert_eq!(selection.admitted.len(), 2);
/// assert_eq!(selection.remaining, 0);
///
/// let again = select(&units, 2, &mut StdRng::seed_from_u64(7));
/// assert_eq!(selection, again);
/// ```
pub fn select<R: Rng + ?Sized>(units: &RaffleUnits, raffle_size: i64, rng: &mut R) -> Selection {
    let mut shuffled: Vec<&UnitKey> = units
        .units()
        .keys()
        .filter(|key| !units.preferred().contains(*key))
        .collect();
    shuffled.shuffle(rng);

    let mut selection = Selection {
        remaining: raffle_size,
        ..Selection::default()
    };

    for key in units.preferred() {
        selection.admit(key, units);
    }

    for key in shuffled {
        if selection.remaining <= 0 {
            break;
        }
        selection.admit(key, units);
    }

    selection
}

//! Read-only view of who would take part in a raffle.

use serde::Serialize;

use crate::allocation::{filter_eligible, RaffleUnits, UnitKey};
use crate::clique::OverrideMode;
use crate::order::{OrderCode, SubEventId};
use crate::snapshot::EventSnapshot;

/// How a unit enters the draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Standing {
    /// Admitted before the draw.
    Preferred,
    /// Takes part in the random draw.
    Draw,
    /// Voided by a `never` override within the unit.
    Excluded,
}

/// An eligible order with its unit and override.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Candidate {
    /// The order.
    pub order: OrderCode,
    /// Admission tickets for the occurrence.
    pub tickets: u32,
    /// The unit the order is drawn with.
    pub unit: UnitKey,
    /// The order's own override.
    #[serde(rename = "override")]
    pub override_mode: OverrideMode,
    /// The unit's standing.
    pub standing: Standing,
}

/// Lists the eligible orders of an occurrence, in snapshot order.
///
/// # Examples
///
/// ```
/// use raffle::operations::list_candidates;
/// use raffle::{EventSlug, EventSnapshot, Order, OrderCode, OrderPosition, OverrideMode};
///
/// let event = EventSlug::new("gala").unwrap();
/// let code = OrderCode::new("A").unwrap();
/// let order = Order::builder(event.clone(), code.clone())
///     .require_approval(true)
///     .position(OrderPosition::admission(None))
///     .build()
///     .unwrap();
/// let snapshot = EventSnapshot::new(event)
///     .with_order(order)
///     .with_override(code, OverrideMode::Never);
///
/// let candidates = list_candidates(&snapshot, None);
/// assert_eq!(candidates.len(), 1);
/// assert_eq!(candidates[0].override_mode, OverrideMode::Never);
/// ```
#[must_use]
pub fn list_candidates(snapshot: &EventSnapshot, subevent: Option<SubEventId>) -> Vec<Candidate> {
    let eligible = filter_eligible(snapshot.orders(), subevent);
    let units = RaffleUnits::resolve(eligible.clone(), snapshot);

    eligible
        .into_iter()
        .map(|candidate| {
            let unit = UnitKey::for_order(candidate.code(), snapshot);
            let standing = if units.excluded().contains(&unit) {
                Standing::Excluded
            } else if units.preferred().contains(&unit) {
                Standing::Preferred
            } else {
                Standing::Draw
            };
            Candidate {
                override_mode: snapshot.override_of(candidate.code()),
                order: candidate.order.code().clone(),
                tickets: candidate.ticket_count,
                unit,
                standing,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clique::CliqueId;
    use crate::order::{EventSlug, Order, OrderPosition};

    fn order(code: &str, tickets: usize) -> Order {
        Order::builder(EventSlug::new("gala").unwrap(), OrderCode::new(code).unwrap())
            .require_approval(true)
            .positions(vec![OrderPosition::admission(Some(SubEventId::new(1))); tickets])
            .build()
            .unwrap()
    }

    fn code(s: &str) -> OrderCode {
        OrderCode::new(s).unwrap()
    }

    #[test]
    fn test_standing_follows_unit() {
        let snapshot = EventSnapshot::new(EventSlug::new("gala").unwrap())
            .with_orders([order("A", 1), order("B", 2), order("C", 1), order("D", 1)])
            .with_membership(code("A"), CliqueId::new(1))
            .with_membership(code("B"), CliqueId::new(1))
            .with_membership(code("C"), CliqueId::new(2))
            .with_override(code("A"), OverrideMode::Always)
            .with_override(code("C"), OverrideMode::Never);

        let candidates = list_candidates(&snapshot, Some(SubEventId::new(1)));
        let standings: Vec<(&str, Standing)> = candidates
            .iter()
            .map(|c| (c.order.as_str(), c.standing))
            .collect();
        assert_eq!(
            standings,
            vec![
                ("A", Standing::Preferred),
                ("B", Standing::Preferred),
                ("C", Standing::Excluded),
                ("D", Standing::Draw),
            ]
        );
        assert_eq!(candidates[1].tickets, 2);
        assert_eq!(candidates[1].override_mode, OverrideMode::Normal);
        assert_eq!(candidates[3].unit, UnitKey::Single(code("D")));
    }

    #[test]
    fn test_other_occurrence_lists_nothing() {
        let snapshot = EventSnapshot::new(EventSlug::new("gala").unwrap()).with_order(order("A", 1));
        assert!(list_candidates(&snapshot, Some(SubEventId::new(2))).is_empty());
    }
}

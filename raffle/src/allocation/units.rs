//! Grouping of eligible orders into raffle units.
//!
//! A unit is either a whole clique or a single unaffiliated order. Units are
//! admitted or rejected as a whole, so a raffle never splits a clique.
//! Overrides are resolved here: `Never` voids the order's entire unit and
//! `Always` makes it preferred.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::Serialize;

use super::eligibility::EligibleOrder;
use crate::clique::{CliqueId, OverrideMode};
use crate::order::OrderCode;
use crate::snapshot::EventSnapshot;

/// Identifies a raffle unit.
///
/// Keys are totally ordered (cliques before singles, then by id or code),
/// which fixes the enumeration order of preferred units.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(tag = "kind", content = "id", rename_all = "lowercase")]
pub enum UnitKey {
    /// All eligible members of a clique.
    Clique(CliqueId),
    /// An order without a clique.
    Single(OrderCode),
}

impl UnitKey {
    /// Returns the unit key of `order` within `snapshot`.
    ///
    /// # Examples
    ///
    /// ```
    /// use raffle::allocation::UnitKey;
    /// use raffle::{CliqueId, EventSlug, EventSnapshot, OrderCode};
    ///
    /// let a = OrderCode::new("A").unwrap();
    /// let b = OrderCode::new("B").unwrap();
    /// let snapshot = EventSnapshot::new(EventSlug::new("gala").unwrap())
    ///     .with_membership(a.clone(), CliqueId::new(9));
    ///
    /// assert_eq!(UnitKey::for_order(&a, &snapshot), UnitKey::Clique(CliqueId::new(9)));
    /// assert_eq!(UnitKey::for_order(&b, &snapshot), UnitKey::Single(b));
    /// ```
    #[must_use]
    pub fn for_order(order: &OrderCode, snapshot: &EventSnapshot) -> Self {
        snapshot
            .clique_of(order)
            .map_or_else(|| Self::Single(order.clone()), Self::Clique)
    }
}

impl fmt::Display for UnitKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Clique(id) => write!(f, "clique:{id}"),
            Self::Single(code) => write!(f, "single:{code}"),
        }
    }
}

/// Eligible orders partitioned into units, with overrides applied.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RaffleUnits {
    units: BTreeMap<UnitKey, Vec<EligibleOrder>>,
    preferred: BTreeSet<UnitKey>,
    excluded: BTreeSet<UnitKey>,
}

impl RaffleUnits {
    /// Groups `eligible` by clique and applies the snapshot's overrides.
    ///
    /// Members keep their input order within a unit. A single `Never` member
    /// removes its whole unit, even if other members are `Always`.
    ///
    /// # Examples
    ///
    /// ```
    /// use raffle::allocation::{filter_eligible, RaffleUnits, UnitKey};
    /// use raffle::{CliqueId, EventSlug, EventSnapshot, Order, OrderCode, OrderPosition, OverrideMode};
    ///
    /// let event = EventSlug::new("gala").unwrap();
    /// let order = |code: &str| {
    ///     Order::builder(event.clone(), OrderCode::new(code).unwrap())
    ///         .require_approval(true)
    ///         .position(OrderPosition::admission(None))
    ///         .build()
    ///         .unwrap()
    /// };
    /// let a = OrderCode::new("A").unwrap();
    /// let snapshot = EventSnapshot::new(event.clone())
    ///     .with_orders([order("A"), order("B"), order("C")])
    ///     .with_membership(a.clone(), CliqueId::new(1))
    ///     .with_membership(OrderCode::new("B").unwrap(), CliqueId::new(1))
    ///     .with_override(a, OverrideMode::Always);
    ///
    /// let eligible = filter_eligible(snapshot.orders(), None);
    /// let units = RaffleUnits::resolve(eligible, &snapshot);
    ///
    /// assert_eq!(units.len(), 2);
    /// assert!(units.preferred().contains(&UnitKey::Clique(CliqueId::new(1))));
    /// assert_eq!(units.ticket_count(&UnitKey::Clique(CliqueId::new(1))), 2);
    /// ```
    #[must_use]
    pub fn resolve(eligible: Vec<EligibleOrder>, snapshot: &EventSnapshot) -> Self {
        let mut resolved = Self::default();

        for candidate in eligible {
            let key = UnitKey::for_order(candidate.code(), snapshot);
            match snapshot.override_of(candidate.code()) {
                OverrideMode::Never => {
                    log::debug!("{} vetoed unit {key}", candidate.code());
                    resolved.excluded.insert(key);
                }
                mode => {
                    if mode == OverrideMode::Always {
                        resolved.preferred.insert(key.clone());
                    }
                    resolved.units.entry(key).or_default().push(candidate);
                }
            }
        }

        for key in &resolved.excluded {
            resolved.units.remove(key);
            resolved.preferred.remove(key);
        }

        resolved
    }

    /// Returns the units and their members.
    #[must_use]
    pub const fn units(&self) -> &BTreeMap<UnitKey, Vec<EligibleOrder>> {
        &self.units
    }

    /// Returns the keys of units containing an `Always` member.
    #[must_use]
    pub const fn preferred(&self) -> &BTreeSet<UnitKey> {
        &self.preferred
    }

    /// Returns the keys voided by a `Never` member.
    ///
    /// A vetoed order without a clique contributes its `Single` key, so the
    /// set covers every unit that stays out of the draw.
    #[must_use]
    pub const fn excluded(&self) -> &BTreeSet<UnitKey> {
        &self.excluded
    }

    /// Returns the members of a unit.
    #[must_use]
    pub fn members(&self, key: &UnitKey) -> Option<&[EligibleOrder]> {
        self.units.get(key).map(Vec::as_slice)
    }

    /// Returns the total ticket count of a unit, 0 for unknown keys.
    #[must_use]
    pub fn ticket_count(&self, key: &UnitKey) -> u32 {
        self.members(key)
            .unwrap_or_default()
            .iter()
            .map(|m| m.ticket_count)
            .sum()
    }

    /// Returns the number of units.
    #[must_use]
    pub fn len(&self) -> usize {
        self.units.len()
    }

    /// Returns `true` if no unit survived.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// Returns the number of orders across all units.
    #[must_use]
    pub fn order_count(&self) -> usize {
        self.units.values().map(Vec::len).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::allocation::eligibility::filter_eligible;
    use crate::order::{EventSlug, Order, OrderPosition};

    fn code(s: &str) -> OrderCode {
        OrderCode::new(s).unwrap()
    }

    fn order(c: &str, tickets: usize) -> Order {
        Order::builder(EventSlug::new("gala").unwrap(), code(c))
            .require_approval(true)
            .positions(std::iter::repeat(OrderPosition::admission(None)).take(tickets))
            .build()
            .unwrap()
    }

    fn resolve(snapshot: &EventSnapshot) -> RaffleUnits {
        RaffleUnits::resolve(filter_eligible(snapshot.orders(), None), snapshot)
    }

    fn member_codes(units: &RaffleUnits, key: &UnitKey) -> Vec<String> {
        units
            .members(key)
            .unwrap_or_default()
            .iter()
            .map(|m| m.code().to_string())
            .collect()
    }

    #[test]
    fn test_singletons_without_cliques() {
        let snapshot = EventSnapshot::new(EventSlug::new("gala").unwrap())
            .with_orders([order("A", 1), order("B", 2)]);
        let units = resolve(&snapshot);

        assert_eq!(units.len(), 2);
        assert_eq!(units.ticket_count(&UnitKey::Single(code("B"))), 2);
        assert!(units.preferred().is_empty());
        assert!(units.excluded().is_empty());
    }

    #[test]
    fn test_clique_members_share_a_unit_in_input_order() {
        let snapshot = EventSnapshot::new(EventSlug::new("gala").unwrap())
            .with_orders([order("C", 1), order("A", 2), order("B", 1)])
            .with_membership(code("C"), CliqueId::new(7))
            .with_membership(code("A"), CliqueId::new(7));
        let units = resolve(&snapshot);

        let clique = UnitKey::Clique(CliqueId::new(7));
        assert_eq!(units.len(), 2);
        assert_eq!(member_codes(&units, &clique), vec!["C", "A"]);
        assert_eq!(units.ticket_count(&clique), 3);
        assert_eq!(units.order_count(), 3);
    }

    #[test]
    fn test_never_voids_whole_clique_even_with_always_member() {
        let snapshot = EventSnapshot::new(EventSlug::new("gala").unwrap())
            .with_orders([order("A", 1), order("B", 1), order("C", 1)])
            .with_membership(code("A"), CliqueId::new(1))
            .with_membership(code("B"), CliqueId::new(1))
            .with_override(code("A"), OverrideMode::Always)
            .with_override(code("B"), OverrideMode::Never);
        let units = resolve(&snapshot);

        let clique = UnitKey::Clique(CliqueId::new(1));
        assert!(units.members(&clique).is_none());
        assert!(!units.preferred().contains(&clique));
        assert!(units.excluded().contains(&clique));
        assert_eq!(units.len(), 1);
        assert_eq!(units.ticket_count(&clique), 0);
    }

    #[test]
    fn test_never_before_always_in_input_order() {
        // The veto applies regardless of which member is seen first.
        let snapshot = EventSnapshot::new(EventSlug::new("gala").unwrap())
            .with_orders([order("B", 1), order("A", 1)])
            .with_membership(code("A"), CliqueId::new(1))
            .with_membership(code("B"), CliqueId::new(1))
            .with_override(code("B"), OverrideMode::Never)
            .with_override(code("A"), OverrideMode::Always);
        let units = resolve(&snapshot);

        assert!(units.is_empty());
        assert!(units.preferred().is_empty());
    }

    #[test]
    fn test_always_marks_unit_preferred() {
        let snapshot = EventSnapshot::new(EventSlug::new("gala").unwrap())
            .with_orders([order("A", 1), order("B", 1)])
            .with_override(code("B"), OverrideMode::Always)
            .with_override(code("A"), OverrideMode::Normal);
        let units = resolve(&snapshot);

        let preferred: Vec<_> = units.preferred().iter().cloned().collect();
        assert_eq!(preferred, vec![UnitKey::Single(code("B"))]);
    }

    #[test]
    fn test_overrides_for_ineligible_orders_are_ignored() {
        let paid = Order::builder(EventSlug::new("gala").unwrap(), code("P"))
            .status(crate::order::OrderStatus::Paid)
            .require_approval(true)
            .position(OrderPosition::admission(None))
            .build()
            .unwrap();
        let snapshot = EventSnapshot::new(EventSlug::new("gala").unwrap())
            .with_orders([order("A", 1), paid])
            .with_membership(code("A"), CliqueId::new(3))
            .with_membership(code("P"), CliqueId::new(3))
            .with_override(code("P"), OverrideMode::Never);
        let units = resolve(&snapshot);

        assert_eq!(
            member_codes(&units, &UnitKey::Clique(CliqueId::new(3))),
            vec!["A"]
        );
    }

    #[test]
    fn test_unit_key_ordering_and_display() {
        let clique = UnitKey::Clique(CliqueId::new(2));
        let single = UnitKey::Single(code("a"));
        assert!(clique < single);
        assert_eq!(clique.to_string(), "clique:2");
        assert_eq!(single.to_string(), "single:A");
    }
}

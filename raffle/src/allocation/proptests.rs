//! Property-based tests for grouping and selection.
//!
//! Random events are generated with cliques, overrides and multi-ticket
//! orders, then run through the full eligibility, grouping and selection
//! pipeline.

use std::collections::{BTreeSet, HashMap};

use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;

use super::{filter_eligible, filter_rejectable, select, RaffleUnits, UnitKey};
use crate::clique::{CliqueId, OverrideMode};
use crate::order::{EventSlug, Order, OrderCode, OrderPosition, OrderStatus, SubEventId};
use crate::snapshot::EventSnapshot;

// ============================================================================
// STRATEGY DEFINITIONS
// ============================================================================

#[derive(Debug, Clone)]
struct OrderSpec {
    tickets: usize,
    elsewhere: bool,
    pending: bool,
    clique: Option<i64>,
    mode: OverrideMode,
}

fn mode_strategy() -> impl Strategy<Value = OverrideMode> {
    prop_oneof![
        6 => Just(OverrideMode::Normal),
        1 => Just(OverrideMode::Always),
        1 => Just(OverrideMode::Never),
    ]
}

fn order_spec_strategy() -> impl Strategy<Value = OrderSpec> {
    (
        0usize..4,
        prop::bool::weighted(0.1),
        prop::bool::weighted(0.9),
        prop::option::weighted(0.5, 0i64..5),
        mode_strategy(),
    )
        .prop_map(|(tickets, elsewhere, pending, clique, mode)| OrderSpec {
            tickets,
            elsewhere,
            pending,
            clique,
            mode,
        })
}

fn snapshot_strategy() -> impl Strategy<Value = EventSnapshot> {
    prop::collection::vec(order_spec_strategy(), 0..30).prop_map(build_snapshot)
}

fn target() -> Option<SubEventId> {
    Some(SubEventId::new(1))
}

fn build_snapshot(specs: Vec<OrderSpec>) -> EventSnapshot {
    let event = EventSlug::new("prop").unwrap();
    let mut snapshot = EventSnapshot::new(event.clone());

    for (i, spec) in specs.into_iter().enumerate() {
        let code = OrderCode::new(format!("O{i:03}")).unwrap();
        let mut builder = Order::builder(event.clone(), code.clone())
            .require_approval(true)
            .status(if spec.pending {
                OrderStatus::Pending
            } else {
                OrderStatus::Paid
            })
            .positions(std::iter::repeat(OrderPosition::admission(target())).take(spec.tickets));
        if spec.elsewhere {
            builder = builder.position(OrderPosition::admission(Some(SubEventId::new(2))));
        }
        snapshot = snapshot.with_order(builder.build().unwrap());

        if let Some(clique) = spec.clique {
            snapshot = snapshot.with_membership(code.clone(), CliqueId::new(clique));
        }
        if spec.mode != OverrideMode::Normal {
            snapshot = snapshot.with_override(code, spec.mode);
        }
    }

    snapshot
}

fn resolve(snapshot: &EventSnapshot) -> RaffleUnits {
    RaffleUnits::resolve(filter_eligible(snapshot.orders(), target()), snapshot)
}

// ============================================================================
// PROPERTY 1: GROUPING PARTITION
// ============================================================================
// Every eligible order lands in exactly one unit, unless its unit was
// vetoed, and no ineligible order lands anywhere.

proptest! {
    #[test]
    fn prop_units_partition_eligible_orders(snapshot in snapshot_strategy()) {
        let eligible = filter_eligible(snapshot.orders(), target());
        let units = resolve(&snapshot);

        let mut seen: HashMap<OrderCode, usize> = HashMap::new();
        for (key, members) in units.units() {
            prop_assert!(!members.is_empty());
            for member in members {
                prop_assert_eq!(&UnitKey::for_order(member.code(), &snapshot), key);
                *seen.entry(member.code().clone()).or_default() += 1;
            }
        }

        for candidate in &eligible {
            let key = UnitKey::for_order(candidate.code(), &snapshot);
            let expected = usize::from(!units.excluded().contains(&key));
            prop_assert_eq!(seen.get(candidate.code()).copied().unwrap_or(0), expected);
        }
        prop_assert_eq!(seen.len(), units.order_count());
        prop_assert!(units.order_count() <= eligible.len());
    }
}

// ============================================================================
// PROPERTY 2: NEVER PROPAGATION
// ============================================================================
// An eligible order with a Never override keeps every order of its unit out
// of the admitted set.

proptest! {
    #[test]
    fn prop_never_vetoes_whole_unit(
        snapshot in snapshot_strategy(),
        raffle_size in -5i64..60,
        seed in any::<u64>(),
    ) {
        let units = resolve(&snapshot);
        let selection = select(&units, raffle_size, &mut StdRng::seed_from_u64(seed));

        let vetoed: BTreeSet<UnitKey> = filter_eligible(snapshot.orders(), target())
            .iter()
            .filter(|e| snapshot.override_of(e.code()) == OverrideMode::Never)
            .map(|e| UnitKey::for_order(e.code(), &snapshot))
            .collect();

        for admitted in &selection.admitted {
            let key = UnitKey::for_order(admitted.code(), &snapshot);
            prop_assert!(!vetoed.contains(&key), "{} admitted from vetoed unit", admitted.code());
        }
        prop_assert_eq!(&vetoed, units.excluded());
    }
}

// ============================================================================
// PROPERTY 3: ALWAYS GUARANTEE
// ============================================================================
// Every unit with an Always member and no Never member is admitted in full,
// for any quota including zero and negative ones.

proptest! {
    #[test]
    fn prop_preferred_units_always_admitted(
        snapshot in snapshot_strategy(),
        raffle_size in -5i64..60,
        seed in any::<u64>(),
    ) {
        let units = resolve(&snapshot);
        let selection = select(&units, raffle_size, &mut StdRng::seed_from_u64(seed));
        let admitted: BTreeSet<&OrderCode> = selection.admitted_codes().into_iter().collect();

        for key in units.preferred() {
            for member in units.members(key).unwrap_or_default() {
                prop_assert!(admitted.contains(member.code()));
            }
        }

        // Preferred units come first, in key order.
        let leading: Vec<&UnitKey> = selection
            .admitted_units
            .iter()
            .take(units.preferred().len())
            .collect();
        let preferred: Vec<&UnitKey> = units.preferred().iter().collect();
        prop_assert_eq!(leading, preferred);
    }
}

// ============================================================================
// PROPERTY 4: QUOTA CONSUMPTION
// ============================================================================
// A non-preferred unit is only admitted while the running remainder is
// positive, and the draw stops only when the quota is used up or nothing is
// left to draw.

proptest! {
    #[test]
    fn prop_quota_consumption(
        snapshot in snapshot_strategy(),
        raffle_size in -5i64..60,
        seed in any::<u64>(),
    ) {
        let units = resolve(&snapshot);
        let selection = select(&units, raffle_size, &mut StdRng::seed_from_u64(seed));

        let mut running = raffle_size;
        let mut total = 0u64;
        for key in &selection.admitted_units {
            if !units.preferred().contains(key) {
                prop_assert!(running > 0, "admitted {} with remainder {}", key, running);
            }
            let tickets = units.ticket_count(key);
            running -= i64::from(tickets);
            total += u64::from(tickets);
        }

        prop_assert_eq!(running, selection.remaining);
        prop_assert_eq!(total, selection.admitted_tickets);
        prop_assert_eq!(
            selection.remaining,
            raffle_size - i64::try_from(selection.admitted_tickets).unwrap()
        );

        let all_drawn = selection.admitted_units.len() == units.len();
        prop_assert!(all_drawn || selection.remaining <= 0);

        // Each admitted unit appears once.
        let distinct: BTreeSet<&UnitKey> = selection.admitted_units.iter().collect();
        prop_assert_eq!(distinct.len(), selection.admitted_units.len());
    }
}

// ============================================================================
// PROPERTY 5: REJECTION COMPLETENESS
// ============================================================================
// The rejection filter is a superset of the raffle filter and ignores
// cliques and overrides entirely.

proptest! {
    #[test]
    fn prop_rejection_ignores_grouping(snapshot in snapshot_strategy()) {
        let rejectable: BTreeSet<OrderCode> = filter_rejectable(snapshot.orders(), target())
            .into_iter()
            .map(|e| e.order.code().clone())
            .collect();

        for eligible in filter_eligible(snapshot.orders(), target()) {
            prop_assert!(rejectable.contains(eligible.code()));
        }

        let bare = EventSnapshot::default().with_orders(snapshot.orders().iter().cloned());
        let bare_rejectable: BTreeSet<OrderCode> = filter_rejectable(bare.orders(), target())
            .into_iter()
            .map(|e| e.order.code().clone())
            .collect();
        prop_assert_eq!(rejectable, bare_rejectable);
    }
}

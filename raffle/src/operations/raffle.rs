//! Raffle run planning.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::allocation::{filter_eligible, select, RaffleUnits};
use crate::order::{SubEventId, UserId};
use crate::snapshot::EventSnapshot;

use super::plan::{OperationPlan, PlanAction, RaffleSummary};

/// Options for a raffle run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RaffleOptions {
    /// Occurrence to raffle, `None` for single-occurrence events.
    pub subevent: Option<SubEventId>,

    /// User the approvals are made on behalf of.
    pub user: UserId,

    /// Ticket quota to fill.
    pub raffle_size: i64,

    /// Add-on limit from the run form. Carried but not applied.
    pub max_addons: Option<u32>,

    /// Seed for the draw; a fresh random seed is used when absent.
    pub seed: Option<u64>,
}

impl RaffleOptions {
    /// Creates options for a raffle with the given quota.
    ///
    /// # Examples
    ///
    /// ```
    /// use raffle::operations::RaffleOptions;
    /// use raffle::{SubEventId, UserId};
    ///
    /// let options = RaffleOptions::new(UserId::new(1), 20)
    ///     .with_subevent(Some(SubEventId::new(4)))
    ///     .with_seed(Some(7));
    /// assert_eq!(options.raffle_size, 20);
    /// assert_eq!(options.max_addons, None);
    /// ```
    #[must_use]
    pub const fn new(user: UserId, raffle_size: i64) -> Self {
        Self {
            subevent: None,
            user,
            raffle_size,
            max_addons: None,
            seed: None,
        }
    }

    /// Sets the occurrence.
    #[must_use]
    pub const fn with_subevent(mut self, subevent: Option<SubEventId>) -> Self {
        self.subevent = subevent;
        self
    }

    /// Sets the add-on limit.
    #[must_use]
    pub const fn with_max_addons(mut self, max_addons: Option<u32>) -> Self {
        self.max_addons = max_addons;
        self
    }

    /// Sets the draw seed.
    #[must_use]
    pub const fn with_seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }
}

/// A raffle plan generator.
///
/// Runs eligibility, grouping and selection over a snapshot and turns the
/// admitted orders into approval actions.
pub struct RafflePlan {
    options: RaffleOptions,
}

impl RafflePlan {
    /// Creates a new raffle plan with the given options.
    #[must_use]
    pub const fn new(options: RaffleOptions) -> Self {
        Self { options }
    }

    /// Builds the plan, seeding the draw from the options.
    ///
    /// # Examples
    ///
    /// ```
    /// use raffle::operations::{RaffleOptions, RafflePlan};
    /// use raffle::{EventSlug, EventSnapshot, Order, OrderCode, OrderPosition, UserId};
    ///
    /// let event = EventSlug::new("gala").unwrap();
    /// let order = Order::builder(event.clone(), OrderCode::new("A").unwrap())
    ///     .require_approval(true)
    ///     .position(OrderPosition::admission(None))
    ///     .build()
    ///     .unwrap();
    /// let snapshot = EventSnapshot::new(event).with_order(order);
    ///
    /// let plan = RafflePlan::new(RaffleOptions::new(UserId::new(1), 5)).build_plan(&snapshot);
    /// assert_eq!(plan.len(), 1);
    /// assert_eq!(plan.summary.unwrap().remaining, 4);
    /// ```
    #[must_use]
    pub fn build_plan(&self, snapshot: &EventSnapshot) -> OperationPlan {
        let mut rng = self
            .options
            .seed
            .map_or_else(StdRng::from_entropy, StdRng::seed_from_u64);
        self.build_plan_with_rng(snapshot, &mut rng)
    }

    /// Builds the plan drawing from the given random source.
    #[must_use]
    pub fn build_plan_with_rng<R: Rng + ?Sized>(
        &self,
        snapshot: &EventSnapshot,
        rng: &mut R,
    ) -> OperationPlan {
        let options = &self.options;
        let eligible = filter_eligible(snapshot.orders(), options.subevent);
        let eligible_orders = eligible.len();
        let units = RaffleUnits::resolve(eligible, snapshot);
        let selection = select(&units, options.raffle_size, rng);

        let summary = RaffleSummary {
            subevent: options.subevent,
            raffle_size: options.raffle_size,
            eligible_orders,
            units: units.len(),
            preferred_units: units.preferred().len(),
            excluded_units: units.excluded().len(),
            admitted_units: selection.admitted_units.len(),
            admitted_orders: selection.admitted.len(),
            admitted_tickets: selection.admitted_tickets,
            remaining: selection.remaining,
        };

        let mut plan = OperationPlan::new(describe(snapshot, options), options.user);

        if let Some(max_addons) = options.max_addons {
            plan = plan.add_warning(format!(
                "max_addons={max_addons} was given but add-on limits are not applied by the raffle"
            ));
        }
        if eligible_orders == 0 {
            plan = plan.add_warning("No eligible orders for this occurrence");
        }
        if selection.remaining < 0 {
            plan = plan.add_warning(format!(
                "Admitted {} tickets, {} over the requested {}",
                selection.admitted_tickets, -selection.remaining, options.raffle_size
            ));
        }

        log::debug!(
            "raffle selected {} of {} units ({} orders)",
            summary.admitted_units,
            summary.units,
            summary.admitted_orders
        );

        selection
            .admitted
            .into_iter()
            .fold(plan, |plan, admitted| {
                plan.add_action(PlanAction::Approve(admitted.order.code().clone()))
            })
            .with_summary(summary)
    }
}

fn describe(snapshot: &EventSnapshot, options: &RaffleOptions) -> String {
    let event = snapshot.event().map_or("event", |e| e.as_str());
    match options.subevent {
        Some(sub) => format!(
            "Raffle {} tickets for {event} subevent {sub}",
            options.raffle_size
        ),
        None => format!("Raffle {} tickets for {event}", options.raffle_size),
    }
}

//! The allocation engine.
//!
//! A raffle run flows through three pure stages:
//!
//! 1. [`filter_eligible`] picks the pending, approval-gated orders for one
//!    occurrence and counts their tickets.
//! 2. [`RaffleUnits::resolve`] groups them into clique or single units and
//!    applies `Always`/`Never` overrides.
//! 3. [`select`] admits preferred units, then a random draw of the rest until
//!    the ticket quota is used up.
//!
//! None of these stages touch storage; side effects belong to
//! [`crate::operations`].

pub mod eligibility;
pub mod selection;
pub mod units;

#[cfg(test)]
mod proptests;

pub use eligibility::{filter_eligible, filter_rejectable, EligibleOrder};
pub use selection::{select, Selection};
pub use units::{RaffleUnits, UnitKey};

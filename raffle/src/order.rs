//! Order types for approval-gated ticket purchases.
//!
//! This module provides the read shape of orders that the allocation engine
//! consumes: identifiers, statuses, line items, and a builder for
//! constructing validated orders.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Error type for invalid field values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// The field that failed validation.
    pub field: String,
    /// A description of the validation failure.
    pub message: String,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "validation error for '{}': {}", self.field, self.message)
    }
}

impl std::error::Error for ValidationError {}

fn non_empty(field: &str, value: &str) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError {
            field: field.into(),
            message: format!("{field} must be non-empty after trimming whitespace"),
        });
    }
    Ok(trimmed.to_string())
}

/// Slug identifying an event.
///
/// # Examples
///
/// ```
/// use raffle::EventSlug;
///
/// let event = EventSlug::new(" summer-camp ").unwrap();
/// assert_eq!(event.as_str(), "summer-camp");
/// assert!(EventSlug::new("   ").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EventSlug(String);

impl EventSlug {
    /// Creates a new event slug.
    ///
    /// # Errors
    ///
    /// Returns an error if the slug is empty after trimming whitespace.
    pub fn new(slug: impl AsRef<str>) -> Result<Self, ValidationError> {
        non_empty("event", slug.as_ref()).map(Self)
    }

    /// Returns the slug as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for EventSlug {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<EventSlug> for String {
    fn from(value: EventSlug) -> Self {
        value.0
    }
}

impl fmt::Display for EventSlug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier of a dated occurrence of an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubEventId(i64);

impl SubEventId {
    /// Wraps a raw occurrence id.
    #[must_use]
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    /// Returns the raw id.
    #[must_use]
    pub const fn value(self) -> i64 {
        self.0
    }
}

impl fmt::Display for SubEventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of the user on whose behalf a run acts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(i64);

impl UserId {
    /// Wraps a raw user id.
    #[must_use]
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    /// Returns the raw id.
    #[must_use]
    pub const fn value(self) -> i64 {
        self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The public code of an order.
///
/// Codes are case-insensitive and stored upper-case.
///
/// # Examples
///
/// ```
/// use raffle::OrderCode;
///
/// let code = OrderCode::new("ab3x9").unwrap();
/// assert_eq!(code.as_str(), "AB3X9");
/// assert_eq!(format!("{code}"), "AB3X9");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct OrderCode(String);

impl OrderCode {
    /// Creates a new order code.
    ///
    /// # Errors
    ///
    /// Returns an error if the code is empty after trimming whitespace.
    pub fn new(code: impl AsRef<str>) -> Result<Self, ValidationError> {
        non_empty("code", code.as_ref()).map(|c| Self(c.to_uppercase()))
    }

    /// Returns the code as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for OrderCode {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<OrderCode> for String {
    fn from(value: OrderCode) -> Self {
        value.0
    }
}

impl fmt::Display for OrderCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Lifecycle status of an order.
///
/// Transitions are owned by the order service; the engine only reads them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    /// Placed and not yet paid (approval-gated orders wait here).
    Pending,
    /// Paid.
    Paid,
    /// Payment deadline passed.
    Expired,
    /// Canceled, including denied orders.
    Canceled,
}

impl OrderStatus {
    /// Returns the storage representation of the status.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Paid => "paid",
            Self::Expired => "expired",
            Self::Canceled => "canceled",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "paid" => Ok(Self::Paid),
            "expired" => Ok(Self::Expired),
            "canceled" | "cancelled" => Ok(Self::Canceled),
            other => Err(ValidationError {
                field: "status".into(),
                message: format!("unknown order status: {other}"),
            }),
        }
    }
}

/// A line item of an order.
///
/// # Examples
///
/// ```
/// use raffle::{OrderPosition, SubEventId};
///
/// let ticket = OrderPosition::admission(Some(SubEventId::new(1)));
/// assert!(ticket.counts_for(Some(SubEventId::new(1))));
/// assert!(!ticket.counts_for(Some(SubEventId::new(2))));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderPosition {
    /// Occurrence the item is for, absent for single-occurrence events.
    #[serde(default)]
    pub subevent: Option<SubEventId>,
    /// Whether the item grants admission.
    #[serde(default = "default_true")]
    pub admission: bool,
    /// Whether the item has been canceled.
    #[serde(default)]
    pub canceled: bool,
}

const fn default_true() -> bool {
    true
}

impl OrderPosition {
    /// Creates a live admission ticket for the given occurrence.
    #[must_use]
    pub const fn admission(subevent: Option<SubEventId>) -> Self {
        Self {
            subevent,
            admission: true,
            canceled: false,
        }
    }

    /// Creates a live non-admission item (e.g. an add-on) for the given occurrence.
    #[must_use]
    pub const fn addon(subevent: Option<SubEventId>) -> Self {
        Self {
            subevent,
            admission: false,
            canceled: false,
        }
    }

    /// Marks the item as canceled.
    #[must_use]
    pub const fn canceled(mut self) -> Self {
        self.canceled = true;
        self
    }

    /// Returns `true` if this is a live admission ticket.
    #[must_use]
    pub const fn is_live_admission(&self) -> bool {
        self.admission && !self.canceled
    }

    /// Returns `true` if this is a live admission ticket for `target`.
    #[must_use]
    pub fn counts_for(&self, target: Option<SubEventId>) -> bool {
        self.is_live_admission() && self.subevent == target
    }
}

/// An order as seen by the allocation engine.
///
/// # Examples
///
/// ```
/// use raffle::{EventSlug, Order, OrderCode, OrderPosition, OrderStatus};
///
/// let order = Order::builder(EventSlug::new("gala").unwrap(), OrderCode::new("A1").unwrap())
///     .require_approval(true)
///     .position(OrderPosition::admission(None))
///     .build()
///     .unwrap();
///
/// assert_eq!(order.status(), OrderStatus::Pending);
/// assert!(order.awaits_approval());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    code: OrderCode,
    event: EventSlug,
    status: OrderStatus,
    require_approval: bool,
    positions: Vec<OrderPosition>,
}

impl Order {
    /// Creates a new order builder.
    #[must_use]
    pub fn builder(event: EventSlug, code: OrderCode) -> OrderBuilder {
        OrderBuilder {
            event,
            code,
            status: OrderStatus::Pending,
            require_approval: false,
            positions: Vec::new(),
        }
    }

    /// Returns the order code.
    #[must_use]
    pub const fn code(&self) -> &OrderCode {
        &self.code
    }

    /// Returns the event the order belongs to.
    #[must_use]
    pub const fn event(&self) -> &EventSlug {
        &self.event
    }

    /// Returns the order status.
    #[must_use]
    pub const fn status(&self) -> OrderStatus {
        self.status
    }

    /// Returns whether the order requires approval.
    #[must_use]
    pub const fn require_approval(&self) -> bool {
        self.require_approval
    }

    /// Returns the order's line items.
    #[must_use]
    pub fn positions(&self) -> &[OrderPosition] {
        &self.positions
    }

    /// Returns `true` if the order is pending and waiting for approval.
    #[must_use]
    pub fn awaits_approval(&self) -> bool {
        self.require_approval && self.status == OrderStatus::Pending
    }

    /// Counts live admission tickets for the given occurrence.
    #[must_use]
    pub fn tickets_for(&self, target: Option<SubEventId>) -> u32 {
        let count = self
            .positions
            .iter()
            .filter(|p| p.counts_for(target))
            .count();
        u32::try_from(count).unwrap_or(u32::MAX)
    }

    /// Counts live admission tickets for any occurrence other than `target`.
    #[must_use]
    pub fn tickets_elsewhere(&self, target: Option<SubEventId>) -> u32 {
        let count = self
            .positions
            .iter()
            .filter(|p| p.is_live_admission() && p.subevent != target)
            .count();
        u32::try_from(count).unwrap_or(u32::MAX)
    }
}

/// Builder for creating `Order` instances.
#[derive(Debug)]
pub struct OrderBuilder {
    event: EventSlug,
    code: OrderCode,
    status: OrderStatus,
    require_approval: bool,
    positions: Vec<OrderPosition>,
}

impl OrderBuilder {
    /// Sets the order status.
    #[must_use]
    pub const fn status(mut self, status: OrderStatus) -> Self {
        self.status = status;
        self
    }

    /// Sets whether the order requires approval.
    #[must_use]
    pub const fn require_approval(mut self, require_approval: bool) -> Self {
        self.require_approval = require_approval;
        self
    }

    /// Appends a line item.
    #[must_use]
    pub fn position(mut self, position: OrderPosition) -> Self {
        self.positions.push(position);
        self
    }

    /// Appends several line items.
    #[must_use]
    pub fn positions(mut self, positions: impl IntoIterator<Item = OrderPosition>) -> Self {
        self.positions.extend(positions);
        self
    }

    /// Builds the order.
    ///
    /// # Errors
    ///
    /// Returns an error if a line item references an occurrence with a
    /// negative id.
    pub fn build(self) -> Result<Order, ValidationError> {
        if let Some(bad) = self
            .positions
            .iter()
            .filter_map(|p| p.subevent)
            .find(|s| s.value() < 0)
        {
            return Err(ValidationError {
                field: "subevent".into(),
                message: format!("subevent id must be non-negative, got {bad}"),
            });
        }

        Ok(Order {
            code: self.code,
            event: self.event,
            status: self.status,
            require_approval: self.require_approval,
            positions: self.positions,
        })
    }
}

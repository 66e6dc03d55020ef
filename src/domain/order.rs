//! Order aggregate
//!
//! An `Order` owns its `OrderLine`s. Both are created together in one
//! transaction and the lines are never mutated afterwards; the only
//! post-creation change is a status transition.

use chrono::{DateTime, Utc};
use rand::distributions::Alphanumeric;
use rand::Rng;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use super::DomainError;

/// Prefix of every generated order code
pub const ORDER_CODE_PREFIX: &str = "SO";

/// Length of the random part of an order code
const ORDER_CODE_SUFFIX_LEN: usize = 6;

// =========================================================================
// OrderStatus
// =========================================================================

/// Lifecycle status of an order.
///
/// ```text
/// New ──────────┐
///  │            ├──> Cancelled
///  v            │
/// InProgress ───┘
///  │
///  v
/// Done
/// ```
///
/// `Done` and `Cancelled` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    #[default]
    New,
    InProgress,
    Done,
    Cancelled,
}

impl OrderStatus {
    /// Storage / wire representation
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::New => "new",
            OrderStatus::InProgress => "in_progress",
            OrderStatus::Done => "done",
            OrderStatus::Cancelled => "cancelled",
        }
    }

    /// No transition leaves a terminal status.
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Done | OrderStatus::Cancelled)
    }

    /// Whether an order in this status may be cancelled
    pub fn can_cancel(&self) -> bool {
        !self.is_terminal()
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown status string
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown order status: {0}")]
pub struct UnknownStatus(pub String);

impl FromStr for OrderStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "new" => Ok(OrderStatus::New),
            "in_progress" => Ok(OrderStatus::InProgress),
            "done" => Ok(OrderStatus::Done),
            "cancelled" => Ok(OrderStatus::Cancelled),
            other => Err(UnknownStatus(other.to_string())),
        }
    }
}

// =========================================================================
// Lines
// =========================================================================

/// Descriptive product fields attached to a line for presentation.
/// Never persisted as part of the line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductSummary {
    pub id: Uuid,
    pub code: String,
    pub name: String,
    pub description: String,
}

/// A line already priced by the caller, ready to be persisted
#[derive(Debug, Clone, PartialEq)]
pub struct NewOrderLine {
    pub product_id: Uuid,
    pub quantity: i32,
    /// Line total: unit price at purchase time × quantity
    pub price: Decimal,
}

impl NewOrderLine {
    /// Freeze the line total from the current unit price.
    pub fn priced(product_id: Uuid, quantity: i32, unit_price: Decimal) -> Self {
        Self {
            product_id,
            quantity,
            price: unit_price * Decimal::from(quantity),
        }
    }
}

/// A persisted order line
#[derive(Debug, Clone, PartialEq)]
pub struct OrderLine {
    pub id: Uuid,
    pub order_id: Uuid,
    pub product_id: Uuid,
    pub quantity: i32,
    pub price: Decimal,
    pub product: Option<ProductSummary>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// =========================================================================
// Order
// =========================================================================

/// Order aggregate root
#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    pub id: Uuid,
    pub code: String,
    pub user_id: Uuid,
    /// Empty unless the order was loaded with lines preloaded
    pub lines: Vec<OrderLine>,
    pub total_price: Decimal,
    pub status: OrderStatus,
    /// Optimistic-lock token, bumped on every update
    pub version: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    /// Sum of line prices, the value `total_price` is fixed to at creation.
    pub fn total_of(lines: &[NewOrderLine]) -> Decimal {
        lines.iter().map(|line| line.price).sum()
    }

    pub fn is_owned_by(&self, user_id: Uuid) -> bool {
        self.user_id == user_id
    }

    /// Move the order to `Cancelled`.
    ///
    /// Fails with `InvalidStateTransition` from a terminal status and leaves
    /// the status untouched.
    pub fn cancel(&mut self) -> Result<(), DomainError> {
        if !self.status.can_cancel() {
            return Err(DomainError::InvalidStateTransition {
                from: self.status,
                to: OrderStatus::Cancelled,
            });
        }
        self.status = OrderStatus::Cancelled;
        Ok(())
    }
}

/// Generate a human-readable order code: `SO` + `YYYYMMDD` + random suffix.
pub fn generate_order_code(now: DateTime<Utc>) -> String {
    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(ORDER_CODE_SUFFIX_LEN)
        .map(|c| char::from(c).to_ascii_uppercase())
        .collect();

    format!("{}{}{}", ORDER_CODE_PREFIX, now.format("%Y%m%d"), suffix)
}

//! # Order Status Machine
//!
//! The order lifecycle and its allowed transitions.
//!
//! ## State Diagram
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Order Status Machine                              │
//! │                                                                         │
//! │   pending_payment ──► processing ──► shipped ──► completed             │
//! │         │                  │            │                               │
//! │         └──────────────────┴────────────┴──────► cancelled              │
//! │                                                                         │
//! │   • No state is skipped; callers request each transition explicitly    │
//! │   • completed and cancelled are terminal                               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

// =============================================================================
// Order Status
// =============================================================================

/// The status of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// Order placed, awaiting payment confirmation.
    PendingPayment,
    /// Paid; goods being stamped and prepared.
    Processing,
    /// Handed to the carrier.
    Shipped,
    /// Delivered and closed.
    Completed,
    /// Abandoned or refunded; terminal.
    Cancelled,
}

impl Default for OrderStatus {
    fn default() -> Self {
        OrderStatus::PendingPayment
    }
}

impl OrderStatus {
    /// Returns the stored string form.
    pub const fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::PendingPayment => "pending_payment",
            OrderStatus::Processing => "processing",
            OrderStatus::Shipped => "shipped",
            OrderStatus::Completed => "completed",
            OrderStatus::Cancelled => "cancelled",
        }
    }

    /// Checks whether this state admits no further transitions.
    pub const fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Completed | OrderStatus::Cancelled)
    }

    /// Checks whether the machine allows moving from `self` to `to`.
    ///
    /// Same-state is NOT a transition; callers treat it as a no-op before
    /// consulting the machine.
    ///
    /// ## Example
    /// ```rust
    /// use sello_core::status::OrderStatus;
    ///
    /// assert!(OrderStatus::PendingPayment.can_transition(OrderStatus::Processing));
    /// assert!(OrderStatus::Shipped.can_transition(OrderStatus::Cancelled));
    /// assert!(!OrderStatus::PendingPayment.can_transition(OrderStatus::Shipped));
    /// assert!(!OrderStatus::Completed.can_transition(OrderStatus::Cancelled));
    /// ```
    pub const fn can_transition(&self, to: OrderStatus) -> bool {
        match (self, to) {
            (OrderStatus::PendingPayment, OrderStatus::Processing) => true,
            (OrderStatus::Processing, OrderStatus::Shipped) => true,
            (OrderStatus::Shipped, OrderStatus::Completed) => true,
            // Cancellation is reachable from any non-terminal state.
            (from, OrderStatus::Cancelled) => !from.is_terminal(),
            _ => false,
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = CoreError;

    /// Parses the stored string form; unknown strings are rejected at the
    /// boundary rather than silently coerced.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending_payment" => Ok(OrderStatus::PendingPayment),
            "processing" => Ok(OrderStatus::Processing),
            "shipped" => Ok(OrderStatus::Shipped),
            "completed" => Ok(OrderStatus::Completed),
            "cancelled" => Ok(OrderStatus::Cancelled),
            other => Err(CoreError::UnknownStatus(other.to_string())),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

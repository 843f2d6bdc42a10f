//! # Order Status State Machine
//!
//! Owns the fulfillment lifecycle for a mobile order.
//!
//! ## State Machine
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Order Status Lifecycle                             │
//! │                                                                         │
//! │   pending ──► preparing ──► ready ──► delivered (terminal)              │
//! │      │            │           │                                         │
//! │      └────────────┴───────────┴─────► cancelled (terminal)              │
//! │                                                                         │
//! │   Rules:                                                                │
//! │   • Transitions are monotonic: an order never moves backwards           │
//! │   • cancelled is reachable from any non-terminal state                  │
//! │   • Terminal states reject every further transition                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Validation here is pure; persistence and observer fan-out live in
//! the engine's lifecycle manager.

use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;

use crate::error::CoreError;

// =============================================================================
// Order Status
// =============================================================================

/// Fulfillment status of a mobile order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    /// Order accepted, not yet picked up by the kitchen.
    Pending,
    /// Kitchen is working on the order.
    Preparing,
    /// Ready for pickup / out for delivery.
    Ready,
    /// Handed to the customer. Terminal.
    Delivered,
    /// Cancelled before completion. Terminal.
    Cancelled,
}

impl OrderStatus {
    /// Returns true for states that permit no further transitions.
    #[inline]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Delivered | OrderStatus::Cancelled)
    }

    /// Position of the status on the forward fulfillment path.
    ///
    /// Used to enforce monotonicity: a transition must strictly increase
    /// the rank (or target `Cancelled`).
    const fn rank(&self) -> u8 {
        match self {
            OrderStatus::Pending => 0,
            OrderStatus::Preparing => 1,
            OrderStatus::Ready => 2,
            OrderStatus::Delivered => 3,
            // Cancelled sits outside the forward path.
            OrderStatus::Cancelled => 4,
        }
    }

    /// Validates a transition from `self` to `next`.
    ///
    /// ## Errors
    /// - [`CoreError::OrderAlreadyFinalized`] if `self` is terminal
    /// - [`CoreError::InvalidStatusTransition`] if the move is backwards
    ///   or a self-transition
    pub fn validate_transition(&self, next: OrderStatus) -> Result<(), CoreError> {
        if self.is_terminal() {
            return Err(CoreError::OrderAlreadyFinalized { status: *self });
        }

        // Cancellation is allowed from any non-terminal state.
        if next == OrderStatus::Cancelled {
            return Ok(());
        }

        if next.rank() <= self.rank() {
            return Err(CoreError::InvalidStatusTransition {
                from: *self,
                to: next,
            });
        }

        Ok(())
    }
}

impl Default for OrderStatus {
    fn default() -> Self {
        OrderStatus::Pending
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Preparing => "preparing",
            OrderStatus::Ready => "ready",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
        };
        f.write_str(s)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forward_path_is_valid() {
        assert!(OrderStatus::Pending
            .validate_transition(OrderStatus::Preparing)
            .is_ok());
        assert!(OrderStatus::Preparing
            .validate_transition(OrderStatus::Ready)
            .is_ok());
        assert!(OrderStatus::Ready
            .validate_transition(OrderStatus::Delivered)
            .is_ok());
    }

    #[test]
    fn test_cancel_from_any_non_terminal() {
        for status in [
            OrderStatus::Pending,
            OrderStatus::Preparing,
            OrderStatus::Ready,
        ] {
            assert!(status.validate_transition(OrderStatus::Cancelled).is_ok());
        }
    }

    #[test]
    fn test_terminal_states_reject_everything() {
        for terminal in [OrderStatus::Delivered, OrderStatus::Cancelled] {
            for next in [
                OrderStatus::Pending,
                OrderStatus::Preparing,
                OrderStatus::Ready,
                OrderStatus::Delivered,
                OrderStatus::Cancelled,
            ] {
                let err = terminal.validate_transition(next).unwrap_err();
                assert!(matches!(err, CoreError::OrderAlreadyFinalized { .. }));
            }
        }
    }

    #[test]
    fn test_backwards_and_self_transitions_rejected() {
        let err = OrderStatus::Ready
            .validate_transition(OrderStatus::Preparing)
            .unwrap_err();
        assert!(matches!(err, CoreError::InvalidStatusTransition { .. }));

        let err = OrderStatus::Pending
            .validate_transition(OrderStatus::Pending)
            .unwrap_err();
        assert!(matches!(err, CoreError::InvalidStatusTransition { .. }));
    }

    #[test]
    fn test_skipping_forward_is_allowed() {
        // A cashier may mark a pickup order delivered straight from ready
        // prep skipped; monotonicity only forbids moving backwards.
        assert!(OrderStatus::Pending
            .validate_transition(OrderStatus::Ready)
            .is_ok());
    }

    #[test]
    fn test_serde_representation() {
        let json = serde_json::to_string(&OrderStatus::Preparing).unwrap();
        assert_eq!(json, "\"preparing\"");
        let parsed: OrderStatus = serde_json::from_str("\"delivered\"").unwrap();
        assert_eq!(parsed, OrderStatus::Delivered);
    }
}

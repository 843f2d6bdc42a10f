//! # Error Types
//!
//! Domain-specific error types for ramen-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  ramen-core errors (this file)                                          │
//! │  ├── CoreError        - Business rule violations                        │
//! │  └── ValidationError  - Input validation failures                       │
//! │                                                                         │
//! │  ramen-db errors (separate crate)                                       │
//! │  └── DbError          - Database operation failures                     │
//! │                                                                         │
//! │  ramen-engine errors (separate crate)                                   │
//! │  └── EngineError      - Composes Core + Db, plus the                    │
//! │                         stock-decremented-but-unrecorded alert          │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → EngineError → Caller               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. `thiserror` derive macros, never manual impls
//! 2. Include context in messages (ingredient name, amounts, status)
//! 3. Errors are enum variants, never String

use thiserror::Error;

use crate::status::OrderStatus;

// =============================================================================
// Core Error
// =============================================================================

/// Business rule violations raised by the fulfillment engine.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A referenced menu item does not exist.
    #[error("Menu item not found: {0}")]
    ItemNotFound(String),

    /// An identifier passed as an add-on is not tagged with the add-on
    /// category.
    #[error("Menu item {id} is '{category}', not an add-on")]
    NotAnAddOn { id: String, category: String },

    /// A recipe references an ingredient with no inventory record.
    #[error("Ingredient not found in inventory: {0}")]
    IngredientNotFound(String),

    /// Insufficient stock to cover a sale.
    ///
    /// ## When This Occurs
    /// The resolved requirement for a single ingredient exceeds the
    /// quantity on hand. The whole deduction is rejected; no ingredient's
    /// stock changes.
    #[error("Insufficient stock for {ingredient}: available {available}, required {required}")]
    InsufficientStock {
        ingredient: String,
        available: i64,
        required: i64,
    },

    /// Mobile order input failed validation (empty line items,
    /// non-positive quantity, missing delivery fields, ...).
    #[error("Invalid order input: {0}")]
    InvalidOrderInput(#[from] ValidationError),

    /// Mobile order cannot be found.
    #[error("Mobile order not found: {0}")]
    OrderNotFound(String),

    /// The order is in a terminal state and rejects all further
    /// transitions.
    #[error("Order is already {status}, no further transitions allowed")]
    OrderAlreadyFinalized { status: OrderStatus },

    /// The requested transition moves backwards on the fulfillment path.
    #[error("Cannot transition order from {from} to {to}")]
    InvalidStatusTransition { from: OrderStatus, to: OrderStatus },
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// Raised before any business logic runs; every variant names the field
/// so the caller can act on it.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// An order was submitted with no line items.
    #[error("order must contain at least one line item")]
    EmptyLineItems,

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// A line item's menu snapshot is incomplete (missing id, name or
    /// price).
    #[error("line item {index} is missing required menu item fields: {reason}")]
    IncompleteLineItem { index: usize, reason: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insufficient_stock_message() {
        let err = CoreError::InsufficientStock {
            ingredient: "Noodles".to_string(),
            available: 5,
            required: 6,
        };
        assert_eq!(
            err.to_string(),
            "Insufficient stock for Noodles: available 5, required 6"
        );
    }

    #[test]
    fn test_finalized_message_names_status() {
        let err = CoreError::OrderAlreadyFinalized {
            status: OrderStatus::Delivered,
        };
        assert!(err.to_string().contains("delivered"));
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::EmptyLineItems;
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::InvalidOrderInput(_)));
    }
}

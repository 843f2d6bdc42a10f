//! # Validation Module
//!
//! Input validation for the mobile order intake and POS sale paths.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Client (mobile app / POS screen)                              │
//! │  └── Basic format checks, immediate feedback                            │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE (business rule validation)                        │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (NOT NULL, UNIQUE, CHECK constraints)                │
//! │                                                                         │
//! │  Defense in depth: each layer catches different errors                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use crate::error::ValidationError;
use crate::types::{DeliveryMethod, OrderLine};
use crate::{MAX_ITEM_QUANTITY, MAX_LINE_ITEMS};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a sale/line quantity.
///
/// ## Rules
/// - Must be positive (> 0)
/// - Must not exceed MAX_ITEM_QUANTITY (999)
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if qty > MAX_ITEM_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_ITEM_QUANTITY,
        });
    }

    Ok(())
}

/// Validates a price snapshot in centavos. Zero is allowed (free items).
pub fn validate_price_cents(cents: i64) -> ValidationResult<()> {
    if cents < 0 {
        return Err(ValidationError::OutOfRange {
            field: "price".to_string(),
            min: 0,
            max: i64::MAX,
        });
    }

    Ok(())
}

// =============================================================================
// Order Validators
// =============================================================================

/// Validates the line items of a mobile order submission.
///
/// ## Rules
/// - At least one line item, at most MAX_LINE_ITEMS
/// - Every line has a positive quantity
/// - Every menu snapshot is fully specified (id, name, non-negative price)
/// - Add-on snapshots are fully specified too
pub fn validate_line_items(lines: &[OrderLine]) -> ValidationResult<()> {
    if lines.is_empty() {
        return Err(ValidationError::EmptyLineItems);
    }

    if lines.len() > MAX_LINE_ITEMS {
        return Err(ValidationError::OutOfRange {
            field: "line items".to_string(),
            min: 1,
            max: MAX_LINE_ITEMS as i64,
        });
    }

    for (index, line) in lines.iter().enumerate() {
        if line.menu_item.id.trim().is_empty() {
            return Err(ValidationError::IncompleteLineItem {
                index,
                reason: "menu item id is empty".to_string(),
            });
        }
        if line.menu_item.name.trim().is_empty() {
            return Err(ValidationError::IncompleteLineItem {
                index,
                reason: "menu item name is empty".to_string(),
            });
        }
        if line.menu_item.price_cents < 0 {
            return Err(ValidationError::IncompleteLineItem {
                index,
                reason: "menu item price is negative".to_string(),
            });
        }

        validate_quantity(line.quantity)?;

        for add_on in &line.selected_add_ons {
            if add_on.id.trim().is_empty() || add_on.name.trim().is_empty() {
                return Err(ValidationError::IncompleteLineItem {
                    index,
                    reason: "add-on snapshot is missing id or name".to_string(),
                });
            }
            if add_on.price_cents < 0 {
                return Err(ValidationError::IncompleteLineItem {
                    index,
                    reason: "add-on price is negative".to_string(),
                });
            }
        }
    }

    Ok(())
}

/// Validates the delivery fields of a mobile order submission.
///
/// A physical delivery needs an address; pickup does not.
pub fn validate_delivery(
    method: DeliveryMethod,
    address: Option<&str>,
) -> ValidationResult<()> {
    if method.requires_delivery_fee() {
        match address {
            Some(addr) if !addr.trim().is_empty() => Ok(()),
            _ => Err(ValidationError::Required {
                field: "delivery_address".to_string(),
            }),
        }
    } else {
        Ok(())
    }
}

/// Validates a payment method label.
pub fn validate_payment_method(label: &str) -> ValidationResult<()> {
    if label.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "payment_method".to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

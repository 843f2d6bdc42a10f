//! # ramen-core: Pure Business Logic for Ramen POS
//!
//! This crate is the **heart** of the order fulfillment and inventory
//! consistency engine. It contains all business rules as pure functions
//! with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Fulfillment Engine Architecture                    │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 ramen-engine (Orchestration)                    │   │
//! │  │  Resolver ─► Deduction ─► Recorder    Intake ─► Reconciler     │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                ★ ramen-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐   │   │
//! │  │   │   types   │  │   money   │  │  status   │  │ validation│   │   │
//! │  │   │ Inventory │  │   Money   │  │ OrderFSM  │  │   rules   │   │   │
//! │  │   │ Sale/Order│  │ centavos  │  │ terminal  │  │  checks   │   │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘   │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS            │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    ramen-db (Database Layer)                    │   │
//! │  │            SQLite queries, migrations, repositories             │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: same input = same output, always
//! 2. **Integer Money**: all monetary values are centavos (i64), never floats
//! 3. **Explicit Errors**: typed errors, never strings or panics

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod money;
pub mod status;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use status::OrderStatus;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Quantity at or below which an ingredient is considered low on stock.
///
/// ## Why a constant?
/// The threshold is a store-wide business rule (≤0 → out of stock,
/// ≤10 → low stock, else in stock). A manual override on an individual
/// ingredient wins over the computed status but is flagged.
pub const LOW_STOCK_THRESHOLD: i64 = 10;

/// Menu category that marks an item as sellable only as an add-on.
///
/// Identifiers passed as add-ons to the resolver must carry this category,
/// otherwise the request is rejected with [`CoreError::NotAnAddOn`].
pub const ADD_ON_CATEGORY: &str = "add-on";

/// Maximum line items allowed in a single mobile order.
///
/// ## Business Reason
/// Prevents runaway orders and keeps reconciliation batches bounded.
pub const MAX_LINE_ITEMS: usize = 100;

/// Maximum quantity of a single item per line.
///
/// ## Business Reason
/// Prevents accidental over-ordering (e.g., typing 1000 instead of 10).
pub const MAX_ITEM_QUANTITY: i64 = 999;

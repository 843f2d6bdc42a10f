//! # Domain Types
//!
//! Core domain types for the fulfillment engine.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │ InventoryItem   │   │    MenuItem     │   │ SaleTransaction │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  name (PK)      │   │  id             │   │  order_number   │       │
//! │  │  quantity       │◄──│  recipe lines   │──►│  item snapshot  │       │
//! │  │  status         │   │  price_cents    │   │  add-ons, total │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │ MobileOrder: order_code, embedded OrderLine[], delivery method, │   │
//! │  │ total, status — reconciled into SaleTransactions one per line   │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Snapshot Pattern
//! Sale and order records freeze menu data (id, name, price) at commit
//! time. Reconciliation and reporting never re-read live prices.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;
use crate::status::OrderStatus;
use crate::LOW_STOCK_THRESHOLD;

// =============================================================================
// Stock Status
// =============================================================================

/// Availability status of an inventory item.
///
/// Normally derived from the quantity on hand; an administrator can pin a
/// manual override, which wins but is flagged when it disagrees with the
/// computed value (see [`InventoryItem::override_conflicts`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum StockStatus {
    InStock,
    LowStock,
    OutOfStock,
}

// =============================================================================
// Inventory Item
// =============================================================================

/// A named, countable stock-keeping unit in the stock ledger.
///
/// ## Invariant
/// `quantity` is never negative after a commit. The only mutation paths
/// are the deduction engine (decrement) and administrative restock
/// (increment).
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct InventoryItem {
    /// Unique ingredient name - the identity of the record.
    pub name: String,

    /// Quantity on hand, in `unit`s.
    pub quantity: i64,

    /// Unit label (e.g., "kg", "pcs", "servings").
    pub unit: String,

    /// When the item was last restocked.
    #[ts(as = "String")]
    pub restocked_at: DateTime<Utc>,

    /// Manual availability override. `None` means derived from quantity.
    pub status_override: Option<StockStatus>,
}

impl InventoryItem {
    /// Status derived from the quantity thresholds.
    pub fn computed_status(&self) -> StockStatus {
        if self.quantity <= 0 {
            StockStatus::OutOfStock
        } else if self.quantity <= LOW_STOCK_THRESHOLD {
            StockStatus::LowStock
        } else {
            StockStatus::InStock
        }
    }

    /// Effective status: the manual override wins when present.
    pub fn status(&self) -> StockStatus {
        self.status_override.unwrap_or_else(|| self.computed_status())
    }

    /// True when a manual override disagrees with the computed status.
    ///
    /// The override still wins; this flag exists so dashboards can show
    /// the disagreement.
    pub fn override_conflicts(&self) -> bool {
        match self.status_override {
            Some(pinned) => pinned != self.computed_status(),
            None => false,
        }
    }
}

// =============================================================================
// Menu & Recipes (collaborator contract)
// =============================================================================

/// One entry of a recipe: the ingredient consumed per unit sold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct RecipeLine {
    /// Ingredient name, matching [`InventoryItem::name`].
    pub ingredient: String,
    /// Quantity of the ingredient consumed per unit of the menu item sold.
    pub quantity_per_unit: i64,
}

/// A sellable menu item with its recipe.
///
/// Read-only input to the engine; menu CRUD is an external collaborator.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct MenuItem {
    /// Unique identifier.
    pub id: String,

    /// Display name.
    pub name: String,

    /// Current price in centavos.
    pub price_cents: i64,

    /// Category label. Items sellable only as extras carry
    /// [`crate::ADD_ON_CATEGORY`].
    pub category: String,

    /// Ordered ingredient requirements per unit sold.
    pub recipe: Vec<RecipeLine>,
}

impl MenuItem {
    /// Returns the price as a Money type.
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }

    /// Whether this item is tagged as an add-on.
    #[inline]
    pub fn is_add_on(&self) -> bool {
        self.category == crate::ADD_ON_CATEGORY
    }
}

/// An aggregated ingredient requirement produced by the recipe resolver.
///
/// Requirements for the same ingredient across the main item and its
/// add-ons are merged before the deduction engine sees them, so each
/// ingredient is checked and decremented exactly once per sale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngredientRequirement {
    pub ingredient: String,
    pub required: i64,
}

// =============================================================================
// Delivery Method
// =============================================================================

/// How a mobile order reaches the customer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryMethod {
    /// Customer collects in store. No surcharge.
    Pickup,
    /// Physical delivery. A fixed surcharge applies.
    Delivery,
}

impl DeliveryMethod {
    /// Whether the fixed delivery surcharge applies.
    #[inline]
    pub const fn requires_delivery_fee(&self) -> bool {
        matches!(self, DeliveryMethod::Delivery)
    }
}

// =============================================================================
// Mobile Order
// =============================================================================

/// Frozen menu item data embedded in an order line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct MenuItemSnapshot {
    pub id: String,
    pub name: String,
    pub price_cents: i64,
}

/// A selected add-on snapshot within an order line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct AddOnSnapshot {
    pub id: String,
    pub name: String,
    pub price_cents: i64,
}

/// One line of a mobile order: a menu item, its quantity, and the add-ons
/// selected for every unit.
///
/// Lines are embedded in the order, not independently addressable; the
/// reconciler identifies them by position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct OrderLine {
    pub menu_item: MenuItemSnapshot,
    pub quantity: i64,
    pub selected_add_ons: Vec<AddOnSnapshot>,
}

impl OrderLine {
    /// Line total: (item price + sum of add-on prices) × quantity.
    pub fn line_total(&self) -> Money {
        let add_ons: Money = self
            .selected_add_ons
            .iter()
            .map(|a| Money::from_cents(a.price_cents))
            .sum();
        (Money::from_cents(self.menu_item.price_cents) + add_ons).multiply_quantity(self.quantity)
    }
}

/// A customer-submitted order from the mobile channel.
///
/// ## Invariants
/// - `total_cents = Σ line_total + delivery fee (if the method requires it)`
/// - `status` is mutated only by the status lifecycle manager
/// - everything else is immutable after intake
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct MobileOrder {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Short human-readable order code shown to the customer.
    pub order_code: String,

    /// Invoice number for receipts.
    pub invoice_number: String,

    /// Customer attribution, when the order was placed signed-in.
    pub customer_id: Option<String>,

    /// Embedded line items.
    pub lines: Vec<OrderLine>,

    pub delivery_method: DeliveryMethod,

    /// Required when `delivery_method` is `Delivery`.
    pub delivery_address: Option<String>,

    /// Payment method label only; settlement is out of scope.
    pub payment_method: String,

    /// Free-text notes from the customer.
    pub notes: Option<String>,

    /// Computed total in centavos (subtotal + surcharge).
    pub total_cents: i64,

    pub status: OrderStatus,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl MobileOrder {
    /// Sum of all line totals, before any delivery surcharge.
    pub fn subtotal(&self) -> Money {
        self.lines.iter().map(OrderLine::line_total).sum()
    }

    /// Recomputes the total from the stored lines and delivery method.
    ///
    /// Must always equal `total_cents`; tests assert this invariant.
    pub fn computed_total(&self, delivery_fee: Money) -> Money {
        let fee = if self.delivery_method.requires_delivery_fee() {
            delivery_fee
        } else {
            Money::zero()
        };
        self.subtotal() + fee
    }
}

// =============================================================================
// Sale Transaction
// =============================================================================

/// An add-on sold with a sale line, frozen at commit time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SaleAddOn {
    pub menu_item_id: String,
    pub name: String,
    pub quantity: i64,
    pub price_cents: i64,
}

/// One entry in the unified sales ledger.
///
/// Created by the sales recorder for POS sales, and by the reconciler for
/// mobile-sourced sales (one per order line). Never mutated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SaleTransaction {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Sequential, zero-padded business identifier (e.g., "0042").
    pub order_number: String,

    /// Sold menu item reference.
    pub menu_item_id: String,

    /// Item name at time of sale (frozen).
    pub item_name: String,

    /// Quantity sold.
    pub quantity: i64,

    /// Unit price in centavos at time of sale (frozen).
    pub unit_price_cents: i64,

    /// Add-on snapshots with their own quantity and price.
    pub add_ons: Vec<SaleAddOn>,

    /// Payment method label.
    pub payment_method: String,

    /// Service type label (e.g., "dine-in", "takeout").
    pub service_type: String,

    /// Computed total in centavos.
    pub total_cents: i64,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    /// Back-reference to the originating mobile order, set by the
    /// reconciler.
    pub mobile_order_id: Option<String>,

    /// Index of the originating line within the mobile order.
    pub mobile_line_index: Option<i64>,

    /// Marks the sale as mobile-sourced.
    pub is_from_mobile_order: bool,
}

impl SaleTransaction {
    /// Recomputes the total: line price × quantity + Σ add-on price ×
    /// add-on quantity.
    pub fn computed_total(&self) -> Money {
        let add_ons: Money = self
            .add_ons
            .iter()
            .map(|a| Money::from_cents(a.price_cents).multiply_quantity(a.quantity))
            .sum();
        Money::from_cents(self.unit_price_cents).multiply_quantity(self.quantity) + add_ons
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

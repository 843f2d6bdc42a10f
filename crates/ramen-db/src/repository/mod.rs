//! # Repository Module
//!
//! Database repository implementations for the fulfillment engine.
//!
//! ## Repository Pattern
//! Each authoritative collection is mutated through exactly one narrow
//! API (arena-style: one addressable record per ingredient/sale/order,
//! never mutated in place from multiple code paths):
//!
//! - [`inventory::InventoryRepository`] - stock ledger; owns the atomic
//!   conditional decrement used by the deduction engine
//! - [`menu::MenuRepository`] - menu items + recipes (read-only contract)
//! - [`sale::SaleRepository`] - sales ledger with sequential order
//!   numbers and the reconciliation idempotence check
//! - [`order::MobileOrderRepository`] - mobile orders with
//!   compare-and-set status updates

pub mod inventory;
pub mod menu;
pub mod order;
pub mod sale;

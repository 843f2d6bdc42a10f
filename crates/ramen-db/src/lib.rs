//! # ramen-db: Database Layer for Ramen POS
//!
//! SQLite persistence for the fulfillment engine, built on sqlx.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Fulfillment Data Flow                             │
//! │                                                                         │
//! │  ramen-engine (record_sale / submit_mobile_order / reconcile)           │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     ramen-db (THIS CRATE)                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌────────────────┐    ┌──────────────┐   │   │
//! │  │   │   Database    │    │  Repositories  │    │  Migrations  │   │   │
//! │  │   │   (pool.rs)   │◄───│ inventory/menu │    │  (embedded)  │   │   │
//! │  │   │  SqlitePool   │    │ sale/order     │    │ 001_init.sql │   │   │
//! │  │   └───────────────┘    └────────────────┘    └──────────────┘   │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite (WAL mode; `:memory:` in tests)                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Repositories (inventory, menu, sale, order)

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use repository::inventory::{DeductionOutcome, InventoryRepository};
pub use repository::menu::MenuRepository;
pub use repository::order::{MobileOrderRepository, StatusUpdate};
pub use repository::sale::{NewSale, SaleRepository};

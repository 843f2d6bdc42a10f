//! # ramen-engine: Order Fulfillment & Inventory Consistency Engine
//!
//! Orchestration layer for Ramen POS. Ties the pure rules in ramen-core
//! to the SQLite repositories in ramen-db and exposes one facade.
//!
//! ## Component Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          Engine Facade                                  │
//! │                                                                         │
//! │  record_sale ─────► RecipeResolver ──► DeductionEngine ──► ledger       │
//! │                          │ live recipes     │ atomic, all-or-nothing    │
//! │                          ▼                  ▼                           │
//! │  reconcile ───────► Reconciler ──► SalesRecorder (snapshot prices)      │
//! │                          │ idempotent per order line                    │
//! │                                                                         │
//! │  submit_mobile_order ─► MobileOrderIntake (validate, price, store)      │
//! │                                                                         │
//! │  set_order_status ────► StatusLifecycle ──► broadcast ──► observers     │
//! │                              monotonic FSM      subscribe()             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//! ```rust,ignore
//! let db = Database::new(DbConfig::new("ramen.db")).await?;
//! let engine = Engine::new(db, EngineConfig::default());
//!
//! let sale = engine.record_sale(SaleRequest { /* ... */ }).await?;
//! let report = engine.reconcile(ReconcileTarget::All).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod config;
pub mod deduction;
pub mod error;
pub mod intake;
pub mod lifecycle;
pub mod reconciler;
pub mod recorder;
pub mod resolver;

// =============================================================================
// Re-exports
// =============================================================================

pub use config::EngineConfig;
pub use deduction::DeductionEngine;
pub use error::{EngineError, EngineResult};
pub use intake::{MobileOrderIntake, MobileOrderRequest};
pub use lifecycle::{OrderEvent, StatusLifecycle};
pub use reconciler::{ReconcileReport, Reconciler};
pub use recorder::{SaleRequest, SalesRecorder};
pub use resolver::{AddOnRequest, RecipeResolver, ResolvedSale};

use tokio::sync::broadcast;

use ramen_core::{InventoryItem, MobileOrder, OrderStatus, SaleTransaction, StockStatus};
use ramen_db::Database;

/// What a reconciliation pass should cover.
#[derive(Debug, Clone)]
pub enum ReconcileTarget {
    /// One order by id.
    Order(String),
    /// Every stored order.
    All,
}

/// The fulfillment engine facade.
///
/// Owns one component of each kind; all components share the database
/// handle's pool. Cheap to construct, but intended to be built once and
/// shared, because the observer channel lives inside.
#[derive(Debug)]
pub struct Engine {
    db: Database,
    recorder: SalesRecorder,
    intake: MobileOrderIntake,
    reconciler: Reconciler,
    lifecycle: StatusLifecycle,
}

impl Engine {
    /// Wires the engine components around a database handle.
    pub fn new(db: Database, config: EngineConfig) -> Self {
        let resolver = RecipeResolver::new(db.menu());
        let deduction = DeductionEngine::new(db.inventory());
        let recorder = SalesRecorder::new(resolver, deduction, db.menu(), db.sales());
        let intake = MobileOrderIntake::new(db.orders(), config.clone());
        let reconciler = Reconciler::new(db.orders(), db.sales(), recorder.clone());
        let lifecycle = StatusLifecycle::new(db.orders(), config.event_capacity);

        Engine {
            db,
            recorder,
            intake,
            reconciler,
            lifecycle,
        }
    }

    // -------------------------------------------------------------------------
    // Sales
    // -------------------------------------------------------------------------

    /// Records a POS sale: resolve recipes, deduct stock atomically,
    /// append to the sales ledger.
    pub async fn record_sale(&self, request: SaleRequest) -> EngineResult<SaleTransaction> {
        self.recorder.record_sale(request).await
    }

    /// Lists the sales ledger, newest first.
    pub async fn list_sales(&self) -> EngineResult<Vec<SaleTransaction>> {
        Ok(self.db.sales().list().await?)
    }

    // -------------------------------------------------------------------------
    // Mobile Orders
    // -------------------------------------------------------------------------

    /// Accepts a mobile order submission.
    pub async fn submit_mobile_order(
        &self,
        request: MobileOrderRequest,
    ) -> EngineResult<MobileOrder> {
        self.intake.submit(request).await
    }

    /// Gets a mobile order by id.
    pub async fn get_order(&self, order_id: &str) -> EngineResult<Option<MobileOrder>> {
        Ok(self.db.orders().get(order_id).await?)
    }

    /// Lists mobile orders, newest first.
    pub async fn list_orders(&self) -> EngineResult<Vec<MobileOrder>> {
        Ok(self.db.orders().list_all().await?)
    }

    /// Lists one customer's mobile orders, newest first.
    pub async fn list_orders_for_customer(
        &self,
        customer_id: &str,
    ) -> EngineResult<Vec<MobileOrder>> {
        Ok(self.db.orders().list_for_customer(customer_id).await?)
    }

    /// Runs an idempotent reconciliation pass.
    pub async fn reconcile(&self, target: ReconcileTarget) -> EngineResult<ReconcileReport> {
        match target {
            ReconcileTarget::Order(id) => self.reconciler.reconcile_order(&id).await,
            ReconcileTarget::All => self.reconciler.reconcile_all().await,
        }
    }

    // -------------------------------------------------------------------------
    // Status Lifecycle & Observers
    // -------------------------------------------------------------------------

    /// Transitions an order's status, enforcing the state machine.
    pub async fn set_order_status(
        &self,
        order_id: &str,
        next: OrderStatus,
    ) -> EngineResult<MobileOrder> {
        self.lifecycle.set_status(order_id, next).await
    }

    /// Subscribes to order status events.
    pub fn subscribe(&self) -> broadcast::Receiver<OrderEvent> {
        self.lifecycle.subscribe()
    }

    // -------------------------------------------------------------------------
    // Inventory Administration
    // -------------------------------------------------------------------------

    /// Lists the stock ledger, sorted by ingredient name.
    pub async fn list_inventory(&self) -> EngineResult<Vec<InventoryItem>> {
        Ok(self.db.inventory().list().await?)
    }

    /// Increments stock for an ingredient and refreshes its restock
    /// timestamp.
    pub async fn restock(&self, ingredient: &str, delta: i64) -> EngineResult<InventoryItem> {
        Ok(self.db.inventory().restock(ingredient, delta).await?)
    }

    /// Pins or clears a manual availability override on an ingredient.
    pub async fn set_stock_override(
        &self,
        ingredient: &str,
        status: Option<StockStatus>,
    ) -> EngineResult<()> {
        Ok(self
            .db
            .inventory()
            .set_status_override(ingredient, status)
            .await?)
    }

    /// The underlying database handle, for seeding and administration.
    pub fn db(&self) -> &Database {
        &self.db
    }
}

//! # Mobile Order Reconciler
//!
//! Converts mobile orders into sales ledger entries, one entry per order
//! line, idempotently. Running reconciliation any number of times yields
//! the same ledger.
//!
//! ## Idempotence
//! ```text
//! for each line of each order:
//!     already in ledger?  ──────────► skipped
//!     record (deduct + append)
//!         ok              ──────────► synced
//!         duplicate race  ──────────► skipped   (other pass won)
//!         anything else   ──────────► failed    (line isolated, pass continues)
//! ```
//! The duplicate race is caught by the unique index on
//! `(mobile_order_id, mobile_line_index)`: two concurrent passes can both
//! miss the existence check, but only one insert commits.

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::{EngineError, EngineResult};
use crate::recorder::SalesRecorder;
use ramen_core::{CoreError, MobileOrder};
use ramen_db::{DbError, MobileOrderRepository, SaleRepository};

/// Per-line tally of one reconciliation pass. Serialized into admin
/// dashboard responses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ReconcileReport {
    /// Lines newly written to the ledger.
    pub synced: usize,
    /// Lines that already had a ledger entry (or lost a duplicate race).
    pub skipped: usize,
    /// Lines that could not be recorded (e.g., insufficient stock).
    pub failed: usize,
}

impl ReconcileReport {
    /// Folds another report into this one.
    pub fn merge(&mut self, other: ReconcileReport) {
        self.synced += other.synced;
        self.skipped += other.skipped;
        self.failed += other.failed;
    }

    /// Total lines examined.
    pub fn total(&self) -> usize {
        self.synced + self.skipped + self.failed
    }
}

/// Reconciles mobile orders into the sales ledger.
#[derive(Debug, Clone)]
pub struct Reconciler {
    orders: MobileOrderRepository,
    sales: SaleRepository,
    recorder: SalesRecorder,
}

impl Reconciler {
    /// Creates a new Reconciler.
    pub fn new(
        orders: MobileOrderRepository,
        sales: SaleRepository,
        recorder: SalesRecorder,
    ) -> Self {
        Reconciler {
            orders,
            sales,
            recorder,
        }
    }

    /// Reconciles a single order by id.
    pub async fn reconcile_order(&self, order_id: &str) -> EngineResult<ReconcileReport> {
        let order = self
            .orders
            .get(order_id)
            .await?
            .ok_or_else(|| CoreError::OrderNotFound(order_id.to_string()))?;

        self.reconcile(&order).await
    }

    /// Reconciles every stored order. Cancelled orders are not synced;
    /// their stock was never consumed.
    pub async fn reconcile_all(&self) -> EngineResult<ReconcileReport> {
        let orders = self.orders.list_all().await?;

        let mut report = ReconcileReport::default();
        for order in &orders {
            report.merge(self.reconcile(order).await?);
        }

        info!(
            orders = orders.len(),
            synced = report.synced,
            skipped = report.skipped,
            failed = report.failed,
            "Reconciliation pass complete"
        );
        Ok(report)
    }

    async fn reconcile(&self, order: &MobileOrder) -> EngineResult<ReconcileReport> {
        let mut report = ReconcileReport::default();

        if order.status.is_terminal() && order.status != ramen_core::OrderStatus::Delivered {
            debug!(order_code = %order.order_code, "Skipping cancelled order");
            return Ok(report);
        }

        for (index, line) in order.lines.iter().enumerate() {
            let index = index as i64;

            if self.sales.exists_for_line(&order.id, index).await? {
                report.skipped += 1;
                continue;
            }

            match self.recorder.record_reconciled(order, index, line).await {
                Ok(sale) => {
                    debug!(
                        order_code = %order.order_code,
                        line = index,
                        order_number = %sale.order_number,
                        "Order line synced to sales ledger"
                    );
                    report.synced += 1;
                }
                Err(EngineError::Db(DbError::UniqueViolation { .. })) => {
                    // Another pass recorded this line between our
                    // existence check and the insert.
                    report.skipped += 1;
                }
                Err(err) => {
                    warn!(
                        order_code = %order.order_code,
                        line = index,
                        error = %err,
                        "Order line could not be reconciled"
                    );
                    report.failed += 1;
                }
            }
        }

        Ok(report)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

//! # Mobile Order Repository
//!
//! Persistence for customer-submitted mobile orders. Order lines are
//! embedded JSON: they are snapshots identified by position, never
//! addressed or mutated individually.
//!
//! Status changes go through a compare-and-set update so that two
//! concurrent transitions from the same starting status cannot both win.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use ramen_core::{DeliveryMethod, MobileOrder, OrderLine, OrderStatus};

// =============================================================================
// Row Mapping
// =============================================================================

#[derive(Debug, sqlx::FromRow)]
struct MobileOrderRow {
    id: String,
    order_code: String,
    invoice_number: String,
    customer_id: Option<String>,
    lines: String,
    delivery_method: DeliveryMethod,
    delivery_address: Option<String>,
    payment_method: String,
    notes: Option<String>,
    total_cents: i64,
    status: OrderStatus,
    created_at: DateTime<Utc>,
}

impl MobileOrderRow {
    fn into_order(self) -> DbResult<MobileOrder> {
        let lines: Vec<OrderLine> =
            serde_json::from_str(&self.lines).map_err(|e| DbError::CorruptRecord {
                entity: "MobileOrder".to_string(),
                id: self.id.clone(),
                reason: e.to_string(),
            })?;

        Ok(MobileOrder {
            id: self.id,
            order_code: self.order_code,
            invoice_number: self.invoice_number,
            customer_id: self.customer_id,
            lines,
            delivery_method: self.delivery_method,
            delivery_address: self.delivery_address,
            payment_method: self.payment_method,
            notes: self.notes,
            total_cents: self.total_cents,
            status: self.status,
            created_at: self.created_at,
        })
    }
}

const ORDER_COLUMNS: &str = r#"
    id, order_code, invoice_number, customer_id, lines, delivery_method,
    delivery_address, payment_method, notes, total_cents, status, created_at
"#;

// =============================================================================
// Status Update Outcome
// =============================================================================

/// Result of a compare-and-set status update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusUpdate {
    /// The row matched the expected status and was updated.
    Applied,
    /// The stored status no longer matched; nothing changed. The caller
    /// re-reads the row to classify the conflict.
    Stale,
}

// =============================================================================
// Mobile Order Repository
// =============================================================================

/// Repository for mobile orders.
#[derive(Debug, Clone)]
pub struct MobileOrderRepository {
    pool: SqlitePool,
}

impl MobileOrderRepository {
    /// Creates a new MobileOrderRepository.
    pub fn new(pool: SqlitePool) -> Self {
        MobileOrderRepository { pool }
    }

    /// Inserts a fully-formed order. The intake component builds the
    /// record (identifiers, snapshots, total) before calling this.
    pub async fn insert(&self, order: &MobileOrder) -> DbResult<()> {
        let lines_json =
            serde_json::to_string(&order.lines).map_err(|e| DbError::Internal(e.to_string()))?;

        sqlx::query(
            r#"
            INSERT INTO mobile_orders (
                id, order_code, invoice_number, customer_id, lines,
                delivery_method, delivery_address, payment_method, notes,
                total_cents, status, created_at
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
            "#,
        )
        .bind(&order.id)
        .bind(&order.order_code)
        .bind(&order.invoice_number)
        .bind(&order.customer_id)
        .bind(&lines_json)
        .bind(order.delivery_method)
        .bind(&order.delivery_address)
        .bind(&order.payment_method)
        .bind(&order.notes)
        .bind(order.total_cents)
        .bind(order.status)
        .bind(order.created_at)
        .execute(&self.pool)
        .await?;

        debug!(
            order_code = %order.order_code,
            total_cents = order.total_cents,
            "Mobile order stored"
        );
        Ok(())
    }

    /// Gets an order by its UUID.
    pub async fn get(&self, id: &str) -> DbResult<Option<MobileOrder>> {
        let row = sqlx::query_as::<_, MobileOrderRow>(&format!(
            "SELECT {ORDER_COLUMNS} FROM mobile_orders WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(MobileOrderRow::into_order).transpose()
    }

    /// Lists every order, newest first.
    pub async fn list_all(&self) -> DbResult<Vec<MobileOrder>> {
        let rows = sqlx::query_as::<_, MobileOrderRow>(&format!(
            "SELECT {ORDER_COLUMNS} FROM mobile_orders ORDER BY created_at DESC"
        ))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(MobileOrderRow::into_order).collect()
    }

    /// Lists a customer's orders, newest first.
    pub async fn list_for_customer(&self, customer_id: &str) -> DbResult<Vec<MobileOrder>> {
        let rows = sqlx::query_as::<_, MobileOrderRow>(&format!(
            "SELECT {ORDER_COLUMNS} FROM mobile_orders
             WHERE customer_id = ?1
             ORDER BY created_at DESC"
        ))
        .bind(customer_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(MobileOrderRow::into_order).collect()
    }

    /// Compare-and-set status update.
    ///
    /// Writes `next` only when the stored status still equals `expected`.
    pub async fn update_status(
        &self,
        id: &str,
        expected: OrderStatus,
        next: OrderStatus,
    ) -> DbResult<StatusUpdate> {
        let result = sqlx::query(
            r#"
            UPDATE mobile_orders SET status = ?3 WHERE id = ?1 AND status = ?2
            "#,
        )
        .bind(id)
        .bind(expected)
        .bind(next)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 1 {
            debug!(order_id = %id, from = %expected, to = %next, "Order status updated");
            Ok(StatusUpdate::Applied)
        } else {
            Ok(StatusUpdate::Stale)
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

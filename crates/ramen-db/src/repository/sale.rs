//! # Sales Ledger Repository
//!
//! Append-only sales ledger. Two writers exist: the POS recorder and the
//! mobile-order reconciler. Both insert through [`SaleRepository::insert`],
//! which allocates the sequential order number inside the insert
//! transaction so numbers never skip or repeat.
//!
//! ## Reconciliation Idempotence
//! A partial unique index on `(mobile_order_id, mobile_line_index)` backs
//! [`SaleRepository::exists_for_line`]: a mobile order line can only ever
//! produce one ledger entry, even when two reconciliation passes race.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use ramen_core::{SaleAddOn, SaleTransaction};

// =============================================================================
// Row Mapping
// =============================================================================

#[derive(Debug, sqlx::FromRow)]
struct SaleRow {
    id: String,
    order_number: String,
    menu_item_id: String,
    item_name: String,
    quantity: i64,
    unit_price_cents: i64,
    add_ons: String,
    payment_method: String,
    service_type: String,
    total_cents: i64,
    created_at: DateTime<Utc>,
    mobile_order_id: Option<String>,
    mobile_line_index: Option<i64>,
    is_from_mobile_order: bool,
}

impl SaleRow {
    fn into_sale(self) -> DbResult<SaleTransaction> {
        let add_ons: Vec<SaleAddOn> =
            serde_json::from_str(&self.add_ons).map_err(|e| DbError::CorruptRecord {
                entity: "SaleTransaction".to_string(),
                id: self.id.clone(),
                reason: e.to_string(),
            })?;

        Ok(SaleTransaction {
            id: self.id,
            order_number: self.order_number,
            menu_item_id: self.menu_item_id,
            item_name: self.item_name,
            quantity: self.quantity,
            unit_price_cents: self.unit_price_cents,
            add_ons,
            payment_method: self.payment_method,
            service_type: self.service_type,
            total_cents: self.total_cents,
            created_at: self.created_at,
            mobile_order_id: self.mobile_order_id,
            mobile_line_index: self.mobile_line_index,
            is_from_mobile_order: self.is_from_mobile_order,
        })
    }
}

const SALE_COLUMNS: &str = r#"
    id, order_number, menu_item_id, item_name, quantity, unit_price_cents,
    add_ons, payment_method, service_type, total_cents, created_at,
    mobile_order_id, mobile_line_index, is_from_mobile_order
"#;

// =============================================================================
// New Sale Draft
// =============================================================================

/// Ledger entry draft. The repository assigns the identity fields
/// (`id`, `order_number`, `created_at`) on insert.
#[derive(Debug, Clone)]
pub struct NewSale {
    pub menu_item_id: String,
    pub item_name: String,
    pub quantity: i64,
    pub unit_price_cents: i64,
    pub add_ons: Vec<SaleAddOn>,
    pub payment_method: String,
    pub service_type: String,
    pub total_cents: i64,
    pub mobile_order_id: Option<String>,
    pub mobile_line_index: Option<i64>,
    pub is_from_mobile_order: bool,
}

// =============================================================================
// Sale Repository
// =============================================================================

/// Repository for the unified sales ledger.
#[derive(Debug, Clone)]
pub struct SaleRepository {
    pool: SqlitePool,
}

impl SaleRepository {
    /// Creates a new SaleRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SaleRepository { pool }
    }

    /// Inserts a ledger entry, allocating the next sequential order
    /// number inside the same transaction as the insert.
    ///
    /// Returns the committed record. A racing duplicate for the same
    /// mobile order line surfaces as [`DbError::UniqueViolation`].
    pub async fn insert(&self, draft: NewSale) -> DbResult<SaleTransaction> {
        let mut tx = self.pool.begin().await?;

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sale_transactions")
            .fetch_one(&mut *tx)
            .await?;
        let order_number = format!("{:04}", count + 1);

        let id = Uuid::new_v4().to_string();
        let created_at = Utc::now();

        let add_ons_json =
            serde_json::to_string(&draft.add_ons).map_err(|e| DbError::Internal(e.to_string()))?;

        sqlx::query(
            r#"
            INSERT INTO sale_transactions (
                id, order_number, menu_item_id, item_name, quantity,
                unit_price_cents, add_ons, payment_method, service_type,
                total_cents, created_at, mobile_order_id, mobile_line_index,
                is_from_mobile_order
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)
            "#,
        )
        .bind(&id)
        .bind(&order_number)
        .bind(&draft.menu_item_id)
        .bind(&draft.item_name)
        .bind(draft.quantity)
        .bind(draft.unit_price_cents)
        .bind(&add_ons_json)
        .bind(&draft.payment_method)
        .bind(&draft.service_type)
        .bind(draft.total_cents)
        .bind(created_at)
        .bind(&draft.mobile_order_id)
        .bind(draft.mobile_line_index)
        .bind(draft.is_from_mobile_order)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        debug!(order_number = %order_number, total_cents = draft.total_cents, "Sale recorded");

        Ok(SaleTransaction {
            id,
            order_number,
            menu_item_id: draft.menu_item_id,
            item_name: draft.item_name,
            quantity: draft.quantity,
            unit_price_cents: draft.unit_price_cents,
            add_ons: draft.add_ons,
            payment_method: draft.payment_method,
            service_type: draft.service_type,
            total_cents: draft.total_cents,
            created_at,
            mobile_order_id: draft.mobile_order_id,
            mobile_line_index: draft.mobile_line_index,
            is_from_mobile_order: draft.is_from_mobile_order,
        })
    }

    /// True when a ledger entry already exists for this mobile order line.
    pub async fn exists_for_line(&self, mobile_order_id: &str, line_index: i64) -> DbResult<bool> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM sale_transactions
            WHERE mobile_order_id = ?1 AND mobile_line_index = ?2
            "#,
        )
        .bind(mobile_order_id)
        .bind(line_index)
        .fetch_one(&self.pool)
        .await?;

        Ok(count > 0)
    }

    /// Gets a sale by its UUID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<SaleTransaction>> {
        let row = sqlx::query_as::<_, SaleRow>(&format!(
            "SELECT {SALE_COLUMNS} FROM sale_transactions WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(SaleRow::into_sale).transpose()
    }

    /// Gets a sale by its sequential order number.
    pub async fn get_by_order_number(
        &self,
        order_number: &str,
    ) -> DbResult<Option<SaleTransaction>> {
        let row = sqlx::query_as::<_, SaleRow>(&format!(
            "SELECT {SALE_COLUMNS} FROM sale_transactions WHERE order_number = ?1"
        ))
        .bind(order_number)
        .fetch_optional(&self.pool)
        .await?;

        row.map(SaleRow::into_sale).transpose()
    }

    /// Lists the whole ledger, newest first.
    pub async fn list(&self) -> DbResult<Vec<SaleTransaction>> {
        let rows = sqlx::query_as::<_, SaleRow>(&format!(
            "SELECT {SALE_COLUMNS} FROM sale_transactions ORDER BY created_at DESC, order_number DESC"
        ))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(SaleRow::into_sale).collect()
    }

    /// Lists the ledger entries produced from one mobile order, in line
    /// order.
    pub async fn list_for_mobile_order(&self, mobile_order_id: &str) -> DbResult<Vec<SaleTransaction>> {
        let rows = sqlx::query_as::<_, SaleRow>(&format!(
            "SELECT {SALE_COLUMNS} FROM sale_transactions
             WHERE mobile_order_id = ?1
             ORDER BY mobile_line_index"
        ))
        .bind(mobile_order_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(SaleRow::into_sale).collect()
    }

    /// Total number of ledger entries.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sale_transactions")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

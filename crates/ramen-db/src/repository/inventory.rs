//! # Inventory Repository
//!
//! Stock ledger operations, including the atomic multi-ingredient
//! deduction used by the deduction engine.
//!
//! ## All-or-Nothing Deduction
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                Conditional Decrement Strategy                           │
//! │                                                                         │
//! │  ❌ WRONG: read-check-write per ingredient                              │
//! │     SELECT quantity ... ; if enough: UPDATE ... SET quantity = n        │
//! │     Two concurrent sales can both pass the check and oversell.          │
//! │                                                                         │
//! │  ✅ CORRECT: atomic conditional decrement, one transaction per sale     │
//! │     UPDATE inventory_items                                              │
//! │     SET quantity = quantity - ?req                                      │
//! │     WHERE name = ?ing AND quantity >= ?req                              │
//! │                                                                         │
//! │     rows_affected = 0  →  missing ingredient OR insufficient stock      │
//! │                        →  ROLLBACK (undoes every prior decrement)       │
//! │     all rows affected  →  COMMIT                                        │
//! │                                                                         │
//! │  SQLite serializes writers, so the check and the decrement are one      │
//! │  indivisible step; combined requirements can never drive quantity       │
//! │  below zero. The CHECK (quantity >= 0) constraint is a second guard.    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use sqlx::{Sqlite, SqlitePool, Transaction};
use tracing::debug;

use crate::error::{DbError, DbResult};
use ramen_core::{IngredientRequirement, InventoryItem, StockStatus};

// =============================================================================
// Row Mapping
// =============================================================================

/// Private row shape for `inventory_items`.
#[derive(Debug, sqlx::FromRow)]
struct InventoryRow {
    name: String,
    quantity: i64,
    unit: String,
    restocked_at: DateTime<Utc>,
    status_override: Option<StockStatus>,
}

impl From<InventoryRow> for InventoryItem {
    fn from(row: InventoryRow) -> Self {
        InventoryItem {
            name: row.name,
            quantity: row.quantity,
            unit: row.unit,
            restocked_at: row.restocked_at,
            status_override: row.status_override,
        }
    }
}

// =============================================================================
// Deduction Outcome
// =============================================================================

/// Result of an attempted multi-ingredient deduction.
///
/// Domain outcomes are data, not errors, so the engine can translate them
/// into its own error taxonomy without string matching.
#[derive(Debug)]
pub enum DeductionOutcome {
    /// Every ingredient was decremented; carries the updated records so
    /// the caller can log low-stock and override-conflict warnings.
    Applied(Vec<InventoryItem>),

    /// A required ingredient has no inventory record. Nothing changed.
    IngredientMissing(String),

    /// One ingredient could not cover its requirement. Nothing changed.
    Insufficient {
        ingredient: String,
        available: i64,
        required: i64,
    },
}

// =============================================================================
// Inventory Repository
// =============================================================================

/// Repository for stock ledger operations.
#[derive(Debug, Clone)]
pub struct InventoryRepository {
    pool: SqlitePool,
}

impl InventoryRepository {
    /// Creates a new InventoryRepository.
    pub fn new(pool: SqlitePool) -> Self {
        InventoryRepository { pool }
    }

    /// Gets an inventory item by name.
    pub async fn get(&self, name: &str) -> DbResult<Option<InventoryItem>> {
        let row = sqlx::query_as::<_, InventoryRow>(
            r#"
            SELECT name, quantity, unit, restocked_at, status_override
            FROM inventory_items
            WHERE name = ?1
            "#,
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(InventoryItem::from))
    }

    /// Lists all inventory items, sorted by name.
    pub async fn list(&self) -> DbResult<Vec<InventoryItem>> {
        let rows = sqlx::query_as::<_, InventoryRow>(
            r#"
            SELECT name, quantity, unit, restocked_at, status_override
            FROM inventory_items
            ORDER BY name
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(InventoryItem::from).collect())
    }

    /// Inserts or replaces an inventory item (seeding / administrative).
    pub async fn upsert(&self, item: &InventoryItem) -> DbResult<()> {
        debug!(name = %item.name, quantity = item.quantity, "Upserting inventory item");

        sqlx::query(
            r#"
            INSERT INTO inventory_items (name, quantity, unit, restocked_at, status_override)
            VALUES (?1, ?2, ?3, ?4, ?5)
            ON CONFLICT(name) DO UPDATE SET
                quantity = excluded.quantity,
                unit = excluded.unit,
                restocked_at = excluded.restocked_at,
                status_override = excluded.status_override
            "#,
        )
        .bind(&item.name)
        .bind(item.quantity)
        .bind(&item.unit)
        .bind(item.restocked_at)
        .bind(item.status_override)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Administrative restock: increments stock and refreshes the
    /// restock timestamp.
    pub async fn restock(&self, name: &str, delta: i64) -> DbResult<InventoryItem> {
        debug!(name = %name, delta = delta, "Restocking inventory item");

        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE inventory_items
            SET quantity = quantity + ?2, restocked_at = ?3
            WHERE name = ?1
            "#,
        )
        .bind(name)
        .bind(delta)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("InventoryItem", name));
        }

        self.get(name)
            .await?
            .ok_or_else(|| DbError::not_found("InventoryItem", name))
    }

    /// Pins or clears a manual availability override.
    pub async fn set_status_override(
        &self,
        name: &str,
        status: Option<StockStatus>,
    ) -> DbResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE inventory_items SET status_override = ?2 WHERE name = ?1
            "#,
        )
        .bind(name)
        .bind(status)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("InventoryItem", name));
        }

        Ok(())
    }

    /// Attempts to deduct every requirement atomically.
    ///
    /// The requirements must already be aggregated per ingredient (the
    /// resolver guarantees this); each ingredient is decremented exactly
    /// once. Either every decrement commits, or none does.
    pub async fn deduct_all(
        &self,
        requirements: &[IngredientRequirement],
    ) -> DbResult<DeductionOutcome> {
        let mut tx = self.pool.begin().await?;

        for req in requirements {
            let result = sqlx::query(
                r#"
                UPDATE inventory_items
                SET quantity = quantity - ?1
                WHERE name = ?2 AND quantity >= ?1
                "#,
            )
            .bind(req.required)
            .bind(&req.ingredient)
            .execute(&mut *tx)
            .await?;

            if result.rows_affected() == 0 {
                // Distinguish a missing record from insufficient stock,
                // then undo every decrement made so far in this sale.
                let available: Option<i64> =
                    sqlx::query_scalar("SELECT quantity FROM inventory_items WHERE name = ?1")
                        .bind(&req.ingredient)
                        .fetch_optional(&mut *tx)
                        .await?;

                tx.rollback().await?;

                return Ok(match available {
                    None => DeductionOutcome::IngredientMissing(req.ingredient.clone()),
                    Some(available) => DeductionOutcome::Insufficient {
                        ingredient: req.ingredient.clone(),
                        available,
                        required: req.required,
                    },
                });
            }
        }

        // Re-read the decremented rows before committing, so the caller
        // sees post-deduction quantities for status logging.
        let mut updated = Vec::with_capacity(requirements.len());
        for req in requirements {
            if let Some(item) = fetch_in_tx(&mut tx, &req.ingredient).await? {
                updated.push(item);
            }
        }

        tx.commit().await?;

        debug!(ingredients = updated.len(), "Deduction committed");
        Ok(DeductionOutcome::Applied(updated))
    }
}

/// Fetches an inventory item within an open transaction.
async fn fetch_in_tx(
    tx: &mut Transaction<'_, Sqlite>,
    name: &str,
) -> DbResult<Option<InventoryItem>> {
    let row = sqlx::query_as::<_, InventoryRow>(
        r#"
        SELECT name, quantity, unit, restocked_at, status_override
        FROM inventory_items
        WHERE name = ?1
        "#,
    )
    .bind(name)
    .fetch_optional(&mut **tx)
    .await?;

    Ok(row.map(InventoryItem::from))
}

// =============================================================================
// Unit Tests
// =============================================================================

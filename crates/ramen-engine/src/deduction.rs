//! # Deduction Engine
//!
//! Commits aggregated ingredient requirements against the stock ledger,
//! all-or-nothing. The atomic conditional decrement itself lives in the
//! inventory repository; this component maps the outcome into the
//! engine's error taxonomy and emits the stock warnings.

use tracing::{info, warn};

use crate::error::EngineResult;
use ramen_core::{CoreError, IngredientRequirement, InventoryItem, StockStatus};
use ramen_db::{DeductionOutcome, InventoryRepository};

/// Applies ingredient deductions atomically.
#[derive(Debug, Clone)]
pub struct DeductionEngine {
    inventory: InventoryRepository,
}

impl DeductionEngine {
    /// Creates a new DeductionEngine.
    pub fn new(inventory: InventoryRepository) -> Self {
        DeductionEngine { inventory }
    }

    /// Deducts every requirement, or nothing.
    ///
    /// On success returns the post-deduction inventory records and logs a
    /// warning for every ingredient that dropped to low or out of stock,
    /// and for manual overrides that now disagree with the computed
    /// status.
    pub async fn commit(
        &self,
        requirements: &[IngredientRequirement],
    ) -> EngineResult<Vec<InventoryItem>> {
        let outcome = self.inventory.deduct_all(requirements).await?;

        let updated = match outcome {
            DeductionOutcome::Applied(items) => items,
            DeductionOutcome::IngredientMissing(ingredient) => {
                return Err(CoreError::IngredientNotFound(ingredient).into());
            }
            DeductionOutcome::Insufficient {
                ingredient,
                available,
                required,
            } => {
                return Err(CoreError::InsufficientStock {
                    ingredient,
                    available,
                    required,
                }
                .into());
            }
        };

        info!(ingredients = updated.len(), "Stock deduction committed");

        for item in &updated {
            match item.computed_status() {
                StockStatus::OutOfStock => {
                    warn!(ingredient = %item.name, "Ingredient is now out of stock");
                }
                StockStatus::LowStock => {
                    warn!(
                        ingredient = %item.name,
                        quantity = item.quantity,
                        "Ingredient is running low"
                    );
                }
                StockStatus::InStock => {}
            }

            if item.override_conflicts() {
                warn!(
                    ingredient = %item.name,
                    pinned = ?item.status_override,
                    computed = ?item.computed_status(),
                    "Manual status override disagrees with quantity on hand"
                );
            }
        }

        Ok(updated)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::EngineError;
    use chrono::Utc;
    use ramen_db::{Database, DbConfig};

    fn req(name: &str, required: i64) -> IngredientRequirement {
        IngredientRequirement {
            ingredient: name.to_string(),
            required,
        }
    }

    async fn seeded() -> (Database, DeductionEngine) {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let inventory = db.inventory();

        for (name, quantity) in [("Noodles", 5i64), ("Broth", 20)] {
            inventory
                .upsert(&InventoryItem {
                    name: name.to_string(),
                    quantity,
                    unit: "servings".to_string(),
                    restocked_at: Utc::now(),
                    status_override: None,
                })
                .await
                .unwrap();
        }

        let engine = DeductionEngine::new(inventory);
        (db, engine)
    }

    #[tokio::test]
    async fn test_commit_returns_updated_items() {
        let (_db, engine) = seeded().await;

        let updated = engine
            .commit(&[req("Noodles", 2), req("Broth", 4)])
            .await
            .unwrap();

        assert_eq!(updated.len(), 2);
        assert_eq!(updated[0].quantity, 3);
        assert_eq!(updated[1].quantity, 16);
    }

    #[tokio::test]
    async fn test_insufficient_maps_to_core_error() {
        let (db, engine) = seeded().await;

        let err = engine.commit(&[req("Noodles", 6)]).await.unwrap_err();
        match err {
            EngineError::Core(CoreError::InsufficientStock {
                ingredient,
                available,
                required,
            }) => {
                assert_eq!(ingredient, "Noodles");
                assert_eq!(available, 5);
                assert_eq!(required, 6);
            }
            other => panic!("expected InsufficientStock, got {other:?}"),
        }

        // Nothing changed.
        let item = db.inventory().get("Noodles").await.unwrap().unwrap();
        assert_eq!(item.quantity, 5);
    }

    #[tokio::test]
    async fn test_missing_ingredient_maps_to_core_error() {
        let (_db, engine) = seeded().await;

        let err = engine
            .commit(&[req("Noodles", 1), req("Chashu", 1)])
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            EngineError::Core(CoreError::IngredientNotFound(ref name)) if name == "Chashu"
        ));
    }
}

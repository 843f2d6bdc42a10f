//! # Menu Repository
//!
//! Read access to menu items and their recipes. The engine treats the
//! menu as a read-only collaborator contract; `insert` exists for
//! seeding and administrative tooling.

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;
use ramen_core::{MenuItem, RecipeLine};

#[derive(Debug, sqlx::FromRow)]
struct MenuItemRow {
    id: String,
    name: String,
    price_cents: i64,
    category: String,
}

#[derive(Debug, sqlx::FromRow)]
struct RecipeLineRow {
    ingredient: String,
    quantity_per_unit: i64,
}

/// Repository for menu items and recipes.
#[derive(Debug, Clone)]
pub struct MenuRepository {
    pool: SqlitePool,
}

impl MenuRepository {
    /// Creates a new MenuRepository.
    pub fn new(pool: SqlitePool) -> Self {
        MenuRepository { pool }
    }

    /// Gets a menu item with its recipe lines in declared order.
    pub async fn get(&self, id: &str) -> DbResult<Option<MenuItem>> {
        let row = sqlx::query_as::<_, MenuItemRow>(
            r#"
            SELECT id, name, price_cents, category
            FROM menu_items
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let recipe = self.recipe_for(id).await?;

        Ok(Some(MenuItem {
            id: row.id,
            name: row.name,
            price_cents: row.price_cents,
            category: row.category,
            recipe,
        }))
    }

    /// Lists all menu items, sorted by name, recipes included.
    pub async fn list(&self) -> DbResult<Vec<MenuItem>> {
        let rows = sqlx::query_as::<_, MenuItemRow>(
            r#"
            SELECT id, name, price_cents, category
            FROM menu_items
            ORDER BY name
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        let mut items = Vec::with_capacity(rows.len());
        for row in rows {
            let recipe = self.recipe_for(&row.id).await?;
            items.push(MenuItem {
                id: row.id,
                name: row.name,
                price_cents: row.price_cents,
                category: row.category,
                recipe,
            });
        }

        Ok(items)
    }

    /// Inserts a menu item and its recipe lines (seeding / administrative).
    pub async fn insert(&self, item: &MenuItem) -> DbResult<()> {
        debug!(id = %item.id, name = %item.name, "Inserting menu item");

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO menu_items (id, name, price_cents, category)
            VALUES (?1, ?2, ?3, ?4)
            "#,
        )
        .bind(&item.id)
        .bind(&item.name)
        .bind(item.price_cents)
        .bind(&item.category)
        .execute(&mut *tx)
        .await?;

        for (order, line) in item.recipe.iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO recipe_lines (menu_item_id, line_order, ingredient, quantity_per_unit)
                VALUES (?1, ?2, ?3, ?4)
                "#,
            )
            .bind(&item.id)
            .bind(order as i64)
            .bind(&line.ingredient)
            .bind(line.quantity_per_unit)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn recipe_for(&self, menu_item_id: &str) -> DbResult<Vec<RecipeLine>> {
        let rows = sqlx::query_as::<_, RecipeLineRow>(
            r#"
            SELECT ingredient, quantity_per_unit
            FROM recipe_lines
            WHERE menu_item_id = ?1
            ORDER BY line_order
            "#,
        )
        .bind(menu_item_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|r| RecipeLine {
                ingredient: r.ingredient,
                quantity_per_unit: r.quantity_per_unit,
            })
            .collect())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};

    fn shoyu_ramen() -> MenuItem {
        MenuItem {
            id: "ramen-1".to_string(),
            name: "Shoyu Ramen".to_string(),
            price_cents: 10000,
            category: "ramen".to_string(),
            recipe: vec![
                RecipeLine {
                    ingredient: "Noodles".to_string(),
                    quantity_per_unit: 1,
                },
                RecipeLine {
                    ingredient: "Broth".to_string(),
                    quantity_per_unit: 2,
                },
            ],
        }
    }

    #[tokio::test]
    async fn test_insert_and_get_preserves_recipe_order() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.menu();

        repo.insert(&shoyu_ramen()).await.unwrap();

        let item = repo.get("ramen-1").await.unwrap().unwrap();
        assert_eq!(item.name, "Shoyu Ramen");
        assert_eq!(item.recipe.len(), 2);
        assert_eq!(item.recipe[0].ingredient, "Noodles");
        assert_eq!(item.recipe[1].ingredient, "Broth");
        assert_eq!(item.recipe[1].quantity_per_unit, 2);
    }

    #[tokio::test]
    async fn test_get_missing_item() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        assert!(db.menu().get("nope").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_includes_recipeless_add_ons() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.menu();

        repo.insert(&shoyu_ramen()).await.unwrap();
        repo.insert(&MenuItem {
            id: "addon-egg".to_string(),
            name: "Extra Egg".to_string(),
            price_cents: 2000,
            category: ramen_core::ADD_ON_CATEGORY.to_string(),
            recipe: vec![RecipeLine {
                ingredient: "Egg".to_string(),
                quantity_per_unit: 1,
            }],
        })
        .await
        .unwrap();

        let items = repo.list().await.unwrap();
        assert_eq!(items.len(), 2);
        assert!(items.iter().any(|i| i.is_add_on()));
    }
}

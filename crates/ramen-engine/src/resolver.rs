//! # Recipe Resolver
//!
//! Expands a sale request (menu item + add-ons, each with a quantity)
//! into the aggregated ingredient requirements the deduction engine
//! consumes.
//!
//! ## Aggregation
//! ```text
//! Shoyu Ramen x2      (recipe: Noodles 1, Broth 2, Egg 1)
//! + Extra Egg x2      (recipe: Egg 1)
//!
//!   Noodles: 1 × 2           = 2
//!   Broth:   2 × 2           = 4
//!   Egg:     1 × 2 + 1 × 2   = 4   ◄── merged across item and add-on
//! ```
//! Requirements for the same ingredient are merged before deduction so
//! each ingredient is checked and decremented exactly once per sale.

use tracing::debug;

use crate::error::EngineResult;
use ramen_core::{validation, CoreError, IngredientRequirement, MenuItem};
use ramen_db::MenuRepository;

/// A requested add-on: the add-on menu item and how many to sell.
#[derive(Debug, Clone)]
pub struct AddOnRequest {
    pub menu_item_id: String,
    pub quantity: i64,
}

/// A fully resolved sale: frozen menu data plus aggregated requirements.
#[derive(Debug)]
pub struct ResolvedSale {
    /// The main menu item, as currently priced.
    pub item: MenuItem,

    /// Resolved add-ons paired with their requested quantities.
    pub add_ons: Vec<(MenuItem, i64)>,

    /// Aggregated ingredient requirements, merged per ingredient in
    /// first-seen order.
    pub requirements: Vec<IngredientRequirement>,
}

/// Resolves sale requests against the menu and its recipes.
#[derive(Debug, Clone)]
pub struct RecipeResolver {
    menu: MenuRepository,
}

impl RecipeResolver {
    /// Creates a new RecipeResolver.
    pub fn new(menu: MenuRepository) -> Self {
        RecipeResolver { menu }
    }

    /// Resolves a sale request into frozen menu data and aggregated
    /// ingredient requirements.
    ///
    /// ## Rules
    /// - The main item must exist; quantities must pass validation
    /// - Every add-on must exist AND carry the add-on category
    /// - Requirements are merged per ingredient across item and add-ons
    pub async fn resolve(
        &self,
        menu_item_id: &str,
        quantity: i64,
        add_ons: &[AddOnRequest],
    ) -> EngineResult<ResolvedSale> {
        validation::validate_quantity(quantity).map_err(CoreError::from)?;

        let item = self
            .menu
            .get(menu_item_id)
            .await?
            .ok_or_else(|| CoreError::ItemNotFound(menu_item_id.to_string()))?;

        let mut requirements: Vec<IngredientRequirement> = Vec::new();
        accumulate(&mut requirements, &item, quantity);

        let mut resolved_add_ons = Vec::with_capacity(add_ons.len());
        for request in add_ons {
            validation::validate_quantity(request.quantity).map_err(CoreError::from)?;

            let add_on = self
                .menu
                .get(&request.menu_item_id)
                .await?
                .ok_or_else(|| CoreError::ItemNotFound(request.menu_item_id.clone()))?;

            if !add_on.is_add_on() {
                return Err(CoreError::NotAnAddOn {
                    id: add_on.id,
                    category: add_on.category,
                }
                .into());
            }

            accumulate(&mut requirements, &add_on, request.quantity);
            resolved_add_ons.push((add_on, request.quantity));
        }

        debug!(
            item = %item.name,
            quantity,
            add_ons = resolved_add_ons.len(),
            ingredients = requirements.len(),
            "Sale resolved"
        );

        Ok(ResolvedSale {
            item,
            add_ons: resolved_add_ons,
            requirements,
        })
    }
}

/// Merges one item's recipe (scaled by quantity) into the requirement
/// list, preserving first-seen ingredient order.
///
/// Shared with the reconciler, which rebuilds requirements from live
/// recipes when syncing mobile order lines.
pub(crate) fn accumulate(
    requirements: &mut Vec<IngredientRequirement>,
    item: &MenuItem,
    quantity: i64,
) {
    for line in &item.recipe {
        let required = line.quantity_per_unit * quantity;
        match requirements
            .iter_mut()
            .find(|r| r.ingredient == line.ingredient)
        {
            Some(existing) => existing.required += required,
            None => requirements.push(IngredientRequirement {
                ingredient: line.ingredient.clone(),
                required,
            }),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

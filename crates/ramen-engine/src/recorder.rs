//! # Sales Recorder
//!
//! Writes the unified sales ledger. Two paths feed it:
//!
//! - **POS sales** ([`SalesRecorder::record_sale`]): resolve against the
//!   live menu, deduct stock, append the ledger entry at live prices.
//! - **Reconciled mobile lines** ([`SalesRecorder::record_reconciled`]):
//!   deduct stock via live recipes, but record at the prices frozen in
//!   the order line snapshot. The customer paid the snapshot price.
//!
//! ## Ordering
//! Stock is deducted BEFORE the ledger write. A sale without stock is
//! worse than stock consumed without a sale record: the first oversells
//! the kitchen, the second only understates revenue until an operator
//! reconciles. When the ledger write fails after a committed deduction,
//! the recorder raises [`EngineError::StockDecrementedUnrecorded`] and
//! logs under the `ledger_inconsistency` target so the discrepancy is
//! greppable.

use tracing::error;

use crate::deduction::DeductionEngine;
use crate::error::{EngineError, EngineResult};
use crate::resolver::{self, AddOnRequest, RecipeResolver};
use ramen_core::{
    validation, CoreError, IngredientRequirement, MobileOrder, OrderLine, SaleAddOn,
    SaleTransaction,
};
use ramen_db::{DbError, MenuRepository, NewSale, SaleRepository};

/// A POS sale request.
#[derive(Debug, Clone)]
pub struct SaleRequest {
    pub menu_item_id: String,
    pub quantity: i64,
    pub add_ons: Vec<AddOnRequest>,
    /// Payment method label (e.g., "cash", "gcash", "maya").
    pub payment_method: String,
    /// Service type label (e.g., "dine-in", "pickup", "takeout").
    pub service_type: String,
}

/// Records sales into the unified ledger.
#[derive(Debug, Clone)]
pub struct SalesRecorder {
    resolver: RecipeResolver,
    deduction: DeductionEngine,
    menu: MenuRepository,
    sales: SaleRepository,
}

impl SalesRecorder {
    /// Creates a new SalesRecorder.
    pub fn new(
        resolver: RecipeResolver,
        deduction: DeductionEngine,
        menu: MenuRepository,
        sales: SaleRepository,
    ) -> Self {
        SalesRecorder {
            resolver,
            deduction,
            menu,
            sales,
        }
    }

    /// Records a POS sale: resolve, deduct, append.
    ///
    /// Prices are read live from the menu and frozen into the record.
    pub async fn record_sale(&self, request: SaleRequest) -> EngineResult<SaleTransaction> {
        validation::validate_payment_method(&request.payment_method)
            .map_err(CoreError::from)?;

        let resolved = self
            .resolver
            .resolve(&request.menu_item_id, request.quantity, &request.add_ons)
            .await?;

        let add_ons: Vec<SaleAddOn> = resolved
            .add_ons
            .iter()
            .map(|(item, quantity)| SaleAddOn {
                menu_item_id: item.id.clone(),
                name: item.name.clone(),
                quantity: *quantity,
                price_cents: item.price_cents,
            })
            .collect();

        let add_on_total: i64 = add_ons.iter().map(|a| a.price_cents * a.quantity).sum();
        let total_cents = resolved.item.price_cents * request.quantity + add_on_total;

        self.deduction.commit(&resolved.requirements).await?;

        let draft = NewSale {
            menu_item_id: resolved.item.id.clone(),
            item_name: resolved.item.name.clone(),
            quantity: request.quantity,
            unit_price_cents: resolved.item.price_cents,
            add_ons,
            payment_method: request.payment_method,
            service_type: request.service_type,
            total_cents,
            mobile_order_id: None,
            mobile_line_index: None,
            is_from_mobile_order: false,
        };

        self.append(draft).await
    }

    /// Records one mobile order line as a ledger entry.
    ///
    /// Stock is deducted from live recipes; prices come from the order's
    /// snapshots. Add-ons apply to every unit, so their ledger quantity
    /// equals the line quantity and the ledger total formula reproduces
    /// the line total the customer was charged.
    pub async fn record_reconciled(
        &self,
        order: &MobileOrder,
        line_index: i64,
        line: &OrderLine,
    ) -> EngineResult<SaleTransaction> {
        let mut requirements: Vec<IngredientRequirement> = Vec::new();

        let item = self
            .menu
            .get(&line.menu_item.id)
            .await?
            .ok_or_else(|| CoreError::ItemNotFound(line.menu_item.id.clone()))?;
        resolver::accumulate(&mut requirements, &item, line.quantity);

        for add_on in &line.selected_add_ons {
            let add_on_item = self
                .menu
                .get(&add_on.id)
                .await?
                .ok_or_else(|| CoreError::ItemNotFound(add_on.id.clone()))?;
            resolver::accumulate(&mut requirements, &add_on_item, line.quantity);
        }

        self.deduction.commit(&requirements).await?;

        let add_ons: Vec<SaleAddOn> = line
            .selected_add_ons
            .iter()
            .map(|a| SaleAddOn {
                menu_item_id: a.id.clone(),
                name: a.name.clone(),
                quantity: line.quantity,
                price_cents: a.price_cents,
            })
            .collect();

        let draft = NewSale {
            menu_item_id: line.menu_item.id.clone(),
            item_name: line.menu_item.name.clone(),
            quantity: line.quantity,
            unit_price_cents: line.menu_item.price_cents,
            add_ons,
            payment_method: order.payment_method.clone(),
            service_type: "pickup".to_string(),
            total_cents: line.line_total().cents(),
            mobile_order_id: Some(order.id.clone()),
            mobile_line_index: Some(line_index),
            is_from_mobile_order: true,
        };

        self.append(draft).await
    }

    /// Appends a ledger entry after a committed deduction, classifying a
    /// failure as the decremented-but-unrecorded inconsistency.
    ///
    /// The one benign failure is the mobile-line duplicate race: another
    /// reconciliation pass recorded the same line first, and the
    /// reconciler counts it as a skip. Every other unique violation
    /// (e.g., an order-number collision after an administrative
    /// correction) still means stock was consumed with no ledger entry.
    async fn append(&self, draft: NewSale) -> EngineResult<SaleTransaction> {
        let item_name = draft.item_name.clone();
        let quantity = draft.quantity;
        let from_mobile_line = draft.mobile_order_id.is_some();

        match self.sales.insert(draft).await {
            Ok(sale) => Ok(sale),
            Err(source) => {
                let mobile_duplicate_race = from_mobile_line
                    && matches!(
                        &source,
                        DbError::UniqueViolation { field } if field.contains("mobile_order_id")
                    );
                if mobile_duplicate_race {
                    return Err(source.into());
                }

                error!(
                    target: "ledger_inconsistency",
                    item = %item_name,
                    quantity,
                    error = %source,
                    "Stock deducted but sale record not written"
                );
                Err(EngineError::StockDecrementedUnrecorded {
                    item_name,
                    quantity,
                    source,
                })
            }
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

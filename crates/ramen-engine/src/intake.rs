//! # Mobile Order Intake
//!
//! Validates customer submissions, freezes price snapshots, computes the
//! total (subtotal + delivery surcharge), assigns identifiers and stores
//! the order as `pending`.
//!
//! ## Identifiers
//! Order codes are derived from the order's UUID (first 12 hex digits,
//! uppercased) instead of an independent random draw, so uniqueness
//! follows from the UUID itself. 48 bits keeps birthday collisions out
//! of reach at any realistic order volume while staying short enough to
//! read over the counter. The invoice number embeds the date:
//! `INV-YYYYMMDD-<code>`.
//!
//! Intake does NOT touch stock. Ingredients are consumed when the order
//! is reconciled into the sales ledger, not when it is placed.

use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use crate::config::EngineConfig;
use crate::error::EngineResult;
use ramen_core::{validation, CoreError, DeliveryMethod, MobileOrder, OrderLine, OrderStatus};
use ramen_db::MobileOrderRepository;

/// A customer's order submission.
#[derive(Debug, Clone)]
pub struct MobileOrderRequest {
    /// Line items with frozen menu snapshots (the mobile client captured
    /// prices at browse time; intake validates and trusts them).
    pub line_items: Vec<OrderLine>,
    pub delivery_method: DeliveryMethod,
    pub delivery_address: Option<String>,
    pub payment_method: String,
    pub notes: Option<String>,
    pub customer_id: Option<String>,
}

/// Accepts and stores mobile orders.
#[derive(Debug, Clone)]
pub struct MobileOrderIntake {
    orders: MobileOrderRepository,
    config: EngineConfig,
}

impl MobileOrderIntake {
    /// Creates a new MobileOrderIntake.
    pub fn new(orders: MobileOrderRepository, config: EngineConfig) -> Self {
        MobileOrderIntake { orders, config }
    }

    /// Validates and stores a submission, returning the stored order.
    pub async fn submit(&self, request: MobileOrderRequest) -> EngineResult<MobileOrder> {
        validation::validate_line_items(&request.line_items).map_err(CoreError::from)?;
        validation::validate_delivery(
            request.delivery_method,
            request.delivery_address.as_deref(),
        )
        .map_err(CoreError::from)?;
        validation::validate_payment_method(&request.payment_method)
            .map_err(CoreError::from)?;

        let id = Uuid::new_v4();
        let created_at = Utc::now();
        let order_code = order_code_from(&id);
        let invoice_number = format!("INV-{}-{}", created_at.format("%Y%m%d"), order_code);

        let mut order = MobileOrder {
            id: id.to_string(),
            order_code,
            invoice_number,
            customer_id: request.customer_id,
            lines: request.line_items,
            delivery_method: request.delivery_method,
            delivery_address: request.delivery_address,
            payment_method: request.payment_method,
            notes: request.notes,
            total_cents: 0,
            status: OrderStatus::Pending,
            created_at,
        };
        order.total_cents = order.computed_total(self.config.delivery_fee()).cents();

        self.orders.insert(&order).await?;

        info!(
            order_code = %order.order_code,
            lines = order.lines.len(),
            total_cents = order.total_cents,
            delivery = ?order.delivery_method,
            "Mobile order accepted"
        );

        Ok(order)
    }
}

/// First 12 hex digits of the UUID, uppercased.
fn order_code_from(id: &Uuid) -> String {
    id.simple().to_string()[..12].to_uppercase()
}

// =============================================================================
// Unit Tests
// =============================================================================

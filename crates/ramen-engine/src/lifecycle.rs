//! # Status Lifecycle Manager
//!
//! Applies validated status transitions to stored orders and fans the
//! resulting events out to observers (cashier dashboard, kitchen screen,
//! customer tracker).
//!
//! ## Concurrency
//! The transition is validated in memory against a loaded copy, then
//! persisted with a compare-and-set update. If another writer moved the
//! order in between, the manager re-reads and retries; the retry loop
//! terminates because every applied transition strictly advances the
//! order, and terminal states end the loop with an error.
//!
//! ## Observer Fan-Out
//! Events ride a `tokio::sync::broadcast` channel: at-most-once, best
//! effort. A transition never fails because nobody is listening; a
//! send error with zero receivers is logged at debug level and dropped.

use serde::Serialize;
use tokio::sync::broadcast;
use tracing::{debug, info};

use crate::error::EngineResult;
use ramen_core::{CoreError, MobileOrder, OrderStatus};
use ramen_db::{MobileOrderRepository, StatusUpdate};

/// A status change notification delivered to observers.
///
/// Serializable because dashboard and tracker frontends consume it as
/// JSON.
#[derive(Debug, Clone, Serialize)]
pub struct OrderEvent {
    pub order_id: String,
    pub status: OrderStatus,
    /// The full order after the transition, so observers need no
    /// follow-up read.
    pub order: MobileOrder,
}

/// Manages order status transitions and the observer channel.
#[derive(Debug)]
pub struct StatusLifecycle {
    orders: MobileOrderRepository,
    events: broadcast::Sender<OrderEvent>,
}

impl StatusLifecycle {
    /// Creates a new StatusLifecycle with the given event capacity.
    pub fn new(orders: MobileOrderRepository, event_capacity: usize) -> Self {
        let (events, _) = broadcast::channel(event_capacity);
        StatusLifecycle { orders, events }
    }

    /// Subscribes to status change events.
    ///
    /// Only events published after the call are received.
    pub fn subscribe(&self) -> broadcast::Receiver<OrderEvent> {
        self.events.subscribe()
    }

    /// Transitions an order to `next`, enforcing the state machine, and
    /// publishes the event on success.
    pub async fn set_status(&self, order_id: &str, next: OrderStatus) -> EngineResult<MobileOrder> {
        loop {
            let mut order = self
                .orders
                .get(order_id)
                .await?
                .ok_or_else(|| CoreError::OrderNotFound(order_id.to_string()))?;

            order.status.validate_transition(next)?;

            match self
                .orders
                .update_status(order_id, order.status, next)
                .await?
            {
                StatusUpdate::Applied => {
                    info!(
                        order_code = %order.order_code,
                        from = %order.status,
                        to = %next,
                        "Order status changed"
                    );
                    order.status = next;
                    self.publish(OrderEvent {
                        order_id: order.id.clone(),
                        status: next,
                        order: order.clone(),
                    });
                    return Ok(order);
                }
                StatusUpdate::Stale => {
                    // Another writer advanced the order first. Re-read
                    // and re-validate against the fresh status.
                    debug!(order_code = %order.order_code, "Status update lost a race, retrying");
                }
            }
        }
    }

    fn publish(&self, event: OrderEvent) {
        if self.events.send(event).is_err() {
            debug!("No order event subscribers, event dropped");
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use ramen_core::{DeliveryMethod, MenuItemSnapshot, OrderLine};
    use ramen_db::{Database, DbConfig};

    async fn lifecycle_with_order() -> (Database, StatusLifecycle) {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        let order = MobileOrder {
            id: "o-1".to_string(),
            order_code: "A1B2C3D4".to_string(),
            invoice_number: "INV-20260823-A1B2C3D4".to_string(),
            customer_id: None,
            lines: vec![OrderLine {
                menu_item: MenuItemSnapshot {
                    id: "ramen-1".to_string(),
                    name: "Shoyu Ramen".to_string(),
                    price_cents: 10000,
                },
                quantity: 1,
                selected_add_ons: vec![],
            }],
            delivery_method: DeliveryMethod::Pickup,
            delivery_address: None,
            payment_method: "cash".to_string(),
            notes: None,
            total_cents: 10000,
            status: OrderStatus::Pending,
            created_at: Utc::now(),
        };
        db.orders().insert(&order).await.unwrap();

        let lifecycle = StatusLifecycle::new(db.orders(), 16);
        (db, lifecycle)
    }

    #[tokio::test]
    async fn test_forward_transition_persists_and_publishes() {
        let (db, lifecycle) = lifecycle_with_order().await;
        let mut events = lifecycle.subscribe();

        let updated = lifecycle
            .set_status("o-1", OrderStatus::Preparing)
            .await
            .unwrap();
        assert_eq!(updated.status, OrderStatus::Preparing);

        let stored = db.orders().get("o-1").await.unwrap().unwrap();
        assert_eq!(stored.status, OrderStatus::Preparing);

        let event = events.recv().await.unwrap();
        assert_eq!(event.order_id, "o-1");
        assert_eq!(event.status, OrderStatus::Preparing);
        assert_eq!(event.order.order_code, "A1B2C3D4");
    }

    #[tokio::test]
    async fn test_backwards_transition_rejected() {
        let (_db, lifecycle) = lifecycle_with_order().await;

        lifecycle
            .set_status("o-1", OrderStatus::Ready)
            .await
            .unwrap();

        let err = lifecycle
            .set_status("o-1", OrderStatus::Preparing)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            crate::EngineError::Core(CoreError::InvalidStatusTransition { .. })
        ));
    }

    #[tokio::test]
    async fn test_terminal_order_rejects_transitions() {
        let (_db, lifecycle) = lifecycle_with_order().await;

        lifecycle
            .set_status("o-1", OrderStatus::Delivered)
            .await
            .unwrap();

        let err = lifecycle
            .set_status("o-1", OrderStatus::Cancelled)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            crate::EngineError::Core(CoreError::OrderAlreadyFinalized {
                status: OrderStatus::Delivered
            })
        ));
    }

    #[tokio::test]
    async fn test_transition_succeeds_without_subscribers() {
        let (_db, lifecycle) = lifecycle_with_order().await;

        // No subscriber exists; the send error must be swallowed.
        let updated = lifecycle
            .set_status("o-1", OrderStatus::Cancelled)
            .await
            .unwrap();
        assert_eq!(updated.status, OrderStatus::Cancelled);
    }

    #[tokio::test]
    async fn test_unknown_order_rejected() {
        let (_db, lifecycle) = lifecycle_with_order().await;

        let err = lifecycle
            .set_status("missing", OrderStatus::Preparing)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            crate::EngineError::Core(CoreError::OrderNotFound(_))
        ));
    }
}

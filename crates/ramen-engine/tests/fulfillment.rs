//! End-to-end fulfillment flows: POS sales, mobile order intake,
//! reconciliation, status lifecycle, and the consistency properties that
//! hold across them.

use std::sync::Arc;

use chrono::Utc;

use ramen_core::{
    AddOnSnapshot, CoreError, DeliveryMethod, InventoryItem, MenuItem, MenuItemSnapshot,
    OrderLine, OrderStatus, RecipeLine,
};
use ramen_db::{Database, DbConfig};
use ramen_engine::{
    Engine, EngineConfig, EngineError, MobileOrderRequest, ReconcileTarget, SaleRequest,
};

// =============================================================================
// Fixtures
// =============================================================================

fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

async fn seeded_engine() -> Engine {
    init_tracing();

    let db = Database::new(DbConfig::in_memory()).await.unwrap();

    db.menu()
        .insert(&MenuItem {
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
        })
        .await
        .unwrap();

    db.menu()
        .insert(&MenuItem {
            id: "rice-1".to_string(),
            name: "Chashu Rice".to_string(),
            price_cents: 5000,
            category: "rice".to_string(),
            recipe: vec![RecipeLine {
                ingredient: "Rice".to_string(),
                quantity_per_unit: 1,
            }],
        })
        .await
        .unwrap();

    db.menu()
        .insert(&MenuItem {
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

    seed_stock(&db, &[("Noodles", 100), ("Broth", 200), ("Rice", 50), ("Egg", 60)]).await;

    Engine::new(db, EngineConfig::default())
}

async fn seed_stock(db: &Database, quantities: &[(&str, i64)]) {
    for (name, quantity) in quantities {
        db.inventory()
            .upsert(&InventoryItem {
                name: name.to_string(),
                quantity: *quantity,
                unit: "servings".to_string(),
                restocked_at: Utc::now(),
                status_override: None,
            })
            .await
            .unwrap();
    }
}

async fn stock_of(engine: &Engine, name: &str) -> i64 {
    engine
        .db()
        .inventory()
        .get(name)
        .await
        .unwrap()
        .unwrap()
        .quantity
}

fn ramen_line(quantity: i64, with_egg: bool) -> OrderLine {
    OrderLine {
        menu_item: MenuItemSnapshot {
            id: "ramen-1".to_string(),
            name: "Shoyu Ramen".to_string(),
            price_cents: 10000,
        },
        quantity,
        selected_add_ons: if with_egg {
            vec![AddOnSnapshot {
                id: "addon-egg".to_string(),
                name: "Extra Egg".to_string(),
                price_cents: 2000,
            }]
        } else {
            vec![]
        },
    }
}

fn pickup_order(lines: Vec<OrderLine>) -> MobileOrderRequest {
    MobileOrderRequest {
        line_items: lines,
        delivery_method: DeliveryMethod::Pickup,
        delivery_address: None,
        payment_method: "gcash".to_string(),
        notes: None,
        customer_id: None,
    }
}

fn pos_sale(quantity: i64) -> SaleRequest {
    SaleRequest {
        menu_item_id: "ramen-1".to_string(),
        quantity,
        add_ons: vec![],
        payment_method: "cash".to_string(),
        service_type: "dine-in".to_string(),
    }
}

// =============================================================================
// POS Sales
// =============================================================================

#[tokio::test]
async fn sale_with_insufficient_stock_changes_nothing() {
    let engine = seeded_engine().await;
    seed_stock(engine.db(), &[("Noodles", 5)]).await;

    let err = engine.record_sale(pos_sale(6)).await.unwrap_err();
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

    assert_eq!(stock_of(&engine, "Noodles").await, 5);
    assert_eq!(stock_of(&engine, "Broth").await, 200);
    assert!(engine.list_sales().await.unwrap().is_empty());
}

#[tokio::test]
async fn multi_ingredient_deduction_is_all_or_nothing() {
    let engine = seeded_engine().await;
    // Enough noodles for 10 bowls, enough broth for only 3.
    seed_stock(engine.db(), &[("Noodles", 10), ("Broth", 6)]).await;

    let err = engine.record_sale(pos_sale(4)).await.unwrap_err();
    assert!(matches!(
        err,
        EngineError::Core(CoreError::InsufficientStock { .. })
    ));

    // The noodle decrement was rolled back along with everything else.
    assert_eq!(stock_of(&engine, "Noodles").await, 10);
    assert_eq!(stock_of(&engine, "Broth").await, 6);
}

#[tokio::test]
async fn sale_order_numbers_are_sequential_and_zero_padded() {
    let engine = seeded_engine().await;

    for expected in ["0001", "0002", "0003"] {
        let sale = engine.record_sale(pos_sale(1)).await.unwrap();
        assert_eq!(sale.order_number, expected);
    }
}

#[tokio::test]
async fn concurrent_sales_never_oversell() {
    let engine = Arc::new(seeded_engine().await);
    seed_stock(engine.db(), &[("Noodles", 5), ("Broth", 1000)]).await;

    let mut handles = Vec::new();
    for _ in 0..10 {
        let engine = Arc::clone(&engine);
        handles.push(tokio::spawn(
            async move { engine.record_sale(pos_sale(1)).await },
        ));
    }

    let mut succeeded = 0;
    let mut rejected = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => succeeded += 1,
            Err(EngineError::Core(CoreError::InsufficientStock { .. })) => rejected += 1,
            Err(other) => panic!("unexpected error: {other:?}"),
        }
    }

    assert_eq!(succeeded, 5);
    assert_eq!(rejected, 5);
    assert_eq!(stock_of(&engine, "Noodles").await, 0);
    assert_eq!(engine.list_sales().await.unwrap().len(), 5);
}

// =============================================================================
// Mobile Orders & Reconciliation
// =============================================================================

#[tokio::test]
async fn delivery_order_totals_include_surcharge() {
    let engine = seeded_engine().await;

    // ((100 + 20) × 2 + 50) + 50 delivery = 340 pesos.
    let order = engine
        .submit_mobile_order(MobileOrderRequest {
            line_items: vec![
                ramen_line(2, true),
                OrderLine {
                    menu_item: MenuItemSnapshot {
                        id: "rice-1".to_string(),
                        name: "Chashu Rice".to_string(),
                        price_cents: 5000,
                    },
                    quantity: 1,
                    selected_add_ons: vec![],
                },
            ],
            delivery_method: DeliveryMethod::Delivery,
            delivery_address: Some("123 Noodle St".to_string()),
            payment_method: "gcash".to_string(),
            notes: None,
            customer_id: Some("cust-1".to_string()),
        })
        .await
        .unwrap();

    assert_eq!(order.total_cents, 34000);
}

#[tokio::test]
async fn reconcile_is_idempotent() {
    let engine = seeded_engine().await;

    let order = engine
        .submit_mobile_order(pickup_order(vec![ramen_line(2, true), ramen_line(1, false)]))
        .await
        .unwrap();

    let first = engine
        .reconcile(ReconcileTarget::Order(order.id.clone()))
        .await
        .unwrap();
    assert_eq!(first.synced, 2);
    assert_eq!(first.skipped, 0);

    let noodles_after_first = stock_of(&engine, "Noodles").await;
    let sales_after_first = engine.list_sales().await.unwrap().len();

    let second = engine
        .reconcile(ReconcileTarget::Order(order.id))
        .await
        .unwrap();
    assert_eq!(second.synced, 0);
    assert_eq!(second.skipped, 2);

    // Nothing deducted or appended the second time.
    assert_eq!(stock_of(&engine, "Noodles").await, noodles_after_first);
    assert_eq!(engine.list_sales().await.unwrap().len(), sales_after_first);
}

#[tokio::test]
async fn reconciled_sales_use_snapshot_prices_and_back_reference() {
    let engine = seeded_engine().await;

    // The order was placed at a promo price below today's menu price;
    // the ledger must carry what the customer actually paid.
    let mut promo_line = ramen_line(2, true);
    promo_line.menu_item.price_cents = 8000;

    let order = engine
        .submit_mobile_order(pickup_order(vec![promo_line]))
        .await
        .unwrap();
    assert_eq!(order.total_cents, 20000);

    engine
        .reconcile(ReconcileTarget::Order(order.id.clone()))
        .await
        .unwrap();

    let sales = engine
        .db()
        .sales()
        .list_for_mobile_order(&order.id)
        .await
        .unwrap();
    assert_eq!(sales.len(), 1);

    let sale = &sales[0];
    assert_eq!(sale.unit_price_cents, 8000);
    assert_eq!(sale.total_cents, 20000);
    assert_eq!(sale.computed_total().cents(), sale.total_cents);
    assert!(sale.is_from_mobile_order);
    assert_eq!(sale.mobile_order_id.as_deref(), Some(order.id.as_str()));
    assert_eq!(sale.mobile_line_index, Some(0));
    // Add-ons apply per unit, so the ledger add-on quantity equals the
    // line quantity.
    assert_eq!(sale.add_ons[0].quantity, 2);
}

#[tokio::test]
async fn reconcile_all_covers_every_unsynced_line() {
    let engine = seeded_engine().await;

    let mut order_ids = Vec::new();
    let mut total_lines = 0;
    for i in 0..10 {
        let lines = if i % 2 == 0 {
            vec![ramen_line(1, false)]
        } else {
            vec![ramen_line(1, false), ramen_line(2, true)]
        };
        total_lines += lines.len();
        let order = engine.submit_mobile_order(pickup_order(lines)).await.unwrap();
        order_ids.push(order.id);
    }

    // Partially sync three orders first.
    let mut pre_synced = 0;
    for id in order_ids.iter().take(3) {
        pre_synced += engine
            .reconcile(ReconcileTarget::Order(id.clone()))
            .await
            .unwrap()
            .synced;
    }

    let report = engine.reconcile(ReconcileTarget::All).await.unwrap();
    assert_eq!(report.skipped, pre_synced);
    assert_eq!(report.synced, total_lines - pre_synced);
    assert_eq!(report.failed, 0);
    assert_eq!(report.total(), total_lines);

    assert_eq!(engine.list_sales().await.unwrap().len(), total_lines);
}

#[tokio::test]
async fn reconcile_isolates_failing_lines() {
    let engine = seeded_engine().await;
    seed_stock(engine.db(), &[("Rice", 0)]).await;

    let order = engine
        .submit_mobile_order(pickup_order(vec![
            ramen_line(1, false),
            OrderLine {
                menu_item: MenuItemSnapshot {
                    id: "rice-1".to_string(),
                    name: "Chashu Rice".to_string(),
                    price_cents: 5000,
                },
                quantity: 1,
                selected_add_ons: vec![],
            },
        ]))
        .await
        .unwrap();

    let report = engine
        .reconcile(ReconcileTarget::Order(order.id.clone()))
        .await
        .unwrap();
    assert_eq!(report.synced, 1);
    assert_eq!(report.failed, 1);

    // After a restock the failed line syncs on the next pass.
    engine.restock("Rice", 10).await.unwrap();
    let retry = engine
        .reconcile(ReconcileTarget::Order(order.id))
        .await
        .unwrap();
    assert_eq!(retry.synced, 1);
    assert_eq!(retry.skipped, 1);
    assert_eq!(retry.failed, 0);
}

#[tokio::test]
async fn cancelled_orders_are_not_reconciled() {
    let engine = seeded_engine().await;

    let order = engine
        .submit_mobile_order(pickup_order(vec![ramen_line(1, false)]))
        .await
        .unwrap();
    engine
        .set_order_status(&order.id, OrderStatus::Cancelled)
        .await
        .unwrap();

    let report = engine.reconcile(ReconcileTarget::All).await.unwrap();
    assert_eq!(report.total(), 0);
    assert_eq!(stock_of(&engine, "Noodles").await, 100);
}

// =============================================================================
// Status Lifecycle
// =============================================================================

#[tokio::test]
async fn delivered_order_rejects_further_transitions() {
    let engine = seeded_engine().await;

    let order = engine
        .submit_mobile_order(pickup_order(vec![ramen_line(1, false)]))
        .await
        .unwrap();

    for status in [OrderStatus::Preparing, OrderStatus::Ready, OrderStatus::Delivered] {
        engine.set_order_status(&order.id, status).await.unwrap();
    }

    let err = engine
        .set_order_status(&order.id, OrderStatus::Preparing)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        EngineError::Core(CoreError::OrderAlreadyFinalized {
            status: OrderStatus::Delivered
        })
    ));
}

#[tokio::test]
async fn observers_receive_status_events() {
    let engine = seeded_engine().await;
    let mut events = engine.subscribe();

    let order = engine
        .submit_mobile_order(pickup_order(vec![ramen_line(1, false)]))
        .await
        .unwrap();
    engine
        .set_order_status(&order.id, OrderStatus::Preparing)
        .await
        .unwrap();
    engine
        .set_order_status(&order.id, OrderStatus::Ready)
        .await
        .unwrap();

    let first = events.recv().await.unwrap();
    assert_eq!(first.order_id, order.id);
    assert_eq!(first.status, OrderStatus::Preparing);

    let second = events.recv().await.unwrap();
    assert_eq!(second.status, OrderStatus::Ready);
    assert_eq!(second.order.order_code, order.order_code);
}

// =============================================================================
// Customer Attribution & Administration
// =============================================================================

#[tokio::test]
async fn customer_order_history_is_filtered() {
    let engine = seeded_engine().await;

    for customer in [Some("cust-1"), Some("cust-2"), Some("cust-1"), None] {
        let mut request = pickup_order(vec![ramen_line(1, false)]);
        request.customer_id = customer.map(str::to_string);
        engine.submit_mobile_order(request).await.unwrap();
    }

    let history = engine.list_orders_for_customer("cust-1").await.unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(engine.list_orders().await.unwrap().len(), 4);
}

#[tokio::test]
async fn restock_and_override_administration() {
    let engine = seeded_engine().await;
    seed_stock(engine.db(), &[("Noodles", 2)]).await;

    let restocked = engine.restock("Noodles", 48).await.unwrap();
    assert_eq!(restocked.quantity, 50);

    engine
        .set_stock_override("Noodles", Some(ramen_core::StockStatus::OutOfStock))
        .await
        .unwrap();
    let items = engine.list_inventory().await.unwrap();
    let noodles = items.iter().find(|i| i.name == "Noodles").unwrap();
    assert_eq!(noodles.status(), ramen_core::StockStatus::OutOfStock);
    assert!(noodles.override_conflicts());
}

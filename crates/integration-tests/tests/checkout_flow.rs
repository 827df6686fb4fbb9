//! End-to-end cart-to-order checkout tests.
//!
//! Each test drives the engine the way the cart screen would: build up a
//! cart through the session handle, then ask the coordinator to convert it
//! into an order against the in-memory catalog and order store.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;
use std::time::Duration;

use hardware_shop_core::{OrderStatus, ProductId, UserId};
use hardware_shop_engine::{
    CheckoutError, CheckoutPhase, EngineConfig, StockError,
    stores::{InMemoryOrderStore, StaticIdentity},
};
use hardware_shop_integration_tests::{TEST_USER_ID, TEST_USER_NAME, TestContext, product};
use rust_decimal::Decimal;

#[tokio::test]
async fn successful_checkout_commits_order_and_clears_cart() {
    let bolt = product("p-bolt", "M6 bolt", 250, 100);
    let wrench = product("p-wrench", "Wrench", 19900, 10);
    let ctx = TestContext::new([bolt.clone(), wrench.clone()]);

    ctx.add_to_cart(&bolt, 4).await;
    let snapshot = ctx.add_to_cart(&wrench, 1).await;
    assert_eq!(snapshot.total, Decimal::new(20900, 2));

    let order_id = ctx.coordinator.checkout().await.unwrap();

    // Cart fully cleared, coordinator back to idle.
    assert!(ctx.cart.snapshot().await.is_empty());
    assert_eq!(ctx.coordinator.phase(), CheckoutPhase::Idle);

    // Exactly one order, carrying the cart's total and line snapshots.
    let orders = ctx.orders.stored_orders().await;
    assert_eq!(orders.len(), 1);
    let order = orders.first().unwrap();
    assert_eq!(order.order_id, order_id);
    assert_eq!(order.user_id, UserId::new(TEST_USER_ID));
    assert_eq!(order.user_display_name, TEST_USER_NAME);
    assert_eq!(order.total_amount, Decimal::new(20900, 2));
    assert_eq!(order.status, OrderStatus::Pending);
    assert_eq!(order.lines.len(), 2);
    let totals: Decimal = order.lines.iter().map(|line| line.line_total()).sum();
    assert_eq!(order.total_amount, totals);
}

#[tokio::test]
async fn order_lines_keep_locked_in_prices() {
    // The catalog says 300 paise now, but the customer carted at 250; the
    // order must keep the price the cart locked in.
    let carted = product("p-bolt", "M6 bolt", 250, 100);
    let repriced = product("p-bolt", "M6 bolt", 300, 100);
    let ctx = TestContext::new([repriced]);

    ctx.add_to_cart(&carted, 2).await;
    ctx.coordinator.checkout().await.unwrap();

    let orders = ctx.orders.stored_orders().await;
    let line = orders.first().unwrap().lines.first().unwrap();
    assert_eq!(line.unit_price, carted.unit_price);
    assert_eq!(orders.first().unwrap().total_amount, Decimal::new(500, 2));
}

#[tokio::test]
async fn empty_cart_is_rejected_without_touching_the_store() {
    let ctx = TestContext::new([product("p-bolt", "M6 bolt", 250, 100)]);

    let result = ctx.coordinator.checkout().await;
    assert!(matches!(result, Err(CheckoutError::EmptyCart)));
    assert!(ctx.orders.is_empty().await);
}

#[tokio::test]
async fn insufficient_stock_rejects_and_leaves_cart_unchanged() {
    // stock(A) = 4, cart requests 5
    let bolt = product("p-bolt", "M6 bolt", 250, 4);
    let ctx = TestContext::new([bolt.clone()]);

    ctx.add_to_cart(&bolt, 5).await;
    let before = ctx.cart.snapshot().await;

    let result = ctx.coordinator.checkout().await;
    match result {
        Err(CheckoutError::Stock(StockError::InsufficientStock {
            product_id,
            requested,
            available,
        })) => {
            assert_eq!(product_id, ProductId::new("p-bolt"));
            assert_eq!(requested, 5);
            assert_eq!(available, 4);
        }
        other => panic!("expected InsufficientStock, got {other:?}"),
    }

    // Same lines, same total; nothing persisted.
    assert_eq!(ctx.cart.snapshot().await, before);
    assert!(ctx.orders.is_empty().await);
}

#[tokio::test]
async fn stock_is_revalidated_at_commit_time() {
    // Stock was plentiful when the item was carted; the owner sells it down
    // before checkout. The fresh read at commit must catch it.
    let bolt = product("p-bolt", "M6 bolt", 250, 100);
    let ctx = TestContext::new([bolt.clone()]);

    ctx.add_to_cart(&bolt, 10).await;
    ctx.catalog.set_stock(&bolt.product_id, 3).await;

    let result = ctx.coordinator.checkout().await;
    assert!(matches!(
        &result,
        Err(CheckoutError::Stock(StockError::InsufficientStock {
            available: 3,
            requested: 10,
            ..
        }))
    ));
    assert_eq!(result.unwrap_err().user_message(), "Only 3 left in stock");
}

#[tokio::test]
async fn product_removed_from_catalog_rejects_checkout() {
    let bolt = product("p-bolt", "M6 bolt", 250, 100);
    let ctx = TestContext::new([bolt.clone()]);

    ctx.add_to_cart(&bolt, 1).await;
    ctx.catalog.remove_product(&bolt.product_id).await;

    let result = ctx.coordinator.checkout().await;
    assert!(matches!(
        result,
        Err(CheckoutError::Stock(StockError::ProductUnavailable { product_id }))
            if product_id == bolt.product_id
    ));
    assert!(!ctx.cart.snapshot().await.is_empty());
}

#[tokio::test]
async fn store_failure_keeps_cart_so_checkout_can_be_retried() {
    let bolt = product("p-bolt", "M6 bolt", 250, 100);
    let ctx = TestContext::new([bolt.clone()]);

    ctx.add_to_cart(&bolt, 2).await;
    let before = ctx.cart.snapshot().await;

    ctx.orders.fail_next_append();
    let result = ctx.coordinator.checkout().await;
    assert!(matches!(result, Err(CheckoutError::StoreUnavailable(_))));
    assert_eq!(ctx.cart.snapshot().await, before);
    assert!(ctx.orders.is_empty().await);

    // The failure was transient; the retry succeeds with the same cart.
    ctx.coordinator.checkout().await.unwrap();
    assert!(ctx.cart.snapshot().await.is_empty());
    assert_eq!(ctx.orders.len().await, 1);
}

#[tokio::test]
async fn anonymous_user_cannot_check_out() {
    let bolt = product("p-bolt", "M6 bolt", 250, 100);
    let ctx = TestContext::build(
        [bolt.clone()],
        InMemoryOrderStore::new(),
        StaticIdentity::anonymous(),
        EngineConfig::default(),
    );

    ctx.add_to_cart(&bolt, 1).await;
    let result = ctx.coordinator.checkout().await;
    assert!(matches!(result, Err(CheckoutError::NotAuthenticated)));
    assert!(ctx.orders.is_empty().await);
    assert!(!ctx.cart.snapshot().await.is_empty());
}

#[tokio::test]
async fn slow_store_times_out_with_cart_untouched() {
    let bolt = product("p-bolt", "M6 bolt", 250, 100);
    let ctx = TestContext::build(
        [bolt.clone()],
        InMemoryOrderStore::with_append_latency(Duration::from_secs(60)),
        StaticIdentity::signed_in(TEST_USER_ID, TEST_USER_NAME),
        EngineConfig {
            checkout_timeout: Duration::from_millis(50),
        },
    );

    ctx.add_to_cart(&bolt, 1).await;
    let before = ctx.cart.snapshot().await;

    let result = ctx.coordinator.checkout().await;
    assert!(matches!(result, Err(CheckoutError::Timeout)));
    assert_eq!(ctx.cart.snapshot().await, before);
    assert_eq!(ctx.coordinator.phase(), CheckoutPhase::Idle);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn concurrent_checkouts_commit_exactly_once() {
    let bolt = product("p-bolt", "M6 bolt", 250, 100);
    let ctx = Arc::new(TestContext::build(
        [bolt.clone()],
        InMemoryOrderStore::with_append_latency(Duration::from_millis(200)),
        StaticIdentity::signed_in(TEST_USER_ID, TEST_USER_NAME),
        EngineConfig::default(),
    ));

    ctx.add_to_cart(&bolt, 2).await;

    let first = tokio::spawn({
        let ctx = Arc::clone(&ctx);
        async move { ctx.coordinator.checkout().await }
    });
    // Give the first checkout time to pass the in-flight guard.
    tokio::time::sleep(Duration::from_millis(50)).await;
    let second = ctx.coordinator.checkout().await;

    assert!(matches!(second, Err(CheckoutError::CheckoutInProgress)));
    first.await.unwrap().unwrap();

    // Exactly one committed order for the cart contents.
    assert_eq!(ctx.orders.len().await, 1);
    assert!(ctx.cart.snapshot().await.is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn cart_edits_during_commit_do_not_enter_the_order() {
    let bolt = product("p-bolt", "M6 bolt", 250, 100);
    let wrench = product("p-wrench", "Wrench", 19900, 10);
    let ctx = Arc::new(TestContext::build(
        [bolt.clone(), wrench.clone()],
        InMemoryOrderStore::with_append_latency(Duration::from_millis(300)),
        StaticIdentity::signed_in(TEST_USER_ID, TEST_USER_NAME),
        EngineConfig::default(),
    ));

    ctx.add_to_cart(&bolt, 2).await;

    let checkout = tokio::spawn({
        let ctx = Arc::clone(&ctx);
        async move { ctx.coordinator.checkout().await }
    });
    // The coordinator releases the cart lock during store I/O, so this edit
    // proceeds while the order append is in flight.
    tokio::time::sleep(Duration::from_millis(100)).await;
    ctx.add_to_cart(&wrench, 1).await;

    checkout.await.unwrap().unwrap();

    // The order holds only the snapshot taken at validation time.
    let orders = ctx.orders.stored_orders().await;
    let order = orders.first().unwrap();
    assert_eq!(order.lines.len(), 1);
    assert_eq!(
        order.lines.first().unwrap().product_id,
        ProductId::new("p-bolt")
    );
}

//! Manual orders and stored totals.

#![allow(clippy::unwrap_used)]

use grocer_core::{OrderStatus, Quantity};
use grocer_integration_tests::{context_or_skip, money};
use grocer_tracker::AppError;
use grocer_tracker::services::OrderService;

#[tokio::test]
async fn test_total_tracks_details() {
    let ctx = context_or_skip!();
    let user = ctx.user().await.unwrap();
    let category = ctx.category().await.unwrap();
    let bread = ctx.product(&category, 349).await.unwrap();
    let jam = ctx.product(&category, 525).await.unwrap();

    let orders = OrderService::new(&ctx.pool);
    let order = orders.create_order(user.id).await.unwrap();
    assert_eq!(order.status, OrderStatus::Open);
    assert_eq!(order.total_amount, money(0));

    let detail = orders
        .add_item(user.id, order.id, bread.id, Quantity::new(3).unwrap())
        .await
        .unwrap();
    assert_eq!(detail.subtotal, money(1047));
    orders
        .add_item(user.id, order.id, jam.id, Quantity::ONE)
        .await
        .unwrap();

    let order = orders.get(user.id, order.id).await.unwrap();
    assert_eq!(order.total_amount, money(1572));

    let completed = orders.complete(user.id, order.id).await.unwrap();
    assert_eq!(completed.status, OrderStatus::Completed);

    let err = orders
        .add_item(user.id, order.id, jam.id, Quantity::ONE)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::ConflictOrEmpty(_)), "{err}");

    let err = orders.cancel(user.id, order.id).await.unwrap_err();
    assert!(matches!(err, AppError::ConflictOrEmpty(_)), "{err}");
}

#[tokio::test]
async fn test_empty_order_cannot_complete() {
    let ctx = context_or_skip!();
    let user = ctx.user().await.unwrap();

    let orders = OrderService::new(&ctx.pool);
    let order = orders.create_order(user.id).await.unwrap();

    let err = orders.complete(user.id, order.id).await.unwrap_err();
    assert!(matches!(err, AppError::ConflictOrEmpty(_)), "{err}");

    let cancelled = orders.cancel(user.id, order.id).await.unwrap();
    assert_eq!(cancelled.status, OrderStatus::Cancelled);
}

#[tokio::test]
async fn test_orders_are_private() {
    let ctx = context_or_skip!();
    let owner = ctx.user().await.unwrap();
    let other = ctx.user().await.unwrap();
    let category = ctx.category().await.unwrap();
    let product = ctx.product(&category, 100).await.unwrap();

    let orders = OrderService::new(&ctx.pool);
    let order = orders.create_order(owner.id).await.unwrap();

    let err = orders.get(other.id, order.id).await.unwrap_err();
    assert!(matches!(err, AppError::Authorization(_)), "{err}");

    let err = orders
        .add_item(other.id, order.id, product.id, Quantity::ONE)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Authorization(_)), "{err}");

    let err = orders.delete(other.id, order.id).await.unwrap_err();
    assert!(matches!(err, AppError::Authorization(_)), "{err}");

    orders.delete(owner.id, order.id).await.unwrap();
    let err = orders.get(owner.id, order.id).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)), "{err}");
}

#[tokio::test]
async fn test_check_totals_reports_tampering() {
    let ctx = context_or_skip!();
    let user = ctx.user().await.unwrap();
    let category = ctx.category().await.unwrap();
    let product = ctx.product(&category, 200).await.unwrap();

    let orders = OrderService::new(&ctx.pool);
    let order = orders.create_order(user.id).await.unwrap();
    orders
        .add_item(user.id, order.id, product.id, Quantity::new(2).unwrap())
        .await
        .unwrap();

    sqlx::query("UPDATE orders SET total_amount = total_amount + 1 WHERE order_id = $1")
        .bind(order.id)
        .execute(&ctx.pool)
        .await
        .unwrap();

    let mismatches = orders.check_totals().await.unwrap();
    let found = mismatches.iter().find(|m| m.order_id == order.id).unwrap();
    assert_eq!(found.recorded, money(500));
    assert_eq!(found.computed, money(400));

    orders.delete(user.id, order.id).await.unwrap();
}

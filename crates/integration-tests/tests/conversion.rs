//! Shopping list to order conversion against a real database.

#![allow(clippy::unwrap_used)]

use grocer_core::{OrderStatus, Quantity, ShoppingListId};
use grocer_integration_tests::{context_or_skip, money};
use grocer_tracker::AppError;
use grocer_tracker::models::ProductInput;
use grocer_tracker::services::{CatalogService, OrderService, ShoppingService};

fn qty(n: i32) -> Quantity {
    Quantity::new(n).unwrap()
}

#[tokio::test]
async fn test_convert_two_items_totals_eleven() {
    let ctx = context_or_skip!();
    let user = ctx.user().await.unwrap();
    let category = ctx.category().await.unwrap();
    let a = ctx.product(&category, 300).await.unwrap();
    let b = ctx.product(&category, 500).await.unwrap();

    let shopping = ShoppingService::new(&ctx.pool);
    let list = shopping.create_list(user.id, "Weekly").await.unwrap();
    shopping.add_item(user.id, list.id, a.id, qty(2)).await.unwrap();
    shopping.add_item(user.id, list.id, b.id, qty(1)).await.unwrap();

    let outcome = shopping.convert_to_order(user.id, list.id).await.unwrap();
    assert_eq!(outcome.total, money(1100));
    assert_eq!(outcome.line_count, 2);

    let orders = OrderService::new(&ctx.pool);
    let order = orders.get_with_lines(user.id, outcome.order_id).await.unwrap();
    assert_eq!(order.order.status, OrderStatus::Completed);
    assert_eq!(order.order.total_amount, money(1100));
    assert_eq!(order.lines.len(), 2);

    let line_a = order
        .lines
        .iter()
        .find(|l| l.detail.product_id == a.id)
        .unwrap();
    assert_eq!(line_a.detail.quantity, qty(2));
    assert_eq!(line_a.detail.subtotal, money(600));

    let items = shopping.items(user.id, list.id).await.unwrap();
    assert!(items.iter().all(|e| e.item.is_purchased));

    let list = shopping.get_list(user.id, list.id).await.unwrap();
    assert!(!list.is_active);

    let mismatches = orders.check_totals().await.unwrap();
    assert!(mismatches.iter().all(|m| m.order_id != outcome.order_id));
}

#[tokio::test]
async fn test_only_unpurchased_items_are_converted() {
    let ctx = context_or_skip!();
    let user = ctx.user().await.unwrap();
    let category = ctx.category().await.unwrap();
    let bought = ctx.product(&category, 199).await.unwrap();
    let first = ctx.product(&category, 250).await.unwrap();
    let second = ctx.product(&category, 1000).await.unwrap();

    let shopping = ShoppingService::new(&ctx.pool);
    let list = shopping.create_list(user.id, "Partial").await.unwrap();
    let done = shopping
        .add_item(user.id, list.id, bought.id, qty(4))
        .await
        .unwrap();
    shopping.add_item(user.id, list.id, first.id, qty(2)).await.unwrap();
    shopping.add_item(user.id, list.id, second.id, qty(1)).await.unwrap();
    shopping.toggle_item(user.id, done.id).await.unwrap();

    let outcome = shopping.convert_to_order(user.id, list.id).await.unwrap();
    assert_eq!(outcome.line_count, 2);
    assert_eq!(outcome.total, money(1500));

    let lines = OrderService::new(&ctx.pool)
        .details(user.id, outcome.order_id)
        .await
        .unwrap();
    assert!(lines.iter().all(|l| l.detail.product_id != bought.id));
}

#[tokio::test]
async fn test_fully_purchased_list_is_rejected() {
    let ctx = context_or_skip!();
    let user = ctx.user().await.unwrap();
    let category = ctx.category().await.unwrap();
    let product = ctx.product(&category, 100).await.unwrap();

    let shopping = ShoppingService::new(&ctx.pool);
    let list = shopping.create_list(user.id, "Done").await.unwrap();
    let item = shopping
        .add_item(user.id, list.id, product.id, qty(1))
        .await
        .unwrap();
    shopping.toggle_item(user.id, item.id).await.unwrap();

    let err = shopping.convert_to_order(user.id, list.id).await.unwrap_err();
    assert!(matches!(err, AppError::ConflictOrEmpty(_)), "{err}");

    let empty = shopping.create_list(user.id, "Empty").await.unwrap();
    let err = shopping.convert_to_order(user.id, empty.id).await.unwrap_err();
    assert!(matches!(err, AppError::ConflictOrEmpty(_)), "{err}");

    let orders = OrderService::new(&ctx.pool)
        .orders_for_user(user.id)
        .await
        .unwrap();
    assert!(orders.is_empty());
    assert!(shopping.get_list(user.id, list.id).await.unwrap().is_active);
}

#[tokio::test]
async fn test_other_users_list_is_untouched() {
    let ctx = context_or_skip!();
    let owner = ctx.user().await.unwrap();
    let intruder = ctx.user().await.unwrap();
    let category = ctx.category().await.unwrap();
    let product = ctx.product(&category, 450).await.unwrap();

    let shopping = ShoppingService::new(&ctx.pool);
    let list = shopping.create_list(owner.id, "Mine").await.unwrap();
    shopping
        .add_item(owner.id, list.id, product.id, qty(3))
        .await
        .unwrap();

    let err = shopping
        .convert_to_order(intruder.id, list.id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Authorization(_)), "{err}");

    let items = shopping.items(owner.id, list.id).await.unwrap();
    assert!(items.iter().all(|e| !e.item.is_purchased));
    assert!(shopping.get_list(owner.id, list.id).await.unwrap().is_active);

    let orders = OrderService::new(&ctx.pool);
    assert!(orders.orders_for_user(owner.id).await.unwrap().is_empty());
    assert!(orders.orders_for_user(intruder.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_missing_list_is_not_found() {
    let ctx = context_or_skip!();
    let user = ctx.user().await.unwrap();

    let err = ShoppingService::new(&ctx.pool)
        .convert_to_order(user.id, ShoppingListId::new(i32::MAX))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)), "{err}");
}

#[tokio::test]
async fn test_order_keeps_price_paid() {
    let ctx = context_or_skip!();
    let user = ctx.user().await.unwrap();
    let category = ctx.category().await.unwrap();
    let product = ctx.product(&category, 349).await.unwrap();

    let shopping = ShoppingService::new(&ctx.pool);
    let list = shopping.create_list(user.id, "Snapshot").await.unwrap();
    shopping
        .add_item(user.id, list.id, product.id, qty(2))
        .await
        .unwrap();
    let outcome = shopping.convert_to_order(user.id, list.id).await.unwrap();

    CatalogService::new(&ctx.pool)
        .update_product(
            product.id,
            ProductInput {
                name: product.name.clone(),
                category_id: category.id,
                brand: None,
                unit_price: grocer_core::Price::from_cents(999).unwrap(),
                unit_measure: product.unit_measure.clone(),
            },
        )
        .await
        .unwrap();

    let order = OrderService::new(&ctx.pool)
        .get_with_lines(user.id, outcome.order_id)
        .await
        .unwrap();
    assert_eq!(order.order.total_amount, money(698));
    assert_eq!(order.lines.first().unwrap().detail.unit_price.amount(), money(349));
}

#[tokio::test]
async fn test_failed_insert_rolls_back_whole_conversion() {
    let ctx = context_or_skip!();
    let user = ctx.user().await.unwrap();
    let category = ctx.category().await.unwrap();
    let cheap = ctx.product(&category, 150).await.unwrap();
    let luxury = ctx.product(&category, 9_999_999).await.unwrap();

    let shopping = ShoppingService::new(&ctx.pool);
    let list = shopping.create_list(user.id, "Too much").await.unwrap();
    shopping.add_item(user.id, list.id, cheap.id, qty(1)).await.unwrap();
    shopping
        .add_item(user.id, list.id, luxury.id, qty(Quantity::MAX))
        .await
        .unwrap();
    let other = shopping.create_list(user.id, "Other").await.unwrap();
    shopping.add_item(user.id, other.id, cheap.id, qty(2)).await.unwrap();

    // 10000 x 99999.99 does not fit in NUMERIC(10,2).
    let err = shopping.convert_to_order(user.id, list.id).await.unwrap_err();
    assert!(matches!(err, AppError::Repository(_)), "{err}");

    let orders = OrderService::new(&ctx.pool)
        .orders_for_user(user.id)
        .await
        .unwrap();
    assert!(orders.is_empty());

    for id in [list.id, other.id] {
        let items = shopping.items(user.id, id).await.unwrap();
        assert!(items.iter().all(|e| !e.item.is_purchased));
        assert!(shopping.get_list(user.id, id).await.unwrap().is_active);
    }
}

#[tokio::test]
async fn test_conversion_leaves_other_lists_alone() {
    let ctx = context_or_skip!();
    let user = ctx.user().await.unwrap();
    let category = ctx.category().await.unwrap();
    let product = ctx.product(&category, 275).await.unwrap();

    let shopping = ShoppingService::new(&ctx.pool);
    let list = shopping.create_list(user.id, "This week").await.unwrap();
    shopping.add_item(user.id, list.id, product.id, qty(1)).await.unwrap();
    let next = shopping.create_list(user.id, "Next week").await.unwrap();
    shopping.add_item(user.id, next.id, product.id, qty(3)).await.unwrap();

    shopping.convert_to_order(user.id, list.id).await.unwrap();

    let items = shopping.items(user.id, next.id).await.unwrap();
    assert_eq!(items.len(), 1);
    assert!(!items.first().unwrap().item.is_purchased);
    assert_eq!(items.first().unwrap().item.quantity, qty(3));
    assert!(shopping.get_list(user.id, next.id).await.unwrap().is_active);
}

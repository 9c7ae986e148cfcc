//! Spending reports over completed orders.

#![allow(clippy::unwrap_used)]

use grocer_core::{Quantity, sum_amounts};
use grocer_integration_tests::{context_or_skip, money};
use grocer_tracker::AppError;
use grocer_tracker::models::DateRange;
use grocer_tracker::services::{AnalyticsService, OrderService, ShoppingService};

#[tokio::test]
async fn test_only_completed_orders_count() {
    let ctx = context_or_skip!();
    let user = ctx.user().await.unwrap();
    let dairy = ctx.category().await.unwrap();
    let bakery = ctx.category().await.unwrap();
    let milk = ctx.product(&dairy, 300).await.unwrap();
    let bread = ctx.product(&bakery, 500).await.unwrap();

    let shopping = ShoppingService::new(&ctx.pool);
    let list = shopping.create_list(user.id, "Week 1").await.unwrap();
    shopping
        .add_item(user.id, list.id, milk.id, Quantity::new(2).unwrap())
        .await
        .unwrap();
    shopping
        .add_item(user.id, list.id, bread.id, Quantity::ONE)
        .await
        .unwrap();
    shopping.convert_to_order(user.id, list.id).await.unwrap();

    let orders = OrderService::new(&ctx.pool);
    let open = orders.create_order(user.id).await.unwrap();
    orders
        .add_item(user.id, open.id, bread.id, Quantity::new(4).unwrap())
        .await
        .unwrap();
    let cancelled = orders.create_order(user.id).await.unwrap();
    orders
        .add_item(user.id, cancelled.id, milk.id, Quantity::ONE)
        .await
        .unwrap();
    orders.cancel(user.id, cancelled.id).await.unwrap();

    let analytics = AnalyticsService::new(&ctx.pool);

    let totals = analytics.total_spending(user.id).await.unwrap();
    assert_eq!(totals.total_spent, money(1100));
    assert_eq!(totals.order_count, 1);
    assert_eq!(totals.average_order_value(), money(1100));

    let by_category = analytics
        .spending_by_category(user.id, DateRange::all_time())
        .await
        .unwrap();
    assert_eq!(by_category.len(), 2);
    let first = by_category.first().unwrap();
    assert_eq!(first.category_name, dairy.name);
    assert_eq!(first.total_spent, money(600));

    let top = analytics.most_purchased(user.id, 10).await.unwrap();
    assert_eq!(top.first().unwrap().product_id, milk.id);
    assert_eq!(top.first().unwrap().total_quantity, 2);

    let monthly = analytics.monthly_spending(user.id, None).await.unwrap();
    assert_eq!(
        sum_amounts(monthly.iter().map(|m| m.total_spent)),
        money(1100)
    );

    let daily = analytics.daily_spending(user.id, 7).await.unwrap();
    assert_eq!(sum_amounts(daily.iter().map(|d| d.total_spent)), money(1100));
}

#[tokio::test]
async fn test_new_user_has_empty_reports() {
    let ctx = context_or_skip!();
    let user = ctx.user().await.unwrap();
    let analytics = AnalyticsService::new(&ctx.pool);

    let totals = analytics.total_spending(user.id).await.unwrap();
    assert_eq!(totals.order_count, 0);
    assert_eq!(totals.average_order_value(), money(0));
    assert!(analytics.most_purchased(user.id, 5).await.unwrap().is_empty());
    assert!(analytics.suggested_products(user.id, 5).await.unwrap().is_empty());

    let err = analytics.most_purchased(user.id, 0).await.unwrap_err();
    assert!(matches!(err, AppError::Validation(_)), "{err}");
}

#[tokio::test]
async fn test_suggestions_skip_recent_purchases() {
    let ctx = context_or_skip!();
    let user = ctx.user().await.unwrap();
    let category = ctx.category().await.unwrap();
    let bought = ctx.product(&category, 200).await.unwrap();
    let untried = ctx.product(&category, 300).await.unwrap();

    let shopping = ShoppingService::new(&ctx.pool);
    let list = shopping.create_list(user.id, "Once").await.unwrap();
    shopping
        .add_item(user.id, list.id, bought.id, Quantity::ONE)
        .await
        .unwrap();
    shopping.convert_to_order(user.id, list.id).await.unwrap();

    let suggestions = AnalyticsService::new(&ctx.pool)
        .suggested_products(user.id, 10)
        .await
        .unwrap();
    assert_eq!(suggestions.len(), 1);
    assert_eq!(suggestions.first().unwrap().product_id, untried.id);
}

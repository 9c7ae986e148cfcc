//! Shopping list editing and ownership.

#![allow(clippy::unwrap_used)]

use grocer_core::Quantity;
use grocer_integration_tests::context_or_skip;
use grocer_tracker::AppError;
use grocer_tracker::services::ShoppingService;

#[tokio::test]
async fn test_adding_same_product_merges() {
    let ctx = context_or_skip!();
    let user = ctx.user().await.unwrap();
    let category = ctx.category().await.unwrap();
    let product = ctx.product(&category, 150).await.unwrap();

    let shopping = ShoppingService::new(&ctx.pool);
    let list = shopping.create_list(user.id, "Merge").await.unwrap();
    let first = shopping
        .add_item(user.id, list.id, product.id, Quantity::new(2).unwrap())
        .await
        .unwrap();
    let second = shopping
        .add_item(user.id, list.id, product.id, Quantity::new(3).unwrap())
        .await
        .unwrap();

    assert_eq!(first.id, second.id);
    assert_eq!(second.quantity.get(), 5);
    assert_eq!(shopping.items(user.id, list.id).await.unwrap().len(), 1);

    let err = shopping
        .add_item(user.id, list.id, product.id, Quantity::new(Quantity::MAX).unwrap())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)), "{err}");
}

#[tokio::test]
async fn test_list_summary_counts() {
    let ctx = context_or_skip!();
    let user = ctx.user().await.unwrap();
    let category = ctx.category().await.unwrap();
    let a = ctx.product(&category, 100).await.unwrap();
    let b = ctx.product(&category, 200).await.unwrap();

    let shopping = ShoppingService::new(&ctx.pool);
    let list = shopping.create_list(user.id, "Counts").await.unwrap();
    let item = shopping
        .add_item(user.id, list.id, a.id, Quantity::ONE)
        .await
        .unwrap();
    shopping
        .add_item(user.id, list.id, b.id, Quantity::ONE)
        .await
        .unwrap();
    shopping.toggle_item(user.id, item.id).await.unwrap();

    let summaries = shopping.lists_for_user(user.id).await.unwrap();
    assert_eq!(summaries.len(), 1);
    let summary = summaries.first().unwrap();
    assert_eq!(summary.total_items, 2);
    assert_eq!(summary.purchased_items, 1);
    assert_eq!(summary.remaining_items(), 1);
}

#[tokio::test]
async fn test_items_are_private() {
    let ctx = context_or_skip!();
    let owner = ctx.user().await.unwrap();
    let other = ctx.user().await.unwrap();
    let category = ctx.category().await.unwrap();
    let product = ctx.product(&category, 100).await.unwrap();

    let shopping = ShoppingService::new(&ctx.pool);
    let list = shopping.create_list(owner.id, "Private").await.unwrap();
    let item = shopping
        .add_item(owner.id, list.id, product.id, Quantity::ONE)
        .await
        .unwrap();

    let err = shopping.toggle_item(other.id, item.id).await.unwrap_err();
    assert!(matches!(err, AppError::Authorization(_)), "{err}");
    let err = shopping.remove_item(other.id, item.id).await.unwrap_err();
    assert!(matches!(err, AppError::Authorization(_)), "{err}");
    let err = shopping
        .add_item(other.id, list.id, product.id, Quantity::ONE)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Authorization(_)), "{err}");

    shopping.remove_item(owner.id, item.id).await.unwrap();
    assert!(shopping.items(owner.id, list.id).await.unwrap().is_empty());
}

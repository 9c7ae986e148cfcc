//! Home inventory: stock levels, expiry alerts and restocking.

#![allow(clippy::unwrap_used)]

use chrono::{Days, Utc};

use grocer_core::{Quantity, StorageLocation};
use grocer_integration_tests::context_or_skip;
use grocer_tracker::AppError;
use grocer_tracker::models::{InventoryItemInput, InventoryItemUpdate};
use grocer_tracker::services::{InventoryService, ShoppingService};

fn input(product_id: grocer_core::ProductId, quantity: i32, min_quantity: i32) -> InventoryItemInput {
    InventoryItemInput {
        product_id,
        quantity,
        min_quantity,
        expiry_date: None,
        location: StorageLocation::Pantry,
        notes: None,
    }
}

#[tokio::test]
async fn test_stock_levels_follow_consumption() {
    let ctx = context_or_skip!();
    let user = ctx.user().await.unwrap();
    let category = ctx.category().await.unwrap();
    let product = ctx.product(&category, 250).await.unwrap();

    let inventory = InventoryService::new(&ctx.pool);
    let item = inventory
        .add(user.id, input(product.id, 5, 2))
        .await
        .unwrap();
    assert!(inventory.low_stock(user.id).await.unwrap().is_empty());

    let item = inventory
        .consume(user.id, item.id, Quantity::new(3).unwrap())
        .await
        .unwrap();
    assert_eq!(item.quantity, 2);
    let low = inventory.low_stock(user.id).await.unwrap();
    assert_eq!(low.len(), 1);
    assert!(inventory.out_of_stock(user.id).await.unwrap().is_empty());

    let item = inventory
        .consume(user.id, item.id, Quantity::new(10).unwrap())
        .await
        .unwrap();
    assert_eq!(item.quantity, 0);
    assert!(inventory.low_stock(user.id).await.unwrap().is_empty());
    assert_eq!(inventory.out_of_stock(user.id).await.unwrap().len(), 1);

    let summary = inventory.summary(user.id).await.unwrap();
    assert_eq!(summary.total_items, 1);
    assert_eq!(summary.out_of_stock_count, 1);
    assert_eq!(summary.low_stock_count, 0);
}

#[tokio::test]
async fn test_expiry_alerts() {
    let ctx = context_or_skip!();
    let user = ctx.user().await.unwrap();
    let category = ctx.category().await.unwrap();
    let milk = ctx.product(&category, 499).await.unwrap();
    let yogurt = ctx.product(&category, 549).await.unwrap();
    let rice = ctx.product(&category, 299).await.unwrap();
    let today = Utc::now().date_naive();

    let inventory = InventoryService::new(&ctx.pool).with_expiry_warning_days(7);
    inventory
        .add(
            user.id,
            InventoryItemInput {
                expiry_date: today.checked_sub_days(Days::new(2)),
                location: StorageLocation::Refrigerator,
                ..input(milk.id, 1, 0)
            },
        )
        .await
        .unwrap();
    inventory
        .add(
            user.id,
            InventoryItemInput {
                expiry_date: today.checked_add_days(Days::new(3)),
                location: StorageLocation::Refrigerator,
                ..input(yogurt.id, 4, 0)
            },
        )
        .await
        .unwrap();
    inventory
        .add(
            user.id,
            InventoryItemInput {
                expiry_date: today.checked_add_days(Days::new(90)),
                ..input(rice.id, 3, 0)
            },
        )
        .await
        .unwrap();

    let alerts = inventory.alerts(user.id).await.unwrap();
    assert_eq!(alerts.expired.len(), 1);
    assert_eq!(alerts.expired.first().unwrap().entry.item.product_id, milk.id);
    assert_eq!(alerts.expired.first().unwrap().days, 2);
    assert_eq!(alerts.expiring_soon.len(), 1);
    assert_eq!(alerts.expiring_soon.first().unwrap().days, 3);

    let fridge = inventory
        .items_for_user(user.id, Some(StorageLocation::Refrigerator), None)
        .await
        .unwrap();
    assert_eq!(fridge.len(), 2);

    let by_location = inventory.by_location(user.id).await.unwrap();
    let pantry = by_location
        .iter()
        .find(|row| row.location == StorageLocation::Pantry)
        .unwrap();
    assert_eq!(pantry.total_quantity, 3);
}

#[tokio::test]
async fn test_restock_creates_list() {
    let ctx = context_or_skip!();
    let user = ctx.user().await.unwrap();
    let category = ctx.category().await.unwrap();
    let eggs = ctx.product(&category, 599).await.unwrap();
    let flour = ctx.product(&category, 349).await.unwrap();

    let inventory = InventoryService::new(&ctx.pool);
    let err = inventory.restock_low_stock(user.id).await.unwrap_err();
    assert!(matches!(err, AppError::ConflictOrEmpty(_)), "{err}");

    inventory.add(user.id, input(eggs.id, 1, 3)).await.unwrap();
    inventory.add(user.id, input(flour.id, 10, 2)).await.unwrap();

    let outcome = inventory.restock_low_stock(user.id).await.unwrap();
    assert!(outcome.created_list);
    assert_eq!(outcome.items_added, 1);

    let entries = ShoppingService::new(&ctx.pool)
        .items(user.id, outcome.list_id)
        .await
        .unwrap();
    assert_eq!(entries.len(), 1);
    let entry = entries.first().unwrap();
    assert_eq!(entry.item.product_id, eggs.id);
    assert_eq!(entry.item.quantity.get(), 3);

    let again = inventory.restock_low_stock(user.id).await.unwrap();
    assert!(!again.created_list);
    assert_eq!(again.list_id, outcome.list_id);
}

#[tokio::test]
async fn test_restock_never_overfills_a_list_line() {
    let ctx = context_or_skip!();
    let user = ctx.user().await.unwrap();
    let category = ctx.category().await.unwrap();
    let rice = ctx.product(&category, 299).await.unwrap();
    let salt = ctx.product(&category, 89).await.unwrap();

    let shopping = ShoppingService::new(&ctx.pool);
    let list = shopping.create_list(user.id, "Bulk").await.unwrap();
    shopping
        .add_item(user.id, list.id, rice.id, Quantity::new(9995).unwrap())
        .await
        .unwrap();

    let inventory = InventoryService::new(&ctx.pool);
    inventory.add(user.id, input(salt.id, 1, 4)).await.unwrap();
    inventory.add(user.id, input(rice.id, 1, 10)).await.unwrap();

    let err = inventory.restock_low_stock(user.id).await.unwrap_err();
    assert!(matches!(err, AppError::Validation(_)), "{err}");

    let entries = shopping.items(user.id, list.id).await.unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries.first().unwrap().item.quantity.get(), 9995);

    let outcome = shopping.convert_to_order(user.id, list.id).await.unwrap();
    assert_eq!(outcome.line_count, 1);
}

#[tokio::test]
async fn test_schema_rejects_oversized_lines() {
    let ctx = context_or_skip!();
    let user = ctx.user().await.unwrap();
    let category = ctx.category().await.unwrap();
    let product = ctx.product(&category, 100).await.unwrap();

    let list = ShoppingService::new(&ctx.pool)
        .create_list(user.id, "Raw")
        .await
        .unwrap();
    let result = sqlx::query(
        "INSERT INTO shopping_list_items (list_id, product_id, quantity) VALUES ($1, $2, 10001)",
    )
    .bind(list.id)
    .bind(product.id)
    .execute(&ctx.pool)
    .await;
    assert!(result.is_err());
}

#[tokio::test]
async fn test_validation_and_ownership() {
    let ctx = context_or_skip!();
    let owner = ctx.user().await.unwrap();
    let other = ctx.user().await.unwrap();
    let category = ctx.category().await.unwrap();
    let product = ctx.product(&category, 100).await.unwrap();

    let inventory = InventoryService::new(&ctx.pool);
    let err = inventory
        .add(owner.id, input(product.id, -1, 2))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)), "{err}");

    let item = inventory
        .add(owner.id, input(product.id, 2, 1))
        .await
        .unwrap();

    let err = inventory.get(other.id, item.id).await.unwrap_err();
    assert!(matches!(err, AppError::Authorization(_)), "{err}");

    let update = InventoryItemUpdate {
        quantity: 7,
        notes: Some("top shelf".to_owned()),
        ..InventoryItemUpdate::from_item(&item)
    };
    let err = inventory
        .update(other.id, item.id, update.clone())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Authorization(_)), "{err}");

    let updated = inventory.update(owner.id, item.id, update).await.unwrap();
    assert_eq!(updated.quantity, 7);
    assert_eq!(updated.notes.as_deref(), Some("top shelf"));

    inventory.delete(owner.id, item.id).await.unwrap();
    let err = inventory.get(owner.id, item.id).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)), "{err}");
}

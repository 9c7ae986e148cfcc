//! Shopping list to order conversion.
//!
//! The arithmetic lives in [`plan_conversion`], a pure function over the
//! list's unpurchased items. [`convert_list_to_order`] wraps it in a single
//! transaction: the list row and the source items are locked, the order and
//! its details are written, the items are marked purchased and the list is
//! deactivated. Any error drops the transaction and nothing is kept.

use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::PgPool;
use tracing::{error, info};

use grocer_core::{
    OrderId, OrderStatus, Price, ProductId, Quantity, ShoppingListId, ShoppingListItemId, UserId,
    sum_amounts,
};

use super::ensure_owner;
use crate::db::{RepositoryError, orders, shopping_lists};
use crate::error::{AppError, Result};
use crate::models::PendingPurchase;

/// One order detail to be written for one list item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlannedLine {
    pub item_id: ShoppingListItemId,
    pub product_id: ProductId,
    pub quantity: Quantity,
    pub unit_price: Price,
    pub subtotal: Decimal,
}

/// Everything a conversion will write, computed before touching the order
/// tables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionPlan {
    pub lines: Vec<PlannedLine>,
    pub total: Decimal,
}

impl ConversionPlan {
    /// The list items this plan consumes.
    #[must_use]
    pub fn item_ids(&self) -> Vec<ShoppingListItemId> {
        self.lines.iter().map(|line| line.item_id).collect()
    }
}

/// Result of a successful conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ConversionOutcome {
    pub order_id: OrderId,
    pub total: Decimal,
    pub line_count: usize,
}

/// Price every pending item and total the order.
///
/// # Errors
///
/// Returns `AppError::ConflictOrEmpty` if there is nothing left to buy.
pub fn plan_conversion(pending: &[PendingPurchase]) -> Result<ConversionPlan> {
    if pending.is_empty() {
        return Err(AppError::ConflictOrEmpty(
            "shopping list has no unpurchased items".to_owned(),
        ));
    }

    let lines: Vec<PlannedLine> = pending
        .iter()
        .map(|p| PlannedLine {
            item_id: p.item_id,
            product_id: p.product_id,
            quantity: p.quantity,
            unit_price: p.unit_price,
            subtotal: p.unit_price.subtotal(p.quantity),
        })
        .collect();
    let total = sum_amounts(lines.iter().map(|line| line.subtotal));

    Ok(ConversionPlan { lines, total })
}

/// Turn the unpurchased items of a list into a completed order.
///
/// # Errors
///
/// Returns `AppError::NotFound` if the list doesn't exist.
/// Returns `AppError::Authorization` if `user_id` doesn't own the list.
/// Returns `AppError::ConflictOrEmpty` if every item is already purchased.
/// Returns `AppError::Repository` if any statement fails; nothing is written.
pub async fn convert_list_to_order(
    pool: &PgPool,
    user_id: UserId,
    list_id: ShoppingListId,
) -> Result<ConversionOutcome> {
    let mut tx = pool.begin().await?;

    let list = shopping_lists::lock_list(&mut *tx, list_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("shopping list {list_id}")))?;
    ensure_owner(list.user_id, user_id, "shopping list")?;

    let pending = shopping_lists::lock_pending_items(&mut *tx, list_id).await?;
    let plan = plan_conversion(&pending)?;

    let order = orders::insert_order(&mut *tx, user_id).await?;
    for line in &plan.lines {
        orders::insert_detail(
            &mut *tx,
            order.id,
            line.product_id,
            line.quantity,
            line.unit_price,
        )
        .await?;
    }

    let stored_total = orders::refresh_total(&mut *tx, order.id).await?;
    if stored_total != plan.total {
        error!(
            order_id = %order.id,
            planned = %plan.total,
            stored = %stored_total,
            "Order total disagrees with planned total"
        );
        return Err(AppError::Repository(RepositoryError::DataCorruption(format!(
            "order {} total {stored_total} does not match planned {}",
            order.id, plan.total
        ))));
    }

    orders::set_status(&mut *tx, order.id, OrderStatus::Completed).await?;

    let item_ids = plan.item_ids();
    let marked = shopping_lists::mark_purchased(&mut *tx, &item_ids).await?;
    if usize::try_from(marked).ok() != Some(item_ids.len()) {
        return Err(AppError::Repository(RepositoryError::DataCorruption(format!(
            "marked {marked} of {} list items purchased",
            item_ids.len()
        ))));
    }

    shopping_lists::deactivate(&mut *tx, list_id).await?;

    tx.commit().await?;

    info!(
        user_id = %user_id,
        list_id = %list_id,
        order_id = %order.id,
        total = %plan.total,
        lines = plan.lines.len(),
        "Shopping list converted to order"
    );

    Ok(ConversionOutcome {
        order_id: order.id,
        total: plan.total,
        line_count: plan.lines.len(),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn pending(item: i32, product: i32, quantity: i32, cents: i64) -> PendingPurchase {
        PendingPurchase {
            item_id: ShoppingListItemId::new(item),
            product_id: ProductId::new(product),
            quantity: Quantity::new(quantity).unwrap(),
            unit_price: Price::from_cents(cents).unwrap(),
        }
    }

    #[test]
    fn test_plan_two_items() {
        let plan = plan_conversion(&[pending(1, 10, 2, 300), pending(2, 11, 1, 500)]).unwrap();

        assert_eq!(plan.lines.len(), 2);
        assert_eq!(plan.total, Decimal::new(1100, 2));
        assert_eq!(plan.total.to_string(), "11.00");
        assert_eq!(plan.lines[0].subtotal, Decimal::new(600, 2));
        assert_eq!(plan.lines[1].subtotal, Decimal::new(500, 2));
        assert_eq!(
            plan.item_ids(),
            vec![ShoppingListItemId::new(1), ShoppingListItemId::new(2)]
        );
    }

    #[test]
    fn test_plan_empty_list_is_conflict() {
        let err = plan_conversion(&[]).unwrap_err();
        assert!(matches!(err, AppError::ConflictOrEmpty(_)));
    }

    #[test]
    fn test_plan_total_is_exact() {
        // 3 × 0.10 + 7 × 0.20 must be exactly 1.70, not a float approximation.
        let plan = plan_conversion(&[pending(1, 1, 3, 10), pending(2, 2, 7, 20)]).unwrap();
        assert_eq!(plan.total, Decimal::new(170, 2));
    }

    #[test]
    fn test_plan_total_equals_sum_of_subtotals() {
        let items: Vec<_> = (1..=20)
            .map(|i| pending(i, i, i, i64::from(i) * 37 + 1))
            .collect();
        let plan = plan_conversion(&items).unwrap();

        let summed: Decimal = plan.lines.iter().map(|l| l.subtotal).sum();
        assert_eq!(plan.total, summed);
        assert_eq!(plan.lines.len(), items.len());
    }

    #[test]
    fn test_plan_keeps_free_items() {
        let plan = plan_conversion(&[pending(1, 1, 4, 0)]).unwrap();
        assert_eq!(plan.total, Decimal::ZERO);
        assert_eq!(plan.lines.len(), 1);
    }
}

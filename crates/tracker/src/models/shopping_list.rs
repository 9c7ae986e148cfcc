//! Shopping list domain types.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use grocer_core::{Price, ProductId, Quantity, ShoppingListId, ShoppingListItemId, UserId};

/// A named, user-owned collection of products to buy.
#[derive(Debug, Clone, Serialize)]
pub struct ShoppingList {
    pub id: ShoppingListId,
    pub user_id: UserId,
    pub name: String,
    pub created_at: DateTime<Utc>,
    /// Cleared once the list has been converted into an order.
    pub is_active: bool,
}

/// A list with item counts, as shown in a user's overview.
#[derive(Debug, Clone, Serialize)]
pub struct ShoppingListSummary {
    pub list: ShoppingList,
    pub total_items: i64,
    pub purchased_items: i64,
}

impl ShoppingListSummary {
    /// Items not yet purchased.
    #[must_use]
    pub const fn remaining_items(&self) -> i64 {
        self.total_items - self.purchased_items
    }
}

/// One product line on a shopping list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShoppingListItem {
    pub id: ShoppingListItemId,
    pub list_id: ShoppingListId,
    pub product_id: ProductId,
    pub quantity: Quantity,
    pub is_purchased: bool,
}

/// A shopping list item joined with product details.
#[derive(Debug, Clone, Serialize)]
pub struct ShoppingListEntry {
    pub item: ShoppingListItem,
    pub product_name: String,
    pub brand: Option<String>,
    pub unit_price: Price,
    pub unit_measure: String,
    pub category_name: String,
}

impl ShoppingListEntry {
    /// Estimated cost of this line at the current price.
    #[must_use]
    pub fn estimated_cost(&self) -> Decimal {
        self.unit_price.subtotal(self.item.quantity)
    }
}

/// An unpurchased item as seen by the list-to-order conversion, priced at
/// the product's current price.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingPurchase {
    pub item_id: ShoppingListItemId,
    pub product_id: ProductId,
    pub quantity: Quantity,
    pub unit_price: Price,
}

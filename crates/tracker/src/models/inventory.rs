//! Household inventory domain models.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use grocer_core::{InventoryItemId, Price, ProductId, ShoppingListId, StorageLocation, UserId};

/// A product the user already has at home.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InventoryItem {
    pub id: InventoryItemId,
    pub user_id: UserId,
    pub product_id: ProductId,
    /// Units on hand. Never negative.
    pub quantity: i32,
    /// Low-stock threshold.
    pub min_quantity: i32,
    pub expiry_date: Option<NaiveDate>,
    pub location: StorageLocation,
    pub notes: Option<String>,
    pub added_at: DateTime<Utc>,
}

impl InventoryItem {
    /// Some left, but at or below the threshold.
    #[must_use]
    pub const fn is_low_stock(&self) -> bool {
        self.quantity > 0 && self.quantity <= self.min_quantity
    }

    /// Nothing left.
    #[must_use]
    pub const fn is_out_of_stock(&self) -> bool {
        self.quantity == 0
    }

    /// Units to buy to get back above the threshold.
    #[must_use]
    pub const fn restock_quantity(&self) -> i32 {
        let shortfall = self.min_quantity - self.quantity + 1;
        if shortfall < 1 { 1 } else { shortfall }
    }

    /// Days until expiry relative to `today`; negative once expired.
    #[must_use]
    pub fn days_until_expiry(&self, today: NaiveDate) -> Option<i64> {
        self.expiry_date
            .map(|expiry| expiry.signed_duration_since(today).num_days())
    }
}

/// An inventory item joined with product details.
#[derive(Debug, Clone, Serialize)]
pub struct InventoryEntry {
    pub item: InventoryItem,
    pub product_name: String,
    pub brand: Option<String>,
    pub unit_measure: String,
    pub unit_price: Price,
    pub category_name: String,
}

/// Input for adding or editing an inventory item.
#[derive(Debug, Clone, Deserialize)]
pub struct InventoryItemInput {
    pub product_id: ProductId,
    pub quantity: i32,
    #[serde(default = "default_min_quantity")]
    pub min_quantity: i32,
    #[serde(default)]
    pub expiry_date: Option<NaiveDate>,
    #[serde(default)]
    pub location: StorageLocation,
    #[serde(default)]
    pub notes: Option<String>,
}

/// New values for an existing inventory item. The product never changes.
#[derive(Debug, Clone, Deserialize)]
pub struct InventoryItemUpdate {
    pub quantity: i32,
    pub min_quantity: i32,
    #[serde(default)]
    pub expiry_date: Option<NaiveDate>,
    pub location: StorageLocation,
    #[serde(default)]
    pub notes: Option<String>,
}

impl InventoryItemUpdate {
    /// Start from an item's current values.
    #[must_use]
    pub fn from_item(item: &InventoryItem) -> Self {
        Self {
            quantity: item.quantity,
            min_quantity: item.min_quantity,
            expiry_date: item.expiry_date,
            location: item.location,
            notes: item.notes.clone(),
        }
    }
}

pub(crate) const fn default_min_quantity() -> i32 {
    2
}

/// An item that has expired or is about to.
#[derive(Debug, Clone, Serialize)]
pub struct ExpiryAlert {
    pub entry: InventoryEntry,
    /// Days left (expiring) or days past expiry (expired); never negative.
    pub days: i64,
}

/// All inventory alerts for a user.
#[derive(Debug, Clone, Default, Serialize)]
pub struct InventoryAlerts {
    pub expired: Vec<ExpiryAlert>,
    pub expiring_soon: Vec<ExpiryAlert>,
    pub low_stock: Vec<InventoryEntry>,
    pub out_of_stock: Vec<InventoryEntry>,
}

impl InventoryAlerts {
    /// Nothing needs attention.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.expired.is_empty()
            && self.expiring_soon.is_empty()
            && self.low_stock.is_empty()
            && self.out_of_stock.is_empty()
    }
}

/// What `restock_low_stock` did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RestockOutcome {
    pub list_id: ShoppingListId,
    /// A new "Restock List" was created because the user had no active list.
    pub created_list: bool,
    pub items_added: usize,
}

/// Counts for the inventory dashboard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct InventorySummary {
    pub total_items: i64,
    pub total_quantity: i64,
    pub expiring_soon_count: i64,
    pub expired_count: i64,
    pub low_stock_count: i64,
    pub out_of_stock_count: i64,
}

/// Stock grouped by storage location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LocationStock {
    pub location: StorageLocation,
    pub item_count: i64,
    pub total_quantity: i64,
}

/// Stock grouped by product category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryStock {
    pub category_name: String,
    pub item_count: i64,
    pub total_quantity: i64,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn item(quantity: i32, min_quantity: i32, expiry_date: Option<NaiveDate>) -> InventoryItem {
        InventoryItem {
            id: InventoryItemId::new(1),
            user_id: UserId::new(1),
            product_id: ProductId::new(1),
            quantity,
            min_quantity,
            expiry_date,
            location: StorageLocation::Pantry,
            notes: None,
            added_at: Utc::now(),
        }
    }

    #[test]
    fn test_stock_levels() {
        assert!(item(0, 2, None).is_out_of_stock());
        assert!(!item(0, 2, None).is_low_stock());
        assert!(item(2, 2, None).is_low_stock());
        assert!(item(1, 2, None).is_low_stock());
        assert!(!item(3, 2, None).is_low_stock());
    }

    #[test]
    fn test_restock_quantity() {
        assert_eq!(item(1, 2, None).restock_quantity(), 2);
        assert_eq!(item(2, 2, None).restock_quantity(), 1);
        assert_eq!(item(0, 4, None).restock_quantity(), 5);
        assert_eq!(item(10, 2, None).restock_quantity(), 1);
    }

    #[test]
    fn test_days_until_expiry() {
        let today = NaiveDate::from_ymd_opt(2026, 3, 10).unwrap();
        let soon = NaiveDate::from_ymd_opt(2026, 3, 13).unwrap();
        let past = NaiveDate::from_ymd_opt(2026, 3, 8).unwrap();
        assert_eq!(item(1, 2, Some(soon)).days_until_expiry(today), Some(3));
        assert_eq!(item(1, 2, Some(past)).days_until_expiry(today), Some(-2));
        assert_eq!(item(1, 2, None).days_until_expiry(today), None);
    }
}

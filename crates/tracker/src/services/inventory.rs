//! Household inventory: stock levels, expiry alerts and restocking.

use chrono::{Days, NaiveDate, Utc};
use sqlx::PgPool;
use tracing::info;

use grocer_core::{InventoryItemId, Quantity, StorageLocation, UserId};

use super::shopping::merged_quantity;
use super::{ensure_owner, not_found_as};
use crate::db::{InventoryRepository, ProductRepository, ShoppingListRepository};
use crate::error::{AppError, Result};
use crate::models::{
    CategoryStock, ExpiryAlert, InventoryAlerts, InventoryEntry, InventoryItem,
    InventoryItemInput, InventoryItemUpdate, InventorySummary, LocationStock, RestockOutcome,
};

/// Name of the list created when restocking finds no active list.
pub const RESTOCK_LIST_NAME: &str = "Restock List";

/// Default look-ahead for "expiring soon".
pub const DEFAULT_EXPIRY_WARNING_DAYS: u32 = 7;

/// Inventory service.
pub struct InventoryService<'a> {
    inventory: InventoryRepository<'a>,
    products: ProductRepository<'a>,
    lists: ShoppingListRepository<'a>,
    expiry_warning_days: u32,
}

impl<'a> InventoryService<'a> {
    /// Create a new inventory service with the default expiry warning window.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            inventory: InventoryRepository::new(pool),
            products: ProductRepository::new(pool),
            lists: ShoppingListRepository::new(pool),
            expiry_warning_days: DEFAULT_EXPIRY_WARNING_DAYS,
        }
    }

    /// Override how many days ahead counts as "expiring soon".
    #[must_use]
    pub const fn with_expiry_warning_days(mut self, days: u32) -> Self {
        self.expiry_warning_days = days;
        self
    }

    /// Record a product at home.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Validation` for negative quantities.
    /// Returns `AppError::NotFound` if the product doesn't exist.
    pub async fn add(&self, user_id: UserId, input: InventoryItemInput) -> Result<InventoryItem> {
        validate_levels(input.quantity, input.min_quantity)?;
        if self.products.get(input.product_id).await?.is_none() {
            return Err(AppError::NotFound(format!("product {}", input.product_id)));
        }
        let input = InventoryItemInput {
            notes: clean_notes(input.notes),
            ..input
        };

        let item = self.inventory.add(user_id, &input).await?;
        info!(
            user_id = %user_id,
            inventory_id = %item.id,
            product_id = %item.product_id,
            quantity = item.quantity,
            location = %item.location,
            "Inventory item added"
        );
        Ok(item)
    }

    /// The user's inventory, optionally limited to one location and to
    /// products whose name contains `search` (case-insensitive).
    ///
    /// # Errors
    ///
    /// Returns `AppError::Repository` if the query fails.
    pub async fn items_for_user(
        &self,
        user_id: UserId,
        location: Option<StorageLocation>,
        search: Option<&str>,
    ) -> Result<Vec<InventoryEntry>> {
        let entries = self.inventory.items_for_user(user_id, location).await?;
        Ok(match search.map(str::trim).filter(|s| !s.is_empty()) {
            Some(term) => filter_by_name(entries, term),
            None => entries,
        })
    }

    /// One of the user's items.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` if the item doesn't exist.
    /// Returns `AppError::Authorization` if it belongs to someone else.
    pub async fn get(&self, user_id: UserId, id: InventoryItemId) -> Result<InventoryItem> {
        let item = self
            .inventory
            .get(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("inventory item {id}")))?;
        ensure_owner(item.user_id, user_id, "inventory item")?;
        Ok(item)
    }

    /// Overwrite quantity, threshold, expiry, location and notes.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Validation` for negative quantities.
    /// Returns `AppError::NotFound` if the item doesn't exist.
    /// Returns `AppError::Authorization` if it belongs to someone else.
    pub async fn update(
        &self,
        user_id: UserId,
        id: InventoryItemId,
        update: InventoryItemUpdate,
    ) -> Result<InventoryItem> {
        validate_levels(update.quantity, update.min_quantity)?;
        self.get(user_id, id).await?;
        let update = InventoryItemUpdate {
            notes: clean_notes(update.notes),
            ..update
        };

        let item = self
            .inventory
            .update(id, &update)
            .await
            .map_err(|e| not_found_as(e, format!("inventory item {id}")))?;
        info!(user_id = %user_id, inventory_id = %id, quantity = item.quantity, "Inventory item updated");
        Ok(item)
    }

    /// Use up some units. The quantity stops at zero.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` if the item doesn't exist.
    /// Returns `AppError::Authorization` if it belongs to someone else.
    pub async fn consume(
        &self,
        user_id: UserId,
        id: InventoryItemId,
        amount: Quantity,
    ) -> Result<InventoryItem> {
        self.get(user_id, id).await?;
        let item = self
            .inventory
            .consume(id, amount.get())
            .await
            .map_err(|e| not_found_as(e, format!("inventory item {id}")))?;
        info!(
            user_id = %user_id,
            inventory_id = %id,
            used = amount.get(),
            remaining = item.quantity,
            "Inventory item used"
        );
        Ok(item)
    }

    /// Remove an item from the inventory.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` if the item doesn't exist.
    /// Returns `AppError::Authorization` if it belongs to someone else.
    pub async fn delete(&self, user_id: UserId, id: InventoryItemId) -> Result<()> {
        self.get(user_id, id).await?;
        if !self.inventory.delete(id).await? {
            return Err(AppError::NotFound(format!("inventory item {id}")));
        }
        info!(user_id = %user_id, inventory_id = %id, "Inventory item deleted");
        Ok(())
    }

    /// Items with a little stock left (at or below their threshold).
    ///
    /// # Errors
    ///
    /// Returns `AppError::Repository` if the query fails.
    pub async fn low_stock(&self, user_id: UserId) -> Result<Vec<InventoryEntry>> {
        Ok(self.inventory.low_stock(user_id).await?)
    }

    /// Items with nothing left.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Repository` if the query fails.
    pub async fn out_of_stock(&self, user_id: UserId) -> Result<Vec<InventoryEntry>> {
        Ok(self.inventory.out_of_stock(user_id).await?)
    }

    /// Items past their expiry date, with how many days ago they expired.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Repository` if the query fails.
    pub async fn expired(&self, user_id: UserId) -> Result<Vec<ExpiryAlert>> {
        let today = today();
        let entries = self.inventory.expired(user_id, today).await?;
        Ok(to_alerts(entries, today))
    }

    /// Items expiring within `days` days (today included), with days left.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Repository` if the query fails.
    pub async fn expiring_within(&self, user_id: UserId, days: u32) -> Result<Vec<ExpiryAlert>> {
        let today = today();
        let entries = self
            .inventory
            .expiring_between(user_id, today, horizon(today, days))
            .await?;
        Ok(to_alerts(entries, today))
    }

    /// Everything needing attention, using the configured warning window.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Repository` if a query fails.
    pub async fn alerts(&self, user_id: UserId) -> Result<InventoryAlerts> {
        Ok(InventoryAlerts {
            expired: self.expired(user_id).await?,
            expiring_soon: self
                .expiring_within(user_id, self.expiry_warning_days)
                .await?,
            low_stock: self.low_stock(user_id).await?,
            out_of_stock: self.out_of_stock(user_id).await?,
        })
    }

    /// Dashboard counts, using the configured warning window.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Repository` if the query fails.
    pub async fn summary(&self, user_id: UserId) -> Result<InventorySummary> {
        let today = today();
        Ok(self
            .inventory
            .summary(user_id, today, horizon(today, self.expiry_warning_days))
            .await?)
    }

    /// Stock per storage location.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Repository` if the query fails.
    pub async fn by_location(&self, user_id: UserId) -> Result<Vec<LocationStock>> {
        Ok(self.inventory.by_location(user_id).await?)
    }

    /// Stock per product category.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Repository` if the query fails.
    pub async fn by_category(&self, user_id: UserId) -> Result<Vec<CategoryStock>> {
        Ok(self.inventory.by_category(user_id).await?)
    }

    /// Put every low-stock product on the user's newest active list, enough
    /// to get back above its threshold. Creates a "Restock List" when the
    /// user has no active list.
    ///
    /// # Errors
    ///
    /// Returns `AppError::ConflictOrEmpty` if nothing is low on stock.
    /// Returns `AppError::Validation` if a merged list line would exceed the
    /// maximum quantity; nothing is added in that case.
    /// Returns `AppError::Repository` if a query fails.
    pub async fn restock_low_stock(&self, user_id: UserId) -> Result<RestockOutcome> {
        let low = self.inventory.low_stock(user_id).await?;
        if low.is_empty() {
            return Err(AppError::ConflictOrEmpty(
                "no low-stock items to restock".to_owned(),
            ));
        }

        let (list, created_list) = match self.lists.newest_active_for_user(user_id).await? {
            Some(list) => (list, false),
            None => (self.lists.create(user_id, RESTOCK_LIST_NAME).await?, true),
        };

        // Check every merge before writing so one oversized line adds nothing.
        let mut additions = Vec::with_capacity(low.len());
        for entry in &low {
            let quantity = Quantity::new(entry.item.restock_quantity()).map_err(|e| {
                AppError::Validation(format!(
                    "restock quantity for {}: {e}",
                    entry.product_name
                ))
            })?;
            let existing = self.lists.find_item(list.id, entry.item.product_id).await?;
            merged_quantity(existing.as_ref(), quantity).map_err(|e| {
                AppError::Validation(format!("cannot restock {}: {e}", entry.product_name))
            })?;
            additions.push((entry.item.product_id, quantity));
        }

        for (product_id, quantity) in additions {
            self.lists.add_item(list.id, product_id, quantity).await?;
        }

        info!(
            user_id = %user_id,
            list_id = %list.id,
            created_list,
            items = low.len(),
            "Low-stock items added to shopping list"
        );

        Ok(RestockOutcome {
            list_id: list.id,
            created_list,
            items_added: low.len(),
        })
    }
}

fn today() -> NaiveDate {
    Utc::now().date_naive()
}

/// Last day of a `days`-day window starting today.
fn horizon(today: NaiveDate, days: u32) -> NaiveDate {
    today
        .checked_add_days(Days::new(u64::from(days)))
        .unwrap_or(NaiveDate::MAX)
}

fn validate_levels(quantity: i32, min_quantity: i32) -> Result<()> {
    if quantity < 0 {
        return Err(AppError::Validation("quantity must not be negative".to_owned()));
    }
    if min_quantity < 0 {
        return Err(AppError::Validation(
            "minimum quantity must not be negative".to_owned(),
        ));
    }
    Ok(())
}

fn clean_notes(notes: Option<String>) -> Option<String> {
    notes
        .map(|n| n.trim().to_owned())
        .filter(|n| !n.is_empty())
}

fn filter_by_name(entries: Vec<InventoryEntry>, term: &str) -> Vec<InventoryEntry> {
    let term = term.to_lowercase();
    entries
        .into_iter()
        .filter(|e| e.product_name.to_lowercase().contains(&term))
        .collect()
}

/// Attach day counts; `days` is never negative.
fn to_alerts(entries: Vec<InventoryEntry>, today: NaiveDate) -> Vec<ExpiryAlert> {
    entries
        .into_iter()
        .map(|entry| {
            let days = entry
                .item
                .days_until_expiry(today)
                .map_or(0, i64::abs);
            ExpiryAlert { entry, days }
        })
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {

    use grocer_core::{Price, ProductId};

    use super::*;

    fn entry(name: &str, expiry: Option<NaiveDate>) -> InventoryEntry {
        InventoryEntry {
            item: InventoryItem {
                id: InventoryItemId::new(1),
                user_id: UserId::new(1),
                product_id: ProductId::new(1),
                quantity: 3,
                min_quantity: 2,
                expiry_date: expiry,
                location: StorageLocation::Refrigerator,
                notes: None,
                added_at: Utc::now(),
            },
            product_name: name.to_owned(),
            brand: None,
            unit_measure: "unit".to_owned(),
            unit_price: Price::from_cents(199).unwrap(),
            category_name: "Dairy".to_owned(),
        }
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 5, d).unwrap()
    }

    #[test]
    fn test_horizon() {
        assert_eq!(horizon(day(1), 7), day(8));
        assert_eq!(horizon(day(1), 0), day(1));
        assert_eq!(horizon(NaiveDate::MAX, 1), NaiveDate::MAX);
    }

    #[test]
    fn test_alert_days_are_non_negative() {
        let alerts = to_alerts(
            vec![entry("Milk", Some(day(3))), entry("Yogurt", Some(day(12)))],
            day(10),
        );
        assert_eq!(alerts[0].days, 7);
        assert_eq!(alerts[1].days, 2);
    }

    #[test]
    fn test_validate_levels() {
        assert!(validate_levels(0, 0).is_ok());
        assert!(validate_levels(-1, 2).is_err());
        assert!(validate_levels(1, -2).is_err());
    }

    #[test]
    fn test_filter_by_name_is_case_insensitive() {
        let entries = vec![entry("Whole Milk", None), entry("Cheddar", None)];
        let found = filter_by_name(entries, "MILK");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].product_name, "Whole Milk");
    }

    #[test]
    fn test_clean_notes() {
        assert_eq!(clean_notes(Some("  ".to_owned())), None);
        assert_eq!(clean_notes(Some(" top shelf ".to_owned())), Some("top shelf".to_owned()));
        assert_eq!(clean_notes(None), None);
    }
}

//! Shopping lists and their items.
//!
//! Every operation takes the acting user and checks that the list belongs to
//! them before reading or writing.

use sqlx::PgPool;
use tracing::info;

use grocer_core::{ProductId, Quantity, ShoppingListId, ShoppingListItemId, UserId};

use super::conversion::{ConversionOutcome, convert_list_to_order};
use super::ensure_owner;
use crate::db::{ProductRepository, ShoppingListRepository};
use crate::error::{AppError, Result};
use crate::models::{ShoppingList, ShoppingListEntry, ShoppingListItem, ShoppingListSummary};

const MAX_LIST_NAME: usize = 100;

/// Shopping list service.
pub struct ShoppingService<'a> {
    pool: &'a PgPool,
    lists: ShoppingListRepository<'a>,
    products: ProductRepository<'a>,
}

impl<'a> ShoppingService<'a> {
    /// Create a new shopping list service.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            pool,
            lists: ShoppingListRepository::new(pool),
            products: ProductRepository::new(pool),
        }
    }

    /// Create an empty list.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Validation` for a blank or over-long name.
    pub async fn create_list(&self, user_id: UserId, name: &str) -> Result<ShoppingList> {
        let name = name.trim();
        if name.is_empty() {
            return Err(AppError::Validation("list name must not be empty".to_owned()));
        }
        if name.chars().count() > MAX_LIST_NAME {
            return Err(AppError::Validation(format!(
                "list name must be at most {MAX_LIST_NAME} characters"
            )));
        }

        let list = self.lists.create(user_id, name).await?;
        info!(user_id = %user_id, list_id = %list.id, name = %list.name, "Shopping list created");
        Ok(list)
    }

    /// The user's lists with item counts, newest first.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Repository` if the query fails.
    pub async fn lists_for_user(&self, user_id: UserId) -> Result<Vec<ShoppingListSummary>> {
        Ok(self.lists.lists_for_user(user_id).await?)
    }

    /// Get one of the user's lists.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` if the list doesn't exist.
    /// Returns `AppError::Authorization` if it belongs to someone else.
    pub async fn get_list(&self, user_id: UserId, list_id: ShoppingListId) -> Result<ShoppingList> {
        let list = self
            .lists
            .get(list_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("shopping list {list_id}")))?;
        ensure_owner(list.user_id, user_id, "shopping list")?;
        Ok(list)
    }

    /// Items on a list with product details.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` if the list doesn't exist.
    /// Returns `AppError::Authorization` if it belongs to someone else.
    pub async fn items(
        &self,
        user_id: UserId,
        list_id: ShoppingListId,
    ) -> Result<Vec<ShoppingListEntry>> {
        self.get_list(user_id, list_id).await?;
        Ok(self.lists.items(list_id).await?)
    }

    /// Add a product to a list, merging into the existing line if the
    /// product is already there.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` if the list or product doesn't exist.
    /// Returns `AppError::Authorization` if the list belongs to someone else.
    /// Returns `AppError::Validation` if the merged quantity is too large.
    pub async fn add_item(
        &self,
        user_id: UserId,
        list_id: ShoppingListId,
        product_id: ProductId,
        quantity: Quantity,
    ) -> Result<ShoppingListItem> {
        self.get_list(user_id, list_id).await?;
        if self.products.get(product_id).await?.is_none() {
            return Err(AppError::NotFound(format!("product {product_id}")));
        }

        let existing = self.lists.find_item(list_id, product_id).await?;
        merged_quantity(existing.as_ref(), quantity)?;

        let item = self.lists.add_item(list_id, product_id, quantity).await?;
        info!(
            user_id = %user_id,
            list_id = %list_id,
            product_id = %product_id,
            quantity = %item.quantity,
            "Item added to shopping list"
        );
        Ok(item)
    }

    /// Replace an item's quantity.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` if the item doesn't exist.
    /// Returns `AppError::Authorization` if its list belongs to someone else.
    pub async fn set_item_quantity(
        &self,
        user_id: UserId,
        item_id: ShoppingListItemId,
        quantity: Quantity,
    ) -> Result<ShoppingListItem> {
        self.owned_item(user_id, item_id).await?;
        Ok(self.lists.set_item_quantity(item_id, quantity).await?)
    }

    /// Remove an item from its list.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` if the item doesn't exist.
    /// Returns `AppError::Authorization` if its list belongs to someone else.
    pub async fn remove_item(&self, user_id: UserId, item_id: ShoppingListItemId) -> Result<()> {
        self.owned_item(user_id, item_id).await?;
        if !self.lists.remove_item(item_id).await? {
            return Err(AppError::NotFound(format!("shopping list item {item_id}")));
        }
        info!(user_id = %user_id, item_id = %item_id, "Item removed from shopping list");
        Ok(())
    }

    /// Flip an item between purchased and not purchased.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` if the item doesn't exist.
    /// Returns `AppError::Authorization` if its list belongs to someone else.
    pub async fn toggle_item(
        &self,
        user_id: UserId,
        item_id: ShoppingListItemId,
    ) -> Result<ShoppingListItem> {
        self.owned_item(user_id, item_id).await?;
        Ok(self.lists.toggle_item(item_id).await?)
    }

    /// Delete a list and its items.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` if the list doesn't exist.
    /// Returns `AppError::Authorization` if it belongs to someone else.
    pub async fn delete_list(&self, user_id: UserId, list_id: ShoppingListId) -> Result<()> {
        self.get_list(user_id, list_id).await?;
        if !self.lists.delete(list_id).await? {
            return Err(AppError::NotFound(format!("shopping list {list_id}")));
        }
        info!(user_id = %user_id, list_id = %list_id, "Shopping list deleted");
        Ok(())
    }

    /// Buy everything still unpurchased on a list as one completed order.
    ///
    /// # Errors
    ///
    /// See [`convert_list_to_order`].
    pub async fn convert_to_order(
        &self,
        user_id: UserId,
        list_id: ShoppingListId,
    ) -> Result<ConversionOutcome> {
        convert_list_to_order(self.pool, user_id, list_id).await
    }

    async fn owned_item(
        &self,
        user_id: UserId,
        item_id: ShoppingListItemId,
    ) -> Result<ShoppingListItem> {
        let item = self
            .lists
            .get_item(item_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("shopping list item {item_id}")))?;
        self.get_list(user_id, item.list_id).await?;
        Ok(item)
    }
}

/// Quantity of a list line after adding `adding` units to it.
///
/// Lines are merged by product, so this is checked before every insert.
pub(crate) fn merged_quantity(
    existing: Option<&ShoppingListItem>,
    adding: Quantity,
) -> Result<Quantity> {
    let Some(existing) = existing else {
        return Ok(adding);
    };
    let merged = existing.quantity.get().saturating_add(adding.get());
    Quantity::new(merged).map_err(|e| {
        AppError::Validation(format!("quantity after merging would be {merged}: {e}"))
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn line(quantity: i32) -> ShoppingListItem {
        ShoppingListItem {
            id: ShoppingListItemId::new(1),
            list_id: ShoppingListId::new(1),
            product_id: ProductId::new(1),
            quantity: Quantity::new(quantity).unwrap(),
            is_purchased: false,
        }
    }

    #[test]
    fn test_merged_quantity_adds_to_existing_line() {
        let three = Quantity::new(3).unwrap();
        assert_eq!(merged_quantity(None, three).unwrap(), three);
        assert_eq!(merged_quantity(Some(&line(2)), three).unwrap().get(), 5);
        assert_eq!(
            merged_quantity(Some(&line(Quantity::MAX - 3)), three)
                .unwrap()
                .get(),
            Quantity::MAX
        );
    }

    #[test]
    fn test_merged_quantity_rejects_overflowing_line() {
        let err = merged_quantity(Some(&line(9995)), Quantity::new(10).unwrap()).unwrap_err();
        assert!(matches!(err, AppError::Validation(msg) if msg.contains("10005")));
    }
}

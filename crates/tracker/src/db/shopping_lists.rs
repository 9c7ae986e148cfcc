//! Shopping list repository for database operations.
//!
//! Besides the pool-backed repository, this module exposes a few
//! connection-level functions used inside the list-to-order transaction.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{PgConnection, PgPool};

use grocer_core::{Price, ProductId, Quantity, ShoppingListId, ShoppingListItemId, UserId};

use super::RepositoryError;
use crate::models::{
    PendingPurchase, ShoppingList, ShoppingListEntry, ShoppingListItem, ShoppingListSummary,
};

// =============================================================================
// Internal Row Types
// =============================================================================

#[derive(Debug, sqlx::FromRow)]
struct ShoppingListRow {
    list_id: i32,
    user_id: i32,
    list_name: String,
    created_at: DateTime<Utc>,
    is_active: bool,
}

impl From<ShoppingListRow> for ShoppingList {
    fn from(row: ShoppingListRow) -> Self {
        Self {
            id: ShoppingListId::new(row.list_id),
            user_id: UserId::new(row.user_id),
            name: row.list_name,
            created_at: row.created_at,
            is_active: row.is_active,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct ShoppingListSummaryRow {
    #[sqlx(flatten)]
    list: ShoppingListRow,
    total_items: i64,
    purchased_items: i64,
}

#[derive(Debug, sqlx::FromRow)]
struct ItemRow {
    item_id: i32,
    list_id: i32,
    product_id: i32,
    quantity: i32,
    is_purchased: bool,
}

impl TryFrom<ItemRow> for ShoppingListItem {
    type Error = RepositoryError;

    fn try_from(row: ItemRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: ShoppingListItemId::new(row.item_id),
            list_id: ShoppingListId::new(row.list_id),
            product_id: ProductId::new(row.product_id),
            quantity: Quantity::new(row.quantity)
                .map_err(|e| RepositoryError::corrupt("list item quantity", e))?,
            is_purchased: row.is_purchased,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct EntryRow {
    #[sqlx(flatten)]
    item: ItemRow,
    product_name: String,
    brand: Option<String>,
    unit_price: Decimal,
    unit_measure: String,
    category_name: String,
}

impl TryFrom<EntryRow> for ShoppingListEntry {
    type Error = RepositoryError;

    fn try_from(row: EntryRow) -> Result<Self, Self::Error> {
        Ok(Self {
            item: row.item.try_into()?,
            product_name: row.product_name,
            brand: row.brand,
            unit_price: Price::new(row.unit_price)
                .map_err(|e| RepositoryError::corrupt("unit price", e))?,
            unit_measure: row.unit_measure,
            category_name: row.category_name,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct PendingRow {
    item_id: i32,
    product_id: i32,
    quantity: i32,
    unit_price: Decimal,
}

impl TryFrom<PendingRow> for PendingPurchase {
    type Error = RepositoryError;

    fn try_from(row: PendingRow) -> Result<Self, Self::Error> {
        Ok(Self {
            item_id: ShoppingListItemId::new(row.item_id),
            product_id: ProductId::new(row.product_id),
            quantity: Quantity::new(row.quantity)
                .map_err(|e| RepositoryError::corrupt("list item quantity", e))?,
            unit_price: Price::new(row.unit_price)
                .map_err(|e| RepositoryError::corrupt("unit price", e))?,
        })
    }
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for shopping lists and their items.
pub struct ShoppingListRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ShoppingListRepository<'a> {
    /// Create a new shopping list repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Create an empty, active list.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the user doesn't exist.
    pub async fn create(
        &self,
        user_id: UserId,
        name: &str,
    ) -> Result<ShoppingList, RepositoryError> {
        let row = sqlx::query_as::<_, ShoppingListRow>(
            r"
            INSERT INTO shopping_lists (user_id, list_name)
            VALUES ($1, $2)
            RETURNING list_id, user_id, list_name, created_at, is_active
            ",
        )
        .bind(user_id)
        .bind(name)
        .fetch_one(self.pool)
        .await
        .map_err(|e| RepositoryError::from_write(e, "user does not exist"))?;

        Ok(row.into())
    }

    /// Get a list by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: ShoppingListId) -> Result<Option<ShoppingList>, RepositoryError> {
        let row = sqlx::query_as::<_, ShoppingListRow>(
            r"
            SELECT list_id, user_id, list_name, created_at, is_active
            FROM shopping_lists
            WHERE list_id = $1
            ",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    /// A user's lists with item counts, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn lists_for_user(
        &self,
        user_id: UserId,
    ) -> Result<Vec<ShoppingListSummary>, RepositoryError> {
        let rows = sqlx::query_as::<_, ShoppingListSummaryRow>(
            r"
            SELECT sl.list_id, sl.user_id, sl.list_name, sl.created_at, sl.is_active,
                   COUNT(sli.item_id) AS total_items,
                   COUNT(sli.item_id) FILTER (WHERE sli.is_purchased) AS purchased_items
            FROM shopping_lists sl
            LEFT JOIN shopping_list_items sli ON sli.list_id = sl.list_id
            WHERE sl.user_id = $1
            GROUP BY sl.list_id
            ORDER BY sl.created_at DESC, sl.list_id DESC
            ",
        )
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| ShoppingListSummary {
                list: row.list.into(),
                total_items: row.total_items,
                purchased_items: row.purchased_items,
            })
            .collect())
    }

    /// The user's most recently created active list, if any.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn newest_active_for_user(
        &self,
        user_id: UserId,
    ) -> Result<Option<ShoppingList>, RepositoryError> {
        let row = sqlx::query_as::<_, ShoppingListRow>(
            r"
            SELECT list_id, user_id, list_name, created_at, is_active
            FROM shopping_lists
            WHERE user_id = $1 AND is_active
            ORDER BY created_at DESC, list_id DESC
            LIMIT 1
            ",
        )
        .bind(user_id)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    /// Items on a list joined with product details, by category then name.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn items(
        &self,
        list_id: ShoppingListId,
    ) -> Result<Vec<ShoppingListEntry>, RepositoryError> {
        let rows = sqlx::query_as::<_, EntryRow>(
            r"
            SELECT sli.item_id, sli.list_id, sli.product_id, sli.quantity, sli.is_purchased,
                   p.product_name, p.brand, p.unit_price, p.unit_measure, c.category_name
            FROM shopping_list_items sli
            JOIN products p ON p.product_id = sli.product_id
            JOIN categories c ON c.category_id = p.category_id
            WHERE sli.list_id = $1
            ORDER BY c.category_name, p.product_name
            ",
        )
        .bind(list_id)
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    /// Get a single item by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_item(
        &self,
        item_id: ShoppingListItemId,
    ) -> Result<Option<ShoppingListItem>, RepositoryError> {
        let row = sqlx::query_as::<_, ItemRow>(
            r"
            SELECT item_id, list_id, product_id, quantity, is_purchased
            FROM shopping_list_items
            WHERE item_id = $1
            ",
        )
        .bind(item_id)
        .fetch_optional(self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    /// Get the item for a product on a list, if present.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn find_item(
        &self,
        list_id: ShoppingListId,
        product_id: ProductId,
    ) -> Result<Option<ShoppingListItem>, RepositoryError> {
        let row = sqlx::query_as::<_, ItemRow>(
            r"
            SELECT item_id, list_id, product_id, quantity, is_purchased
            FROM shopping_list_items
            WHERE list_id = $1 AND product_id = $2
            ",
        )
        .bind(list_id)
        .bind(product_id)
        .fetch_optional(self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    /// Add a product to a list, incrementing the quantity when it is already
    /// there.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the list or product doesn't exist.
    pub async fn add_item(
        &self,
        list_id: ShoppingListId,
        product_id: ProductId,
        quantity: Quantity,
    ) -> Result<ShoppingListItem, RepositoryError> {
        let row = sqlx::query_as::<_, ItemRow>(
            r"
            INSERT INTO shopping_list_items (list_id, product_id, quantity)
            VALUES ($1, $2, $3)
            ON CONFLICT (list_id, product_id)
            DO UPDATE SET quantity = shopping_list_items.quantity + EXCLUDED.quantity
            RETURNING item_id, list_id, product_id, quantity, is_purchased
            ",
        )
        .bind(list_id)
        .bind(product_id)
        .bind(quantity.get())
        .fetch_one(self.pool)
        .await
        .map_err(|e| RepositoryError::from_write(e, "list or product does not exist"))?;

        row.try_into()
    }

    /// Replace an item's quantity.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the item doesn't exist.
    pub async fn set_item_quantity(
        &self,
        item_id: ShoppingListItemId,
        quantity: Quantity,
    ) -> Result<ShoppingListItem, RepositoryError> {
        let row = sqlx::query_as::<_, ItemRow>(
            r"
            UPDATE shopping_list_items
            SET quantity = $2
            WHERE item_id = $1
            RETURNING item_id, list_id, product_id, quantity, is_purchased
            ",
        )
        .bind(item_id)
        .bind(quantity.get())
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        row.try_into()
    }

    /// Flip an item's purchased flag.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the item doesn't exist.
    pub async fn toggle_item(
        &self,
        item_id: ShoppingListItemId,
    ) -> Result<ShoppingListItem, RepositoryError> {
        let row = sqlx::query_as::<_, ItemRow>(
            r"
            UPDATE shopping_list_items
            SET is_purchased = NOT is_purchased
            WHERE item_id = $1
            RETURNING item_id, list_id, product_id, quantity, is_purchased
            ",
        )
        .bind(item_id)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        row.try_into()
    }

    /// Remove an item from its list.
    ///
    /// Returns `true` if a row was deleted.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn remove_item(&self, item_id: ShoppingListItemId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM shopping_list_items WHERE item_id = $1")
            .bind(item_id)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Delete a list and, by cascade, its items.
    ///
    /// Returns `true` if a row was deleted.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn delete(&self, id: ShoppingListId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM shopping_lists WHERE list_id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

// =============================================================================
// Transaction helpers
// =============================================================================

/// Fetch a list and lock its row until the transaction ends.
pub(crate) async fn lock_list(
    conn: &mut PgConnection,
    id: ShoppingListId,
) -> Result<Option<ShoppingList>, RepositoryError> {
    let row = sqlx::query_as::<_, ShoppingListRow>(
        r"
        SELECT list_id, user_id, list_name, created_at, is_active
        FROM shopping_lists
        WHERE list_id = $1
        FOR UPDATE
        ",
    )
    .bind(id)
    .fetch_optional(&mut *conn)
    .await?;

    Ok(row.map(Into::into))
}

/// Lock a list's unpurchased items and price them at current product prices.
pub(crate) async fn lock_pending_items(
    conn: &mut PgConnection,
    list_id: ShoppingListId,
) -> Result<Vec<PendingPurchase>, RepositoryError> {
    let rows = sqlx::query_as::<_, PendingRow>(
        r"
        SELECT sli.item_id, sli.product_id, sli.quantity, p.unit_price
        FROM shopping_list_items sli
        JOIN products p ON p.product_id = sli.product_id
        WHERE sli.list_id = $1 AND NOT sli.is_purchased
        ORDER BY sli.item_id
        FOR UPDATE OF sli
        ",
    )
    .bind(list_id)
    .fetch_all(&mut *conn)
    .await?;

    rows.into_iter().map(TryInto::try_into).collect()
}

/// Mark the given items purchased. Returns the number of rows updated.
pub(crate) async fn mark_purchased(
    conn: &mut PgConnection,
    item_ids: &[ShoppingListItemId],
) -> Result<u64, RepositoryError> {
    let result = sqlx::query(
        r"
        UPDATE shopping_list_items
        SET is_purchased = TRUE
        WHERE item_id = ANY($1)
        ",
    )
    .bind(item_ids)
    .execute(&mut *conn)
    .await?;

    Ok(result.rows_affected())
}

/// Mark a list inactive.
pub(crate) async fn deactivate(
    conn: &mut PgConnection,
    id: ShoppingListId,
) -> Result<(), RepositoryError> {
    sqlx::query("UPDATE shopping_lists SET is_active = FALSE WHERE list_id = $1")
        .bind(id)
        .execute(&mut *conn)
        .await?;

    Ok(())
}

//! Inventory repository for database operations.
//!
//! Date-dependent queries take `today` from the caller so that alerts and
//! day counts agree with each other within one request.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use grocer_core::{InventoryItemId, Price, ProductId, StorageLocation, UserId};

use super::RepositoryError;
use crate::models::{
    CategoryStock, InventoryEntry, InventoryItem, InventoryItemInput, InventoryItemUpdate,
    InventorySummary, LocationStock,
};

// =============================================================================
// Internal Row Types
// =============================================================================

#[derive(Debug, sqlx::FromRow)]
struct InventoryRow {
    inventory_id: i32,
    user_id: i32,
    product_id: i32,
    quantity: i32,
    min_quantity: i32,
    expiry_date: Option<NaiveDate>,
    location: StorageLocation,
    notes: Option<String>,
    added_at: DateTime<Utc>,
}

impl From<InventoryRow> for InventoryItem {
    fn from(row: InventoryRow) -> Self {
        Self {
            id: InventoryItemId::new(row.inventory_id),
            user_id: UserId::new(row.user_id),
            product_id: ProductId::new(row.product_id),
            quantity: row.quantity,
            min_quantity: row.min_quantity,
            expiry_date: row.expiry_date,
            location: row.location,
            notes: row.notes,
            added_at: row.added_at,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct EntryRow {
    #[sqlx(flatten)]
    item: InventoryRow,
    product_name: String,
    brand: Option<String>,
    unit_measure: String,
    unit_price: Decimal,
    category_name: String,
}

impl TryFrom<EntryRow> for InventoryEntry {
    type Error = RepositoryError;

    fn try_from(row: EntryRow) -> Result<Self, Self::Error> {
        Ok(Self {
            item: row.item.into(),
            product_name: row.product_name,
            brand: row.brand,
            unit_measure: row.unit_measure,
            unit_price: Price::new(row.unit_price)
                .map_err(|e| RepositoryError::corrupt("unit price", e))?,
            category_name: row.category_name,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct SummaryRow {
    total_items: i64,
    total_quantity: i64,
    expiring_soon_count: i64,
    expired_count: i64,
    low_stock_count: i64,
    out_of_stock_count: i64,
}

#[derive(Debug, sqlx::FromRow)]
struct LocationRow {
    location: StorageLocation,
    item_count: i64,
    total_quantity: i64,
}

#[derive(Debug, sqlx::FromRow)]
struct CategoryRow {
    category_name: String,
    item_count: i64,
    total_quantity: i64,
}

const ITEM_COLUMNS: &str = "inventory_id, user_id, product_id, quantity, min_quantity, \
                            expiry_date, location, notes, added_at";

const SELECT_ENTRY: &str = r"
    SELECT i.inventory_id, i.user_id, i.product_id, i.quantity, i.min_quantity,
           i.expiry_date, i.location, i.notes, i.added_at,
           p.product_name, p.brand, p.unit_measure, p.unit_price, c.category_name
    FROM inventory i
    JOIN products p ON p.product_id = i.product_id
    JOIN categories c ON c.category_id = p.category_id
";

// =============================================================================
// Repository
// =============================================================================

/// Repository for household inventory.
pub struct InventoryRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> InventoryRepository<'a> {
    /// Create a new inventory repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Record a product the user has at home.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the user or product doesn't exist.
    pub async fn add(
        &self,
        user_id: UserId,
        input: &InventoryItemInput,
    ) -> Result<InventoryItem, RepositoryError> {
        let sql = format!(
            "INSERT INTO inventory (user_id, product_id, quantity, min_quantity, expiry_date, \
             location, notes) VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING {ITEM_COLUMNS}"
        );
        let row = sqlx::query_as::<_, InventoryRow>(&sql)
            .bind(user_id)
            .bind(input.product_id)
            .bind(input.quantity)
            .bind(input.min_quantity)
            .bind(input.expiry_date)
            .bind(input.location)
            .bind(input.notes.as_deref())
            .fetch_one(self.pool)
            .await
            .map_err(|e| RepositoryError::from_write(e, "user or product does not exist"))?;

        Ok(row.into())
    }

    /// Get an item by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: InventoryItemId) -> Result<Option<InventoryItem>, RepositoryError> {
        let sql = format!("SELECT {ITEM_COLUMNS} FROM inventory WHERE inventory_id = $1");
        let row = sqlx::query_as::<_, InventoryRow>(&sql)
            .bind(id)
            .fetch_optional(self.pool)
            .await?;

        Ok(row.map(Into::into))
    }

    /// A user's inventory joined with product details, optionally limited to
    /// one storage location.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn items_for_user(
        &self,
        user_id: UserId,
        location: Option<StorageLocation>,
    ) -> Result<Vec<InventoryEntry>, RepositoryError> {
        let sql = format!(
            "{SELECT_ENTRY} WHERE i.user_id = $1 \
             AND ($2::storage_location IS NULL OR i.location = $2) \
             ORDER BY i.location, p.product_name"
        );
        let rows = sqlx::query_as::<_, EntryRow>(&sql)
            .bind(user_id)
            .bind(location)
            .fetch_all(self.pool)
            .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    /// Items with some stock left, at or below their threshold.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn low_stock(&self, user_id: UserId) -> Result<Vec<InventoryEntry>, RepositoryError> {
        let sql = format!(
            "{SELECT_ENTRY} WHERE i.user_id = $1 \
             AND i.quantity > 0 AND i.quantity <= i.min_quantity \
             ORDER BY i.quantity, p.product_name"
        );
        let rows = sqlx::query_as::<_, EntryRow>(&sql)
            .bind(user_id)
            .fetch_all(self.pool)
            .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    /// Items with nothing left.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn out_of_stock(
        &self,
        user_id: UserId,
    ) -> Result<Vec<InventoryEntry>, RepositoryError> {
        let sql = format!(
            "{SELECT_ENTRY} WHERE i.user_id = $1 AND i.quantity = 0 ORDER BY p.product_name"
        );
        let rows = sqlx::query_as::<_, EntryRow>(&sql)
            .bind(user_id)
            .fetch_all(self.pool)
            .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    /// In-stock items whose expiry date is before `today`, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn expired(
        &self,
        user_id: UserId,
        today: NaiveDate,
    ) -> Result<Vec<InventoryEntry>, RepositoryError> {
        let sql = format!(
            "{SELECT_ENTRY} WHERE i.user_id = $1 \
             AND i.quantity > 0 AND i.expiry_date < $2 \
             ORDER BY i.expiry_date, p.product_name"
        );
        let rows = sqlx::query_as::<_, EntryRow>(&sql)
            .bind(user_id)
            .bind(today)
            .fetch_all(self.pool)
            .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    /// In-stock items expiring between `today` and `until`, both inclusive.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn expiring_between(
        &self,
        user_id: UserId,
        today: NaiveDate,
        until: NaiveDate,
    ) -> Result<Vec<InventoryEntry>, RepositoryError> {
        let sql = format!(
            "{SELECT_ENTRY} WHERE i.user_id = $1 \
             AND i.quantity > 0 AND i.expiry_date BETWEEN $2 AND $3 \
             ORDER BY i.expiry_date, p.product_name"
        );
        let rows = sqlx::query_as::<_, EntryRow>(&sql)
            .bind(user_id)
            .bind(today)
            .bind(until)
            .fetch_all(self.pool)
            .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    /// Overwrite an item's mutable fields.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the item doesn't exist.
    pub async fn update(
        &self,
        id: InventoryItemId,
        update: &InventoryItemUpdate,
    ) -> Result<InventoryItem, RepositoryError> {
        let sql = format!(
            "UPDATE inventory SET quantity = $2, min_quantity = $3, expiry_date = $4, \
             location = $5, notes = $6 WHERE inventory_id = $1 RETURNING {ITEM_COLUMNS}"
        );
        let row = sqlx::query_as::<_, InventoryRow>(&sql)
            .bind(id)
            .bind(update.quantity)
            .bind(update.min_quantity)
            .bind(update.expiry_date)
            .bind(update.location)
            .bind(update.notes.as_deref())
            .fetch_optional(self.pool)
            .await?
            .ok_or(RepositoryError::NotFound)?;

        Ok(row.into())
    }

    /// Use up `amount` units; the quantity never drops below zero.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the item doesn't exist.
    pub async fn consume(
        &self,
        id: InventoryItemId,
        amount: i32,
    ) -> Result<InventoryItem, RepositoryError> {
        let sql = format!(
            "UPDATE inventory SET quantity = GREATEST(quantity - $2, 0) \
             WHERE inventory_id = $1 RETURNING {ITEM_COLUMNS}"
        );
        let row = sqlx::query_as::<_, InventoryRow>(&sql)
            .bind(id)
            .bind(amount)
            .fetch_optional(self.pool)
            .await?
            .ok_or(RepositoryError::NotFound)?;

        Ok(row.into())
    }

    /// Delete an item.
    ///
    /// Returns `true` if a row was deleted.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn delete(&self, id: InventoryItemId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM inventory WHERE inventory_id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Dashboard counts. "Expiring soon" means `today <= expiry <= until`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn summary(
        &self,
        user_id: UserId,
        today: NaiveDate,
        until: NaiveDate,
    ) -> Result<InventorySummary, RepositoryError> {
        let row = sqlx::query_as::<_, SummaryRow>(
            r"
            SELECT COUNT(*) AS total_items,
                   COALESCE(SUM(quantity), 0)::BIGINT AS total_quantity,
                   COUNT(*) FILTER (
                       WHERE quantity > 0 AND expiry_date BETWEEN $2 AND $3
                   ) AS expiring_soon_count,
                   COUNT(*) FILTER (
                       WHERE quantity > 0 AND expiry_date < $2
                   ) AS expired_count,
                   COUNT(*) FILTER (
                       WHERE quantity > 0 AND quantity <= min_quantity
                   ) AS low_stock_count,
                   COUNT(*) FILTER (WHERE quantity = 0) AS out_of_stock_count
            FROM inventory
            WHERE user_id = $1
            ",
        )
        .bind(user_id)
        .bind(today)
        .bind(until)
        .fetch_one(self.pool)
        .await?;

        Ok(InventorySummary {
            total_items: row.total_items,
            total_quantity: row.total_quantity,
            expiring_soon_count: row.expiring_soon_count,
            expired_count: row.expired_count,
            low_stock_count: row.low_stock_count,
            out_of_stock_count: row.out_of_stock_count,
        })
    }

    /// Item and unit counts per storage location.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn by_location(&self, user_id: UserId) -> Result<Vec<LocationStock>, RepositoryError> {
        let rows = sqlx::query_as::<_, LocationRow>(
            r"
            SELECT location,
                   COUNT(*) AS item_count,
                   COALESCE(SUM(quantity), 0)::BIGINT AS total_quantity
            FROM inventory
            WHERE user_id = $1
            GROUP BY location
            ORDER BY location
            ",
        )
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| LocationStock {
                location: row.location,
                item_count: row.item_count,
                total_quantity: row.total_quantity,
            })
            .collect())
    }

    /// Item and unit counts per product category, largest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn by_category(&self, user_id: UserId) -> Result<Vec<CategoryStock>, RepositoryError> {
        let rows = sqlx::query_as::<_, CategoryRow>(
            r"
            SELECT c.category_name,
                   COUNT(*) AS item_count,
                   COALESCE(SUM(i.quantity), 0)::BIGINT AS total_quantity
            FROM inventory i
            JOIN products p ON p.product_id = i.product_id
            JOIN categories c ON c.category_id = p.category_id
            WHERE i.user_id = $1
            GROUP BY c.category_name
            ORDER BY total_quantity DESC, c.category_name
            ",
        )
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| CategoryStock {
                category_name: row.category_name,
                item_count: row.item_count,
                total_quantity: row.total_quantity,
            })
            .collect())
    }
}

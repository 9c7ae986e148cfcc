//! Product repository for database operations.
//!
//! Every read joins the category so callers never need a second lookup.

use rust_decimal::Decimal;
use sqlx::{PgConnection, PgPool};

use grocer_core::{CategoryId, Price, ProductId};

use super::RepositoryError;
use crate::models::{Product, ProductInput};

#[derive(Debug, sqlx::FromRow)]
struct ProductRow {
    product_id: i32,
    product_name: String,
    category_id: i32,
    category_name: String,
    brand: Option<String>,
    unit_price: Decimal,
    unit_measure: String,
}

impl TryFrom<ProductRow> for Product {
    type Error = RepositoryError;

    fn try_from(row: ProductRow) -> Result<Self, Self::Error> {
        let unit_price =
            Price::new(row.unit_price).map_err(|e| RepositoryError::corrupt("unit price", e))?;

        Ok(Self {
            id: ProductId::new(row.product_id),
            name: row.product_name,
            category_id: CategoryId::new(row.category_id),
            category_name: row.category_name,
            brand: row.brand,
            unit_price,
            unit_measure: row.unit_measure,
        })
    }
}

const SELECT_PRODUCT: &str = r"
    SELECT p.product_id, p.product_name, p.category_id, c.category_name,
           p.brand, p.unit_price, p.unit_measure
    FROM products p
    JOIN categories c ON c.category_id = p.category_id
";

/// Repository for product database operations.
pub struct ProductRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProductRepository<'a> {
    /// Create a new product repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Create a product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the category doesn't exist.
    pub async fn create(&self, input: &ProductInput) -> Result<Product, RepositoryError> {
        let id: i32 = sqlx::query_scalar(
            r"
            INSERT INTO products (product_name, category_id, brand, unit_price, unit_measure)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING product_id
            ",
        )
        .bind(&input.name)
        .bind(input.category_id)
        .bind(input.brand.as_deref())
        .bind(input.unit_price.amount())
        .bind(&input.unit_measure)
        .fetch_one(self.pool)
        .await
        .map_err(|e| RepositoryError::from_write(e, "category does not exist"))?;

        self.get(ProductId::new(id))
            .await?
            .ok_or(RepositoryError::NotFound)
    }

    /// List all products, ordered by category then name.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_all(&self) -> Result<Vec<Product>, RepositoryError> {
        let sql = format!("{SELECT_PRODUCT} ORDER BY c.category_name, p.product_name");
        let rows = sqlx::query_as::<_, ProductRow>(&sql)
            .fetch_all(self.pool)
            .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    /// List the products in one category, ordered by name.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_by_category(
        &self,
        category_id: CategoryId,
    ) -> Result<Vec<Product>, RepositoryError> {
        let sql = format!("{SELECT_PRODUCT} WHERE p.category_id = $1 ORDER BY p.product_name");
        let rows = sqlx::query_as::<_, ProductRow>(&sql)
            .bind(category_id)
            .fetch_all(self.pool)
            .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    /// Case-insensitive substring search on product name or brand.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn search(&self, term: &str) -> Result<Vec<Product>, RepositoryError> {
        let pattern = format!("%{}%", escape_like(term));
        let sql = format!(
            "{SELECT_PRODUCT} WHERE p.product_name ILIKE $1 OR p.brand ILIKE $1 \
             ORDER BY c.category_name, p.product_name"
        );
        let rows = sqlx::query_as::<_, ProductRow>(&sql)
            .bind(pattern)
            .fetch_all(self.pool)
            .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    /// Get a product by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let sql = format!("{SELECT_PRODUCT} WHERE p.product_id = $1");
        let row = sqlx::query_as::<_, ProductRow>(&sql)
            .bind(id)
            .fetch_optional(self.pool)
            .await?;

        row.map(TryInto::try_into).transpose()
    }

    /// Update every field of a product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product doesn't exist.
    /// Returns `RepositoryError::Conflict` if the category doesn't exist.
    pub async fn update(
        &self,
        id: ProductId,
        input: &ProductInput,
    ) -> Result<Product, RepositoryError> {
        let result = sqlx::query(
            r"
            UPDATE products
            SET product_name = $2, category_id = $3, brand = $4,
                unit_price = $5, unit_measure = $6
            WHERE product_id = $1
            ",
        )
        .bind(id)
        .bind(&input.name)
        .bind(input.category_id)
        .bind(input.brand.as_deref())
        .bind(input.unit_price.amount())
        .bind(&input.unit_measure)
        .execute(self.pool)
        .await
        .map_err(|e| RepositoryError::from_write(e, "category does not exist"))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        self.get(id).await?.ok_or(RepositoryError::NotFound)
    }

    /// Delete a product.
    ///
    /// Returns `true` if a row was deleted.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if lists, orders or inventory
    /// still reference it.
    pub async fn delete(&self, id: ProductId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM products WHERE product_id = $1")
            .bind(id)
            .execute(self.pool)
            .await
            .map_err(|e| RepositoryError::from_write(e, "product is still referenced"))?;

        Ok(result.rows_affected() > 0)
    }
}

/// Current shelf price of a product, read inside an open transaction.
pub(crate) async fn current_price(
    conn: &mut PgConnection,
    id: ProductId,
) -> Result<Option<Price>, RepositoryError> {
    let price: Option<Decimal> =
        sqlx::query_scalar("SELECT unit_price FROM products WHERE product_id = $1")
            .bind(id)
            .fetch_optional(&mut *conn)
            .await?;

    price
        .map(|p| Price::new(p).map_err(|e| RepositoryError::corrupt("unit price", e)))
        .transpose()
}

/// Escape `%`, `_` and `\` so user input matches literally inside `ILIKE`.
fn escape_like(term: &str) -> String {
    let mut out = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like("milk"), "milk");
        assert_eq!(escape_like("50%_off"), "50\\%\\_off");
        assert_eq!(escape_like("a\\b"), "a\\\\b");
    }
}

//! Order repository for database operations.
//!
//! Writes that touch both `orders` and `order_details` go through the
//! connection-level functions at the bottom of this module so they can share
//! a transaction. The stored `total_amount` is always recomputed from the
//! details by `refresh_total`, never incremented.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{PgConnection, PgPool};

use grocer_core::{OrderDetailId, OrderId, OrderStatus, Price, ProductId, Quantity, UserId};

use super::RepositoryError;
use crate::models::{Order, OrderDetail, OrderLine, TotalMismatch};

// =============================================================================
// Internal Row Types
// =============================================================================

#[derive(Debug, sqlx::FromRow)]
struct OrderRow {
    order_id: i32,
    user_id: i32,
    order_date: DateTime<Utc>,
    total_amount: Decimal,
    status: OrderStatus,
}

impl From<OrderRow> for Order {
    fn from(row: OrderRow) -> Self {
        Self {
            id: OrderId::new(row.order_id),
            user_id: UserId::new(row.user_id),
            order_date: row.order_date,
            total_amount: row.total_amount,
            status: row.status,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct DetailRow {
    detail_id: i32,
    order_id: i32,
    product_id: i32,
    quantity: i32,
    unit_price: Decimal,
    subtotal: Decimal,
}

impl TryFrom<DetailRow> for OrderDetail {
    type Error = RepositoryError;

    fn try_from(row: DetailRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: OrderDetailId::new(row.detail_id),
            order_id: OrderId::new(row.order_id),
            product_id: ProductId::new(row.product_id),
            quantity: Quantity::new(row.quantity)
                .map_err(|e| RepositoryError::corrupt("order detail quantity", e))?,
            unit_price: Price::new(row.unit_price)
                .map_err(|e| RepositoryError::corrupt("order detail price", e))?,
            subtotal: row.subtotal,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct LineRow {
    #[sqlx(flatten)]
    detail: DetailRow,
    product_name: String,
    brand: Option<String>,
    category_name: String,
}

#[derive(Debug, sqlx::FromRow)]
struct MismatchRow {
    order_id: i32,
    recorded: Decimal,
    computed: Decimal,
}

const ORDER_COLUMNS: &str = "order_id, user_id, order_date, total_amount, status";

// =============================================================================
// Repository
// =============================================================================

/// Repository for orders and their details.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Create an empty open order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the user doesn't exist.
    pub async fn create(&self, user_id: UserId) -> Result<Order, RepositoryError> {
        let mut conn = self.pool.acquire().await?;
        insert_order(&mut *conn, user_id).await
    }

    /// Get an order by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: OrderId) -> Result<Option<Order>, RepositoryError> {
        let sql = format!("SELECT {ORDER_COLUMNS} FROM orders WHERE order_id = $1");
        let row = sqlx::query_as::<_, OrderRow>(&sql)
            .bind(id)
            .fetch_optional(self.pool)
            .await?;

        Ok(row.map(Into::into))
    }

    /// A user's orders, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn orders_for_user(&self, user_id: UserId) -> Result<Vec<Order>, RepositoryError> {
        let sql = format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE user_id = $1 \
             ORDER BY order_date DESC, order_id DESC"
        );
        let rows = sqlx::query_as::<_, OrderRow>(&sql)
            .bind(user_id)
            .fetch_all(self.pool)
            .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// An order's lines joined with product, brand and category.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn details(&self, order_id: OrderId) -> Result<Vec<OrderLine>, RepositoryError> {
        let rows = sqlx::query_as::<_, LineRow>(
            r"
            SELECT od.detail_id, od.order_id, od.product_id, od.quantity,
                   od.unit_price, od.subtotal,
                   p.product_name, p.brand, c.category_name
            FROM order_details od
            JOIN products p ON p.product_id = od.product_id
            JOIN categories c ON c.category_id = p.category_id
            WHERE od.order_id = $1
            ORDER BY od.detail_id
            ",
        )
        .bind(order_id)
        .fetch_all(self.pool)
        .await?;

        rows.into_iter()
            .map(|row| {
                Ok(OrderLine {
                    detail: row.detail.try_into()?,
                    product_name: row.product_name,
                    brand: row.brand,
                    category_name: row.category_name,
                })
            })
            .collect()
    }

    /// Delete an order and, by cascade, its details.
    ///
    /// Returns `true` if a row was deleted.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn delete(&self, id: OrderId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM orders WHERE order_id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Orders whose stored total differs from the sum of their details.
    ///
    /// An empty result means the total invariant holds for every order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn total_mismatches(&self) -> Result<Vec<TotalMismatch>, RepositoryError> {
        let rows = sqlx::query_as::<_, MismatchRow>(
            r"
            SELECT o.order_id,
                   o.total_amount AS recorded,
                   COALESCE(SUM(od.subtotal), 0)::NUMERIC(10, 2) AS computed
            FROM orders o
            LEFT JOIN order_details od ON od.order_id = o.order_id
            GROUP BY o.order_id
            HAVING o.total_amount <> COALESCE(SUM(od.subtotal), 0)
            ORDER BY o.order_id
            ",
        )
        .fetch_all(self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| TotalMismatch {
                order_id: OrderId::new(row.order_id),
                recorded: row.recorded,
                computed: row.computed,
            })
            .collect())
    }
}

// =============================================================================
// Transaction helpers
// =============================================================================

/// Insert an open order with a zero total.
pub(crate) async fn insert_order(
    conn: &mut PgConnection,
    user_id: UserId,
) -> Result<Order, RepositoryError> {
    let sql = format!(
        "INSERT INTO orders (user_id, status) VALUES ($1, 'open') RETURNING {ORDER_COLUMNS}"
    );
    let row = sqlx::query_as::<_, OrderRow>(&sql)
        .bind(user_id)
        .fetch_one(&mut *conn)
        .await
        .map_err(|e| RepositoryError::from_write(e, "user does not exist"))?;

    Ok(row.into())
}

/// Fetch an order and lock its row until the transaction ends.
pub(crate) async fn lock_order(
    conn: &mut PgConnection,
    id: OrderId,
) -> Result<Option<Order>, RepositoryError> {
    let sql = format!("SELECT {ORDER_COLUMNS} FROM orders WHERE order_id = $1 FOR UPDATE");
    let row = sqlx::query_as::<_, OrderRow>(&sql)
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;

    Ok(row.map(Into::into))
}

/// Insert one detail line with a price captured by the caller.
pub(crate) async fn insert_detail(
    conn: &mut PgConnection,
    order_id: OrderId,
    product_id: ProductId,
    quantity: Quantity,
    unit_price: Price,
) -> Result<OrderDetail, RepositoryError> {
    let row = sqlx::query_as::<_, DetailRow>(
        r"
        INSERT INTO order_details (order_id, product_id, quantity, unit_price, subtotal)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING detail_id, order_id, product_id, quantity, unit_price, subtotal
        ",
    )
    .bind(order_id)
    .bind(product_id)
    .bind(quantity.get())
    .bind(unit_price.amount())
    .bind(unit_price.subtotal(quantity))
    .fetch_one(&mut *conn)
    .await
    .map_err(|e| RepositoryError::from_write(e, "order or product does not exist"))?;

    row.try_into()
}

/// Recompute an order's total from its details and return it.
pub(crate) async fn refresh_total(
    conn: &mut PgConnection,
    order_id: OrderId,
) -> Result<Decimal, RepositoryError> {
    let total: Decimal = sqlx::query_scalar(
        r"
        UPDATE orders
        SET total_amount = (
            SELECT COALESCE(SUM(subtotal), 0)
            FROM order_details
            WHERE order_id = $1
        )
        WHERE order_id = $1
        RETURNING total_amount
        ",
    )
    .bind(order_id)
    .fetch_optional(&mut *conn)
    .await?
    .ok_or(RepositoryError::NotFound)?;

    Ok(total)
}

/// Number of detail lines on an order.
pub(crate) async fn detail_count(
    conn: &mut PgConnection,
    order_id: OrderId,
) -> Result<i64, RepositoryError> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM order_details WHERE order_id = $1")
        .bind(order_id)
        .fetch_one(&mut *conn)
        .await?;

    Ok(count)
}

/// Overwrite an order's status.
pub(crate) async fn set_status(
    conn: &mut PgConnection,
    order_id: OrderId,
    status: OrderStatus,
) -> Result<Order, RepositoryError> {
    let sql = format!("UPDATE orders SET status = $2 WHERE order_id = $1 RETURNING {ORDER_COLUMNS}");
    let row = sqlx::query_as::<_, OrderRow>(&sql)
        .bind(order_id)
        .bind(status)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or(RepositoryError::NotFound)?;

    Ok(row.into())
}

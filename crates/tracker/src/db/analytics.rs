//! Aggregate spending queries.
//!
//! Each report is one `SELECT`. Spending only counts completed orders.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::PgPool;

use grocer_core::{Price, ProductId, UserId};

use super::RepositoryError;
use crate::models::{
    CategorySpending, DailySpending, DateRange, MonthlySpending, ProductPopularity,
    SpendingTotals, Suggestion,
};

#[derive(Debug, sqlx::FromRow)]
struct CategorySpendingRow {
    category_name: String,
    total_spent: Decimal,
}

#[derive(Debug, sqlx::FromRow)]
struct MonthlyRow {
    month: String,
    total_spent: Decimal,
    order_count: i64,
}

#[derive(Debug, sqlx::FromRow)]
struct DailyRow {
    day: NaiveDate,
    total_spent: Decimal,
}

#[derive(Debug, sqlx::FromRow)]
struct PopularityRow {
    product_id: i32,
    product_name: String,
    brand: Option<String>,
    category_name: String,
    total_quantity: i64,
    order_count: i64,
}

#[derive(Debug, sqlx::FromRow)]
struct TotalsRow {
    total_spent: Decimal,
    order_count: i64,
}

#[derive(Debug, sqlx::FromRow)]
struct SuggestionRow {
    product_id: i32,
    product_name: String,
    brand: Option<String>,
    category_name: String,
    unit_price: Decimal,
}

/// Repository for spending reports.
pub struct AnalyticsRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> AnalyticsRepository<'a> {
    /// Create a new analytics repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Sum of detail subtotals per category, highest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn spending_by_category(
        &self,
        user_id: UserId,
        range: DateRange,
    ) -> Result<Vec<CategorySpending>, RepositoryError> {
        let rows = sqlx::query_as::<_, CategorySpendingRow>(
            r"
            SELECT c.category_name, SUM(od.subtotal) AS total_spent
            FROM orders o
            JOIN order_details od ON od.order_id = o.order_id
            JOIN products p ON p.product_id = od.product_id
            JOIN categories c ON c.category_id = p.category_id
            WHERE o.user_id = $1
              AND o.status = 'completed'
              AND ($2::date IS NULL OR o.order_date::date >= $2)
              AND ($3::date IS NULL OR o.order_date::date <= $3)
            GROUP BY c.category_id, c.category_name
            ORDER BY total_spent DESC, c.category_name
            ",
        )
        .bind(user_id)
        .bind(range.start)
        .bind(range.end)
        .fetch_all(self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| CategorySpending {
                category_name: row.category_name,
                total_spent: row.total_spent,
            })
            .collect())
    }

    /// Spending and order count per `YYYY-MM`, optionally for one year.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn monthly_spending(
        &self,
        user_id: UserId,
        year: Option<i32>,
    ) -> Result<Vec<MonthlySpending>, RepositoryError> {
        let rows = sqlx::query_as::<_, MonthlyRow>(
            r"
            SELECT to_char(order_date, 'YYYY-MM') AS month,
                   SUM(total_amount) AS total_spent,
                   COUNT(*) AS order_count
            FROM orders
            WHERE user_id = $1
              AND status = 'completed'
              AND ($2::int IS NULL OR EXTRACT(YEAR FROM order_date)::int = $2)
            GROUP BY month
            ORDER BY month
            ",
        )
        .bind(user_id)
        .bind(year)
        .fetch_all(self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| MonthlySpending {
                month: row.month,
                total_spent: row.total_spent,
                order_count: row.order_count,
            })
            .collect())
    }

    /// Products by total quantity bought.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn most_purchased(
        &self,
        user_id: UserId,
        limit: i64,
    ) -> Result<Vec<ProductPopularity>, RepositoryError> {
        let rows = sqlx::query_as::<_, PopularityRow>(
            r"
            SELECT p.product_id, p.product_name, p.brand, c.category_name,
                   SUM(od.quantity)::BIGINT AS total_quantity,
                   COUNT(DISTINCT o.order_id) AS order_count
            FROM orders o
            JOIN order_details od ON od.order_id = o.order_id
            JOIN products p ON p.product_id = od.product_id
            JOIN categories c ON c.category_id = p.category_id
            WHERE o.user_id = $1 AND o.status = 'completed'
            GROUP BY p.product_id, p.product_name, p.brand, c.category_name
            ORDER BY total_quantity DESC, p.product_name
            LIMIT $2
            ",
        )
        .bind(user_id)
        .bind(limit)
        .fetch_all(self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| ProductPopularity {
                product_id: ProductId::new(row.product_id),
                product_name: row.product_name,
                brand: row.brand,
                category_name: row.category_name,
                total_quantity: row.total_quantity,
                order_count: row.order_count,
            })
            .collect())
    }

    /// Spending per day on or after `since`. Days without orders are absent.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn daily_spending(
        &self,
        user_id: UserId,
        since: NaiveDate,
    ) -> Result<Vec<DailySpending>, RepositoryError> {
        let rows = sqlx::query_as::<_, DailyRow>(
            r"
            SELECT order_date::date AS day, SUM(total_amount) AS total_spent
            FROM orders
            WHERE user_id = $1
              AND status = 'completed'
              AND order_date::date >= $2
            GROUP BY day
            ORDER BY day
            ",
        )
        .bind(user_id)
        .bind(since)
        .fetch_all(self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| DailySpending {
                day: row.day,
                total_spent: row.total_spent,
            })
            .collect())
    }

    /// Lifetime spending and completed order count.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn total_spending(&self, user_id: UserId) -> Result<SpendingTotals, RepositoryError> {
        let row = sqlx::query_as::<_, TotalsRow>(
            r"
            SELECT COALESCE(SUM(total_amount), 0) AS total_spent,
                   COUNT(*) AS order_count
            FROM orders
            WHERE user_id = $1 AND status = 'completed'
            ",
        )
        .bind(user_id)
        .fetch_one(self.pool)
        .await?;

        Ok(SpendingTotals {
            total_spent: row.total_spent,
            order_count: row.order_count,
        })
    }

    /// Products from the user's five most-bought categories that they have
    /// not bought since `since`, in random order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn suggested_products(
        &self,
        user_id: UserId,
        since: NaiveDate,
        limit: i64,
    ) -> Result<Vec<Suggestion>, RepositoryError> {
        let rows = sqlx::query_as::<_, SuggestionRow>(
            r"
            WITH user_categories AS (
                SELECT p.category_id, COUNT(*) AS frequency
                FROM orders o
                JOIN order_details od ON od.order_id = o.order_id
                JOIN products p ON p.product_id = od.product_id
                WHERE o.user_id = $1 AND o.status <> 'cancelled'
                GROUP BY p.category_id
                ORDER BY frequency DESC, p.category_id
                LIMIT 5
            ),
            recent_products AS (
                SELECT DISTINCT od.product_id
                FROM orders o
                JOIN order_details od ON od.order_id = o.order_id
                WHERE o.user_id = $1
                  AND o.status <> 'cancelled'
                  AND o.order_date::date >= $2
            )
            SELECT p.product_id, p.product_name, p.brand, c.category_name, p.unit_price
            FROM products p
            JOIN categories c ON c.category_id = p.category_id
            WHERE p.category_id IN (SELECT category_id FROM user_categories)
              AND p.product_id NOT IN (SELECT product_id FROM recent_products)
            ORDER BY random()
            LIMIT $3
            ",
        )
        .bind(user_id)
        .bind(since)
        .bind(limit)
        .fetch_all(self.pool)
        .await?;

        rows.into_iter()
            .map(|row| {
                Ok(Suggestion {
                    product_id: ProductId::new(row.product_id),
                    product_name: row.product_name,
                    brand: row.brand,
                    category_name: row.category_name,
                    unit_price: Price::new(row.unit_price)
                        .map_err(|e| RepositoryError::corrupt("unit price", e))?,
                })
            })
            .collect()
    }
}

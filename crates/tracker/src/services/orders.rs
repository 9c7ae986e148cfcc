//! Manually built orders.
//!
//! Adding a line and recomputing the total happen in one transaction with
//! the order row locked, so the stored total always matches the details.

use sqlx::{PgConnection, PgPool};
use tracing::{info, warn};

use grocer_core::{OrderId, OrderStatus, ProductId, Quantity, UserId};

use super::ensure_owner;
use crate::db::{OrderRepository, orders, products};
use crate::error::{AppError, Result};
use crate::models::{Order, OrderDetail, OrderLine, OrderWithLines, TotalMismatch};

/// Order service.
pub struct OrderService<'a> {
    pool: &'a PgPool,
    orders: OrderRepository<'a>,
}

impl<'a> OrderService<'a> {
    /// Create a new order service.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            pool,
            orders: OrderRepository::new(pool),
        }
    }

    /// Start an empty open order.
    ///
    /// # Errors
    ///
    /// Returns `AppError::ConflictOrEmpty` if the user doesn't exist.
    pub async fn create_order(&self, user_id: UserId) -> Result<Order> {
        let order = self.orders.create(user_id).await?;
        info!(user_id = %user_id, order_id = %order.id, "Order created");
        Ok(order)
    }

    /// Add a product line at the product's current price.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` if the order or product doesn't exist.
    /// Returns `AppError::Authorization` if the order belongs to someone else.
    /// Returns `AppError::ConflictOrEmpty` if the order is no longer open.
    pub async fn add_item(
        &self,
        user_id: UserId,
        order_id: OrderId,
        product_id: ProductId,
        quantity: Quantity,
    ) -> Result<OrderDetail> {
        let mut tx = self.pool.begin().await?;

        let order = lock_owned_order(&mut *tx, user_id, order_id).await?;
        if !order.status.is_open() {
            return Err(AppError::ConflictOrEmpty(format!(
                "order {order_id} is {} and cannot be changed",
                order.status
            )));
        }

        let unit_price = products::current_price(&mut *tx, product_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("product {product_id}")))?;

        let detail =
            orders::insert_detail(&mut *tx, order_id, product_id, quantity, unit_price).await?;
        let total = orders::refresh_total(&mut *tx, order_id).await?;

        tx.commit().await?;

        info!(
            user_id = %user_id,
            order_id = %order_id,
            product_id = %product_id,
            subtotal = %detail.subtotal,
            total = %total,
            "Item added to order"
        );
        Ok(detail)
    }

    /// Mark an open order completed.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` if the order doesn't exist.
    /// Returns `AppError::Authorization` if the order belongs to someone else.
    /// Returns `AppError::ConflictOrEmpty` if the order is not open or has no
    /// lines.
    pub async fn complete(&self, user_id: UserId, order_id: OrderId) -> Result<Order> {
        self.transition(user_id, order_id, OrderStatus::Completed)
            .await
    }

    /// Cancel an open order.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` if the order doesn't exist.
    /// Returns `AppError::Authorization` if the order belongs to someone else.
    /// Returns `AppError::ConflictOrEmpty` if the order is not open.
    pub async fn cancel(&self, user_id: UserId, order_id: OrderId) -> Result<Order> {
        self.transition(user_id, order_id, OrderStatus::Cancelled)
            .await
    }

    async fn transition(
        &self,
        user_id: UserId,
        order_id: OrderId,
        next: OrderStatus,
    ) -> Result<Order> {
        let mut tx = self.pool.begin().await?;

        let order = lock_owned_order(&mut *tx, user_id, order_id).await?;
        if !order.status.can_transition_to(next) {
            return Err(AppError::ConflictOrEmpty(format!(
                "order {order_id} is {} and cannot become {next}",
                order.status
            )));
        }
        if next == OrderStatus::Completed && orders::detail_count(&mut *tx, order_id).await? == 0 {
            return Err(AppError::ConflictOrEmpty(format!(
                "order {order_id} has no items"
            )));
        }

        let order = orders::set_status(&mut *tx, order_id, next).await?;
        tx.commit().await?;

        info!(user_id = %user_id, order_id = %order_id, status = %next, "Order status changed");
        Ok(order)
    }

    /// The user's orders, newest first.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Repository` if the query fails.
    pub async fn orders_for_user(&self, user_id: UserId) -> Result<Vec<Order>> {
        Ok(self.orders.orders_for_user(user_id).await?)
    }

    /// One of the user's orders.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` if the order doesn't exist.
    /// Returns `AppError::Authorization` if the order belongs to someone else.
    pub async fn get(&self, user_id: UserId, order_id: OrderId) -> Result<Order> {
        let order = self
            .orders
            .get(order_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("order {order_id}")))?;
        ensure_owner(order.user_id, user_id, "order")?;
        Ok(order)
    }

    /// An order's lines with product details.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` if the order doesn't exist.
    /// Returns `AppError::Authorization` if the order belongs to someone else.
    pub async fn details(&self, user_id: UserId, order_id: OrderId) -> Result<Vec<OrderLine>> {
        self.get(user_id, order_id).await?;
        Ok(self.orders.details(order_id).await?)
    }

    /// An order together with its lines.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` if the order doesn't exist.
    /// Returns `AppError::Authorization` if the order belongs to someone else.
    pub async fn get_with_lines(&self, user_id: UserId, order_id: OrderId) -> Result<OrderWithLines> {
        let order = self.get(user_id, order_id).await?;
        let lines = self.orders.details(order_id).await?;
        Ok(OrderWithLines { order, lines })
    }

    /// Delete an order and its lines.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` if the order doesn't exist.
    /// Returns `AppError::Authorization` if the order belongs to someone else.
    pub async fn delete(&self, user_id: UserId, order_id: OrderId) -> Result<()> {
        self.get(user_id, order_id).await?;
        if !self.orders.delete(order_id).await? {
            return Err(AppError::NotFound(format!("order {order_id}")));
        }
        info!(user_id = %user_id, order_id = %order_id, "Order deleted");
        Ok(())
    }

    /// Every order whose stored total differs from its details. Empty when
    /// the database is consistent.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Repository` if the query fails.
    pub async fn check_totals(&self) -> Result<Vec<TotalMismatch>> {
        let mismatches = self.orders.total_mismatches().await?;
        for m in &mismatches {
            warn!(
                order_id = %m.order_id,
                recorded = %m.recorded,
                computed = %m.computed,
                "Order total mismatch"
            );
        }
        Ok(mismatches)
    }
}

async fn lock_owned_order(
    conn: &mut PgConnection,
    user_id: UserId,
    order_id: OrderId,
) -> Result<Order> {
    let order = orders::lock_order(conn, order_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("order {order_id}")))?;
    ensure_owner(order.user_id, user_id, "order")?;
    Ok(order)
}

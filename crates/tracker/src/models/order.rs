//! Order domain types.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use grocer_core::{OrderDetailId, OrderId, OrderStatus, Price, ProductId, Quantity, UserId};

/// A purchase record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Order {
    pub id: OrderId,
    pub user_id: UserId,
    pub order_date: DateTime<Utc>,
    /// Always equal to the sum of the order's detail subtotals.
    pub total_amount: Decimal,
    pub status: OrderStatus,
}

/// One purchased product line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderDetail {
    pub id: OrderDetailId,
    pub order_id: OrderId,
    pub product_id: ProductId,
    pub quantity: Quantity,
    /// Product price captured when the line was added.
    pub unit_price: Price,
    /// `quantity × unit_price`.
    pub subtotal: Decimal,
}

/// An order detail joined with product and category names.
#[derive(Debug, Clone, Serialize)]
pub struct OrderLine {
    pub detail: OrderDetail,
    pub product_name: String,
    pub brand: Option<String>,
    pub category_name: String,
}

/// An order together with its lines.
#[derive(Debug, Clone, Serialize)]
pub struct OrderWithLines {
    pub order: Order,
    pub lines: Vec<OrderLine>,
}

/// An order whose recorded total disagrees with its details.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TotalMismatch {
    pub order_id: OrderId,
    pub recorded: Decimal,
    pub computed: Decimal,
}

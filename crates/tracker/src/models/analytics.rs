//! Report rows for spending analytics.
//!
//! Only completed orders count towards spending.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use thiserror::Error;

use grocer_core::{Price, ProductId};

/// Errors that can occur when building a [`DateRange`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DateRangeError {
    /// The start date is later than the end date.
    #[error("start date {start} is after end date {end}")]
    Reversed { start: NaiveDate, end: NaiveDate },
}

/// Inclusive date range filter; either bound may be open.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateRange {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl DateRange {
    /// Build a range, rejecting `start > end`.
    ///
    /// # Errors
    ///
    /// Returns `DateRangeError::Reversed` when the start date is after the
    /// end date.
    pub fn new(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Result<Self, DateRangeError> {
        if let (Some(start), Some(end)) = (start, end)
            && start > end
        {
            return Err(DateRangeError::Reversed { start, end });
        }
        Ok(Self { start, end })
    }

    /// No bounds.
    #[must_use]
    pub const fn all_time() -> Self {
        Self {
            start: None,
            end: None,
        }
    }

}

/// Spending in one category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategorySpending {
    pub category_name: String,
    pub total_spent: Decimal,
}

/// Spending in one calendar month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthlySpending {
    /// `YYYY-MM`.
    pub month: String,
    pub total_spent: Decimal,
    pub order_count: i64,
}

/// Spending on one day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DailySpending {
    pub day: NaiveDate,
    pub total_spent: Decimal,
}

/// How often a product was bought.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProductPopularity {
    pub product_id: ProductId,
    pub product_name: String,
    pub brand: Option<String>,
    pub category_name: String,
    pub total_quantity: i64,
    pub order_count: i64,
}

/// Lifetime totals across completed orders.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SpendingTotals {
    pub total_spent: Decimal,
    pub order_count: i64,
}

impl SpendingTotals {
    /// Mean order value, zero when there are no orders.
    #[must_use]
    pub fn average_order_value(&self) -> Decimal {
        if self.order_count == 0 {
            return Decimal::ZERO;
        }
        (self.total_spent / Decimal::from(self.order_count)).round_dp(2)
    }
}

/// A product worth buying again, from the user's favourite categories.
#[derive(Debug, Clone, Serialize)]
pub struct Suggestion {
    pub product_id: ProductId,
    pub product_name: String,
    pub brand: Option<String>,
    pub category_name: String,
    pub unit_price: Price,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 1, d).unwrap()
    }

    #[test]
    fn test_date_range_validation() {
        assert_eq!(
            DateRange::new(Some(day(5)), Some(day(1))),
            Err(DateRangeError::Reversed {
                start: day(5),
                end: day(1)
            })
        );
        assert!(DateRange::new(Some(day(1)), Some(day(1))).is_ok());
        assert!(DateRange::new(None, Some(day(1))).is_ok());
    }

    #[test]
    fn test_average_order_value() {
        let totals = SpendingTotals {
            total_spent: Decimal::new(1000, 2),
            order_count: 3,
        };
        assert_eq!(totals.average_order_value(), Decimal::new(333, 2));
        assert_eq!(SpendingTotals::default().average_order_value(), Decimal::ZERO);
    }
}

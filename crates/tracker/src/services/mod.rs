//! Business logic services for the tracker.
//!
//! # Services
//!
//! - `auth` - Registration and password login
//! - `catalog` - Categories and products
//! - `shopping` - Shopping lists and their items
//! - `conversion` - Shopping list to order, in one transaction
//! - `orders` - Manual orders and the total consistency check
//! - `inventory` - Household stock, expiry alerts and restocking
//! - `analytics` - Spending reports and suggestions
//!
//! Services borrow a `PgPool` and check ownership before touching another
//! user's rows: acting on a record the user does not own is an
//! [`AppError::Authorization`], never a silent no-op.

pub mod analytics;
pub mod auth;
pub mod catalog;
pub mod conversion;
pub mod inventory;
pub mod orders;
pub mod shopping;

pub use analytics::AnalyticsService;
pub use auth::AuthService;
pub use catalog::CatalogService;
pub use conversion::{ConversionOutcome, ConversionPlan, PlannedLine, plan_conversion};
pub use inventory::InventoryService;
pub use orders::OrderService;
pub use shopping::ShoppingService;

use grocer_core::UserId;

use crate::db::RepositoryError;
use crate::error::{AppError, Result};

/// Fail with `Authorization` unless `acting` owns the record.
pub(crate) fn ensure_owner(owner: UserId, acting: UserId, what: &str) -> Result<()> {
    if owner == acting {
        Ok(())
    } else {
        Err(AppError::Authorization(format!(
            "{what} belongs to another user"
        )))
    }
}

/// Attach the record name to a bare repository `NotFound`.
pub(crate) fn not_found_as(err: RepositoryError, what: String) -> AppError {
    match err {
        RepositoryError::NotFound => AppError::NotFound(what),
        other => other.into(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_ensure_owner() {
        assert!(ensure_owner(UserId::new(1), UserId::new(1), "shopping list").is_ok());
        let err = ensure_owner(UserId::new(1), UserId::new(2), "shopping list").unwrap_err();
        assert!(matches!(err, AppError::Authorization(msg) if msg.contains("shopping list")));
    }
}

//! Domain models for the tracker.
//!
//! These are validated domain records, separate from the `sqlx::FromRow` row
//! types each repository keeps private.

pub mod analytics;
pub mod catalog;
pub mod inventory;
pub mod order;
pub mod shopping_list;
pub mod user;

pub use analytics::{
    CategorySpending, DailySpending, DateRange, DateRangeError, MonthlySpending, ProductPopularity,
    SpendingTotals, Suggestion,
};
pub use catalog::{Category, CategoryInput, Product, ProductInput};
pub use inventory::{
    CategoryStock, ExpiryAlert, InventoryAlerts, InventoryEntry, InventoryItem,
    InventoryItemInput, InventoryItemUpdate, InventorySummary, LocationStock, RestockOutcome,
};
pub use order::{Order, OrderDetail, OrderLine, OrderWithLines, TotalMismatch};
pub use shopping_list::{
    PendingPurchase, ShoppingList, ShoppingListEntry, ShoppingListItem, ShoppingListSummary,
};
pub use user::User;

//! Database operations for the grocery `PostgreSQL` database.
//!
//! ## Tables
//!
//! - `users` - Login name, email and Argon2 password hash
//! - `categories` - Product groups (Dairy, Beverages, ...)
//! - `products` - Catalog items with unit price
//! - `shopping_lists` / `shopping_list_items` - Planned purchases
//! - `orders` / `order_details` - Finalized purchases
//! - `inventory` - What is already at home
//!
//! # Migrations
//!
//! Migrations are stored in `crates/tracker/migrations/`, embedded at compile
//! time and run via:
//! ```bash
//! cargo run -p grocer-cli -- migrate
//! ```

pub mod analytics;
pub mod categories;
pub mod inventory;
pub mod orders;
pub mod products;
pub mod shopping_lists;
pub mod users;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::migrate::Migrator;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub use analytics::AnalyticsRepository;
pub use categories::CategoryRepository;
pub use inventory::InventoryRepository;
pub use orders::OrderRepository;
pub use products::ProductRepository;
pub use shopping_lists::ShoppingListRepository;
pub use users::UserRepository;

use crate::config::TrackerConfig;

/// Embedded schema migrations.
pub static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., unique username, product still referenced).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

impl RepositoryError {
    /// Translate unique and foreign-key violations into `Conflict`.
    ///
    /// `what` describes the constraint in user terms, e.g. "username or email
    /// already exists".
    pub(crate) fn from_write(err: sqlx::Error, what: &str) -> Self {
        if let sqlx::Error::Database(ref db_err) = err
            && (db_err.is_unique_violation() || db_err.is_foreign_key_violation())
        {
            return Self::Conflict(what.to_owned());
        }
        Self::Database(err)
    }

    pub(crate) fn corrupt(what: &str, err: impl std::fmt::Display) -> Self {
        Self::DataCorruption(format!("invalid {what} in database: {err}"))
    }
}

/// Create a `PostgreSQL` connection pool from tracker configuration.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(config: &TrackerConfig) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(1)
        .acquire_timeout(config.acquire_timeout)
        .connect(config.database_url.expose_secret())
        .await
}

/// Create a small pool directly from a URL (tests, one-off tools).
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn connect(database_url: &str) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url)
        .await
}

/// Apply any pending migrations.
///
/// # Errors
///
/// Returns `MigrateError` if a migration fails or the history is inconsistent.
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    MIGRATOR.run(pool).await
}

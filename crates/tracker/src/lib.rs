//! Grocer Tracker - the grocery tracking library.
//!
//! Everything the application does to the database lives here: the schema
//! (embedded migrations), one repository per entity, and the services that
//! enforce ownership and validation on top of them.
//!
//! # Architecture
//!
//! - [`db`] - Connection pool, migrations and repositories. Each repository
//!   borrows a `PgPool`; every method is one round trip.
//! - [`services`] - Business rules: authentication, catalog validation,
//!   shopping lists, orders, inventory, analytics and the list-to-order
//!   conversion (the only multi-statement transaction).
//! - [`models`] - Typed records returned by repositories and services.
//! - [`config`] - Environment-driven configuration.
//! - [`error`] - The [`AppError`](error::AppError) returned by services.
//! - [`seed`] - Sample catalog loading.
//!
//! No global connection exists: callers create a pool with
//! [`db::create_pool`] and hand it to each service explicitly.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod seed;
pub mod services;

pub use config::TrackerConfig;
pub use error::{AppError, Result};

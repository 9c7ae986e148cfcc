//! Grocer Core - Shared types library.
//!
//! This crate provides common types used across all Grocer components:
//! - `tracker` - Query layer, services and the list-to-order conversion
//! - `cli` - Command-line surface for migrations, seeding and day-to-day use
//!
//! # Architecture
//!
//! The core crate contains only types and validation - no I/O, no database
//! access. Database encode/decode for IDs and enums sits behind the `postgres`
//! feature so the types stay usable anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for IDs, emails, usernames, prices,
//!   quantities and statuses

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;

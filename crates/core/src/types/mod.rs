//! Core types for Grocer.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod email;
pub mod id;
pub mod price;
pub mod quantity;
pub mod status;
pub mod username;

pub use email::{Email, EmailError};
pub use id::*;
pub use price::{Price, PriceError, sum_amounts};
pub use quantity::{Quantity, QuantityError};
pub use status::*;
pub use username::{Username, UsernameError};

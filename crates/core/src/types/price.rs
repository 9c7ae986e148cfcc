//! Unit prices and line arithmetic using decimal math.
//!
//! Prices are stored as `NUMERIC(10, 2)`. All money arithmetic stays in
//! [`Decimal`] so `2 × 3.00 + 1 × 5.00` is exactly `11.00`.

use core::fmt;
use core::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::Quantity;

/// Errors that can occur when constructing a [`Price`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PriceError {
    /// The amount is below zero.
    #[error("price cannot be negative")]
    Negative,
    /// The amount has more than two decimal places.
    #[error("price cannot have more than 2 decimal places")]
    TooPrecise,
    /// The amount does not fit in `NUMERIC(10, 2)`.
    #[error("price must be less than {max}")]
    TooLarge {
        /// Exclusive upper bound.
        max: Decimal,
    },
    /// The input is not a decimal number.
    #[error("invalid price: {0}")]
    Invalid(String),
}

/// A non-negative unit price with at most two decimal places.
///
/// ```
/// use grocer_core::{Price, Quantity};
///
/// let price: Price = "3.00".parse().unwrap();
/// let qty = Quantity::new(2).unwrap();
/// assert_eq!(price.subtotal(qty).to_string(), "6.00");
///
/// assert!("-1".parse::<Price>().is_err());
/// assert!("1.999".parse::<Price>().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Price(Decimal);

impl Price {
    /// Zero.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Create a validated price.
    ///
    /// # Errors
    ///
    /// Returns an error if the amount is negative, has more than two decimal
    /// places, or is `>= 100_000_000`.
    pub fn new(amount: Decimal) -> Result<Self, PriceError> {
        let max = Decimal::from(100_000_000_i64);
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(PriceError::Negative);
        }
        if amount.normalize().scale() > 2 {
            return Err(PriceError::TooPrecise);
        }
        if amount >= max {
            return Err(PriceError::TooLarge { max });
        }
        let mut amount = amount;
        amount.rescale(2);
        Ok(Self(amount))
    }

    /// Create a price from a whole number of cents.
    ///
    /// # Errors
    ///
    /// Same as [`Price::new`].
    pub fn from_cents(cents: i64) -> Result<Self, PriceError> {
        Self::new(Decimal::new(cents, 2))
    }

    /// The underlying decimal amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// `quantity × price`, kept at two decimal places.
    #[must_use]
    pub fn subtotal(&self, quantity: Quantity) -> Decimal {
        let mut total = self.0 * Decimal::from(quantity.get());
        total.rescale(2);
        total
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

impl FromStr for Price {
    type Err = PriceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let amount = Decimal::from_str(s.trim().trim_start_matches('$'))
            .map_err(|e| PriceError::Invalid(e.to_string()))?;
        Self::new(amount)
    }
}

impl TryFrom<Decimal> for Price {
    type Error = PriceError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Price> for Decimal {
    fn from(price: Price) -> Self {
        price.0
    }
}

/// Sum a sequence of money amounts, kept at two decimal places.
#[must_use]
pub fn sum_amounts<I>(amounts: I) -> Decimal
where
    I: IntoIterator<Item = Decimal>,
{
    let mut total: Decimal = amounts.into_iter().sum();
    total.rescale(2);
    total
}

//! Line quantities for shopping-list items and order details.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

/// Errors that can occur when constructing a [`Quantity`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum QuantityError {
    /// Zero or negative.
    #[error("quantity must be at least 1")]
    NotPositive,
    /// Above [`Quantity::MAX`].
    #[error("quantity must be at most {max}")]
    TooLarge {
        /// Inclusive upper bound.
        max: i32,
    },
    /// Not an integer.
    #[error("invalid quantity: {0}")]
    Invalid(String),
}

/// A strictly positive item count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i32", into = "i32")]
pub struct Quantity(i32);

impl Quantity {
    /// Largest quantity accepted on a single line.
    pub const MAX: i32 = 10_000;

    /// One unit.
    pub const ONE: Self = Self(1);

    /// Create a validated quantity.
    ///
    /// # Errors
    ///
    /// Returns an error if `n < 1` or `n > Quantity::MAX`.
    pub const fn new(n: i32) -> Result<Self, QuantityError> {
        if n < 1 {
            return Err(QuantityError::NotPositive);
        }
        if n > Self::MAX {
            return Err(QuantityError::TooLarge { max: Self::MAX });
        }
        Ok(Self(n))
    }

    /// The count as `i32`, matching the `INTEGER` column.
    #[must_use]
    pub const fn get(self) -> i32 {
        self.0
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Quantity {
    type Err = QuantityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let n = s
            .trim()
            .parse::<i32>()
            .map_err(|e| QuantityError::Invalid(e.to_string()))?;
        Self::new(n)
    }
}

impl TryFrom<i32> for Quantity {
    type Error = QuantityError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Quantity> for i32 {
    fn from(q: Quantity) -> Self {
        q.0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_bounds() {
        assert_eq!(Quantity::new(0), Err(QuantityError::NotPositive));
        assert_eq!(Quantity::new(-3), Err(QuantityError::NotPositive));
        assert_eq!(Quantity::new(1), Ok(Quantity::ONE));
        assert!(Quantity::new(Quantity::MAX).is_ok());
        assert_eq!(
            Quantity::new(Quantity::MAX + 1),
            Err(QuantityError::TooLarge { max: 10_000 })
        );
    }

    #[test]
    fn test_from_str() {
        assert_eq!("4".parse::<Quantity>().unwrap().get(), 4);
        assert!(matches!(
            "two".parse::<Quantity>(),
            Err(QuantityError::Invalid(_))
        ));
    }

    #[test]
    fn test_deserialize_validates() {
        assert!(serde_json::from_str::<Quantity>("0").is_err());
        assert_eq!(serde_json::from_str::<Quantity>("3").unwrap().get(), 3);
    }
}

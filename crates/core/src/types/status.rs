//! Status enums for orders and inventory.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

/// Error returned when a status or location string is not recognised.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown {kind} '{value}'")]
pub struct UnknownVariant {
    kind: &'static str,
    value: String,
}

/// Lifecycle of an order.
///
/// ```text
/// open ──complete──▶ completed
///   └───cancel────▶ cancelled
/// ```
///
/// Completed and cancelled orders are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "order_status", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// Still collecting items.
    #[default]
    Open,
    /// Paid for; counts towards spending analytics.
    Completed,
    /// Abandoned; excluded from analytics.
    Cancelled,
}

impl OrderStatus {
    /// Database / display representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }

    /// Whether an order in this status can move to `next`.
    #[must_use]
    pub const fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Open, Self::Completed | Self::Cancelled)
        )
    }

    /// Whether items may still be added.
    #[must_use]
    pub const fn is_open(self) -> bool {
        matches!(self, Self::Open)
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "open" => Ok(Self::Open),
            "completed" => Ok(Self::Completed),
            "cancelled" | "canceled" => Ok(Self::Cancelled),
            other => Err(UnknownVariant {
                kind: "order status",
                value: other.to_owned(),
            }),
        }
    }
}

/// Where an inventory item is kept at home.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "storage_location", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum StorageLocation {
    #[default]
    Pantry,
    Refrigerator,
    Freezer,
    Cabinet,
    Other,
}

impl StorageLocation {
    /// All locations, in display order.
    pub const ALL: [Self; 5] = [
        Self::Pantry,
        Self::Refrigerator,
        Self::Freezer,
        Self::Cabinet,
        Self::Other,
    ];

    /// Database / display representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pantry => "pantry",
            Self::Refrigerator => "refrigerator",
            Self::Freezer => "freezer",
            Self::Cabinet => "cabinet",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for StorageLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StorageLocation {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        match lower.as_str() {
            "fridge" => Ok(Self::Refrigerator),
            _ => Self::ALL
                .into_iter()
                .find(|loc| loc.as_str() == lower)
                .ok_or(UnknownVariant {
                    kind: "storage location",
                    value: lower,
                }),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_order_status_transitions() {
        assert!(OrderStatus::Open.can_transition_to(OrderStatus::Completed));
        assert!(OrderStatus::Open.can_transition_to(OrderStatus::Cancelled));
        assert!(!OrderStatus::Open.can_transition_to(OrderStatus::Open));
        assert!(!OrderStatus::Completed.can_transition_to(OrderStatus::Cancelled));
        assert!(!OrderStatus::Cancelled.can_transition_to(OrderStatus::Completed));
        assert!(!OrderStatus::Completed.can_transition_to(OrderStatus::Open));
    }

    #[test]
    fn test_order_status_parse_and_display() {
        for status in [
            OrderStatus::Open,
            OrderStatus::Completed,
            OrderStatus::Cancelled,
        ] {
            assert_eq!(status.to_string().parse::<OrderStatus>().unwrap(), status);
        }
        assert_eq!(
            "Canceled".parse::<OrderStatus>().unwrap(),
            OrderStatus::Cancelled
        );
        let err = "pending".parse::<OrderStatus>().unwrap_err();
        assert_eq!(err.to_string(), "unknown order status 'pending'");
    }

    #[test]
    fn test_order_status_serde() {
        let json = serde_json::to_string(&OrderStatus::Completed).unwrap();
        assert_eq!(json, "\"completed\"");
    }

    #[test]
    fn test_storage_location_parse() {
        assert_eq!(
            "Refrigerator".parse::<StorageLocation>().unwrap(),
            StorageLocation::Refrigerator
        );
        assert_eq!(
            "fridge".parse::<StorageLocation>().unwrap(),
            StorageLocation::Refrigerator
        );
        assert!("garage".parse::<StorageLocation>().is_err());
        assert_eq!(StorageLocation::default(), StorageLocation::Pantry);
    }
}

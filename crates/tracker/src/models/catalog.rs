//! Catalog domain types: categories and products.

use serde::{Deserialize, Serialize};

use grocer_core::{CategoryId, Price, ProductId};

/// A product group such as "Dairy" or "Household".
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub description: Option<String>,
}

/// Input for creating or updating a category.
#[derive(Debug, Clone, Deserialize)]
pub struct CategoryInput {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// A catalog product, joined with its category name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub category_id: CategoryId,
    pub category_name: String,
    pub brand: Option<String>,
    /// Current shelf price. Order details capture a copy at purchase time.
    pub unit_price: Price,
    /// Unit of sale, e.g. "lb", "pack", "gallon".
    pub unit_measure: String,
}

/// Input for creating or updating a product.
#[derive(Debug, Clone, Deserialize)]
pub struct ProductInput {
    pub name: String,
    pub category_id: CategoryId,
    #[serde(default)]
    pub brand: Option<String>,
    pub unit_price: Price,
    #[serde(default = "default_unit_measure")]
    pub unit_measure: String,
}

pub(crate) fn default_unit_measure() -> String {
    "unit".to_owned()
}

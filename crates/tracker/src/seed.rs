//! Sample catalog loading.
//!
//! A catalog is a YAML document of categories, each with its products, plus
//! an optional demo user. The bundled catalog is compiled in; operators can
//! point `grocer seed --file` at their own.
//!
//! Seeding is skipped entirely when the database already has categories, so
//! running it twice is harmless.

use std::collections::HashSet;

use serde::Deserialize;
use sqlx::PgPool;
use thiserror::Error;
use tracing::{info, warn};

use grocer_core::Price;

use crate::db::CategoryRepository;
use crate::error::AppError;
use crate::models::{CategoryInput, ProductInput, catalog::default_unit_measure};
use crate::services::{AuthService, CatalogService};

/// The catalog shipped with the application.
pub const DEFAULT_CATALOG: &str = include_str!("../seed/catalog.yaml");

/// Errors that can occur while seeding.
#[derive(Debug, Error)]
pub enum SeedError {
    /// The YAML could not be parsed.
    #[error("invalid catalog file: {0}")]
    Parse(#[from] serde_yaml::Error),

    /// The catalog parsed but is inconsistent.
    #[error("catalog has {} problem(s): {}", .0.len(), .0.join("; "))]
    Invalid(Vec<String>),

    /// Writing to the database failed.
    #[error(transparent)]
    App(#[from] AppError),
}

/// A whole seed file.
#[derive(Debug, Clone, Deserialize)]
pub struct SeedCatalog {
    #[serde(default)]
    pub demo_user: Option<SeedUser>,
    pub categories: Vec<SeedCategory>,
}

/// A user created alongside the catalog.
#[derive(Debug, Clone, Deserialize)]
pub struct SeedUser {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// A category and its products.
#[derive(Debug, Clone, Deserialize)]
pub struct SeedCategory {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub products: Vec<SeedProduct>,
}

/// One product line in a seed file.
#[derive(Debug, Clone, Deserialize)]
pub struct SeedProduct {
    pub name: String,
    #[serde(default)]
    pub brand: Option<String>,
    pub price: Price,
    #[serde(default = "default_unit_measure")]
    pub unit: String,
}

impl SeedCatalog {
    /// Total number of products across all categories.
    #[must_use]
    pub fn product_count(&self) -> usize {
        self.categories.iter().map(|c| c.products.len()).sum()
    }
}

/// What a seeding run did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedReport {
    /// The database already had a catalog; nothing was written.
    pub skipped: bool,
    pub categories: usize,
    pub products: usize,
    pub demo_user_created: bool,
}

/// Parse and validate a catalog document.
///
/// # Errors
///
/// Returns `SeedError::Parse` for malformed YAML and `SeedError::Invalid`
/// for duplicate or blank names.
pub fn parse_catalog(yaml: &str) -> Result<SeedCatalog, SeedError> {
    let catalog: SeedCatalog = serde_yaml::from_str(yaml)?;
    let problems = validate_catalog(&catalog);
    if problems.is_empty() {
        Ok(catalog)
    } else {
        Err(SeedError::Invalid(problems))
    }
}

/// List everything wrong with a catalog; empty means it is usable.
#[must_use]
pub fn validate_catalog(catalog: &SeedCatalog) -> Vec<String> {
    let mut problems = Vec::new();
    let mut category_names = HashSet::new();

    if catalog.categories.is_empty() {
        problems.push("catalog has no categories".to_owned());
    }

    for category in &catalog.categories {
        let name = category.name.trim();
        if name.is_empty() {
            problems.push("category with a blank name".to_owned());
            continue;
        }
        if !category_names.insert(name.to_lowercase()) {
            problems.push(format!("duplicate category '{name}'"));
        }

        let mut product_names = HashSet::new();
        for product in &category.products {
            let product_name = product.name.trim();
            if product_name.is_empty() {
                problems.push(format!("blank product name in '{name}'"));
            } else if !product_names.insert(product_name.to_lowercase()) {
                problems.push(format!("duplicate product '{product_name}' in '{name}'"));
            }
        }
    }

    problems
}

/// Load a catalog into an empty database.
///
/// # Errors
///
/// Returns `SeedError::App` if any insert fails. Rows inserted before the
/// failure are kept.
pub async fn seed_catalog(pool: &PgPool, catalog: &SeedCatalog) -> Result<SeedReport, SeedError> {
    let existing = CategoryRepository::new(pool)
        .count()
        .await
        .map_err(AppError::from)?;
    if existing > 0 {
        warn!(categories = existing, "Catalog already present, skipping seed");
        return Ok(SeedReport {
            skipped: true,
            ..SeedReport::default()
        });
    }

    let service = CatalogService::new(pool);
    let mut report = SeedReport::default();

    for seed_category in &catalog.categories {
        let category = service
            .create_category(CategoryInput {
                name: seed_category.name.clone(),
                description: seed_category.description.clone(),
            })
            .await?;
        report.categories += 1;

        for seed_product in &seed_category.products {
            service
                .create_product(ProductInput {
                    name: seed_product.name.clone(),
                    category_id: category.id,
                    brand: seed_product.brand.clone(),
                    unit_price: seed_product.price,
                    unit_measure: seed_product.unit.clone(),
                })
                .await?;
            report.products += 1;
        }
    }

    if let Some(user) = &catalog.demo_user {
        match AuthService::new(pool)
            .register(&user.username, &user.email, &user.password)
            .await
        {
            Ok(_) => report.demo_user_created = true,
            Err(AppError::Validation(msg)) => {
                warn!(username = %user.username, reason = %msg, "Demo user not created");
            }
            Err(e) => return Err(e.into()),
        }
    }

    info!(
        categories = report.categories,
        products = report.products,
        demo_user = report.demo_user_created,
        "Catalog seeded"
    );
    Ok(report)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;

    #[test]
    fn test_default_catalog_parses() {
        let catalog = parse_catalog(DEFAULT_CATALOG).unwrap();
        assert_eq!(catalog.categories.len(), 10);
        assert_eq!(catalog.product_count(), 50);

        let demo = catalog.demo_user.as_ref().unwrap();
        assert_eq!(demo.username, "demo_user");

        let dairy = &catalog.categories[0];
        assert_eq!(dairy.name, "Dairy");
        assert_eq!(dairy.products[0].name, "Whole Milk");
        assert_eq!(dairy.products[0].price.amount(), Decimal::new(499, 2));
        assert_eq!(dairy.products[0].unit, "gallon");
    }

    #[test]
    fn test_unit_defaults() {
        let yaml = r#"
categories:
  - name: Pantry
    products:
      - { name: Rice, price: "2.50" }
"#;
        let catalog = parse_catalog(yaml).unwrap();
        assert_eq!(catalog.categories[0].products[0].unit, "unit");
        assert!(catalog.demo_user.is_none());
    }

    #[test]
    fn test_duplicates_rejected() {
        let yaml = r#"
categories:
  - name: Dairy
    products:
      - { name: Milk, price: "1.00" }
      - { name: milk, price: "1.10" }
  - name: dairy
"#;
        match parse_catalog(yaml) {
            Err(SeedError::Invalid(problems)) => {
                assert_eq!(problems.len(), 2);
                assert!(problems.iter().any(|p| p.contains("duplicate product")));
                assert!(problems.iter().any(|p| p.contains("duplicate category")));
            }
            other => panic!("expected Invalid, got {other:?}"),
        }
    }

    #[test]
    fn test_negative_price_rejected() {
        let yaml = r#"
categories:
  - name: Dairy
    products:
      - { name: Milk, price: "-1.00" }
"#;
        assert!(matches!(parse_catalog(yaml), Err(SeedError::Parse(_))));
    }
}

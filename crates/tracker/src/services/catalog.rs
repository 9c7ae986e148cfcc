//! Category and product management.

use sqlx::PgPool;
use tracing::info;

use grocer_core::{CategoryId, ProductId};

use super::not_found_as;
use crate::db::{CategoryRepository, ProductRepository};
use crate::error::{AppError, Result};
use crate::models::{Category, CategoryInput, Product, ProductInput};

const MAX_CATEGORY_NAME: usize = 50;
const MAX_PRODUCT_NAME: usize = 100;
const MAX_BRAND: usize = 50;
const MAX_UNIT_MEASURE: usize = 20;

/// Catalog service.
pub struct CatalogService<'a> {
    categories: CategoryRepository<'a>,
    products: ProductRepository<'a>,
}

impl<'a> CatalogService<'a> {
    /// Create a new catalog service.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            categories: CategoryRepository::new(pool),
            products: ProductRepository::new(pool),
        }
    }

    // =========================================================================
    // Categories
    // =========================================================================

    /// Create a category.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Validation` for a blank or over-long name.
    /// Returns `AppError::ConflictOrEmpty` if the name is already taken.
    pub async fn create_category(&self, input: CategoryInput) -> Result<Category> {
        let input = normalize_category(input)?;
        let category = self.categories.create(&input).await?;
        info!(category_id = %category.id, name = %category.name, "Category created");
        Ok(category)
    }

    /// All categories ordered by name.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Repository` if the query fails.
    pub async fn list_categories(&self) -> Result<Vec<Category>> {
        Ok(self.categories.list_all().await?)
    }

    /// Get a category.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` if the category doesn't exist.
    pub async fn get_category(&self, id: CategoryId) -> Result<Category> {
        self.categories
            .get(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("category {id}")))
    }

    /// Rename a category or change its description.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Validation` for a blank or over-long name.
    /// Returns `AppError::NotFound` if the category doesn't exist.
    pub async fn update_category(&self, id: CategoryId, input: CategoryInput) -> Result<Category> {
        let input = normalize_category(input)?;
        let category = self
            .categories
            .update(id, &input)
            .await
            .map_err(|e| not_found_as(e, format!("category {id}")))?;
        info!(category_id = %id, "Category updated");
        Ok(category)
    }

    /// Delete a category that no product references.
    ///
    /// # Errors
    ///
    /// Returns `AppError::ConflictOrEmpty` while products still belong to it.
    /// Returns `AppError::NotFound` if the category doesn't exist.
    pub async fn delete_category(&self, id: CategoryId) -> Result<()> {
        let linked = self.categories.product_count(id).await?;
        if linked > 0 {
            return Err(AppError::ConflictOrEmpty(format!(
                "category {id} still has {linked} product(s)"
            )));
        }
        if !self.categories.delete(id).await? {
            return Err(AppError::NotFound(format!("category {id}")));
        }
        info!(category_id = %id, "Category deleted");
        Ok(())
    }

    // =========================================================================
    // Products
    // =========================================================================

    /// Create a product.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Validation` for bad names or units.
    /// Returns `AppError::NotFound` if the category doesn't exist.
    pub async fn create_product(&self, input: ProductInput) -> Result<Product> {
        let input = normalize_product(input)?;
        self.get_category(input.category_id).await?;

        let product = self.products.create(&input).await?;
        info!(
            product_id = %product.id,
            name = %product.name,
            price = %product.unit_price,
            "Product created"
        );
        Ok(product)
    }

    /// All products ordered by category then name.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Repository` if the query fails.
    pub async fn list_products(&self) -> Result<Vec<Product>> {
        Ok(self.products.list_all().await?)
    }

    /// Products in one category.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Repository` if the query fails.
    pub async fn products_in_category(&self, category_id: CategoryId) -> Result<Vec<Product>> {
        Ok(self.products.list_by_category(category_id).await?)
    }

    /// Case-insensitive search on product name or brand. A blank term lists
    /// everything.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Repository` if the query fails.
    pub async fn search_products(&self, term: &str) -> Result<Vec<Product>> {
        let term = term.trim();
        if term.is_empty() {
            return self.list_products().await;
        }
        Ok(self.products.search(term).await?)
    }

    /// Get a product.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` if the product doesn't exist.
    pub async fn get_product(&self, id: ProductId) -> Result<Product> {
        self.products
            .get(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("product {id}")))
    }

    /// Replace a product's fields. Past order details keep their captured
    /// prices.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Validation` for bad names or units.
    /// Returns `AppError::NotFound` if the product or category doesn't exist.
    pub async fn update_product(&self, id: ProductId, input: ProductInput) -> Result<Product> {
        let input = normalize_product(input)?;
        self.get_category(input.category_id).await?;

        let product = self
            .products
            .update(id, &input)
            .await
            .map_err(|e| not_found_as(e, format!("product {id}")))?;
        info!(product_id = %id, price = %product.unit_price, "Product updated");
        Ok(product)
    }

    /// Delete a product no list, order or inventory item references.
    ///
    /// # Errors
    ///
    /// Returns `AppError::ConflictOrEmpty` if the product is still referenced.
    /// Returns `AppError::NotFound` if the product doesn't exist.
    pub async fn delete_product(&self, id: ProductId) -> Result<()> {
        if !self.products.delete(id).await? {
            return Err(AppError::NotFound(format!("product {id}")));
        }
        info!(product_id = %id, "Product deleted");
        Ok(())
    }
}

/// Trim a required text field and enforce its length.
fn required_text(field: &str, value: &str, max: usize) -> Result<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(AppError::Validation(format!("{field} must not be empty")));
    }
    if value.chars().count() > max {
        return Err(AppError::Validation(format!(
            "{field} must be at most {max} characters"
        )));
    }
    Ok(value.to_owned())
}

/// Trim an optional text field; blank becomes `None`.
fn optional_text(field: &str, value: Option<String>, max: usize) -> Result<Option<String>> {
    match value.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(v) => required_text(field, v, max).map(Some),
    }
}

fn normalize_category(input: CategoryInput) -> Result<CategoryInput> {
    Ok(CategoryInput {
        name: required_text("category name", &input.name, MAX_CATEGORY_NAME)?,
        description: input
            .description
            .map(|d| d.trim().to_owned())
            .filter(|d| !d.is_empty()),
    })
}

fn normalize_product(input: ProductInput) -> Result<ProductInput> {
    Ok(ProductInput {
        name: required_text("product name", &input.name, MAX_PRODUCT_NAME)?,
        category_id: input.category_id,
        brand: optional_text("brand", input.brand, MAX_BRAND)?,
        unit_price: input.unit_price,
        unit_measure: required_text("unit measure", &input.unit_measure, MAX_UNIT_MEASURE)?,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use grocer_core::Price;

    use super::*;

    fn product(name: &str, brand: Option<&str>, unit: &str) -> ProductInput {
        ProductInput {
            name: name.to_owned(),
            category_id: CategoryId::new(1),
            brand: brand.map(str::to_owned),
            unit_price: Price::from_cents(299).unwrap(),
            unit_measure: unit.to_owned(),
        }
    }

    #[test]
    fn test_normalize_category_trims() {
        let input = CategoryInput {
            name: "  Dairy ".to_owned(),
            description: Some("   ".to_owned()),
        };
        let normalized = normalize_category(input).unwrap();
        assert_eq!(normalized.name, "Dairy");
        assert_eq!(normalized.description, None);
    }

    #[test]
    fn test_normalize_category_rejects_blank_and_long_names() {
        let blank = CategoryInput {
            name: "   ".to_owned(),
            description: None,
        };
        assert!(matches!(
            normalize_category(blank),
            Err(AppError::Validation(_))
        ));

        let long = CategoryInput {
            name: "x".repeat(51),
            description: None,
        };
        assert!(matches!(
            normalize_category(long),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_normalize_product() {
        let normalized = normalize_product(product(" Whole Milk ", Some(" "), "gallon")).unwrap();
        assert_eq!(normalized.name, "Whole Milk");
        assert_eq!(normalized.brand, None);

        assert!(normalize_product(product("Milk", None, "  ")).is_err());
        assert!(normalize_product(product(&"m".repeat(101), None, "unit")).is_err());
    }
}

//! Product catalog commands.
//!
//! # Usage
//!
//! ```bash
//! grocer product list --category 1
//! grocer product list --search milk
//! grocer product create "Oat Milk" --category 1 --price 3.49 --unit carton
//! ```

use clap::{Args, Subcommand};
use tracing::info;

use grocer_core::{CategoryId, Price, ProductId};
use grocer_tracker::models::{Product, ProductInput};
use grocer_tracker::services::CatalogService;

use super::{CommandError, CommandResult, Context, brand_suffix};

#[derive(Subcommand)]
pub enum ProductAction {
    /// List products, optionally by category or name
    List {
        #[arg(short, long)]
        category: Option<CategoryId>,

        /// Case-insensitive name or brand fragment
        #[arg(short, long)]
        search: Option<String>,
    },
    /// Add a product to the catalog
    Create(ProductArgs),
    /// Replace a product's details
    Update {
        id: ProductId,

        #[command(flatten)]
        product: ProductArgs,
    },
    /// Remove a product
    Delete { id: ProductId },
}

#[derive(Args)]
pub struct ProductArgs {
    name: String,

    #[arg(short, long)]
    category: CategoryId,

    #[arg(short, long)]
    brand: Option<String>,

    /// Shelf price, e.g. 4.99
    #[arg(short, long)]
    price: Price,

    /// Unit of sale, e.g. lb, pack, gallon
    #[arg(short, long, default_value = "unit")]
    unit: String,
}

impl From<ProductArgs> for ProductInput {
    fn from(args: ProductArgs) -> Self {
        Self {
            name: args.name,
            category_id: args.category,
            brand: args.brand,
            unit_price: args.price,
            unit_measure: args.unit,
        }
    }
}

/// Run a product subcommand.
///
/// # Errors
///
/// Returns the tracker error for invalid input or unknown ids, and
/// `CommandError::InvalidArguments` when both filters are given.
pub async fn run(ctx: &Context, action: ProductAction) -> CommandResult {
    let catalog = CatalogService::new(&ctx.pool);

    match action {
        ProductAction::List { category, search } => {
            let products = match (category, search) {
                (Some(_), Some(_)) => {
                    return Err(CommandError::InvalidArguments(
                        "use either --category or --search, not both".to_owned(),
                    )
                    .into());
                }
                (Some(category_id), None) => catalog.products_in_category(category_id).await?,
                (None, Some(term)) => catalog.search_products(&term).await?,
                (None, None) => catalog.list_products().await?,
            };
            info!("{} product(s)", products.len());
            for product in &products {
                log_product(product);
            }
        }
        ProductAction::Create(args) => {
            let product = catalog.create_product(args.into()).await?;
            info!("Product created:");
            log_product(&product);
        }
        ProductAction::Update { id, product } => {
            let product = catalog.update_product(id, product.into()).await?;
            info!("Product updated:");
            log_product(&product);
        }
        ProductAction::Delete { id } => {
            catalog.delete_product(id).await?;
            info!("Product #{id} deleted");
        }
    }
    Ok(())
}

fn log_product(product: &Product) {
    info!(
        "  #{} {}{} [{}] {}/{}",
        product.id,
        product.name,
        brand_suffix(product.brand.as_deref()),
        product.category_name,
        product.unit_price,
        product.unit_measure
    );
}

//! Category management commands.

use clap::Subcommand;
use tracing::info;

use grocer_core::CategoryId;
use grocer_tracker::models::CategoryInput;
use grocer_tracker::services::CatalogService;

use super::{CommandResult, Context};

#[derive(Subcommand)]
pub enum CategoryAction {
    /// List all categories
    List,
    /// Create a category
    Create {
        name: String,

        #[arg(short, long)]
        description: Option<String>,
    },
    /// Rename or re-describe a category
    Update {
        id: CategoryId,

        name: String,

        #[arg(short, long)]
        description: Option<String>,
    },
    /// Delete a category with no products
    Delete { id: CategoryId },
}

/// Run a category subcommand.
///
/// # Errors
///
/// Returns the tracker error for invalid names, duplicates, unknown ids or
/// categories still holding products.
pub async fn run(ctx: &Context, action: CategoryAction) -> CommandResult {
    let catalog = CatalogService::new(&ctx.pool);

    match action {
        CategoryAction::List => {
            for category in catalog.list_categories().await? {
                info!(
                    "#{} {}  {}",
                    category.id,
                    category.name,
                    category.description.unwrap_or_default()
                );
            }
        }
        CategoryAction::Create { name, description } => {
            let category = catalog
                .create_category(CategoryInput { name, description })
                .await?;
            info!("Category created: #{} {}", category.id, category.name);
        }
        CategoryAction::Update {
            id,
            name,
            description,
        } => {
            let category = catalog
                .update_category(id, CategoryInput { name, description })
                .await?;
            info!("Category updated: #{} {}", category.id, category.name);
        }
        CategoryAction::Delete { id } => {
            catalog.delete_category(id).await?;
            info!("Category #{id} deleted");
        }
    }
    Ok(())
}

//! Shopping list commands.
//!
//! # Usage
//!
//! ```bash
//! grocer --user alice list create "Weekly shop"
//! grocer --user alice list add 1 --product 7 --quantity 2
//! grocer --user alice list show 1
//! grocer --user alice list convert 1
//! ```

use clap::Subcommand;
use rust_decimal::Decimal;
use tracing::info;

use grocer_core::{ProductId, Quantity, ShoppingListId, ShoppingListItemId, sum_amounts};
use grocer_tracker::services::ShoppingService;

use super::{CommandResult, Context, brand_suffix};

#[derive(Subcommand)]
pub enum ListAction {
    /// Start a new shopping list
    Create { name: String },
    /// Show your lists with progress
    Lists,
    /// Show the items on a list
    Show { id: ShoppingListId },
    /// Add a product (merges with an existing line)
    Add {
        id: ShoppingListId,

        #[arg(short, long)]
        product: ProductId,

        #[arg(short, long, default_value_t = Quantity::ONE)]
        quantity: Quantity,
    },
    /// Change an item's quantity
    Qty {
        item: ShoppingListItemId,
        quantity: Quantity,
    },
    /// Remove an item
    Remove { item: ShoppingListItemId },
    /// Mark an item purchased or not purchased
    Toggle { item: ShoppingListItemId },
    /// Delete a list
    Delete { id: ShoppingListId },
    /// Buy every unpurchased item as one completed order
    Convert { id: ShoppingListId },
}

/// Run a shopping list subcommand as the `--user`.
///
/// # Errors
///
/// Returns the tracker error for unknown ids, lists owned by someone else,
/// invalid quantities or an empty conversion.
pub async fn run(ctx: &Context, action: ListAction) -> CommandResult {
    let user = ctx.acting_user().await?;
    let shopping = ShoppingService::new(&ctx.pool);

    match action {
        ListAction::Create { name } => {
            let list = shopping.create_list(user.id, &name).await?;
            info!("Shopping list created: #{} {}", list.id, list.name);
        }
        ListAction::Lists => {
            for summary in shopping.lists_for_user(user.id).await? {
                info!(
                    "#{} {}{}  {}/{} purchased, created {}",
                    summary.list.id,
                    summary.list.name,
                    if summary.list.is_active { "" } else { " (done)" },
                    summary.purchased_items,
                    summary.total_items,
                    summary.list.created_at.format("%Y-%m-%d")
                );
            }
        }
        ListAction::Show { id } => {
            let list = shopping.get_list(user.id, id).await?;
            let entries = shopping.items(user.id, id).await?;
            info!("{} (#{})", list.name, list.id);
            for entry in &entries {
                info!(
                    "  [{}] #{} {} x {}{} @ {} = {}",
                    if entry.item.is_purchased { "x" } else { " " },
                    entry.item.id,
                    entry.item.quantity,
                    entry.product_name,
                    brand_suffix(entry.brand.as_deref()),
                    entry.unit_price,
                    entry.estimated_cost()
                );
            }
            let remaining: Decimal = sum_amounts(
                entries
                    .iter()
                    .filter(|e| !e.item.is_purchased)
                    .map(|e| e.estimated_cost()),
            );
            info!("Still to buy: {remaining}");
        }
        ListAction::Add {
            id,
            product,
            quantity,
        } => {
            let item = shopping.add_item(user.id, id, product, quantity).await?;
            info!("Item #{} now x {}", item.id, item.quantity);
        }
        ListAction::Qty { item, quantity } => {
            let item = shopping.set_item_quantity(user.id, item, quantity).await?;
            info!("Item #{} now x {}", item.id, item.quantity);
        }
        ListAction::Remove { item } => {
            shopping.remove_item(user.id, item).await?;
            info!("Item #{item} removed");
        }
        ListAction::Toggle { item } => {
            let item = shopping.toggle_item(user.id, item).await?;
            info!(
                "Item #{} marked {}",
                item.id,
                if item.is_purchased { "purchased" } else { "not purchased" }
            );
        }
        ListAction::Delete { id } => {
            shopping.delete_list(user.id, id).await?;
            info!("Shopping list #{id} deleted");
        }
        ListAction::Convert { id } => {
            let outcome = shopping.convert_to_order(user.id, id).await?;
            info!(
                "Order #{} created with {} item(s), total {}",
                outcome.order_id, outcome.line_count, outcome.total
            );
        }
    }
    Ok(())
}

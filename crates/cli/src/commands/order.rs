//! Order commands.
//!
//! Orders are normally produced by `list convert`; these commands build
//! one by hand or inspect history.

use clap::Subcommand;
use tracing::{info, warn};

use grocer_core::{OrderId, ProductId, Quantity};
use grocer_tracker::services::OrderService;

use super::{CommandResult, Context, brand_suffix};

#[derive(Subcommand)]
pub enum OrderAction {
    /// Start an empty open order
    Create,
    /// Add a product at its current price
    Add {
        id: OrderId,

        #[arg(short, long)]
        product: ProductId,

        #[arg(short, long, default_value_t = Quantity::ONE)]
        quantity: Quantity,
    },
    /// Mark an open order completed
    Complete { id: OrderId },
    /// Cancel an open order
    Cancel { id: OrderId },
    /// Show an order and its lines
    Show { id: OrderId },
    /// List your orders, newest first
    List,
    /// Delete an order
    Delete { id: OrderId },
    /// Verify every stored order total against its lines
    Check,
}

/// Run an order subcommand.
///
/// `check` is database-wide and needs no `--user`.
///
/// # Errors
///
/// Returns the tracker error for unknown ids, orders owned by someone else
/// or invalid status changes, and an error from `check` when any total is
/// inconsistent.
pub async fn run(ctx: &Context, action: OrderAction) -> CommandResult {
    let orders = OrderService::new(&ctx.pool);

    match action {
        OrderAction::Check => check_totals(&orders).await,
        action => run_for_user(ctx, &orders, action).await,
    }
}

async fn run_for_user(ctx: &Context, orders: &OrderService<'_>, action: OrderAction) -> CommandResult {
    let user = ctx.acting_user().await?;

    match action {
        OrderAction::Create => {
            let order = orders.create_order(user.id).await?;
            info!("Order #{} opened", order.id);
        }
        OrderAction::Add {
            id,
            product,
            quantity,
        } => {
            let detail = orders.add_item(user.id, id, product, quantity).await?;
            info!(
                "Added product #{} x {} @ {} = {}",
                detail.product_id, detail.quantity, detail.unit_price, detail.subtotal
            );
        }
        OrderAction::Complete { id } => {
            let order = orders.complete(user.id, id).await?;
            info!("Order #{} completed, total {}", order.id, order.total_amount);
        }
        OrderAction::Cancel { id } => {
            let order = orders.cancel(user.id, id).await?;
            info!("Order #{} cancelled", order.id);
        }
        OrderAction::Show { id } => {
            let order = orders.get_with_lines(user.id, id).await?;
            info!(
                "Order #{} ({}) on {}",
                order.order.id,
                order.order.status,
                order.order.order_date.format("%Y-%m-%d %H:%M")
            );
            for line in &order.lines {
                info!(
                    "  {} x {}{} [{}] @ {} = {}",
                    line.detail.quantity,
                    line.product_name,
                    brand_suffix(line.brand.as_deref()),
                    line.category_name,
                    line.detail.unit_price,
                    line.detail.subtotal
                );
            }
            info!("Total: {}", order.order.total_amount);
        }
        OrderAction::List => {
            for order in orders.orders_for_user(user.id).await? {
                info!(
                    "#{} {} {:>10} {}",
                    order.id,
                    order.order_date.format("%Y-%m-%d"),
                    order.total_amount,
                    order.status
                );
            }
        }
        OrderAction::Delete { id } => {
            orders.delete(user.id, id).await?;
            info!("Order #{id} deleted");
        }
        OrderAction::Check => check_totals(orders).await?,
    }
    Ok(())
}

async fn check_totals(orders: &OrderService<'_>) -> CommandResult {
    let mismatches = orders.check_totals().await?;
    if mismatches.is_empty() {
        info!("All order totals match their details");
        return Ok(());
    }
    for m in &mismatches {
        warn!(
            "  Order #{}: recorded {}, details sum to {}",
            m.order_id, m.recorded, m.computed
        );
    }
    Err(format!("{} order total(s) inconsistent", mismatches.len()).into())
}

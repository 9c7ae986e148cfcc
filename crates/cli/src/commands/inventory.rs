//! Home inventory commands.
//!
//! # Usage
//!
//! ```bash
//! grocer --user alice inventory add --product 1 --quantity 2 --expires 2026-11-02 --location refrigerator
//! grocer --user alice inventory list --location pantry
//! grocer --user alice inventory use 4 --amount 1
//! grocer --user alice inventory alerts
//! grocer --user alice inventory restock
//! ```

use chrono::NaiveDate;
use clap::Subcommand;
use tracing::{info, warn};

use grocer_core::{InventoryItemId, ProductId, Quantity, StorageLocation};
use grocer_tracker::models::{
    ExpiryAlert, InventoryEntry, InventoryItem, InventoryItemInput, InventoryItemUpdate,
};
use grocer_tracker::services::InventoryService;

use super::{CommandResult, Context, brand_suffix};

#[derive(Subcommand)]
pub enum InventoryAction {
    /// Record a product at home
    Add {
        #[arg(short, long)]
        product: ProductId,

        #[arg(short, long, default_value_t = 1)]
        quantity: i32,

        /// Threshold at or below which the item counts as low on stock
        #[arg(short, long, default_value_t = 2)]
        min: i32,

        /// Expiry date (YYYY-MM-DD)
        #[arg(short, long)]
        expires: Option<NaiveDate>,

        #[arg(short, long, default_value_t = StorageLocation::Pantry)]
        location: StorageLocation,

        #[arg(short, long)]
        notes: Option<String>,
    },
    /// Show what's at home
    List {
        #[arg(short, long)]
        location: Option<StorageLocation>,

        /// Case-insensitive product name fragment
        #[arg(short, long)]
        search: Option<String>,
    },
    /// Change an item; unspecified fields keep their value
    Update {
        id: InventoryItemId,

        #[arg(short, long)]
        quantity: Option<i32>,

        #[arg(short, long)]
        min: Option<i32>,

        #[arg(short, long, conflicts_with = "clear_expiry")]
        expires: Option<NaiveDate>,

        /// Remove the expiry date
        #[arg(long)]
        clear_expiry: bool,

        #[arg(short, long)]
        location: Option<StorageLocation>,

        #[arg(short, long)]
        notes: Option<String>,
    },
    /// Use up some of an item
    Use {
        id: InventoryItemId,

        #[arg(short, long, default_value_t = Quantity::ONE)]
        amount: Quantity,
    },
    /// Remove an item
    Delete { id: InventoryItemId },
    /// Expired, expiring, low and empty items
    Alerts,
    /// Counts per location and category
    Summary,
    /// Add low-stock items to your shopping list
    Restock,
}

/// Run an inventory subcommand as the `--user`.
///
/// # Errors
///
/// Returns the tracker error for unknown ids, items owned by someone else,
/// negative quantities or a restock with nothing low.
pub async fn run(ctx: &Context, action: InventoryAction) -> CommandResult {
    let user = ctx.acting_user().await?;
    let inventory =
        InventoryService::new(&ctx.pool).with_expiry_warning_days(ctx.config.expiry_warning_days);

    match action {
        InventoryAction::Add {
            product,
            quantity,
            min,
            expires,
            location,
            notes,
        } => {
            let item = inventory
                .add(
                    user.id,
                    InventoryItemInput {
                        product_id: product,
                        quantity,
                        min_quantity: min,
                        expiry_date: expires,
                        location,
                        notes,
                    },
                )
                .await?;
            log_item("Inventory item added:", &item);
        }
        InventoryAction::List { location, search } => {
            let entries = inventory
                .items_for_user(user.id, location, search.as_deref())
                .await?;
            info!("{} item(s)", entries.len());
            for entry in &entries {
                log_entry(entry);
            }
        }
        InventoryAction::Update {
            id,
            quantity,
            min,
            expires,
            clear_expiry,
            location,
            notes,
        } => {
            let current = inventory.get(user.id, id).await?;
            let mut update = InventoryItemUpdate::from_item(&current);
            if let Some(quantity) = quantity {
                update.quantity = quantity;
            }
            if let Some(min) = min {
                update.min_quantity = min;
            }
            if clear_expiry {
                update.expiry_date = None;
            } else if expires.is_some() {
                update.expiry_date = expires;
            }
            if let Some(location) = location {
                update.location = location;
            }
            if notes.is_some() {
                update.notes = notes;
            }
            let item = inventory.update(user.id, id, update).await?;
            log_item("Inventory item updated:", &item);
        }
        InventoryAction::Use { id, amount } => {
            let item = inventory.consume(user.id, id, amount).await?;
            if item.is_out_of_stock() {
                warn!("Item #{} is now out of stock", item.id);
            } else if item.is_low_stock() {
                warn!("Item #{} is low: {} left", item.id, item.quantity);
            } else {
                info!("Item #{}: {} left", item.id, item.quantity);
            }
        }
        InventoryAction::Delete { id } => {
            inventory.delete(user.id, id).await?;
            info!("Inventory item #{id} deleted");
        }
        InventoryAction::Alerts => {
            let alerts = inventory.alerts(user.id).await?;
            if alerts.is_empty() {
                info!("Nothing needs attention");
                return Ok(());
            }
            log_alerts("Expired", &alerts.expired, "day(s) ago");
            log_alerts("Expiring soon", &alerts.expiring_soon, "day(s) left");
            if !alerts.low_stock.is_empty() {
                warn!("Low stock:");
                for entry in &alerts.low_stock {
                    log_entry(entry);
                }
            }
            if !alerts.out_of_stock.is_empty() {
                warn!("Out of stock:");
                for entry in &alerts.out_of_stock {
                    log_entry(entry);
                }
            }
        }
        InventoryAction::Summary => {
            let summary = inventory.summary(user.id).await?;
            info!(
                "{} item(s), {} unit(s) in total",
                summary.total_items, summary.total_quantity
            );
            info!(
                "Expired: {}  Expiring soon: {}  Low: {}  Out: {}",
                summary.expired_count,
                summary.expiring_soon_count,
                summary.low_stock_count,
                summary.out_of_stock_count
            );
            info!("By location:");
            for row in inventory.by_location(user.id).await? {
                info!("  {:<14} {} item(s), {} unit(s)", row.location, row.item_count, row.total_quantity);
            }
            info!("By category:");
            for row in inventory.by_category(user.id).await? {
                info!("  {:<14} {} item(s), {} unit(s)", row.category_name, row.item_count, row.total_quantity);
            }
        }
        InventoryAction::Restock => {
            let outcome = inventory.restock_low_stock(user.id).await?;
            info!(
                "{} item(s) added to {} list #{}",
                outcome.items_added,
                if outcome.created_list { "new" } else { "existing" },
                outcome.list_id
            );
        }
    }
    Ok(())
}

fn log_item(heading: &str, item: &InventoryItem) {
    info!("{heading}");
    info!(
        "  #{} product #{} x {} (min {}) in {}{}",
        item.id,
        item.product_id,
        item.quantity,
        item.min_quantity,
        item.location,
        item.expiry_date
            .map_or_else(String::new, |d| format!(", expires {d}"))
    );
}

fn log_entry(entry: &InventoryEntry) {
    info!(
        "  #{} {}{} x {} {} [{}] in {}{}",
        entry.item.id,
        entry.product_name,
        brand_suffix(entry.brand.as_deref()),
        entry.item.quantity,
        entry.unit_measure,
        entry.category_name,
        entry.item.location,
        entry
            .item
            .expiry_date
            .map_or_else(String::new, |d| format!(", expires {d}"))
    );
}

fn log_alerts(heading: &str, alerts: &[ExpiryAlert], unit: &str) {
    if alerts.is_empty() {
        return;
    }
    warn!("{heading}:");
    for alert in alerts {
        warn!(
            "  #{} {} ({} {unit})",
            alert.entry.item.id, alert.entry.product_name, alert.days
        );
    }
}

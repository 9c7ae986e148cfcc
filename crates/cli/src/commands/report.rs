//! Spending reports and suggestions.
//!
//! Only completed orders count towards spending.

use chrono::NaiveDate;
use clap::Subcommand;
use tracing::info;

use grocer_tracker::models::DateRange;
use grocer_tracker::services::AnalyticsService;
use grocer_tracker::services::analytics::{
    DEFAULT_DAILY_WINDOW, DEFAULT_SUGGESTIONS, DEFAULT_TOP_PRODUCTS,
};

use super::{CommandError, CommandResult, Context, brand_suffix};

#[derive(Subcommand)]
pub enum ReportAction {
    /// Lifetime spending, order count and average order
    Summary,
    /// Spending per category
    Category {
        /// First day included (YYYY-MM-DD)
        #[arg(long)]
        from: Option<NaiveDate>,

        /// Last day included (YYYY-MM-DD)
        #[arg(long)]
        to: Option<NaiveDate>,
    },
    /// Spending per month
    Monthly {
        #[arg(short, long)]
        year: Option<i32>,
    },
    /// Most purchased products
    Top {
        #[arg(short, long, default_value_t = DEFAULT_TOP_PRODUCTS)]
        limit: u32,
    },
    /// Spending per day over a recent window
    Daily {
        #[arg(short, long, default_value_t = DEFAULT_DAILY_WINDOW)]
        days: u32,
    },
    /// Products from your favourite categories you haven't bought lately
    Suggest {
        #[arg(short, long, default_value_t = DEFAULT_SUGGESTIONS)]
        limit: u32,
    },
}

/// Run a report subcommand as the `--user`.
///
/// # Errors
///
/// Returns `CommandError::InvalidArguments` for an inverted date range and
/// the tracker error for a zero limit or a failed query.
pub async fn run(ctx: &Context, action: ReportAction) -> CommandResult {
    let user = ctx.acting_user().await?;
    let analytics = AnalyticsService::new(&ctx.pool)
        .with_suggestion_lookback_days(ctx.config.suggestion_lookback_days);

    match action {
        ReportAction::Summary => {
            let totals = analytics.total_spending(user.id).await?;
            info!("Total spent:   {}", totals.total_spent);
            info!("Orders:        {}", totals.order_count);
            info!("Average order: {}", totals.average_order_value());
        }
        ReportAction::Category { from, to } => {
            let range = DateRange::new(from, to)
                .map_err(|e| CommandError::InvalidArguments(e.to_string()))?;
            for row in analytics.spending_by_category(user.id, range).await? {
                info!("  {:<20} {:>10}", row.category_name, row.total_spent);
            }
        }
        ReportAction::Monthly { year } => {
            for row in analytics.monthly_spending(user.id, year).await? {
                info!(
                    "  {} {:>10} ({} order(s))",
                    row.month, row.total_spent, row.order_count
                );
            }
        }
        ReportAction::Top { limit } => {
            for row in analytics.most_purchased(user.id, limit).await? {
                info!(
                    "  {:>4} x {}{} [{}] in {} order(s)",
                    row.total_quantity,
                    row.product_name,
                    brand_suffix(row.brand.as_deref()),
                    row.category_name,
                    row.order_count
                );
            }
        }
        ReportAction::Daily { days } => {
            for row in analytics.daily_spending(user.id, days).await? {
                info!("  {} {:>10}", row.day, row.total_spent);
            }
        }
        ReportAction::Suggest { limit } => {
            let suggestions = analytics.suggested_products(user.id, limit).await?;
            if suggestions.is_empty() {
                info!("No suggestions yet; complete a few orders first");
            }
            for s in &suggestions {
                info!(
                    "  #{} {}{} [{}] {}",
                    s.product_id,
                    s.product_name,
                    brand_suffix(s.brand.as_deref()),
                    s.category_name,
                    s.unit_price
                );
            }
        }
    }
    Ok(())
}

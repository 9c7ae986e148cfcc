//! Grocer CLI - migrations, seeding and day-to-day grocery tracking.
//!
//! # Usage
//!
//! ```bash
//! # Create the schema and load the sample catalog
//! grocer migrate
//! grocer seed
//!
//! # Register and work as a user
//! grocer user create -u alice -e alice@example.com -p hunter2hunter2
//! grocer --user alice list create "Weekly shop"
//! grocer --user alice list add 1 --product 3 --quantity 2
//! grocer --user alice list convert 1
//!
//! # Reports
//! grocer --user alice report summary
//! ```
//!
//! # Environment Variables
//!
//! See `grocer_tracker::config`. `RUST_LOG` overrides the default log filter.

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use grocer_tracker::TrackerConfig;
use grocer_tracker::config::LogFormat;

mod commands;

use commands::Context;

#[derive(Parser)]
#[command(name = "grocer")]
#[command(author, version, about = "Grocery lists, orders, inventory and spending")]
struct Cli {
    /// Username to act as (required for list, order, inventory and report)
    #[arg(long, global = true)]
    user: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Load the sample catalog and demo user
    Seed {
        /// YAML catalog to load instead of the bundled one
        #[arg(short, long)]
        file: Option<String>,
    },
    /// Manage users
    User {
        #[command(subcommand)]
        action: commands::user::UserAction,
    },
    /// Manage product categories
    Category {
        #[command(subcommand)]
        action: commands::category::CategoryAction,
    },
    /// Manage catalog products
    Product {
        #[command(subcommand)]
        action: commands::product::ProductAction,
    },
    /// Manage shopping lists
    List {
        #[command(subcommand)]
        action: commands::list::ListAction,
    },
    /// Manage orders
    Order {
        #[command(subcommand)]
        action: commands::order::OrderAction,
    },
    /// Manage the home inventory
    Inventory {
        #[command(subcommand)]
        action: commands::inventory::InventoryAction,
    },
    /// Spending reports and suggestions
    Report {
        #[command(subcommand)]
        action: commands::report::ReportAction,
    },
}

#[tokio::main]
async fn main() {
    let config = TrackerConfig::from_env();
    init_tracing(
        config
            .as_ref()
            .map_or(LogFormat::Pretty, |config| config.log_format),
    );

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = match config {
        Ok(config) => run(cli, config).await,
        Err(e) => Err(e.into()),
    };

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("grocer=info,grocer_tracker=info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    match format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Pretty => builder.without_time().with_target(false).init(),
    }
}

async fn run(cli: Cli, config: TrackerConfig) -> Result<(), Box<dyn std::error::Error>> {
    let ctx = Context::connect(config, cli.user).await?;

    match cli.command {
        Commands::Migrate => commands::migrate::run(&ctx).await?,
        Commands::Seed { file } => commands::seed::run(&ctx, file.as_deref()).await?,
        Commands::User { action } => commands::user::run(&ctx, action).await?,
        Commands::Category { action } => commands::category::run(&ctx, action).await?,
        Commands::Product { action } => commands::product::run(&ctx, action).await?,
        Commands::List { action } => commands::list::run(&ctx, action).await?,
        Commands::Order { action } => commands::order::run(&ctx, action).await?,
        Commands::Inventory { action } => commands::inventory::run(&ctx, action).await?,
        Commands::Report { action } => commands::report::run(&ctx, action).await?,
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_global_user_flag() {
        let cli = Cli::try_parse_from(["grocer", "list", "lists", "--user", "alice"]);
        assert!(cli.is_ok_and(|cli| cli.user.as_deref() == Some("alice")));
    }
}

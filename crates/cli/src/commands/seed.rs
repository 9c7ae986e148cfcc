//! Seed the database with the sample catalog.
//!
//! # Usage
//!
//! ```bash
//! # Bundled catalog (10 categories, 50 products, demo_user)
//! grocer seed
//!
//! # Custom catalog
//! grocer seed --file my-catalog.yaml
//! ```
//!
//! Seeding does nothing when categories already exist.

use std::path::Path;

use tracing::{error, info};

use grocer_tracker::seed::{self, DEFAULT_CATALOG, SeedError};

use super::{CommandResult, Context};

/// Load a catalog file (or the bundled one) into the database.
///
/// # Errors
///
/// Returns an error if the file cannot be read, fails validation, or an
/// insert fails.
pub async fn run(ctx: &Context, file: Option<&str>) -> CommandResult {
    let content = match file {
        Some(file_path) => {
            let path = Path::new(file_path);
            if !path.exists() {
                return Err(format!("File not found: {file_path}").into());
            }
            info!(path = %file_path, "Loading catalog from file");
            tokio::fs::read_to_string(path).await?
        }
        None => {
            info!("Loading bundled catalog");
            DEFAULT_CATALOG.to_owned()
        }
    };

    let catalog = match seed::parse_catalog(&content) {
        Ok(catalog) => catalog,
        Err(SeedError::Invalid(problems)) => {
            error!("Catalog validation failed:");
            for problem in &problems {
                error!("  - {problem}");
            }
            return Err(format!("{} validation errors found", problems.len()).into());
        }
        Err(e) => return Err(e.into()),
    };

    info!(
        categories = catalog.categories.len(),
        products = catalog.product_count(),
        "Parsed catalog"
    );

    let report = seed::seed_catalog(&ctx.pool, &catalog).await?;
    if report.skipped {
        info!("Database already has a catalog; nothing to do");
        return Ok(());
    }

    info!("Seeding complete!");
    info!("  Categories inserted: {}", report.categories);
    info!("  Products inserted: {}", report.products);
    if report.demo_user_created {
        info!("  Demo user created");
    }
    Ok(())
}

//! Database migration command.
//!
//! # Usage
//!
//! ```bash
//! grocer migrate
//! ```
//!
//! Migrations are embedded in `grocer-tracker` (`crates/tracker/migrations/`)
//! and applied in order; already-applied migrations are skipped.

use tracing::info;

use grocer_tracker::db;

use super::{CommandResult, Context};

/// Apply all pending migrations.
///
/// # Errors
///
/// Returns an error if a migration fails.
pub async fn run(ctx: &Context) -> CommandResult {
    info!("Running migrations...");
    db::run_migrations(&ctx.pool).await?;
    info!(
        migrations = db::MIGRATOR.iter().count(),
        "Migrations complete!"
    );
    Ok(())
}

//! Subcommand implementations.
//!
//! Each module owns its clap `Subcommand` enum and a `run` entry point.
//! Results are reported through `tracing`, like every other operator-facing
//! message.

pub mod category;
pub mod inventory;
pub mod list;
pub mod migrate;
pub mod order;
pub mod product;
pub mod report;
pub mod seed;
pub mod user;

use sqlx::PgPool;
use thiserror::Error;

use grocer_tracker::TrackerConfig;
use grocer_tracker::db;
use grocer_tracker::models::User;
use grocer_tracker::services::AuthService;

/// Result type shared by every command.
pub type CommandResult = Result<(), Box<dyn std::error::Error>>;

/// Errors raised by the CLI itself rather than the tracker.
#[derive(Debug, Error)]
pub enum CommandError {
    /// A per-user command was run without `--user`.
    #[error("this command needs --user <NAME>")]
    MissingUser,

    /// Arguments that parse individually but don't make sense together.
    #[error("{0}")]
    InvalidArguments(String),
}

/// Shared state for one CLI invocation.
pub struct Context {
    pub pool: PgPool,
    pub config: TrackerConfig,
    username: Option<String>,
}

impl Context {
    /// Open the connection pool.
    ///
    /// # Errors
    ///
    /// Returns `sqlx::Error` if the database is unreachable.
    pub async fn connect(config: TrackerConfig, username: Option<String>) -> Result<Self, sqlx::Error> {
        tracing::debug!("Connecting to database...");
        let pool = db::create_pool(&config).await?;
        Ok(Self {
            pool,
            config,
            username,
        })
    }

    /// The user named by `--user`.
    ///
    /// # Errors
    ///
    /// Returns `CommandError::MissingUser` without `--user`, or the tracker's
    /// `NotFound` if no such user exists.
    pub async fn acting_user(&self) -> Result<User, Box<dyn std::error::Error>> {
        let username = self.username.as_deref().ok_or(CommandError::MissingUser)?;
        Ok(AuthService::new(&self.pool).get_by_username(username).await?)
    }
}

/// Render an optional brand as a suffix, e.g. `" (Chobani)"`.
pub fn brand_suffix(brand: Option<&str>) -> String {
    brand.map_or_else(String::new, |b| format!(" ({b})"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_brand_suffix() {
        assert_eq!(brand_suffix(Some("Chobani")), " (Chobani)");
        assert_eq!(brand_suffix(None), "");
    }

    #[test]
    fn test_missing_user_message() {
        assert_eq!(
            CommandError::MissingUser.to_string(),
            "this command needs --user <NAME>"
        );
    }
}

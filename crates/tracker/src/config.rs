//! Tracker configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `GROCER_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)
//!
//! ## Optional
//! - `GROCER_DB_MAX_CONNECTIONS` - Pool size (default: 5)
//! - `GROCER_DB_ACQUIRE_TIMEOUT_SECS` - Pool acquire timeout (default: 10)
//! - `GROCER_EXPIRY_WARNING_DAYS` - "Expiring soon" window for inventory (default: 7)
//! - `GROCER_SUGGESTION_LOOKBACK_DAYS` - Products bought within this many days
//!   are not suggested again (default: 30)
//! - `GROCER_LOG_FORMAT` - `pretty` or `json` (default: pretty)

use std::str::FromStr;
use std::time::Duration;

use secrecy::SecretString;
use thiserror::Error;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Output format for the tracing subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pretty" | "text" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(format!("expected 'pretty' or 'json', got '{other}'")),
        }
    }
}

/// Tracker configuration.
///
/// `Debug` is derived; `SecretString` redacts the database URL.
#[derive(Debug, Clone)]
pub struct TrackerConfig {
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: SecretString,
    /// Maximum pooled connections
    pub max_connections: u32,
    /// How long to wait for a pooled connection
    pub acquire_timeout: Duration,
    /// Days ahead that count as "expiring soon"
    pub expiry_warning_days: u32,
    /// Days of purchase history that suppress a product suggestion
    pub suggestion_lookback_days: u32,
    /// Log output format
    pub log_format: LogFormat,
}

impl TrackerConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the database URL is missing or any optional
    /// variable fails to parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let database_url = get_database_url("GROCER_DATABASE_URL")?;
        let max_connections = get_parsed_or_default("GROCER_DB_MAX_CONNECTIONS", 5_u32)?;
        let acquire_timeout_secs = get_parsed_or_default("GROCER_DB_ACQUIRE_TIMEOUT_SECS", 10_u64)?;
        let expiry_warning_days = get_parsed_or_default("GROCER_EXPIRY_WARNING_DAYS", 7_u32)?;
        let suggestion_lookback_days =
            get_parsed_or_default("GROCER_SUGGESTION_LOOKBACK_DAYS", 30_u32)?;
        let log_format = get_parsed_or_default("GROCER_LOG_FORMAT", LogFormat::Pretty)?;

        if max_connections == 0 {
            return Err(ConfigError::InvalidEnvVar(
                "GROCER_DB_MAX_CONNECTIONS".to_string(),
                "must be at least 1".to_string(),
            ));
        }

        Ok(Self {
            database_url,
            max_connections,
            acquire_timeout: Duration::from_secs(acquire_timeout_secs),
            expiry_warning_days,
            suggestion_lookback_days,
            log_format,
        })
    }

    /// Build a configuration with defaults around an explicit database URL.
    ///
    /// Used by tests and tools that already know where the database is.
    #[must_use]
    pub fn with_database_url(database_url: impl Into<String>) -> Self {
        Self {
            database_url: SecretString::from(database_url.into()),
            max_connections: 5,
            acquire_timeout: Duration::from_secs(10),
            expiry_warning_days: 7,
            suggestion_lookback_days: 30,
            log_format: LogFormat::Pretty,
        }
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get database URL with fallback to generic `DATABASE_URL`.
fn get_database_url(primary_key: &str) -> Result<SecretString, ConfigError> {
    if let Ok(value) = std::env::var(primary_key) {
        return Ok(SecretString::from(value));
    }
    if let Ok(value) = std::env::var("DATABASE_URL") {
        return Ok(SecretString::from(value));
    }
    Err(ConfigError::MissingEnvVar(primary_key.to_string()))
}

/// Parse an optional environment variable, falling back to `default` when unset.
fn get_parsed_or_default<T>(key: &str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    std::env::var(key).map_or(Ok(default), |raw| parse_value(key, &raw))
}

fn parse_value<T>(key: &str, raw: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use secrecy::ExposeSecret;

    use super::*;

    #[test]
    fn test_parse_value_ok() {
        let n: u32 = parse_value("GROCER_DB_MAX_CONNECTIONS", " 12 ").unwrap();
        assert_eq!(n, 12);
    }

    #[test]
    fn test_parse_value_reports_key() {
        let err = parse_value::<u32>("GROCER_DB_MAX_CONNECTIONS", "lots").unwrap_err();
        match err {
            ConfigError::InvalidEnvVar(key, _) => assert_eq!(key, "GROCER_DB_MAX_CONNECTIONS"),
            ConfigError::MissingEnvVar(_) => panic!("wrong variant"),
        }
    }

    #[test]
    fn test_log_format_parse() {
        assert_eq!("JSON".parse::<LogFormat>().unwrap(), LogFormat::Json);
        assert_eq!("pretty".parse::<LogFormat>().unwrap(), LogFormat::Pretty);
        assert!("xml".parse::<LogFormat>().is_err());
    }

    #[test]
    fn test_with_database_url_defaults() {
        let config = TrackerConfig::with_database_url("postgres://localhost/grocer");
        assert_eq!(config.database_url.expose_secret(), "postgres://localhost/grocer");
        assert_eq!(config.max_connections, 5);
        assert_eq!(config.expiry_warning_days, 7);
        assert_eq!(config.suggestion_lookback_days, 30);
        assert_eq!(config.log_format, LogFormat::Pretty);
    }

    #[test]
    fn test_negative_days_rejected() {
        assert!(parse_value::<u32>("GROCER_EXPIRY_WARNING_DAYS", "-3").is_err());
    }

    #[test]
    fn test_debug_redacts_url() {
        let config = TrackerConfig::with_database_url("postgres://user:hunter2@db/grocer");
        let debug = format!("{config:?}");
        assert!(!debug.contains("hunter2"));
    }
}

//! Unified error handling for tracker services.
//!
//! Every service method returns `Result<T, AppError>`. The four domain kinds
//! (`NotFound`, `Authorization`, `Validation`, `ConflictOrEmpty`) are handled
//! per request by the caller; none of them is retried.

use thiserror::Error;

use crate::db::RepositoryError;

/// Application-level error type.
#[derive(Debug, Error)]
pub enum AppError {
    /// A referenced record does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// The acting user does not own the record, or credentials are wrong.
    #[error("Not authorized: {0}")]
    Authorization(String),

    /// Invalid input (quantity, price, name, duplicate username, ...).
    #[error("Validation failed: {0}")]
    Validation(String),

    /// The operation conflicts with current state (empty list, closed order,
    /// category still in use, ...).
    #[error("Conflict: {0}")]
    ConflictOrEmpty(String),

    /// Database operation failed.
    #[error("Database error: {0}")]
    Repository(RepositoryError),

    /// Password hashing failed.
    #[error("Password hashing error")]
    PasswordHash,
}

impl From<RepositoryError> for AppError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound => Self::NotFound("record not found".to_owned()),
            RepositoryError::Conflict(msg) => Self::ConflictOrEmpty(msg),
            other => Self::Repository(other),
        }
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        RepositoryError::from(err).into()
    }
}

impl AppError {
    /// Short machine-readable kind, used as a structured logging field.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "not_found",
            Self::Authorization(_) => "authorization",
            Self::Validation(_) => "validation",
            Self::ConflictOrEmpty(_) => "conflict_or_empty",
            Self::Repository(_) | Self::PasswordHash => "internal",
        }
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Build a `Validation` error from anything displayable.
pub(crate) fn invalid(err: impl std::fmt::Display) -> AppError {
    AppError::Validation(err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_error_display() {
        let err = AppError::NotFound("shopping list 4".to_string());
        assert_eq!(err.to_string(), "Not found: shopping list 4");

        let err = AppError::ConflictOrEmpty("shopping list has no unpurchased items".to_string());
        assert_eq!(
            err.to_string(),
            "Conflict: shopping list has no unpurchased items"
        );
    }

    #[test]
    fn test_repository_error_mapping() {
        assert!(matches!(
            AppError::from(RepositoryError::NotFound),
            AppError::NotFound(_)
        ));
        assert!(matches!(
            AppError::from(RepositoryError::Conflict("dup".to_owned())),
            AppError::ConflictOrEmpty(msg) if msg == "dup"
        ));
        assert!(matches!(
            AppError::from(RepositoryError::DataCorruption("bad".to_owned())),
            AppError::Repository(_)
        ));
    }

    #[test]
    fn test_kind() {
        assert_eq!(AppError::Authorization("x".into()).kind(), "authorization");
        assert_eq!(AppError::Validation("x".into()).kind(), "validation");
        assert_eq!(AppError::PasswordHash.kind(), "internal");
    }
}

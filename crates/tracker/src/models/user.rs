//! User domain types.

use chrono::{DateTime, Utc};
use serde::Serialize;

use grocer_core::{Email, UserId, Username};

/// A registered user.
///
/// The password hash never leaves the repository layer.
#[derive(Debug, Clone, Serialize)]
pub struct User {
    /// Unique user ID.
    pub id: UserId,
    /// Login name.
    pub username: Username,
    /// Contact email.
    pub email: Email,
    /// When the account was created.
    pub created_at: DateTime<Utc>,
}

//! Registration and password login.

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use sqlx::PgPool;
use tracing::{info, warn};

use grocer_core::{Email, UserId, Username};

use crate::db::{RepositoryError, UserRepository};
use crate::error::{AppError, Result, invalid};
use crate::models::User;

/// Minimum password length in characters.
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Message for every failed login, so callers cannot probe for usernames.
const INVALID_CREDENTIALS: &str = "invalid username or password";

/// Authentication service.
pub struct AuthService<'a> {
    users: UserRepository<'a>,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            users: UserRepository::new(pool),
        }
    }

    /// Register a new user.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Validation` if the username, email or password is
    /// invalid, or if the username or email is already registered.
    pub async fn register(&self, username: &str, email: &str, password: &str) -> Result<User> {
        let username = Username::parse(username).map_err(invalid)?;
        let email = Email::parse(email).map_err(invalid)?;
        validate_password(password)?;

        let password_hash = hash_password(password)?;

        let user = self
            .users
            .create(&username, &email, &password_hash)
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(msg) => AppError::Validation(msg),
                other => AppError::from(other),
            })?;

        info!(user_id = %user.id, username = %user.username, "User registered");
        Ok(user)
    }

    /// Check a username and password.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Authorization` if the user doesn't exist or the
    /// password is wrong; both cases produce the same message.
    pub async fn authenticate(&self, username: &str, password: &str) -> Result<User> {
        let Ok(username) = Username::parse(username) else {
            return Err(AppError::Authorization(INVALID_CREDENTIALS.to_owned()));
        };

        let Some((user, password_hash)) = self.users.get_with_password_hash(&username).await?
        else {
            warn!(username = %username, "Login failed: unknown user");
            return Err(AppError::Authorization(INVALID_CREDENTIALS.to_owned()));
        };

        if !verify_password(password, &password_hash) {
            warn!(user_id = %user.id, "Login failed: wrong password");
            return Err(AppError::Authorization(INVALID_CREDENTIALS.to_owned()));
        }

        Ok(user)
    }

    /// Get a user by ID.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` if the user doesn't exist.
    pub async fn get_by_id(&self, id: UserId) -> Result<User> {
        self.users
            .get_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("user {id}")))
    }

    /// Get a user by login name.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` if the user doesn't exist.
    pub async fn get_by_username(&self, username: &str) -> Result<User> {
        let parsed = Username::parse(username).map_err(invalid)?;
        self.users
            .get_by_username(&parsed)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("user '{username}'")))
    }

    /// List all users.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Repository` if the query fails.
    pub async fn list_all(&self) -> Result<Vec<User>> {
        Ok(self.users.list_all().await?)
    }
}

/// Validate password meets requirements.
fn validate_password(password: &str) -> Result<()> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(AppError::Validation(format!(
            "password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }
    Ok(())
}

/// Hash a password using Argon2id.
pub(crate) fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AppError::PasswordHash)
}

/// Verify a password against a stored PHC hash. A malformed hash never
/// verifies.
fn verify_password(password: &str, hash: &str) -> bool {
    let Ok(parsed_hash) = PasswordHash::new(hash) else {
        return false;
    };

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok()
}

//! User management commands.
//!
//! # Usage
//!
//! ```bash
//! grocer user create -u alice -e alice@example.com -p 'correct horse'
//! grocer user list
//! grocer user login -u alice -p 'correct horse'
//! ```

use clap::Subcommand;
use tracing::info;

use grocer_tracker::services::AuthService;

use super::{CommandResult, Context};

#[derive(Subcommand)]
pub enum UserAction {
    /// Register a new user
    Create {
        /// Username (3-50 characters: letters, digits, `_`, `-`)
        #[arg(short, long)]
        username: String,

        /// Email address
        #[arg(short, long)]
        email: String,

        /// Password (at least 8 characters)
        #[arg(short, long)]
        password: String,
    },
    /// List all users
    List,
    /// Check a username and password
    Login {
        #[arg(short, long)]
        username: String,

        #[arg(short, long)]
        password: String,
    },
}

/// Run a user subcommand.
///
/// # Errors
///
/// Returns the tracker error for invalid input, duplicates or bad
/// credentials.
pub async fn run(ctx: &Context, action: UserAction) -> CommandResult {
    let auth = AuthService::new(&ctx.pool);

    match action {
        UserAction::Create {
            username,
            email,
            password,
        } => {
            let user = auth.register(&username, &email, &password).await?;
            info!("User created! ID: {}, Username: {}", user.id, user.username);
        }
        UserAction::List => {
            let users = auth.list_all().await?;
            info!("{} user(s)", users.len());
            for user in users {
                info!(
                    "  #{} {} <{}> joined {}",
                    user.id,
                    user.username,
                    user.email,
                    user.created_at.format("%Y-%m-%d")
                );
            }
        }
        UserAction::Login { username, password } => {
            let user = auth.authenticate(&username, &password).await?;
            info!("Login OK: {} (ID {})", user.username, user.id);
        }
    }
    Ok(())
}

//! Account management commands.
//!
//! # Usage
//!
//! ```bash
//! # Password is read from the first line of stdin
//! echo 'S3cure-pass' | finmate-cli account create -e user@example.com
//! ```
//!
//! Accounts created here skip the signup form's password policy but still
//! get an Argon2id hash and the store's duplicate-email check.

use std::io::BufRead;

use thiserror::Error;

use finmate_core::{AccountId, Email, EmailError};
use finmate_web::db::{PgAccountStore, create_pool};
use finmate_web::services::auth::{AuthError, AuthService};

use super::{CommandError, database_url};

/// Errors that can occur during account operations.
#[derive(Debug, Error)]
pub enum AccountError {
    #[error(transparent)]
    Command(#[from] CommandError),

    /// Invalid email.
    #[error("Invalid email {0}: {1}")]
    InvalidEmail(String, EmailError),

    /// Nothing usable on stdin.
    #[error("Password must be provided on stdin")]
    MissingPassword,

    /// Reading stdin failed.
    #[error("Failed to read password: {0}")]
    Io(#[from] std::io::Error),

    /// Account already exists.
    #[error("Account already exists with email: {0}")]
    AccountExists(String),

    /// Registration failed.
    #[error("Failed to create account: {0}")]
    Auth(AuthError),
}

/// Create a new account.
///
/// # Arguments
///
/// * `email` - Login email address
/// * `first_name` - Given name (may be empty)
/// * `last_name` - Family name (may be empty)
///
/// # Returns
///
/// The ID of the created account.
///
/// # Errors
///
/// Returns an error for a bad email, an empty password, a taken email or a
/// database failure.
pub async fn create(
    email: &str,
    first_name: &str,
    last_name: &str,
) -> Result<AccountId, AccountError> {
    let parsed =
        Email::parse(email).map_err(|e| AccountError::InvalidEmail(email.to_owned(), e))?;
    let password = read_password(std::io::stdin().lock())?;

    let database_url = database_url()?;
    tracing::info!("Connecting to database...");
    let pool = create_pool(&database_url)
        .await
        .map_err(CommandError::from)?;
    let store = PgAccountStore::new(pool);

    let account = AuthService::new(&store)
        .register_with_names(parsed, &password, first_name, last_name)
        .await
        .map_err(|e| match e {
            AuthError::EmailTaken => AccountError::AccountExists(email.to_owned()),
            other => AccountError::Auth(other),
        })?;

    tracing::info!(
        "Account created successfully! ID: {}, Email: {}",
        account.id,
        account.email
    );

    Ok(account.id)
}

/// First line of `input`, without its line ending.
fn read_password(mut input: impl BufRead) -> Result<String, AccountError> {
    let mut line = String::new();
    input.read_line(&mut line)?;

    let password = line.trim_end_matches(['\r', '\n']);
    if password.is_empty() {
        return Err(AccountError::MissingPassword);
    }

    Ok(password.to_owned())
}

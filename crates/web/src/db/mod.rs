//! Persistence for accounts and financial profiles.
//!
//! # Tables
//!
//! - `account` - Email/password identity plus the onboarding flag
//! - `financial_profile` - One row per account, created on first survey visit
//! - `tower_sessions.session` - Tower-sessions storage
//!
//! Email uniqueness is enforced by a unique index on `lower(email)`. Form-level
//! duplicate checks are a courtesy; the index decides concurrent signups.
//!
//! # Migrations
//!
//! Migrations are stored in `crates/web/migrations/` and run via:
//! ```bash
//! cargo run -p finmate-cli -- migrate
//! ```

pub mod accounts;
pub mod memory;

use std::time::Duration;

use async_trait::async_trait;
use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

use finmate_core::{AccountId, Email};

use crate::models::{Account, FinancialProfile, NewAccount, SurveyAnswers};

pub use accounts::PgAccountStore;
pub use memory::MemoryAccountStore;

/// Errors returned by [`AccountStore`] implementations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., unique email).
    #[error("constraint violation: {0}")]
    Conflict(String),

    /// The account's onboarding flag was already set when the write ran.
    #[error("onboarding already completed")]
    AlreadyOnboarded,
}

/// Storage port for accounts and their financial profiles.
///
/// Email comparisons are case-insensitive throughout.
#[async_trait]
pub trait AccountStore: Send + Sync {
    /// Check that the backing store is reachable.
    async fn ping(&self) -> Result<(), RepositoryError>;

    /// Whether any account already uses this email, ignoring case.
    async fn email_exists(&self, email: &Email) -> Result<bool, RepositoryError>;

    /// Insert an account.
    ///
    /// Must fail with [`RepositoryError::Conflict`] when the email is taken,
    /// even if a prior [`email_exists`](Self::email_exists) said otherwise.
    async fn create_account(&self, account: &NewAccount) -> Result<Account, RepositoryError>;

    /// Fetch an account by ID.
    async fn get_account(&self, id: AccountId) -> Result<Option<Account>, RepositoryError>;

    /// Fetch an account and its password hash for login.
    async fn get_credentials(
        &self,
        email: &Email,
    ) -> Result<Option<(Account, String)>, RepositoryError>;

    /// Stamp `last_login` with the current time.
    async fn record_login(&self, id: AccountId) -> Result<(), RepositoryError>;

    /// Return the account's profile, creating an empty one on first call.
    async fn get_or_create_profile(
        &self,
        account_id: AccountId,
    ) -> Result<FinancialProfile, RepositoryError>;

    /// Return the account's profile if one exists.
    async fn get_profile(
        &self,
        account_id: AccountId,
    ) -> Result<Option<FinancialProfile>, RepositoryError>;

    /// Save survey answers and set `onboarding_completed` atomically.
    ///
    /// Creates the profile if it does not exist yet. The flag is claimed
    /// before the answers are written: if it is already set, nothing changes
    /// and [`RepositoryError::AlreadyOnboarded`] is returned, whatever the
    /// caller's copy of the account says.
    async fn complete_onboarding(
        &self,
        account_id: AccountId,
        answers: &SurveyAnswers,
    ) -> Result<FinancialProfile, RepositoryError>;
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn account_store_is_object_safe() {
        let store = MemoryAccountStore::new();
        let _store: &dyn AccountStore = &store;
    }

    #[test]
    fn test_repository_error_display() {
        let err = RepositoryError::Conflict("email already exists".to_owned());
        assert_eq!(err.to_string(), "constraint violation: email already exists");
    }
}

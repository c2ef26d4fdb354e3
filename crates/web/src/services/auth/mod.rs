//! Authentication service.
//!
//! Registers accounts with Argon2id password hashes and authenticates
//! email/password pairs. Form-level policy (matching confirmation, minimum
//! length) lives in [`crate::forms`]; this layer only hashes, stores and
//! verifies.

mod error;

pub use error::AuthError;

use std::sync::LazyLock;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};

use finmate_core::{AccountId, Email};

use crate::db::{AccountStore, RepositoryError};
use crate::models::{Account, NewAccount};

/// Hash verified when the email is unknown so both login failures cost the same.
static DUMMY_HASH: LazyLock<Option<String>> =
    LazyLock::new(|| hash_password("finmate-timing-equalizer").ok());

/// Authentication service.
pub struct AuthService<'a> {
    store: &'a dyn AccountStore,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(store: &'a dyn AccountStore) -> Self {
        Self { store }
    }

    /// Register a new account with email and password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::EmailTaken` if the email is already registered,
    /// including when a concurrent signup wins the race after form validation.
    pub async fn register(&self, email: Email, password: &str) -> Result<Account, AuthError> {
        self.register_with_names(email, password, "", "").await
    }

    /// Register a new account with display names.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::EmailTaken` if the email is already registered.
    pub async fn register_with_names(
        &self,
        email: Email,
        password: &str,
        first_name: &str,
        last_name: &str,
    ) -> Result<Account, AuthError> {
        let password_hash = hash_password(password)?;

        let new_account = NewAccount {
            first_name: first_name.trim().to_owned(),
            last_name: last_name.trim().to_owned(),
            ..NewAccount::new(email, password_hash)
        };

        let account = self
            .store
            .create_account(&new_account)
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => AuthError::EmailTaken,
                other => AuthError::Repository(other),
            })?;

        tracing::info!(account_id = %account.id, "Account registered");
        Ok(account)
    }

    /// Authenticate with email and password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` if the email is malformed or
    /// unknown, or the password is wrong.
    pub async fn authenticate(&self, email: &str, password: &str) -> Result<Account, AuthError> {
        let Ok(email) = Email::parse(email) else {
            equalize_timing(password);
            return Err(AuthError::InvalidCredentials);
        };

        let Some((account, password_hash)) = self.store.get_credentials(&email).await? else {
            equalize_timing(password);
            return Err(AuthError::InvalidCredentials);
        };

        verify_password(password, &password_hash)?;

        Ok(account)
    }

    /// Stamp the account's last login time.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::AccountNotFound` if the account was deleted.
    pub async fn record_login(&self, id: AccountId) -> Result<(), AuthError> {
        self.store.record_login(id).await.map_err(|e| match e {
            RepositoryError::NotFound => AuthError::AccountNotFound,
            other => AuthError::Repository(other),
        })
    }

    /// Load the account behind a session.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::AccountNotFound` if the account was deleted.
    pub async fn get_account(&self, id: AccountId) -> Result<Account, AuthError> {
        self.store
            .get_account(id)
            .await?
            .ok_or(AuthError::AccountNotFound)
    }
}

/// Hash a password using Argon2id.
fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

/// Verify a password against a hash.
fn verify_password(password: &str, hash: &str) -> Result<(), AuthError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::InvalidCredentials)?;
    let argon2 = Argon2::default();

    argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AuthError::InvalidCredentials)
}

fn equalize_timing(password: &str) {
    if let Some(hash) = DUMMY_HASH.as_deref() {
        let _ = verify_password(password, hash);
    }
}

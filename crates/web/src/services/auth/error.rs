//! Authentication error types.

use thiserror::Error;

use crate::db::RepositoryError;

/// Errors that can occur during authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Wrong password, unknown email or malformed email.
    ///
    /// The three cases are deliberately indistinguishable to callers.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Another account already uses this email (any case).
    #[error("email already registered")]
    EmailTaken,

    /// The account referenced by the session no longer exists.
    #[error("account not found")]
    AccountNotFound,

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),

    /// Password hashing error.
    #[error("password hashing error")]
    PasswordHash,
}

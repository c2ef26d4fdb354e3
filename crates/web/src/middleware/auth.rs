//! Authentication extractors and session helpers.
//!
//! The session only carries a [`CurrentAccount`]; handlers that need the
//! onboarding flag load the account from the store.

use axum::{
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Response},
};
use tower_sessions::Session;

use crate::models::{CurrentAccount, session_keys};
use crate::routes::{found, paths};

/// Extractor that requires an authenticated session.
///
/// Redirects (302) to the login page when the session is anonymous.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(
///     RequireAuth(current): RequireAuth,
/// ) -> impl IntoResponse {
///     format!("Hello, {}!", current.email)
/// }
/// ```
pub struct RequireAuth(pub CurrentAccount);

/// Rejection for [`RequireAuth`].
pub enum AuthRejection {
    /// Redirect to the login page.
    RedirectToLogin,
    /// The session layer is missing from the stack.
    MissingSession,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::RedirectToLogin => found(paths::LOGIN),
            Self::MissingSession => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
        }
    }
}

impl<S> FromRequestParts<S> for RequireAuth
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let session = parts
            .extensions
            .get::<Session>()
            .ok_or(AuthRejection::MissingSession)?;

        let current = current_account(session)
            .await
            .ok_or(AuthRejection::RedirectToLogin)?;

        Ok(Self(current))
    }
}

/// Extractor that optionally gets the current account.
///
/// Unlike `RequireAuth`, this never rejects.
pub struct OptionalAuth(pub Option<CurrentAccount>);

impl<S> FromRequestParts<S> for OptionalAuth
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let current = match parts.extensions.get::<Session>() {
            Some(session) => current_account(session).await,
            None => None,
        };

        Ok(Self(current))
    }
}

/// Read the signed-in account from the session.
///
/// An unreadable session value counts as anonymous.
pub async fn current_account(session: &Session) -> Option<CurrentAccount> {
    session
        .get::<CurrentAccount>(session_keys::CURRENT_ACCOUNT)
        .await
        .ok()
        .flatten()
}

/// Start an authenticated session.
///
/// The session ID is rotated first so a pre-login ID can't be reused.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_current_account(
    session: &Session,
    account: &CurrentAccount,
) -> Result<(), tower_sessions::session::Error> {
    session.cycle_id().await?;
    session.insert(session_keys::CURRENT_ACCOUNT, account).await
}

/// End the session, dropping every stored value and the cookie.
///
/// # Errors
///
/// Returns an error if the session store cannot delete the record.
pub async fn clear_current_account(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session.flush().await
}

//! HTTP route handlers for the FinMate server.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                   - Dashboard (requires login)
//! GET  /health             - Liveness check
//! GET  /health/ready       - Readiness check (store reachable)
//! GET  /static/*           - Static assets
//!
//! # Accounts
//! GET  /accounts/signup/   - Signup page
//! POST /accounts/signup/   - Create account and sign in
//! GET  /accounts/login/    - Login page
//! POST /accounts/login/    - Sign in
//! POST /accounts/logout/   - Sign out
//! GET  /accounts/survey/   - Onboarding survey (requires login)
//! POST /accounts/survey/   - Save survey answers
//! ```
//!
//! Every redirect is a `302 Found`.

pub mod accounts;
pub mod dashboard;
pub mod health;
pub mod redirects;

use std::path::Path;

use axum::{
    Router,
    http::{StatusCode, header::LOCATION},
    middleware::{from_fn, from_fn_with_state},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use tower::ServiceBuilder;
use tower_http::{services::ServeDir, trace::TraceLayer};
use tower_sessions::{Session, SessionManagerLayer, SessionStore};

use crate::error::AppError;
use crate::middleware::{clear_current_account, login_required, security_headers_middleware};
use crate::models::{Account, CurrentAccount};
use crate::services::auth::{AuthError, AuthService};
use crate::state::AppState;

pub use redirects::{AuthRedirects, OnboardingRedirects};

/// Fixed paths of the account flow.
pub mod paths {
    pub const DASHBOARD: &str = "/";
    pub const SIGNUP: &str = "/accounts/signup/";
    pub const LOGIN: &str = "/accounts/login/";
    pub const LOGOUT: &str = "/accounts/logout/";
    pub const SURVEY: &str = "/accounts/survey/";
}

/// `302 Found` to `location`.
///
/// `Redirect::to` answers 303, which browsers treat the same but clients
/// checking the status do not.
#[must_use]
pub fn found(location: &str) -> Response {
    (StatusCode::FOUND, [(LOCATION, location)]).into_response()
}

/// Create the account routes router.
pub fn account_routes() -> Router<AppState> {
    Router::new()
        .route("/signup/", get(accounts::signup_page).post(accounts::signup))
        .route("/login/", get(accounts::login_page).post(accounts::login))
        .route("/logout/", post(accounts::logout))
        .route("/survey/", get(accounts::survey_page).post(accounts::survey))
}

/// Create all routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(dashboard::show))
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
        .nest("/accounts", account_routes())
}

/// Assemble the application with its middleware stack.
///
/// Sentry layers are added by the binary on top of this.
pub fn app<S>(state: AppState, session_layer: SessionManagerLayer<S>, static_dir: &Path) -> Router
where
    S: SessionStore + Clone,
{
    routes()
        .nest_service("/static", ServeDir::new(static_dir))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(from_fn(security_headers_middleware))
                .layer(session_layer)
                .layer(from_fn_with_state(state.clone(), login_required)),
        )
        .with_state(state)
}

/// Load the account behind the session.
///
/// A session whose account has been deleted is flushed and reported as
/// `None`, leaving the visitor anonymous.
pub(crate) async fn session_account(
    state: &AppState,
    session: &Session,
    current: &CurrentAccount,
) -> Result<Option<Account>, AppError> {
    match AuthService::new(state.store()).get_account(current.id).await {
        Ok(account) => Ok(Some(account)),
        Err(AuthError::AccountNotFound) => {
            tracing::warn!(account_id = %current.id, "Session refers to a missing account");
            clear_current_account(session).await?;
            Ok(None)
        }
        Err(e) => Err(e.into()),
    }
}

//! Site-wide login requirement.
//!
//! Every request passes through [`login_required`] before reaching a handler.
//! Paths matching an exempt pattern or a built-in prefix pass untouched;
//! anything else needs a signed-in session or gets a 302 to the login page.
//! The middleware only reads the session.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use regex::RegexSet;
use tower_sessions::Session;

use super::auth::current_account;
use crate::routes::{found, paths};
use crate::state::AppState;

/// Prefixes always reachable without a session.
pub const BUILTIN_EXEMPT_PREFIXES: &[&str] = &["/admin/", "/static/", "/media/"];

/// Compiled exempt path patterns.
///
/// Each pattern must match at the start of the path but may stop anywhere,
/// so `^/health` also lets `/health/ready` through.
#[derive(Debug, Clone)]
pub struct ExemptUrls {
    patterns: RegexSet,
}

impl ExemptUrls {
    /// Compile the configured patterns.
    ///
    /// # Errors
    ///
    /// Returns the regex error for the first invalid pattern.
    pub fn new<I, S>(patterns: I) -> Result<Self, regex::Error>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let anchored = patterns
            .into_iter()
            .map(|pattern| format!("^(?:{})", pattern.as_ref()));

        Ok(Self {
            patterns: RegexSet::new(anchored)?,
        })
    }

    /// Whether a request path may be served without a session.
    #[must_use]
    pub fn is_exempt(&self, path: &str) -> bool {
        self.patterns.is_match(path)
            || BUILTIN_EXEMPT_PREFIXES
                .iter()
                .any(|prefix| path.starts_with(prefix))
    }
}

/// Redirect anonymous requests for protected paths to the login page.
pub async fn login_required(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let path = request.uri().path();
    if state.exempt_urls().is_exempt(path) {
        return next.run(request).await;
    }

    let signed_in = match request.extensions().get::<Session>() {
        Some(session) => current_account(session).await.is_some(),
        None => {
            tracing::error!("Session layer missing; treating request as anonymous");
            false
        }
    };

    if signed_in {
        next.run(request).await
    } else {
        tracing::debug!(path = %request.uri().path(), "Anonymous request to protected path");
        found(paths::LOGIN)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn defaults() -> ExemptUrls {
        ExemptUrls::new(crate::config::DEFAULT_EXEMPT_URLS).unwrap()
    }

    #[test]
    fn test_default_patterns() {
        let exempt = defaults();
        assert!(exempt.is_exempt("/accounts/login/"));
        assert!(exempt.is_exempt("/accounts/signup/"));
        assert!(exempt.is_exempt("/health"));
        assert!(exempt.is_exempt("/health/ready"));
        assert!(!exempt.is_exempt("/accounts/survey/"));
        assert!(!exempt.is_exempt("/"));
    }

    #[test]
    fn test_builtin_prefixes() {
        let exempt = ExemptUrls::new(Vec::<String>::new()).unwrap();
        assert!(exempt.is_exempt("/static/css/main.css"));
        assert!(exempt.is_exempt("/media/avatar.png"));
        assert!(exempt.is_exempt("/admin/"));
        assert!(!exempt.is_exempt("/admin"));
        assert!(!exempt.is_exempt("/accounts/login/"));
    }

    #[test]
    fn test_patterns_match_from_path_start() {
        let exempt = ExemptUrls::new(["/about/"]).unwrap();
        assert!(exempt.is_exempt("/about/team"));
        assert!(!exempt.is_exempt("/x/about/"));
    }

    #[test]
    fn test_invalid_pattern_is_rejected() {
        assert!(ExemptUrls::new(["^/accounts/(login"]).is_err());
    }
}

//! Application state shared across handlers.

use std::sync::Arc;

use crate::db::AccountStore;
use crate::middleware::ExemptUrls;
use crate::routes::{AuthRedirects, OnboardingRedirects};

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`; everything inside is read-only after startup.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    store: Arc<dyn AccountStore>,
    exempt_urls: ExemptUrls,
    redirects: Arc<dyn AuthRedirects>,
}

impl AppState {
    /// Create a new application state with the default redirect policy.
    ///
    /// # Arguments
    ///
    /// * `store` - Account and profile storage
    /// * `exempt_urls` - Compiled patterns for paths that skip login
    #[must_use]
    pub fn new(store: Arc<dyn AccountStore>, exempt_urls: ExemptUrls) -> Self {
        Self::with_redirects(store, exempt_urls, Arc::new(OnboardingRedirects))
    }

    /// Create a new application state with a custom redirect policy.
    #[must_use]
    pub fn with_redirects(
        store: Arc<dyn AccountStore>,
        exempt_urls: ExemptUrls,
        redirects: Arc<dyn AuthRedirects>,
    ) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                store,
                exempt_urls,
                redirects,
            }),
        }
    }

    /// Get a reference to the account store.
    #[must_use]
    pub fn store(&self) -> &dyn AccountStore {
        self.inner.store.as_ref()
    }

    /// Get the compiled login exemptions.
    #[must_use]
    pub fn exempt_urls(&self) -> &ExemptUrls {
        &self.inner.exempt_urls
    }

    /// Get the login/logout redirect policy.
    #[must_use]
    pub fn redirects(&self) -> &dyn AuthRedirects {
        self.inner.redirects.as_ref()
    }
}

//! Test client driving the full router in-process.

#![allow(dead_code, clippy::unwrap_used)]

use std::path::Path;
use std::sync::Arc;

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{
        Request, Response, StatusCode,
        header::{CONTENT_TYPE, COOKIE, LOCATION, SET_COOKIE},
    },
};
use async_trait::async_trait;
use tower::ServiceExt;
use tower_sessions::MemoryStore;

use finmate_core::{AccountId, Email};
use finmate_web::config::DEFAULT_EXEMPT_URLS;
use finmate_web::db::{AccountStore, MemoryAccountStore, RepositoryError};
use finmate_web::middleware::{ExemptUrls, SESSION_COOKIE_NAME, create_session_layer};
use finmate_web::models::{Account, FinancialProfile, NewAccount, SurveyAnswers};
use finmate_web::routes::{self, AuthRedirects};
use finmate_web::services::auth::AuthService;
use finmate_web::state::AppState;

pub const PASSWORD: &str = "P@ss1234";

/// A browser-like client: one cookie jar, shared stores.
pub struct TestApp {
    pub router: Router,
    pub store: Arc<MemoryAccountStore>,
    pub cookie: Option<String>,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_exempt_urls(DEFAULT_EXEMPT_URLS)
    }

    pub fn with_exempt_urls(patterns: &[&str]) -> Self {
        let store = Arc::new(MemoryAccountStore::new());
        let state = AppState::new(store.clone(), ExemptUrls::new(patterns).unwrap());
        Self::build(state, store)
    }

    pub fn with_redirects(redirects: Arc<dyn AuthRedirects>) -> Self {
        let store = Arc::new(MemoryAccountStore::new());
        let state = AppState::with_redirects(
            store.clone(),
            ExemptUrls::new(DEFAULT_EXEMPT_URLS).unwrap(),
            redirects,
        );
        Self::build(state, store)
    }

    /// Serve requests through `app_store`, which wraps `store`.
    pub fn with_store(store: Arc<MemoryAccountStore>, app_store: Arc<dyn AccountStore>) -> Self {
        let state = AppState::new(app_store, ExemptUrls::new(DEFAULT_EXEMPT_URLS).unwrap());
        Self::build(state, store)
    }

    fn build(state: AppState, store: Arc<MemoryAccountStore>) -> Self {
        let static_dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("static");
        let session_layer = create_session_layer(MemoryStore::default(), false);
        let router = routes::app(state, session_layer, &static_dir);

        Self {
            router,
            store,
            cookie: None,
        }
    }

    /// A second browser against the same stores, with an empty cookie jar.
    pub fn fresh_client(&self) -> Self {
        Self {
            router: self.router.clone(),
            store: self.store.clone(),
            cookie: None,
        }
    }

    pub async fn get(&mut self, path: &str) -> Response<Body> {
        let request = Request::builder().uri(path);
        self.send(request.body(Body::empty()).unwrap()).await
    }

    pub async fn post(&mut self, path: &str, form: &str) -> Response<Body> {
        let request = Request::builder()
            .method("POST")
            .uri(path)
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded");
        self.send(request.body(Body::from(form.to_owned())).unwrap())
            .await
    }

    async fn send(&mut self, mut request: Request<Body>) -> Response<Body> {
        if let Some(cookie) = &self.cookie {
            request
                .headers_mut()
                .insert(COOKIE, cookie.parse().unwrap());
        }

        let response = self.router.clone().oneshot(request).await.unwrap();

        for value in response.headers().get_all(SET_COOKIE) {
            let pair = value.to_str().unwrap().split(';').next().unwrap().trim();
            if let Some(id) = pair.strip_prefix(&format!("{SESSION_COOKIE_NAME}=")) {
                self.cookie = if id.is_empty() {
                    None
                } else {
                    Some(pair.to_owned())
                };
            }
        }

        response
    }

    /// Sign up through the form and return the new account.
    pub async fn signup(&mut self, email: &str) -> Account {
        let form = format!(
            "email={}&password1={pw}&password2={pw}",
            encode(email),
            pw = encode(PASSWORD)
        );
        let response = self.post("/accounts/signup/", &form).await;
        assert_redirect(&response, "/accounts/survey/");

        let email = Email::parse(email).unwrap();
        AuthService::new(self.store.as_ref())
            .authenticate(email.as_str(), PASSWORD)
            .await
            .unwrap()
    }

    /// Sign up and submit a valid survey.
    pub async fn onboarded(&mut self, email: &str) -> Account {
        let account = self.signup(email).await;
        let response = self
            .post(
                "/accounts/survey/",
                "monthly_income=50000&necessary_needs=30000&goals_and_wants=Car&monthly_unwanted_limit=5000",
            )
            .await;
        assert_redirect(&response, "/");
        account
    }
}

/// Memory store with switchable misbehaviour.
///
/// `hide_existing_emails` makes the pre-check miss so only the insert can
/// catch a duplicate; `fail_record_login` breaks the `last_login` stamp.
#[derive(Default)]
pub struct FaultyStore {
    pub inner: Arc<MemoryAccountStore>,
    pub hide_existing_emails: bool,
    pub fail_record_login: bool,
}

#[async_trait]
impl AccountStore for FaultyStore {
    async fn ping(&self) -> Result<(), RepositoryError> {
        self.inner.ping().await
    }

    async fn email_exists(&self, email: &Email) -> Result<bool, RepositoryError> {
        if self.hide_existing_emails {
            return Ok(false);
        }
        self.inner.email_exists(email).await
    }

    async fn create_account(&self, account: &NewAccount) -> Result<Account, RepositoryError> {
        self.inner.create_account(account).await
    }

    async fn get_account(&self, id: AccountId) -> Result<Option<Account>, RepositoryError> {
        self.inner.get_account(id).await
    }

    async fn get_credentials(
        &self,
        email: &Email,
    ) -> Result<Option<(Account, String)>, RepositoryError> {
        self.inner.get_credentials(email).await
    }

    async fn record_login(&self, id: AccountId) -> Result<(), RepositoryError> {
        if self.fail_record_login {
            return Err(RepositoryError::Database(sqlx::Error::PoolTimedOut));
        }
        self.inner.record_login(id).await
    }

    async fn get_or_create_profile(
        &self,
        account_id: AccountId,
    ) -> Result<FinancialProfile, RepositoryError> {
        self.inner.get_or_create_profile(account_id).await
    }

    async fn get_profile(
        &self,
        account_id: AccountId,
    ) -> Result<Option<FinancialProfile>, RepositoryError> {
        self.inner.get_profile(account_id).await
    }

    async fn complete_onboarding(
        &self,
        account_id: AccountId,
        answers: &SurveyAnswers,
    ) -> Result<FinancialProfile, RepositoryError> {
        self.inner.complete_onboarding(account_id, answers).await
    }
}

pub fn encode(value: &str) -> String {
    value.replace('%', "%25").replace('@', "%40").replace('+', "%2B").replace(' ', "+")
}

pub fn assert_redirect(response: &Response<Body>, location: &str) {
    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(response.headers().get(LOCATION).unwrap(), location);
}

pub async fn body_text(response: Response<Body>) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

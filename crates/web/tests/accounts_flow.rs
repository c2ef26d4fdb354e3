//! End-to-end tests of the signup, login, survey and logout flow.
//!
//! Drives the real router with in-memory account and session stores.

#![allow(clippy::unwrap_used)]

mod common;

use std::sync::Arc;

use axum::http::StatusCode;

use finmate_core::{Amount, Email};
use finmate_web::db::{AccountStore, MemoryAccountStore};
use finmate_web::models::Account;
use finmate_web::routes::AuthRedirects;
use finmate_web::services::auth::AuthService;

use common::{FaultyStore, PASSWORD, TestApp, assert_redirect, body_text, encode};

fn login_form(email: &str, password: &str) -> String {
    format!("username={}&password={}", encode(email), encode(password))
}

// =============================================================================
// Signup
// =============================================================================

#[tokio::test]
async fn test_signup_creates_account_and_redirects_to_survey() {
    let mut app = TestApp::new();

    let response = app
        .post(
            "/accounts/signup/",
            "email=a%40b.com&password1=P%40ss1234&password2=P%40ss1234",
        )
        .await;

    assert_redirect(&response, "/accounts/survey/");
    assert!(app.cookie.is_some());
    assert_eq!(app.store.account_count().await, 1);

    let response = app.get("/accounts/survey/").await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_text(response).await;
    assert!(body.contains("Account created successfully. Complete your financial profile."));
}

#[tokio::test]
async fn test_signup_duplicate_email_any_case_is_rejected() {
    let mut first = TestApp::new();
    first.signup("a@b.com").await;

    let mut second = first.fresh_client();
    let response = second
        .post(
            "/accounts/signup/",
            "email=A%40B.COM&password1=P%40ss1234&password2=P%40ss1234",
        )
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_text(response).await;
    assert!(body.contains("A user with that email already exists."));
    assert_eq!(second.store.account_count().await, 1);
}

#[tokio::test]
async fn test_signup_duplicate_caught_on_insert_rerenders_form() {
    let store = Arc::new(MemoryAccountStore::new());
    let app_store = Arc::new(FaultyStore {
        inner: store.clone(),
        hide_existing_emails: true,
        ..FaultyStore::default()
    });
    let mut first = TestApp::with_store(store, app_store);
    first.signup("a@b.com").await;

    let mut second = first.fresh_client();
    let response = second
        .post(
            "/accounts/signup/",
            "email=A%40B.COM&password1=P%40ss1234&password2=P%40ss1234",
        )
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_text(response).await;
    assert!(body.contains("A user with that email already exists."));
    assert_eq!(second.store.account_count().await, 1);
}

#[tokio::test]
async fn test_signup_password_mismatch_creates_nothing() {
    let mut app = TestApp::new();

    let response = app
        .post(
            "/accounts/signup/",
            "email=newuser%40example.com&password1=SecurePass123%21&password2=DifferentPass123%21",
        )
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_text(response).await;
    assert!(body.contains("The two password fields didn"));
    assert!(body.contains("value=\"newuser@example.com\""));
    assert_eq!(app.store.account_count().await, 0);
}

#[tokio::test]
async fn test_signup_missing_fields_are_required() {
    let mut app = TestApp::new();

    let response = app.post("/accounts/signup/", "").await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_text(response).await;
    assert_eq!(body.matches("This field is required.").count(), 3);
    assert_eq!(app.store.account_count().await, 0);
}

#[tokio::test]
async fn test_signup_page_renders_for_anonymous() {
    let mut app = TestApp::new();

    let response = app.get("/accounts/signup/").await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_text(response).await;
    assert!(body.contains("name=\"password2\""));
}

// =============================================================================
// Authenticated visits to signup/login
// =============================================================================

#[tokio::test]
async fn test_onboarded_account_is_sent_to_dashboard_from_signup_and_login() {
    let mut app = TestApp::new();
    app.onboarded("a@b.com").await;

    assert_redirect(&app.get("/accounts/signup/").await, "/");
    assert_redirect(&app.get("/accounts/login/").await, "/");
    assert_redirect(
        &app.post("/accounts/login/", &login_form("a@b.com", PASSWORD)).await,
        "/",
    );
}

#[tokio::test]
async fn test_unonboarded_account_is_sent_to_survey_from_login() {
    let mut app = TestApp::new();
    app.signup("a@b.com").await;

    assert_redirect(&app.get("/accounts/login/").await, "/accounts/survey/");
    assert_redirect(&app.get("/accounts/signup/").await, "/");
}

// =============================================================================
// Login / Logout
// =============================================================================

#[tokio::test]
async fn test_login_routes_by_onboarding_flag() {
    let mut app = TestApp::new();
    app.signup("new@b.com").await;
    app.cookie = None;

    let response = app
        .post("/accounts/login/", &login_form("new@b.com", PASSWORD))
        .await;
    assert_redirect(&response, "/accounts/survey/");

    let mut other = app.fresh_client();
    other.onboarded("done@b.com").await;
    other.cookie = None;

    let response = other
        .post("/accounts/login/", &login_form("DONE@b.com", PASSWORD))
        .await;
    assert_redirect(&response, "/");
}

#[tokio::test]
async fn test_login_records_last_login() {
    let mut app = TestApp::new();
    let account = app.signup("a@b.com").await;
    app.cookie = None;

    app.post("/accounts/login/", &login_form("a@b.com", PASSWORD))
        .await;

    let reloaded = app.store.get_account(account.id).await.unwrap().unwrap();
    assert!(reloaded.last_login.is_some());
}

#[tokio::test]
async fn test_login_not_signed_in_when_last_login_fails() {
    let store = Arc::new(MemoryAccountStore::new());
    AuthService::new(store.as_ref())
        .register(Email::parse("a@b.com").unwrap(), PASSWORD)
        .await
        .unwrap();
    let app_store = Arc::new(FaultyStore {
        inner: store.clone(),
        fail_record_login: true,
        ..FaultyStore::default()
    });
    let mut app = TestApp::with_store(store, app_store);

    let response = app
        .post("/accounts/login/", &login_form("a@b.com", PASSWORD))
        .await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_redirect(&app.get("/").await, "/accounts/login/");
}

#[tokio::test]
async fn test_login_accepts_email_field_name() {
    let mut app = TestApp::new();
    app.signup("a@b.com").await;
    app.cookie = None;

    let response = app
        .post("/accounts/login/", "email=a%40b.com&password=P%40ss1234")
        .await;

    assert_redirect(&response, "/accounts/survey/");
}

#[tokio::test]
async fn test_login_failure_is_generic_and_stays_anonymous() {
    let mut app = TestApp::new();
    app.signup("a@b.com").await;
    app.cookie = None;

    for form in [
        login_form("a@b.com", "wrong-password"),
        login_form("nobody@b.com", PASSWORD),
    ] {
        let response = app.post("/accounts/login/", &form).await;

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_text(response).await;
        assert!(body.contains(
            "Please enter a correct email and password. Note that both fields may be case-sensitive."
        ));
    }

    assert_redirect(&app.get("/").await, "/accounts/login/");
}

#[tokio::test]
async fn test_login_missing_fields_are_required() {
    let mut app = TestApp::new();

    let response = app.post("/accounts/login/", "username=&password=").await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_text(response).await;
    assert_eq!(body.matches("This field is required.").count(), 2);
}

#[tokio::test]
async fn test_logout_ends_session_and_redirects_to_signup() {
    let mut app = TestApp::new();
    app.signup("a@b.com").await;

    let response = app.post("/accounts/logout/", "").await;

    assert_redirect(&response, "/accounts/signup/");
    assert_redirect(&app.get("/accounts/survey/").await, "/accounts/login/");
}

#[tokio::test]
async fn test_logout_requires_post() {
    let mut app = TestApp::new();
    app.signup("a@b.com").await;

    let response = app.get("/accounts/logout/").await;

    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(app.get("/").await.status(), StatusCode::OK);
}

// =============================================================================
// Survey
// =============================================================================

#[tokio::test]
async fn test_survey_requires_login() {
    let mut app = TestApp::new();

    assert_redirect(&app.get("/accounts/survey/").await, "/accounts/login/");
    assert_redirect(
        &app.post("/accounts/survey/", "monthly_income=1").await,
        "/accounts/login/",
    );
}

#[tokio::test]
async fn test_survey_visits_create_one_profile() {
    let mut app = TestApp::new();
    app.signup("a@b.com").await;

    for _ in 0..3 {
        assert_eq!(app.get("/accounts/survey/").await.status(), StatusCode::OK);
    }

    assert_eq!(app.store.profile_count().await, 1);
}

#[tokio::test]
async fn test_survey_submission_completes_onboarding_once() {
    let mut app = TestApp::new();
    let account = app.onboarded("a@b.com").await;

    let reloaded = app.store.get_account(account.id).await.unwrap().unwrap();
    assert!(reloaded.onboarding_completed);

    let profile = app.store.get_profile(account.id).await.unwrap().unwrap();
    assert_eq!(profile.monthly_income, Some(Amount::parse("50000").unwrap()));
    assert_eq!(profile.goals_and_wants, "Car");
    assert_eq!(app.store.profile_count().await, 1);

    assert_redirect(&app.get("/accounts/survey/").await, "/");
    assert_redirect(
        &app.post("/accounts/survey/", "monthly_income=1").await,
        "/",
    );

    let profile = app.store.get_profile(account.id).await.unwrap().unwrap();
    assert_eq!(profile.monthly_income, Some(Amount::parse("50000").unwrap()));
}

#[tokio::test]
async fn test_survey_success_flash_shows_on_dashboard_once() {
    let mut app = TestApp::new();
    app.onboarded("a@b.com").await;

    let body = body_text(app.get("/").await).await;
    assert!(body.contains("Financial profile completed! Welcome to FinMate."));
    assert!(body.contains("50000"));

    let body = body_text(app.get("/").await).await;
    assert!(!body.contains("Financial profile completed!"));
}

#[tokio::test]
async fn test_survey_invalid_amounts_rerender_without_onboarding() {
    let mut app = TestApp::new();
    let account = app.signup("a@b.com").await;

    let response = app
        .post(
            "/accounts/survey/",
            "monthly_income=-5&necessary_needs=abc&goals_and_wants=&monthly_unwanted_limit=1.234",
        )
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_text(response).await;
    assert!(body.contains("Ensure this value is greater than or equal to 0."));
    assert!(body.contains("Enter a number."));
    assert!(body.contains("Ensure that there are no more than 2 decimal places."));

    let reloaded = app.store.get_account(account.id).await.unwrap().unwrap();
    assert!(!reloaded.onboarding_completed);
}

#[tokio::test]
async fn test_survey_blank_submission_completes_onboarding() {
    let mut app = TestApp::new();
    let account = app.signup("a@b.com").await;

    let response = app.post("/accounts/survey/", "").await;

    assert_redirect(&response, "/");
    let profile = app.store.get_profile(account.id).await.unwrap().unwrap();
    assert_eq!(profile.monthly_income, None);
    assert!(app.store.get_account(account.id).await.unwrap().unwrap().onboarding_completed);
}

// =============================================================================
// Dashboard
// =============================================================================

#[tokio::test]
async fn test_dashboard_links_unonboarded_account_to_survey() {
    let mut app = TestApp::new();
    app.signup("a@b.com").await;

    let response = app.get("/").await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_text(response).await;
    assert!(body.contains("href=\"/accounts/survey/\""));
}

#[tokio::test]
async fn test_deleted_account_session_is_cleared() {
    let mut app = TestApp::new();
    let account = app.signup("a@b.com").await;
    assert!(app.cookie.is_some());

    app.store.delete_account(account.id).await.unwrap();
    let response = app.get("/").await;

    assert_redirect(&response, "/accounts/login/");
    assert!(app.cookie.is_none());
    assert_redirect(&app.get("/accounts/survey/").await, "/accounts/login/");
}

// =============================================================================
// Pluggable redirects
// =============================================================================

struct HomeEverywhere;

impl AuthRedirects for HomeEverywhere {
    fn after_login(&self, _account: &Account) -> String {
        "/home/".to_owned()
    }

    fn after_logout(&self) -> String {
        "/goodbye/".to_owned()
    }
}

#[tokio::test]
async fn test_custom_redirects_are_used() {
    let mut app = TestApp::with_redirects(Arc::new(HomeEverywhere));
    app.signup("a@b.com").await;

    assert_redirect(&app.get("/accounts/login/").await, "/home/");
    assert_redirect(&app.post("/accounts/logout/", "").await, "/goodbye/");
}

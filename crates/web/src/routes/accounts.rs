//! Signup, login, logout and onboarding survey handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    response::{IntoResponse, Response},
};
use tower_sessions::Session;

use super::{found, paths, session_account};
use crate::error::{Result, clear_sentry_user, set_sentry_user};
use crate::forms::{
    FormError, FormErrors, LoginForm, SignupForm, SurveyForm, signup::DUPLICATE_EMAIL,
};
use crate::middleware::{
    OptionalAuth, RequireAuth, clear_current_account, push_flash, set_current_account,
    take_flashes,
};
use crate::models::{Account, CurrentAccount, FlashMessage};
use crate::services::auth::{AuthError, AuthService};
use crate::services::onboarding::{OnboardingError, OnboardingService};
use crate::state::AppState;

/// Flash queued after a successful signup.
pub const SIGNUP_SUCCESS: &str = "Account created successfully. Complete your financial profile.";

/// Flash queued after the survey is saved.
pub const SURVEY_SUCCESS: &str = "Financial profile completed! Welcome to FinMate.";

// =============================================================================
// Templates
// =============================================================================

/// Signup page template.
#[derive(Template, WebTemplate)]
#[template(path = "accounts/signup.html")]
pub struct SignupTemplate {
    pub email: String,
    pub errors: FormErrors,
    pub messages: Vec<FlashMessage>,
}

/// Login page template.
#[derive(Template, WebTemplate)]
#[template(path = "accounts/login.html")]
pub struct LoginTemplate {
    pub username: String,
    pub errors: FormErrors,
    pub messages: Vec<FlashMessage>,
}

/// Onboarding survey template.
#[derive(Template, WebTemplate)]
#[template(path = "accounts/survey.html")]
pub struct SurveyTemplate {
    pub form: SurveyForm,
    pub errors: FormErrors,
    pub messages: Vec<FlashMessage>,
}

/// Stamp `last_login`, then rotate the session and remember the account.
///
/// The session is only signed in once the stamp is written.
async fn start_session(state: &AppState, session: &Session, account: &Account) -> Result<()> {
    AuthService::new(state.store())
        .record_login(account.id)
        .await?;
    set_current_account(session, &CurrentAccount::from(account)).await?;
    set_sentry_user(&account.id, Some(account.email.as_str()));
    tracing::info!(account_id = %account.id, "Session started");
    Ok(())
}

/// The account a request is signed in as, if it still exists.
async fn signed_in(
    state: &AppState,
    session: &Session,
    current: Option<CurrentAccount>,
) -> Result<Option<Account>> {
    match current {
        Some(current) => session_account(state, session, &current).await,
        None => Ok(None),
    }
}

// =============================================================================
// Signup
// =============================================================================

/// Display the signup page.
pub async fn signup_page(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(current): OptionalAuth,
) -> Result<Response> {
    if signed_in(&state, &session, current).await?.is_some() {
        return Ok(found(paths::DASHBOARD));
    }

    Ok(SignupTemplate {
        email: String::new(),
        errors: FormErrors::default(),
        messages: take_flashes(&session).await,
    }
    .into_response())
}

/// Handle signup form submission.
///
/// Creates the account, signs it in and sends it to the survey.
pub async fn signup(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(current): OptionalAuth,
    Form(form): Form<SignupForm>,
) -> Result<Response> {
    if signed_in(&state, &session, current).await?.is_some() {
        return Ok(found(paths::DASHBOARD));
    }

    let valid = match form.validate(state.store()).await {
        Ok(valid) => valid,
        Err(FormError::Invalid(errors)) => return Ok(render_signup(&session, form, errors).await),
        Err(FormError::Repository(e)) => return Err(e.into()),
    };

    let account = match AuthService::new(state.store())
        .register(valid.email, &valid.password)
        .await
    {
        Ok(account) => account,
        Err(AuthError::EmailTaken) => {
            // Lost the race against a concurrent signup for the same email
            let mut errors = FormErrors::default();
            errors.add("email", DUPLICATE_EMAIL);
            return Ok(render_signup(&session, form, errors).await);
        }
        Err(e) => return Err(e.into()),
    };

    start_session(&state, &session, &account).await?;
    push_flash(&session, SIGNUP_SUCCESS).await?;

    Ok(found(paths::SURVEY))
}

async fn render_signup(session: &Session, form: SignupForm, errors: FormErrors) -> Response {
    SignupTemplate {
        email: form.email,
        errors,
        messages: take_flashes(session).await,
    }
    .into_response()
}

// =============================================================================
// Login / Logout
// =============================================================================

/// Display the login page.
pub async fn login_page(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(current): OptionalAuth,
) -> Result<Response> {
    if let Some(account) = signed_in(&state, &session, current).await? {
        return Ok(found(&state.redirects().after_login(&account)));
    }

    Ok(LoginTemplate {
        username: String::new(),
        errors: FormErrors::default(),
        messages: take_flashes(&session).await,
    }
    .into_response())
}

/// Handle login form submission.
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(current): OptionalAuth,
    Form(form): Form<LoginForm>,
) -> Result<Response> {
    if let Some(account) = signed_in(&state, &session, current).await? {
        return Ok(found(&state.redirects().after_login(&account)));
    }

    if let Err(errors) = form.validate() {
        return Ok(render_login(&session, form, errors).await);
    }

    match AuthService::new(state.store())
        .authenticate(&form.username, &form.password)
        .await
    {
        Ok(account) => {
            start_session(&state, &session, &account).await?;
            Ok(found(&state.redirects().after_login(&account)))
        }
        Err(AuthError::InvalidCredentials) => {
            tracing::info!("Login failed");
            Ok(render_login(&session, form, LoginForm::credentials_rejected()).await)
        }
        Err(e) => Err(e.into()),
    }
}

async fn render_login(session: &Session, form: LoginForm, errors: FormErrors) -> Response {
    LoginTemplate {
        username: form.username,
        errors,
        messages: take_flashes(session).await,
    }
    .into_response()
}

/// Handle logout.
///
/// Flushes the whole session, not just the account key.
pub async fn logout(State(state): State<AppState>, session: Session) -> Result<Response> {
    clear_current_account(&session).await?;
    clear_sentry_user();

    Ok(found(&state.redirects().after_logout()))
}

// =============================================================================
// Onboarding Survey
// =============================================================================

/// Display the survey, pre-filled from any saved answers.
pub async fn survey_page(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(current): RequireAuth,
) -> Result<Response> {
    let Some(account) = session_account(&state, &session, &current).await? else {
        return Ok(found(paths::LOGIN));
    };

    match OnboardingService::new(state.store())
        .open_survey(&account)
        .await
    {
        Ok(profile) => Ok(SurveyTemplate {
            form: SurveyForm::from(&profile.answers()),
            errors: FormErrors::default(),
            messages: take_flashes(&session).await,
        }
        .into_response()),
        Err(OnboardingError::AlreadyOnboarded) => Ok(found(paths::DASHBOARD)),
        Err(e) => Err(e.into()),
    }
}

/// Handle survey submission.
pub async fn survey(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(current): RequireAuth,
    Form(form): Form<SurveyForm>,
) -> Result<Response> {
    let Some(account) = session_account(&state, &session, &current).await? else {
        return Ok(found(paths::LOGIN));
    };

    let onboarding = OnboardingService::new(state.store());

    match onboarding.open_survey(&account).await {
        Ok(_) => {}
        Err(OnboardingError::AlreadyOnboarded) => return Ok(found(paths::DASHBOARD)),
        Err(e) => return Err(e.into()),
    }

    let answers = match form.validate() {
        Ok(answers) => answers,
        Err(errors) => {
            return Ok(SurveyTemplate {
                form,
                errors,
                messages: take_flashes(&session).await,
            }
            .into_response());
        }
    };

    match onboarding.submit_survey(&account, &answers).await {
        Ok(_) => {}
        Err(OnboardingError::AlreadyOnboarded) => return Ok(found(paths::DASHBOARD)),
        Err(e) => return Err(e.into()),
    }
    push_flash(&session, SURVEY_SUCCESS).await?;

    Ok(found(paths::DASHBOARD))
}

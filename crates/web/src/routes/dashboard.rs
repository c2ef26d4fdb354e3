//! Dashboard page.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::State,
    response::{IntoResponse, Response},
};
use tower_sessions::Session;

use finmate_core::Amount;

use super::{found, paths, session_account};
use crate::error::Result;
use crate::middleware::{RequireAuth, take_flashes};
use crate::models::{FinancialProfile, FlashMessage};
use crate::state::AppState;

/// Profile figures formatted for display.
pub struct ProfileSummary {
    pub monthly_income: String,
    pub necessary_needs: String,
    pub monthly_unwanted_limit: String,
    pub goals_and_wants: String,
}

impl From<&FinancialProfile> for ProfileSummary {
    fn from(profile: &FinancialProfile) -> Self {
        Self {
            monthly_income: show_amount(profile.monthly_income),
            necessary_needs: show_amount(profile.necessary_needs),
            monthly_unwanted_limit: show_amount(profile.monthly_unwanted_limit),
            goals_and_wants: profile.goals_and_wants.clone(),
        }
    }
}

fn show_amount(amount: Option<Amount>) -> String {
    amount.map_or_else(|| "Not set".to_owned(), |a| a.to_string())
}

/// Dashboard template.
#[derive(Template, WebTemplate)]
#[template(path = "dashboard.html")]
pub struct DashboardTemplate {
    pub name: String,
    pub onboarded: bool,
    pub profile: Option<ProfileSummary>,
    pub messages: Vec<FlashMessage>,
}

/// Display the dashboard.
///
/// Accounts that skipped the survey get a link to it instead of figures.
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(current): RequireAuth,
) -> Result<Response> {
    let Some(account) = session_account(&state, &session, &current).await? else {
        return Ok(found(paths::LOGIN));
    };

    let profile = if account.onboarding_completed {
        state.store().get_profile(account.id).await?
    } else {
        None
    };

    Ok(DashboardTemplate {
        name: account.display_name(),
        onboarded: account.onboarding_completed,
        profile: profile.as_ref().map(ProfileSummary::from),
        messages: take_flashes(&session).await,
    }
    .into_response())
}

//! Account domain types.
//!
//! These types represent validated domain objects separate from database row types.

use chrono::{DateTime, Utc};

use finmate_core::{AccountId, Amount, Email, ProfileId};

/// A registered account.
///
/// The email is the only login identifier. `onboarding_completed` is the single
/// source of truth for whether the financial survey has been submitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    /// Unique account ID.
    pub id: AccountId,
    /// Normalized email address.
    pub email: Email,
    /// Given name (may be empty).
    pub first_name: String,
    /// Family name (may be empty).
    pub last_name: String,
    /// Set once by a valid survey submission, never cleared.
    pub onboarding_completed: bool,
    /// Last successful session start.
    pub last_login: Option<DateTime<Utc>>,
    /// When the account was created.
    pub created_at: DateTime<Utc>,
    /// When the account was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Account {
    /// Full name if any part is set, otherwise the email.
    #[must_use]
    pub fn display_name(&self) -> String {
        let full = format!("{} {}", self.first_name, self.last_name);
        let full = full.trim();
        if full.is_empty() {
            self.email.to_string()
        } else {
            full.to_string()
        }
    }

    /// Where this account sits in the onboarding flow.
    #[must_use]
    pub const fn state(&self) -> AccountState {
        if self.onboarding_completed {
            AccountState::Onboarded
        } else {
            AccountState::Unonboarded
        }
    }
}

/// Onboarding states of an authenticated session.
///
/// Anonymous visitors have no account, so they are represented by the absence
/// of an [`Account`] rather than a variant here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountState {
    /// Signed in, survey not yet submitted.
    Unonboarded,
    /// Signed in, survey submitted.
    Onboarded,
}

/// Data required to insert an account.
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub email: Email,
    /// Argon2 PHC string, never the raw password.
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
}

impl NewAccount {
    /// An account with no display names.
    #[must_use]
    pub const fn new(email: Email, password_hash: String) -> Self {
        Self {
            email,
            password_hash,
            first_name: String::new(),
            last_name: String::new(),
        }
    }
}

/// Per-account financial profile captured by the onboarding survey.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FinancialProfile {
    pub id: ProfileId,
    pub account_id: AccountId,
    pub monthly_income: Option<Amount>,
    /// Rent, EMI, groceries and other fixed needs.
    pub necessary_needs: Option<Amount>,
    /// Free-text goals, e.g. "Car: 500000 by Dec 2026".
    pub goals_and_wants: String,
    /// Cap on discretionary spending per month.
    pub monthly_unwanted_limit: Option<Amount>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl FinancialProfile {
    /// Answers currently stored on the profile, for pre-filling the survey.
    #[must_use]
    pub fn answers(&self) -> SurveyAnswers {
        SurveyAnswers {
            monthly_income: self.monthly_income,
            necessary_needs: self.necessary_needs,
            goals_and_wants: self.goals_and_wants.clone(),
            monthly_unwanted_limit: self.monthly_unwanted_limit,
        }
    }
}

/// Validated survey submission.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SurveyAnswers {
    pub monthly_income: Option<Amount>,
    pub necessary_needs: Option<Amount>,
    pub goals_and_wants: String,
    pub monthly_unwanted_limit: Option<Amount>,
}

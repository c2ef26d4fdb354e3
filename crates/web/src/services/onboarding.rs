//! Onboarding survey service.
//!
//! An account is onboarded once, by a valid survey submission. The profile row
//! is created lazily on the first survey visit and may exist long before the
//! flag is set; only the flag says whether onboarding is done.

use thiserror::Error;

use crate::db::{AccountStore, RepositoryError};
use crate::models::{Account, FinancialProfile, SurveyAnswers};

/// Errors from the onboarding flow.
#[derive(Debug, Error)]
pub enum OnboardingError {
    /// The account already finished onboarding; the survey is closed.
    #[error("onboarding already completed")]
    AlreadyOnboarded,

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

/// Onboarding survey service.
pub struct OnboardingService<'a> {
    store: &'a dyn AccountStore,
}

impl<'a> OnboardingService<'a> {
    /// Create a new onboarding service.
    #[must_use]
    pub const fn new(store: &'a dyn AccountStore) -> Self {
        Self { store }
    }

    /// Open the survey for an account, creating its empty profile if needed.
    ///
    /// Safe to call on every visit: at most one profile is ever created.
    ///
    /// # Errors
    ///
    /// Returns `OnboardingError::AlreadyOnboarded` for onboarded accounts.
    pub async fn open_survey(&self, account: &Account) -> Result<FinancialProfile, OnboardingError> {
        if account.onboarding_completed {
            return Err(OnboardingError::AlreadyOnboarded);
        }

        Ok(self.store.get_or_create_profile(account.id).await?)
    }

    /// Save the answers and mark the account onboarded.
    ///
    /// # Errors
    ///
    /// Returns `OnboardingError::AlreadyOnboarded` for onboarded accounts,
    /// including when `account` is stale and the flag was set in the meantime.
    pub async fn submit_survey(
        &self,
        account: &Account,
        answers: &SurveyAnswers,
    ) -> Result<FinancialProfile, OnboardingError> {
        if account.onboarding_completed {
            return Err(OnboardingError::AlreadyOnboarded);
        }

        let profile = self
            .store
            .complete_onboarding(account.id, answers)
            .await
            .map_err(|e| match e {
                RepositoryError::AlreadyOnboarded => OnboardingError::AlreadyOnboarded,
                other => other.into(),
            })?;
        tracing::info!(account_id = %account.id, "Onboarding completed");

        Ok(profile)
    }
}

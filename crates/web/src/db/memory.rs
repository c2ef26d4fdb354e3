//! In-process [`AccountStore`] used by tests and local demos.
//!
//! Mirrors the `PostgreSQL` constraints: case-insensitive unique email, at most
//! one profile per account, and atomic onboarding completion.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;

use finmate_core::{AccountId, Email, ProfileId};

use super::{AccountStore, RepositoryError};
use crate::models::{Account, FinancialProfile, NewAccount, SurveyAnswers};

#[derive(Default)]
struct Inner {
    accounts: BTreeMap<AccountId, (Account, String)>,
    profiles: BTreeMap<AccountId, FinancialProfile>,
    next_account_id: i64,
    next_profile_id: i64,
}

impl Inner {
    fn find_by_email(&self, email: &Email) -> Option<&(Account, String)> {
        let key = email.lookup_key();
        self.accounts
            .values()
            .find(|(account, _)| account.email.lookup_key() == key)
    }

    fn insert_profile(&mut self, account_id: AccountId) -> FinancialProfile {
        self.next_profile_id += 1;
        let now = Utc::now();
        let profile = FinancialProfile {
            id: ProfileId::new(self.next_profile_id),
            account_id,
            monthly_income: None,
            necessary_needs: None,
            goals_and_wants: String::new(),
            monthly_unwanted_limit: None,
            created_at: now,
            updated_at: now,
        };
        self.profiles.insert(account_id, profile.clone());
        profile
    }
}

/// Account store held entirely in memory.
#[derive(Default)]
pub struct MemoryAccountStore {
    inner: Mutex<Inner>,
}

impl MemoryAccountStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored accounts.
    pub async fn account_count(&self) -> usize {
        self.inner.lock().await.accounts.len()
    }

    /// Number of stored financial profiles.
    pub async fn profile_count(&self) -> usize {
        self.inner.lock().await.profiles.len()
    }

    /// Delete an account and its profile, as `ON DELETE CASCADE` would.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the account doesn't exist.
    pub async fn delete_account(&self, id: AccountId) -> Result<(), RepositoryError> {
        let mut inner = self.inner.lock().await;
        inner
            .accounts
            .remove(&id)
            .ok_or(RepositoryError::NotFound)?;
        inner.profiles.remove(&id);
        Ok(())
    }
}

#[async_trait]
impl AccountStore for MemoryAccountStore {
    async fn ping(&self) -> Result<(), RepositoryError> {
        Ok(())
    }

    async fn email_exists(&self, email: &Email) -> Result<bool, RepositoryError> {
        Ok(self.inner.lock().await.find_by_email(email).is_some())
    }

    async fn create_account(&self, new: &NewAccount) -> Result<Account, RepositoryError> {
        let mut inner = self.inner.lock().await;
        if inner.find_by_email(&new.email).is_some() {
            return Err(RepositoryError::Conflict("email already exists".to_owned()));
        }

        inner.next_account_id += 1;
        let now = Utc::now();
        let account = Account {
            id: AccountId::new(inner.next_account_id),
            email: new.email.clone(),
            first_name: new.first_name.clone(),
            last_name: new.last_name.clone(),
            onboarding_completed: false,
            last_login: None,
            created_at: now,
            updated_at: now,
        };
        inner
            .accounts
            .insert(account.id, (account.clone(), new.password_hash.clone()));

        Ok(account)
    }

    async fn get_account(&self, id: AccountId) -> Result<Option<Account>, RepositoryError> {
        let inner = self.inner.lock().await;
        Ok(inner.accounts.get(&id).map(|(account, _)| account.clone()))
    }

    async fn get_credentials(
        &self,
        email: &Email,
    ) -> Result<Option<(Account, String)>, RepositoryError> {
        Ok(self.inner.lock().await.find_by_email(email).cloned())
    }

    async fn record_login(&self, id: AccountId) -> Result<(), RepositoryError> {
        let mut inner = self.inner.lock().await;
        let (account, _) = inner
            .accounts
            .get_mut(&id)
            .ok_or(RepositoryError::NotFound)?;
        account.last_login = Some(Utc::now());
        Ok(())
    }

    async fn get_or_create_profile(
        &self,
        account_id: AccountId,
    ) -> Result<FinancialProfile, RepositoryError> {
        let mut inner = self.inner.lock().await;
        if !inner.accounts.contains_key(&account_id) {
            return Err(RepositoryError::NotFound);
        }
        if let Some(profile) = inner.profiles.get(&account_id) {
            return Ok(profile.clone());
        }
        Ok(inner.insert_profile(account_id))
    }

    async fn get_profile(
        &self,
        account_id: AccountId,
    ) -> Result<Option<FinancialProfile>, RepositoryError> {
        Ok(self.inner.lock().await.profiles.get(&account_id).cloned())
    }

    async fn complete_onboarding(
        &self,
        account_id: AccountId,
        answers: &SurveyAnswers,
    ) -> Result<FinancialProfile, RepositoryError> {
        let mut inner = self.inner.lock().await;
        let (account, _) = inner
            .accounts
            .get(&account_id)
            .ok_or(RepositoryError::NotFound)?;
        if account.onboarding_completed {
            return Err(RepositoryError::AlreadyOnboarded);
        }

        if !inner.profiles.contains_key(&account_id) {
            inner.insert_profile(account_id);
        }

        let now = Utc::now();
        let profile = inner
            .profiles
            .get_mut(&account_id)
            .ok_or(RepositoryError::NotFound)?;
        profile.monthly_income = answers.monthly_income;
        profile.necessary_needs = answers.necessary_needs;
        profile.goals_and_wants.clone_from(&answers.goals_and_wants);
        profile.monthly_unwanted_limit = answers.monthly_unwanted_limit;
        profile.updated_at = now;
        let profile = profile.clone();

        if let Some((account, _)) = inner.accounts.get_mut(&account_id) {
            account.onboarding_completed = true;
            account.updated_at = now;
        }

        Ok(profile)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use finmate_core::Amount;

    use super::*;

    fn new_account(email: &str) -> NewAccount {
        NewAccount::new(Email::parse(email).unwrap(), "hash".to_string())
    }

    #[tokio::test]
    async fn test_create_rejects_duplicate_email_any_case() {
        let store = MemoryAccountStore::new();
        store.create_account(&new_account("test@example.com")).await.unwrap();

        let err = store
            .create_account(&new_account("TEST@Example.com"))
            .await
            .unwrap_err();

        assert!(matches!(err, RepositoryError::Conflict(_)));
        assert_eq!(store.account_count().await, 1);
    }

    #[tokio::test]
    async fn test_get_or_create_profile_is_idempotent() {
        let store = MemoryAccountStore::new();
        let account = store.create_account(&new_account("a@b.com")).await.unwrap();

        let first = store.get_or_create_profile(account.id).await.unwrap();
        let second = store.get_or_create_profile(account.id).await.unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(store.profile_count().await, 1);
    }

    #[tokio::test]
    async fn test_get_or_create_profile_requires_account() {
        let store = MemoryAccountStore::new();
        let err = store
            .get_or_create_profile(AccountId::new(99))
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::NotFound));
    }

    #[tokio::test]
    async fn test_complete_onboarding_saves_answers_and_flag() {
        let store = MemoryAccountStore::new();
        let account = store.create_account(&new_account("a@b.com")).await.unwrap();
        let answers = SurveyAnswers {
            monthly_income: Some(Amount::parse("50000").unwrap()),
            goals_and_wants: "Car: 500000 by Dec 2026".to_string(),
            ..SurveyAnswers::default()
        };

        let profile = store.complete_onboarding(account.id, &answers).await.unwrap();

        assert_eq!(profile.answers(), answers);
        let reloaded = store.get_account(account.id).await.unwrap().unwrap();
        assert!(reloaded.onboarding_completed);
        assert_eq!(store.profile_count().await, 1);
    }

    #[tokio::test]
    async fn test_complete_onboarding_runs_once() {
        let store = MemoryAccountStore::new();
        let account = store.create_account(&new_account("a@b.com")).await.unwrap();
        let first = SurveyAnswers {
            monthly_income: Some(Amount::parse("100").unwrap()),
            ..SurveyAnswers::default()
        };
        let second = SurveyAnswers {
            monthly_income: Some(Amount::parse("999").unwrap()),
            ..SurveyAnswers::default()
        };

        store.complete_onboarding(account.id, &first).await.unwrap();
        let err = store
            .complete_onboarding(account.id, &second)
            .await
            .unwrap_err();

        assert!(matches!(err, RepositoryError::AlreadyOnboarded));
        let profile = store.get_profile(account.id).await.unwrap().unwrap();
        assert_eq!(profile.monthly_income, first.monthly_income);
    }

    #[tokio::test]
    async fn test_delete_account_removes_profile() {
        let store = MemoryAccountStore::new();
        let account = store.create_account(&new_account("a@b.com")).await.unwrap();
        store.get_or_create_profile(account.id).await.unwrap();

        store.delete_account(account.id).await.unwrap();

        assert!(store.get_account(account.id).await.unwrap().is_none());
        assert_eq!(store.profile_count().await, 0);
        assert!(matches!(
            store.delete_account(account.id).await,
            Err(RepositoryError::NotFound)
        ));
    }
}

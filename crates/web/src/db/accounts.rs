//! `PostgreSQL` implementation of [`AccountStore`].
//!
//! Queries are checked at runtime (`query_as` + `FromRow`) so the crate builds
//! without a live database or an offline query cache.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use finmate_core::{AccountId, Amount, Email, ProfileId};

use super::{AccountStore, RepositoryError};
use crate::models::{Account, FinancialProfile, NewAccount, SurveyAnswers};

const ACCOUNT_COLUMNS: &str = "id, email, first_name, last_name, onboarding_completed, \
                               last_login, created_at, updated_at";

const PROFILE_COLUMNS: &str = "id, account_id, monthly_income, necessary_needs, \
                               goals_and_wants, monthly_unwanted_limit, created_at, updated_at";

#[derive(sqlx::FromRow)]
struct AccountRow {
    id: i64,
    email: String,
    first_name: String,
    last_name: String,
    onboarding_completed: bool,
    last_login: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<AccountRow> for Account {
    type Error = RepositoryError;

    fn try_from(row: AccountRow) -> Result<Self, Self::Error> {
        let email = Email::parse(&row.email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
        })?;

        Ok(Self {
            id: AccountId::new(row.id),
            email,
            first_name: row.first_name,
            last_name: row.last_name,
            onboarding_completed: row.onboarding_completed,
            last_login: row.last_login,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct CredentialRow {
    #[sqlx(flatten)]
    account: AccountRow,
    password_hash: String,
}

#[derive(sqlx::FromRow)]
struct ProfileRow {
    id: i64,
    account_id: i64,
    monthly_income: Option<Decimal>,
    necessary_needs: Option<Decimal>,
    goals_and_wants: String,
    monthly_unwanted_limit: Option<Decimal>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

fn stored_amount(value: Option<Decimal>, column: &str) -> Result<Option<Amount>, RepositoryError> {
    value
        .map(Amount::new)
        .transpose()
        .map_err(|e| RepositoryError::DataCorruption(format!("invalid {column} in database: {e}")))
}

impl TryFrom<ProfileRow> for FinancialProfile {
    type Error = RepositoryError;

    fn try_from(row: ProfileRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: ProfileId::new(row.id),
            account_id: AccountId::new(row.account_id),
            monthly_income: stored_amount(row.monthly_income, "monthly_income")?,
            necessary_needs: stored_amount(row.necessary_needs, "necessary_needs")?,
            goals_and_wants: row.goals_and_wants,
            monthly_unwanted_limit: stored_amount(
                row.monthly_unwanted_limit,
                "monthly_unwanted_limit",
            )?,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Map constraint violations to domain errors.
fn map_write_error(e: sqlx::Error, what: &str) -> RepositoryError {
    if let sqlx::Error::Database(ref db_err) = e {
        if db_err.is_unique_violation() {
            return RepositoryError::Conflict(format!("{what} already exists"));
        }
        if db_err.is_foreign_key_violation() {
            return RepositoryError::NotFound;
        }
    }
    RepositoryError::Database(e)
}

/// Account store backed by the `finmate` schema.
#[derive(Clone)]
pub struct PgAccountStore {
    pool: PgPool,
}

impl PgAccountStore {
    /// Create a store over an existing pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Get a reference to the underlying pool.
    #[must_use]
    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl AccountStore for PgAccountStore {
    async fn ping(&self) -> Result<(), RepositoryError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn email_exists(&self, email: &Email) -> Result<bool, RepositoryError> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM finmate.account WHERE lower(email) = $1)",
        )
        .bind(email.lookup_key())
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    async fn create_account(&self, account: &NewAccount) -> Result<Account, RepositoryError> {
        let sql = format!(
            "INSERT INTO finmate.account (email, password_hash, first_name, last_name) \
             VALUES ($1, $2, $3, $4) \
             RETURNING {ACCOUNT_COLUMNS}"
        );

        let row: AccountRow = sqlx::query_as(&sql)
            .bind(&account.email)
            .bind(&account.password_hash)
            .bind(&account.first_name)
            .bind(&account.last_name)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_write_error(e, "email"))?;

        row.try_into()
    }

    async fn get_account(&self, id: AccountId) -> Result<Option<Account>, RepositoryError> {
        let sql = format!("SELECT {ACCOUNT_COLUMNS} FROM finmate.account WHERE id = $1");

        let row: Option<AccountRow> = sqlx::query_as(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(Account::try_from).transpose()
    }

    async fn get_credentials(
        &self,
        email: &Email,
    ) -> Result<Option<(Account, String)>, RepositoryError> {
        let sql = format!(
            "SELECT {ACCOUNT_COLUMNS}, password_hash FROM finmate.account WHERE lower(email) = $1"
        );

        let row: Option<CredentialRow> = sqlx::query_as(&sql)
            .bind(email.lookup_key())
            .fetch_optional(&self.pool)
            .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        Ok(Some((row.account.try_into()?, row.password_hash)))
    }

    async fn record_login(&self, id: AccountId) -> Result<(), RepositoryError> {
        let result = sqlx::query("UPDATE finmate.account SET last_login = now() WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    async fn get_or_create_profile(
        &self,
        account_id: AccountId,
    ) -> Result<FinancialProfile, RepositoryError> {
        // ON CONFLICT keeps concurrent first visits down to a single row
        sqlx::query(
            "INSERT INTO finmate.financial_profile (account_id) VALUES ($1) \
             ON CONFLICT (account_id) DO NOTHING",
        )
        .bind(account_id)
        .execute(&self.pool)
        .await
        .map_err(|e| map_write_error(e, "profile"))?;

        self.get_profile(account_id)
            .await?
            .ok_or(RepositoryError::NotFound)
    }

    async fn get_profile(
        &self,
        account_id: AccountId,
    ) -> Result<Option<FinancialProfile>, RepositoryError> {
        let sql =
            format!("SELECT {PROFILE_COLUMNS} FROM finmate.financial_profile WHERE account_id = $1");

        let row: Option<ProfileRow> = sqlx::query_as(&sql)
            .bind(account_id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(FinancialProfile::try_from).transpose()
    }

    async fn complete_onboarding(
        &self,
        account_id: AccountId,
        answers: &SurveyAnswers,
    ) -> Result<FinancialProfile, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        // Claim the flag first so only one submission ever writes answers
        let claimed = sqlx::query(
            "UPDATE finmate.account \
             SET onboarding_completed = TRUE, updated_at = now() \
             WHERE id = $1 AND onboarding_completed = FALSE",
        )
        .bind(account_id)
        .execute(&mut *tx)
        .await?;

        if claimed.rows_affected() == 0 {
            let exists: bool = sqlx::query_scalar(
                "SELECT EXISTS (SELECT 1 FROM finmate.account WHERE id = $1)",
            )
            .bind(account_id)
            .fetch_one(&mut *tx)
            .await?;

            // Dropping the transaction rolls it back
            return Err(if exists {
                RepositoryError::AlreadyOnboarded
            } else {
                RepositoryError::NotFound
            });
        }

        let sql = format!(
            "INSERT INTO finmate.financial_profile \
                 (account_id, monthly_income, necessary_needs, goals_and_wants, monthly_unwanted_limit) \
             VALUES ($1, $2, $3, $4, $5) \
             ON CONFLICT (account_id) DO UPDATE SET \
                 monthly_income = EXCLUDED.monthly_income, \
                 necessary_needs = EXCLUDED.necessary_needs, \
                 goals_and_wants = EXCLUDED.goals_and_wants, \
                 monthly_unwanted_limit = EXCLUDED.monthly_unwanted_limit, \
                 updated_at = now() \
             RETURNING {PROFILE_COLUMNS}"
        );

        let row: ProfileRow = sqlx::query_as(&sql)
            .bind(account_id)
            .bind(answers.monthly_income)
            .bind(answers.necessary_needs)
            .bind(&answers.goals_and_wants)
            .bind(answers.monthly_unwanted_limit)
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| map_write_error(e, "profile"))?;

        tx.commit().await?;

        row.try_into()
    }
}

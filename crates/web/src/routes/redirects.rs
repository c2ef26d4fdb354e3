//! Where the account flow sends people after signing in or out.

use super::paths;
use crate::models::{Account, AccountState};

/// Redirect policy for the login and logout flows.
///
/// Installed once in [`AppState`](crate::state::AppState); swap the
/// implementation to change landing pages without touching the handlers.
pub trait AuthRedirects: Send + Sync {
    /// Target after a successful login, and for signed-in visits to the login page.
    fn after_login(&self, account: &Account) -> String;

    /// Target after logout.
    fn after_logout(&self) -> String;
}

/// Sends accounts that haven't finished the survey back to it.
#[derive(Debug, Clone, Copy, Default)]
pub struct OnboardingRedirects;

impl AuthRedirects for OnboardingRedirects {
    fn after_login(&self, account: &Account) -> String {
        let target = match account.state() {
            AccountState::Unonboarded => paths::SURVEY,
            AccountState::Onboarded => paths::DASHBOARD,
        };
        target.to_owned()
    }

    fn after_logout(&self) -> String {
        paths::SIGNUP.to_owned()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Utc;
    use finmate_core::{AccountId, Email};

    use super::*;

    fn account(onboarded: bool) -> Account {
        let now = Utc::now();
        Account {
            id: AccountId::new(1),
            email: Email::parse("a@b.com").unwrap(),
            first_name: String::new(),
            last_name: String::new(),
            onboarding_completed: onboarded,
            last_login: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_after_login_follows_onboarding() {
        assert_eq!(OnboardingRedirects.after_login(&account(false)), "/accounts/survey/");
        assert_eq!(OnboardingRedirects.after_login(&account(true)), "/");
    }

    #[test]
    fn test_after_logout_is_signup() {
        assert_eq!(OnboardingRedirects.after_logout(), "/accounts/signup/");
    }
}

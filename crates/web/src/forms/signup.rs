//! Signup form.

use serde::Deserialize;

use finmate_core::Email;

use super::{FormError, FormErrors, REQUIRED};
use crate::db::AccountStore;

/// Shown when the email (any case) is already registered.
pub const DUPLICATE_EMAIL: &str = "A user with that email already exists.";

/// Shown when the two password entries differ.
pub const PASSWORD_MISMATCH: &str = "The two password fields didn't match.";

/// Minimum password length.
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Signup form data.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SignupForm {
    pub email: String,
    pub password1: String,
    pub password2: String,
}

/// A signup that passed validation.
#[derive(Debug, Clone)]
pub struct ValidSignup {
    pub email: Email,
    pub password: String,
}

impl SignupForm {
    /// Validate the input, including the duplicate-email check.
    ///
    /// The duplicate check is advisory: a concurrent signup can still claim
    /// the email before the insert, which the store then rejects.
    ///
    /// # Errors
    ///
    /// Returns `FormError::Invalid` with field messages, or
    /// `FormError::Repository` if the store lookup fails.
    pub async fn validate(&self, store: &dyn AccountStore) -> Result<ValidSignup, FormError> {
        let mut errors = FormErrors::default();

        let email = if self.email.trim().is_empty() {
            errors.add("email", REQUIRED);
            None
        } else {
            match Email::parse(&self.email) {
                Ok(email) => Some(email),
                Err(_) => {
                    errors.add("email", "Enter a valid email address.");
                    None
                }
            }
        };

        if let Some(email) = &email
            && store.email_exists(email).await?
        {
            errors.add("email", DUPLICATE_EMAIL);
        }

        if self.password1.is_empty() {
            errors.add("password1", REQUIRED);
        }

        if self.password2.is_empty() {
            errors.add("password2", REQUIRED);
        } else if !self.password1.is_empty() {
            if self.password1 == self.password2 {
                for message in password_policy_errors(&self.password2) {
                    errors.add("password2", message);
                }
            } else {
                errors.add("password2", PASSWORD_MISMATCH);
            }
        }

        match email {
            Some(email) if errors.is_empty() => Ok(ValidSignup {
                email,
                password: self.password1.clone(),
            }),
            _ => Err(errors.into()),
        }
    }
}

/// Check a password against the signup policy.
#[must_use]
pub fn password_policy_errors(password: &str) -> Vec<String> {
    let mut messages = Vec::new();

    if password.chars().count() < MIN_PASSWORD_LENGTH {
        messages.push(format!(
            "This password is too short. It must contain at least {MIN_PASSWORD_LENGTH} characters."
        ));
    }

    if password.chars().all(|c| c.is_ascii_digit()) {
        messages.push("This password is entirely numeric.".to_owned());
    }

    messages
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::db::MemoryAccountStore;
    use crate::models::NewAccount;

    fn form(email: &str, password1: &str, password2: &str) -> SignupForm {
        SignupForm {
            email: email.to_string(),
            password1: password1.to_string(),
            password2: password2.to_string(),
        }
    }

    fn invalid(result: Result<ValidSignup, FormError>) -> FormErrors {
        match result {
            Err(FormError::Invalid(errors)) => errors,
            other => panic!("expected invalid form, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_signup_form_valid() {
        let store = MemoryAccountStore::new();
        let valid = form("newuser@example.com", "SecurePass123!", "SecurePass123!")
            .validate(&store)
            .await
            .unwrap();

        assert_eq!(valid.email.as_str(), "newuser@example.com");
        assert_eq!(valid.password, "SecurePass123!");
    }

    #[tokio::test]
    async fn test_signup_form_password_mismatch() {
        let store = MemoryAccountStore::new();
        let errors = invalid(
            form("newuser@example.com", "SecurePass123!", "DifferentPass123!")
                .validate(&store)
                .await,
        );

        assert_eq!(errors.get("password2"), [PASSWORD_MISMATCH]);
        assert!(!errors.has("email"));
    }

    #[tokio::test]
    async fn test_signup_form_duplicate_email_any_case() {
        let store = MemoryAccountStore::new();
        store
            .create_account(&NewAccount::new(
                Email::parse("test@example.com").unwrap(),
                "hash".to_string(),
            ))
            .await
            .unwrap();

        let errors = invalid(
            form("TEST@Example.COM", "SecurePass123!", "SecurePass123!")
                .validate(&store)
                .await,
        );

        assert_eq!(errors.get("email"), [DUPLICATE_EMAIL]);
    }

    #[tokio::test]
    async fn test_signup_form_required_fields() {
        let store = MemoryAccountStore::new();
        let errors = invalid(SignupForm::default().validate(&store).await);

        assert_eq!(errors.get("email"), [REQUIRED]);
        assert_eq!(errors.get("password1"), [REQUIRED]);
        assert_eq!(errors.get("password2"), [REQUIRED]);
    }

    #[tokio::test]
    async fn test_signup_form_malformed_email() {
        let store = MemoryAccountStore::new();
        let errors = invalid(
            form("not-an-email", "SecurePass123!", "SecurePass123!")
                .validate(&store)
                .await,
        );

        assert_eq!(errors.get("email"), ["Enter a valid email address."]);
    }

    #[test]
    fn test_password_policy() {
        assert!(password_policy_errors("P@ss1234").is_empty());
        assert_eq!(password_policy_errors("short").len(), 1);
        assert_eq!(password_policy_errors("12345678"), ["This password is entirely numeric."]);
        assert_eq!(password_policy_errors("123").len(), 2);
    }
}

//! Login form.
//!
//! The email is submitted in the `username` field; `email` is accepted too.

use serde::Deserialize;

use super::{FormErrors, REQUIRED};

/// Shown for any failed login, whether or not the email exists.
pub const INVALID_CREDENTIALS: &str =
    "Please enter a correct email and password. Note that both fields may be case-sensitive.";

/// Login form data.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LoginForm {
    #[serde(alias = "email")]
    pub username: String,
    pub password: String,
}

impl LoginForm {
    /// Check that both fields are present.
    ///
    /// # Errors
    ///
    /// Returns the field errors for blank inputs.
    pub fn validate(&self) -> Result<(), FormErrors> {
        let mut errors = FormErrors::default();

        if self.username.trim().is_empty() {
            errors.add("username", REQUIRED);
        }
        if self.password.is_empty() {
            errors.add("password", REQUIRED);
        }

        errors.into_result(|| ())
    }

    /// Form errors for rejected credentials.
    #[must_use]
    pub fn credentials_rejected() -> FormErrors {
        let mut errors = FormErrors::default();
        errors.add_non_field(INVALID_CREDENTIALS);
        errors
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_login_form_requires_both_fields() {
        let errors = LoginForm::default().validate().unwrap_err();
        assert_eq!(errors.get("username"), [REQUIRED]);
        assert_eq!(errors.get("password"), [REQUIRED]);
    }

    #[test]
    fn test_login_form_valid() {
        let form = LoginForm {
            username: "test@example.com".to_string(),
            password: "testpass123".to_string(),
        };
        assert!(form.validate().is_ok());
    }

    #[test]
    fn test_credentials_rejected_is_non_field() {
        let errors = LoginForm::credentials_rejected();
        assert_eq!(errors.non_field(), [INVALID_CREDENTIALS]);
        assert!(!errors.has("username"));
    }
}

//! HTML form payloads and their validation.
//!
//! Every form deserializes leniently (missing fields become empty strings) so
//! that absent input is reported as a field error instead of a 422 rejection.
//!
//! - [`signup`] - Email plus password confirmation
//! - [`login`] - Email-as-username credentials
//! - [`survey`] - Onboarding financial profile

pub mod login;
pub mod signup;
pub mod survey;

use std::collections::BTreeMap;

use thiserror::Error;

use crate::db::RepositoryError;

pub use login::LoginForm;
pub use signup::SignupForm;
pub use survey::SurveyForm;

/// Message for a blank required field.
pub const REQUIRED: &str = "This field is required.";

/// Field-scoped and form-wide validation messages.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormErrors {
    fields: BTreeMap<&'static str, Vec<String>>,
    non_field: Vec<String>,
}

impl FormErrors {
    /// Attach a message to a field.
    pub fn add(&mut self, field: &'static str, message: impl Into<String>) {
        self.fields.entry(field).or_default().push(message.into());
    }

    /// Attach a message to the form as a whole.
    pub fn add_non_field(&mut self, message: impl Into<String>) {
        self.non_field.push(message.into());
    }

    /// Messages for one field, in the order they were added.
    #[must_use]
    pub fn get(&self, field: &str) -> &[String] {
        self.fields.get(field).map_or(&[], Vec::as_slice)
    }

    /// Whether a field has at least one message.
    #[must_use]
    pub fn has(&self, field: &str) -> bool {
        !self.get(field).is_empty()
    }

    /// Form-wide messages.
    #[must_use]
    pub fn non_field(&self) -> &[String] {
        &self.non_field
    }

    /// True when nothing has been reported.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty() && self.non_field.is_empty()
    }

    /// `Ok(value)` when empty, otherwise `Err(self)`.
    ///
    /// # Errors
    ///
    /// Returns the collected errors if any were reported.
    pub fn into_result<T>(self, value: impl FnOnce() -> T) -> Result<T, Self> {
        if self.is_empty() { Ok(value()) } else { Err(self) }
    }
}

/// Outcome of validating a form that also consults the store.
#[derive(Debug, Error)]
pub enum FormError {
    /// The input was rejected; re-render with these messages.
    #[error("form has errors")]
    Invalid(FormErrors),

    /// The store could not be consulted.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

impl From<FormErrors> for FormError {
    fn from(errors: FormErrors) -> Self {
        Self::Invalid(errors)
    }
}

//! Onboarding survey form.

use serde::Deserialize;

use finmate_core::Amount;

use super::FormErrors;
use crate::models::SurveyAnswers;

/// Survey form data, kept as raw strings so invalid input can be re-rendered.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SurveyForm {
    pub monthly_income: String,
    pub necessary_needs: String,
    pub goals_and_wants: String,
    pub monthly_unwanted_limit: String,
}

impl SurveyForm {
    /// Validate every field, collecting all errors.
    ///
    /// Blank amounts are allowed and stored as unset.
    ///
    /// # Errors
    ///
    /// Returns the field errors for malformed or out-of-range amounts.
    pub fn validate(&self) -> Result<SurveyAnswers, FormErrors> {
        let mut errors = FormErrors::default();

        let monthly_income = optional_amount(&self.monthly_income, "monthly_income", &mut errors);
        let necessary_needs =
            optional_amount(&self.necessary_needs, "necessary_needs", &mut errors);
        let monthly_unwanted_limit = optional_amount(
            &self.monthly_unwanted_limit,
            "monthly_unwanted_limit",
            &mut errors,
        );

        errors.into_result(|| SurveyAnswers {
            monthly_income,
            necessary_needs,
            goals_and_wants: self.goals_and_wants.trim().to_owned(),
            monthly_unwanted_limit,
        })
    }
}

impl From<&SurveyAnswers> for SurveyForm {
    fn from(answers: &SurveyAnswers) -> Self {
        let show = |amount: Option<Amount>| amount.map(|a| a.to_string()).unwrap_or_default();

        Self {
            monthly_income: show(answers.monthly_income),
            necessary_needs: show(answers.necessary_needs),
            goals_and_wants: answers.goals_and_wants.clone(),
            monthly_unwanted_limit: show(answers.monthly_unwanted_limit),
        }
    }
}

fn optional_amount(raw: &str, field: &'static str, errors: &mut FormErrors) -> Option<Amount> {
    if raw.trim().is_empty() {
        return None;
    }

    match Amount::parse(raw) {
        Ok(amount) => Some(amount),
        Err(e) => {
            errors.add(field, e.to_string());
            None
        }
    }
}

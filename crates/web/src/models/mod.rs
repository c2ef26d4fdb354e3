//! Domain models for the accounts subsystem.
//!
//! - [`account`] - Accounts, financial profiles and survey answers
//! - [`session`] - What the session cookie carries between requests

pub mod account;
pub mod session;

pub use account::{Account, AccountState, FinancialProfile, NewAccount, SurveyAnswers};
pub use session::{CurrentAccount, FlashMessage, keys as session_keys};

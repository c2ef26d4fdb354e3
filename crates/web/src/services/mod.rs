//! Business logic services.
//!
//! - `auth` - Account registration and email/password authentication
//! - `onboarding` - The one-time financial survey

pub mod auth;
pub mod onboarding;

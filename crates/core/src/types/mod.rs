//! Core types for FinMate.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod amount;
pub mod email;
pub mod id;

pub use amount::{Amount, AmountError};
pub use email::{Email, EmailError};
pub use id::*;

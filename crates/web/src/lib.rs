//! FinMate web server library.
//!
//! Account signup, login and logout, the onboarding financial survey and the
//! site-wide login requirement. Exposed as a library so the router can be
//! driven from tests and the CLI can reuse the account services.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod forms;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;

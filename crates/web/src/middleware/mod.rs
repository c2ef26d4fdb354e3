//! HTTP middleware stack for the FinMate server.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (hub per request, HTTP transaction)
//! 2. `TraceLayer` (request tracing)
//! 3. Security headers
//! 4. Session layer (tower-sessions)
//! 5. Login required (redirect anonymous visitors of protected paths)

pub mod auth;
pub mod flash;
pub mod login_required;
pub mod security_headers;
pub mod session;

pub use auth::{OptionalAuth, RequireAuth, clear_current_account, set_current_account};
pub use flash::{push_flash, take_flashes};
pub use login_required::{BUILTIN_EXEMPT_PREFIXES, ExemptUrls, login_required};
pub use security_headers::security_headers_middleware;
pub use session::{SESSION_COOKIE_NAME, create_session_layer};

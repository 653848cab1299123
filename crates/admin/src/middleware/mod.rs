//! HTTP middleware stack for admin.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (hub per request, HTTP transaction)
//! 2. `TraceLayer` (request span)
//! 3. Request ID (add unique ID to each request)
//! 4. Session layer (tower-sessions, `admin.session`, SameSite=Strict)
//! 5. Rate limiting (governor) on the login route
//!
//! Handlers opt into authentication with the [`RequireAdminAuth`] and
//! [`RequireWriter`] extractors; cron routes check a bearer secret instead.

pub mod auth;
pub mod rate_limit;
pub mod request_id;
pub mod session;

pub use auth::{RequireAdminAuth, RequireWriter, clear_current_admin, set_current_admin};
pub use rate_limit::login_rate_limiter;
pub use request_id::request_id_middleware;
pub use session::create_session_layer;

//! HTTP middleware stack for the site.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (capture errors)
//! 2. `TraceLayer` (request tracing)
//! 3. Request ID (add unique ID to each request)
//! 4. Security headers
//! 5. Session layer (tower-sessions with in-process store)

pub mod auth;
pub mod request_id;
pub mod security_headers;
pub mod session;

pub use auth::{RequireAdmin, current_admin, grant_admin, is_admin, password_matches, revoke_admin};
pub use request_id::request_id_middleware;
pub use security_headers::security_headers_middleware;
pub use session::create_session_layer;

//! HTTP middleware stack for the storefront.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (hub per request, error capture)
//! 2. Rate limiting on `/api` (governor)
//! 3. `TraceLayer` (request span with `request_id` and `customer_id` fields)
//! 4. Request ID (add unique ID to each request)
//! 5. Security headers
//! 6. Session layer (tower-sessions, moka-backed store)
//!
//! The customer extractors in [`auth`] run inside the handler, after the
//! session layer has loaded the session.

pub mod auth;
pub mod rate_limit;
pub mod request_id;
pub mod security_headers;
pub mod session;

pub use auth::{RequireAuth, clear_current_customer, set_current_customer};
pub use rate_limit::api_rate_limiter;
pub use request_id::request_id_middleware;
pub use security_headers::security_headers_middleware;
pub use session::create_session_layer;

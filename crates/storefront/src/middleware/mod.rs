//! HTTP middleware stack for storefront.
//!
//! # Middleware Order (bottom to top in Router)
//!
//! 1. Sentry layers (capture errors, added by the binary)
//! 2. `TraceLayer` (request tracing)
//! 3. Session layer (tower-sessions with `PostgreSQL` store)
//! 4. Security headers

pub mod auth;
pub mod flash;
pub mod security_headers;
pub mod session;

pub use auth::{RequireAuth, clear_identity, current_identity, set_identity};
pub use flash::{push_flash, take_flash};
pub use security_headers::security_headers_middleware;
pub use session::create_session_layer;

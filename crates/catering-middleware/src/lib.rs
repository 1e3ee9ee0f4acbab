//! # Catering Middleware
//!
//! Request pipeline stages, outermost first as the server installs them:
//!
//! 1. [`LoggingMiddleware`]: one `tracing` event per request
//! 2. [`RouteGate`]: redirects page requests based on session-cookie presence
//! 3. [`SessionMiddleware`]: resolves the session cookie into a
//!    [`catering_auth::SessionState`] for API handlers
//! 4. [`CsrfMiddleware`]: double-submit check on state-changing API calls

pub mod csrf;
pub mod logging;
pub mod route_gate;
pub mod session;

pub use csrf::{CsrfConfig, CsrfMiddleware, generate_token, tokens_match, verify_request};
pub use logging::LoggingMiddleware;
pub use route_gate::{RouteClass, RouteGate, RouteGateConfig};
pub use session::{SessionMiddleware, session_of};

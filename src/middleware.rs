//! Request logging, page route gating, session resolution and CSRF.

pub use catering_middleware::*;

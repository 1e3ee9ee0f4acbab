//! Password hashing, JWT session tokens and role checks.

pub use catering_auth::*;

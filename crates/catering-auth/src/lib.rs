//! # Catering Auth
//!
//! Credential and session management:
//!
//! - [`PasswordHasher`] / [`Argon2Hasher`]: salted Argon2id hashes
//! - [`JwtAuth`] / [`Claims`]: HS256 session tokens carrying
//!   `{userId, email, role}` with a one-hour default lifetime
//! - [`SessionState`] / [`SessionIdentity`]: the per-request view of the
//!   `token` cookie
//! - [`require_role`]: the single capability check used by protected views

pub mod hasher;
pub mod identity;
pub mod jwt;

pub use hasher::{Argon2Hasher, PasswordHasher};
pub use identity::{
	SESSION_COOKIE, SessionIdentity, SessionState, require_role, role_grants,
};
pub use jwt::{Claims, DEFAULT_TOKEN_TTL, JwtAuth};

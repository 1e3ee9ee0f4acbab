//! Request-scoped session identity and the central capability check.
//!
//! The session layer resolves the `token` cookie once per request into a
//! [`SessionState`] and stores it in request extensions. Handlers read it
//! back and call [`require_role`] instead of comparing roles themselves.

use catering_core::{Error, Result, Role};
use serde::Serialize;

use crate::jwt::{Claims, JwtAuth};

/// Name of the cookie carrying the signed session token.
pub const SESSION_COOKIE: &str = "token";

/// Identity asserted by a verified session token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionIdentity {
	pub user_id: String,
	pub email: String,
	pub role: Role,
}

impl From<Claims> for SessionIdentity {
	fn from(claims: Claims) -> Self {
		Self {
			user_id: claims.user_id,
			email: claims.email,
			role: claims.role,
		}
	}
}

impl SessionIdentity {
	pub fn is_admin(&self) -> bool {
		self.role == Role::Admin
	}

	/// Whether this identity owns a record stored with `owner_id`.
	pub fn owns(&self, owner_id: &str) -> bool {
		self.user_id == owner_id
	}
}

/// Outcome of resolving the session cookie for one request.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SessionState {
	/// No session cookie was sent
	#[default]
	Anonymous,
	/// A cookie was sent but failed verification
	Invalid(String),
	Authenticated(SessionIdentity),
}

impl SessionState {
	/// Resolves a raw cookie value, if any, against `auth`.
	pub fn resolve(token: Option<&str>, auth: &JwtAuth) -> Self {
		match token {
			None => SessionState::Anonymous,
			Some(token) => match auth.decode(token) {
				Ok(claims) => SessionState::Authenticated(claims.into()),
				Err(err) => {
					tracing::debug!(error = %err, "session token rejected");
					SessionState::Invalid(err.to_string())
				}
			},
		}
	}

	pub fn identity(&self) -> Option<&SessionIdentity> {
		match self {
			SessionState::Authenticated(identity) => Some(identity),
			_ => None,
		}
	}

	/// Identity or an error that keeps "no token" and "bad token" apart.
	///
	/// Missing yields [`Error::Authentication`] (401), a token that failed
	/// verification yields [`Error::InvalidToken`] (403).
	pub fn require_verified(&self, missing_message: &str) -> Result<&SessionIdentity> {
		match self {
			SessionState::Authenticated(identity) => Ok(identity),
			SessionState::Anonymous => Err(Error::Authentication(missing_message.to_string())),
			SessionState::Invalid(_) => {
				Err(Error::InvalidToken("Invalid or expired token.".to_string()))
			}
		}
	}
}

/// Whether `held` satisfies `required`. Admins hold every user capability.
pub fn role_grants(held: Role, required: Role) -> bool {
	match required {
		Role::User => true,
		Role::Admin => held == Role::Admin,
	}
}

fn denial_message(required: Role) -> &'static str {
	match required {
		Role::User => "User not authenticated.",
		Role::Admin => "Unauthorized: Admin access required.",
	}
}

/// Central capability check shared by every protected handler.
///
/// Absent, invalid and under-privileged sessions are all authorization
/// failures here; the message depends only on the required role.
///
/// # Examples
///
/// ```
/// use catering_auth::{SessionIdentity, SessionState, require_role};
/// use catering_core::Role;
///
/// let user = SessionState::Authenticated(SessionIdentity {
///     user_id: "u-1".into(),
///     email: "a@example.com".into(),
///     role: Role::User,
/// });
///
/// assert!(require_role(&user, Role::User).is_ok());
/// assert!(require_role(&user, Role::Admin).is_err());
/// assert!(require_role(&SessionState::Anonymous, Role::User).is_err());
/// ```
pub fn require_role(session: &SessionState, required: Role) -> Result<&SessionIdentity> {
	match session.identity() {
		Some(identity) if role_grants(identity.role, required) => Ok(identity),
		Some(_) => Err(Error::Authorization(denial_message(required).to_string())),
		None => match required {
			Role::User => Err(Error::Authentication(denial_message(required).to_string())),
			Role::Admin => Err(Error::Authorization(denial_message(required).to_string())),
		},
	}
}

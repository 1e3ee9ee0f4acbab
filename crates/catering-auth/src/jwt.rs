use catering_core::{Error, Result, Role};
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

/// Session token lifetime used when none is configured.
pub const DEFAULT_TOKEN_TTL: Duration = Duration::hours(1);

/// Claims embedded in the `token` cookie.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Claims {
	pub user_id: String,
	pub email: String,
	pub role: Role,
	pub iat: i64,
	pub exp: i64,
}

impl Claims {
	/// Creates claims issued now and expiring after `expires_in`.
	///
	/// # Examples
	///
	/// ```
	/// use catering_auth::jwt::Claims;
	/// use catering_core::Role;
	/// use chrono::Duration;
	///
	/// let claims = Claims::new("u-1", "a@example.com", Role::User, Duration::hours(1));
	/// assert_eq!(claims.exp - claims.iat, 3600);
	/// assert!(!claims.is_expired());
	/// ```
	pub fn new(
		user_id: impl Into<String>,
		email: impl Into<String>,
		role: Role,
		expires_in: Duration,
	) -> Self {
		let now = Utc::now();
		Self {
			user_id: user_id.into(),
			email: email.into(),
			role,
			iat: now.timestamp(),
			exp: (now + expires_in).timestamp(),
		}
	}

	pub fn is_expired(&self) -> bool {
		Utc::now().timestamp() > self.exp
	}
}

/// HS256 signer and verifier for session tokens.
pub struct JwtAuth {
	encoding_key: EncodingKey,
	decoding_key: DecodingKey,
	validation: Validation,
	ttl: Duration,
}

impl JwtAuth {
	pub fn new(secret: &[u8]) -> Self {
		let mut validation = Validation::default();
		validation.leeway = 0;
		Self {
			encoding_key: EncodingKey::from_secret(secret),
			decoding_key: DecodingKey::from_secret(secret),
			validation,
			ttl: DEFAULT_TOKEN_TTL,
		}
	}

	pub fn with_ttl(mut self, ttl: Duration) -> Self {
		self.ttl = ttl;
		self
	}

	pub fn ttl(&self) -> Duration {
		self.ttl
	}

	pub fn encode(&self, claims: &Claims) -> Result<String> {
		encode(&Header::default(), claims, &self.encoding_key)
			.map_err(|e| Error::Internal(format!("token signing failed: {}", e)))
	}

	/// Verifies signature and expiry.
	///
	/// Every failure is [`Error::InvalidToken`]; callers decide whether that
	/// means "logged out" or a distinct 403.
	pub fn decode(&self, token: &str) -> Result<Claims> {
		decode::<Claims>(token, &self.decoding_key, &self.validation)
			.map(|data| data.claims)
			.map_err(|e| Error::InvalidToken(e.to_string()))
	}

	/// Issues a token for the given identity using the configured lifetime.
	///
	/// # Examples
	///
	/// ```
	/// use catering_auth::jwt::JwtAuth;
	/// use catering_core::Role;
	///
	/// let auth = JwtAuth::new(b"secret");
	/// let token = auth.issue("u-1", "a@example.com", Role::Admin).unwrap();
	/// let claims = auth.decode(&token).unwrap();
	/// assert_eq!(claims.role, Role::Admin);
	/// ```
	pub fn issue(&self, user_id: &str, email: &str, role: Role) -> Result<String> {
		self.encode(&Claims::new(user_id, email, role, self.ttl))
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	fn test_claims_wire_names() {
		let claims = Claims::new("u-1", "a@example.com", Role::User, Duration::hours(1));
		let json = serde_json::to_value(&claims).unwrap();

		assert_eq!(json["userId"], "u-1");
		assert_eq!(json["email"], "a@example.com");
		assert_eq!(json["role"], "user");
		assert!(json["exp"].is_i64());
	}

	#[rstest]
	fn test_expired_token_rejected() {
		let auth = JwtAuth::new(b"secret");
		let claims = Claims::new("u-1", "a@example.com", Role::User, Duration::seconds(-5));
		let token = auth.encode(&claims).unwrap();

		let err = auth.decode(&token).unwrap_err();
		assert!(matches!(err, Error::InvalidToken(_)));
	}

	#[rstest]
	fn test_wrong_secret_rejected() {
		let token = JwtAuth::new(b"one")
			.issue("u-1", "a@example.com", Role::User)
			.unwrap();

		let err = JwtAuth::new(b"two").decode(&token).unwrap_err();
		assert_eq!(err.status_code().as_u16(), 403);
	}

	#[rstest]
	fn test_garbage_token_rejected() {
		let auth = JwtAuth::new(b"secret");
		assert!(auth.decode("not.a.jwt").is_err());
		assert!(auth.decode("").is_err());
	}

	#[rstest]
	fn test_custom_ttl() {
		let auth = JwtAuth::new(b"secret").with_ttl(Duration::minutes(5));
		let claims = auth.decode(&auth.issue("u", "e@x.io", Role::User).unwrap()).unwrap();

		assert_eq!(claims.exp - claims.iat, 300);
	}
}

use catering_core::{Error, Result};

/// Password hashing strategy.
///
/// # Examples
///
/// ```
/// use catering_auth::{Argon2Hasher, PasswordHasher};
///
/// let hasher = Argon2Hasher::new();
/// let hash = hasher.hash("Rahasia#2024").unwrap();
///
/// assert!(hasher.verify("Rahasia#2024", &hash).unwrap());
/// assert!(!hasher.verify("rahasia#2024", &hash).unwrap());
/// ```
pub trait PasswordHasher: Send + Sync {
	/// Hashes a plaintext password into a self-describing PHC string.
	fn hash(&self, password: &str) -> Result<String>;

	/// Checks `password` against a stored hash.
	///
	/// Returns `Ok(false)` on mismatch and an error only when `hash` is not
	/// a parseable PHC string.
	fn verify(&self, password: &str, hash: &str) -> Result<bool>;
}

/// Argon2id with the crate's default parameters.
#[derive(Debug, Clone, Copy, Default)]
pub struct Argon2Hasher;

impl Argon2Hasher {
	pub fn new() -> Self {
		Self
	}
}

impl PasswordHasher for Argon2Hasher {
	fn hash(&self, password: &str) -> Result<String> {
		use argon2::{
			Argon2,
			password_hash::{PasswordHasher as _, SaltString},
		};
		use rand::RngCore;

		let mut salt_bytes = [0u8; 16];
		rand::rngs::OsRng.fill_bytes(&mut salt_bytes);

		let salt = SaltString::encode_b64(&salt_bytes)
			.map_err(|e| Error::Internal(format!("salt encoding failed: {}", e)))?;

		Argon2::default()
			.hash_password(password.as_bytes(), &salt)
			.map(|hash| hash.to_string())
			.map_err(|e| Error::Internal(format!("password hashing failed: {}", e)))
	}

	fn verify(&self, password: &str, hash: &str) -> Result<bool> {
		use argon2::{
			Argon2,
			password_hash::{PasswordHash, PasswordVerifier},
		};

		let parsed_hash = PasswordHash::new(hash)
			.map_err(|e| Error::Internal(format!("stored hash is malformed: {}", e)))?;

		Ok(Argon2::default()
			.verify_password(password.as_bytes(), &parsed_hash)
			.is_ok())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	fn test_hash_is_salted() {
		let hasher = Argon2Hasher::new();
		let first = hasher.hash("Rahasia#2024").unwrap();
		let second = hasher.hash("Rahasia#2024").unwrap();

		assert_ne!(first, second);
		assert!(first.starts_with("$argon2id$"));
		assert!(hasher.verify("Rahasia#2024", &second).unwrap());
	}

	#[rstest]
	fn test_verify_wrong_password() {
		let hasher = Argon2Hasher::new();
		let hash = hasher.hash("Rahasia#2024").unwrap();

		assert!(!hasher.verify("Rahasia#2025", &hash).unwrap());
	}

	#[rstest]
	fn test_verify_malformed_hash_is_error() {
		let hasher = Argon2Hasher::new();
		assert!(hasher.verify("anything", "not-a-phc-string").is_err());
	}
}

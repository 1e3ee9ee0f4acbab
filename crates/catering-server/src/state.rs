use catering_auth::{Argon2Hasher, DEFAULT_TOKEN_TTL, JwtAuth, PasswordHasher, SESSION_COOKIE};
use catering_conf::{MAX_TOKEN_TTL_SECS, Settings};
use catering_core::Result;
use catering_db::{
	MetricsAggregator, PlanRepository, SqlitePool, SubscriptionRepository, TestimonialRepository,
	UserRepository,
};
use catering_http::{SameSite, SetCookie};
use catering_middleware::CsrfConfig;
use chrono::TimeDelta;
use once_cell::sync::OnceCell;
use std::sync::Arc;

/// Session lifetime from settings. Values outside `1..=MAX_TOKEN_TTL_SECS`
/// fall back to [`DEFAULT_TOKEN_TTL`].
fn session_ttl(settings: &Settings) -> TimeDelta {
	if settings.token_ttl_secs == 0 || settings.token_ttl_secs > MAX_TOKEN_TTL_SECS {
		tracing::warn!(
			token_ttl_secs = settings.token_ttl_secs,
			"token lifetime out of range, using the default"
		);
		return DEFAULT_TOKEN_TTL;
	}
	i64::try_from(settings.token_ttl_secs)
		.ok()
		.and_then(TimeDelta::try_seconds)
		.unwrap_or(DEFAULT_TOKEN_TTL)
}

/// Plaintext behind the placeholder hash checked for unknown login emails
const PLACEHOLDER_PASSWORD: &str = "placeholder-password-for-unknown-accounts";

/// Everything a view needs, shared across requests.
pub struct AppState {
	pub pool: SqlitePool,
	pub users: UserRepository,
	pub plans: PlanRepository,
	pub subscriptions: SubscriptionRepository,
	pub testimonials: TestimonialRepository,
	pub metrics: MetricsAggregator,
	pub auth: Arc<JwtAuth>,
	pub hasher: Arc<dyn PasswordHasher>,
	pub csrf: CsrfConfig,
	/// Adds `Secure` to the session cookie
	pub secure_cookies: bool,
	placeholder_hash: OnceCell<String>,
}

impl AppState {
	pub fn new(pool: SqlitePool, settings: &Settings) -> Self {
		let auth = JwtAuth::new(settings.jwt_secret().as_bytes()).with_ttl(session_ttl(settings));
		let csrf = if settings.production {
			CsrfConfig::production()
		} else {
			CsrfConfig::default()
		};

		Self {
			users: UserRepository::new(pool.clone()),
			plans: PlanRepository::new(pool.clone()),
			subscriptions: SubscriptionRepository::new(pool.clone()),
			testimonials: TestimonialRepository::new(pool.clone()),
			metrics: MetricsAggregator::new(pool.clone()),
			pool,
			auth: Arc::new(auth),
			hasher: Arc::new(Argon2Hasher::new()),
			csrf,
			secure_cookies: settings.production,
			placeholder_hash: OnceCell::new(),
		}
	}

	/// Replace the password hasher.
	pub fn with_hasher(mut self, hasher: Arc<dyn PasswordHasher>) -> Self {
		self.hasher = hasher;
		self.placeholder_hash = OnceCell::new();
		self
	}

	/// Run one password verification against a placeholder hash.
	///
	/// Login calls this when the email is unknown so that path does the
	/// same hashing work as a wrong password. The outcome is discarded.
	pub fn verify_placeholder(&self, password: &str) -> Result<()> {
		let hash = self
			.placeholder_hash
			.get_or_try_init(|| self.hasher.hash(PLACEHOLDER_PASSWORD))?;
		self.hasher.verify(password, hash)?;
		Ok(())
	}

	/// `token` cookie carrying a freshly issued session token
	pub fn session_cookie(&self, token: &str) -> SetCookie {
		SetCookie::new(SESSION_COOKIE, token)
			.http_only(true)
			.secure(self.secure_cookies)
			.same_site(SameSite::Lax)
			.max_age(self.auth.ttl().num_seconds())
	}

	/// `token` cookie that clears the session
	pub fn cleared_session_cookie(&self) -> SetCookie {
		SetCookie::expired(SESSION_COOKIE)
			.http_only(true)
			.secure(self.secure_cookies)
			.same_site(SameSite::Lax)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	#[case(600, TimeDelta::seconds(600))]
	#[case(MAX_TOKEN_TTL_SECS, TimeDelta::days(365))]
	#[case(0, DEFAULT_TOKEN_TTL)]
	#[case(MAX_TOKEN_TTL_SECS + 1, DEFAULT_TOKEN_TTL)]
	#[case(u64::MAX, DEFAULT_TOKEN_TTL)]
	fn test_session_ttl_never_overflows(#[case] secs: u64, #[case] expected: TimeDelta) {
		let settings = Settings {
			token_ttl_secs: secs,
			..Settings::default()
		};
		assert_eq!(session_ttl(&settings), expected);
	}

	#[rstest]
	#[tokio::test]
	async fn test_oversized_ttl_builds_state() {
		let pool = catering_db::connect_in_memory().await.unwrap();
		let settings = Settings {
			token_ttl_secs: u64::MAX,
			..Settings::default()
		};
		let state = AppState::new(pool, &settings);
		assert_eq!(state.auth.ttl(), DEFAULT_TOKEN_TTL);
		assert!(state.auth.issue("u-1", "budi@example.com", catering_core::Role::User).is_ok());
	}

	#[rstest]
	#[tokio::test]
	async fn test_placeholder_hash_is_reused() {
		let pool = catering_db::connect_in_memory().await.unwrap();
		let state = AppState::new(pool, &Settings::default());

		state.verify_placeholder("Rahasia#2024").unwrap();
		let first = state.placeholder_hash.get().cloned().unwrap();
		state.verify_placeholder("lain").unwrap();

		assert!(first.starts_with("$argon2id$"));
		assert_eq!(state.placeholder_hash.get(), Some(&first));
	}
}

use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

use crate::env::{Env, EnvError};

pub const ENV_PREFIX: &str = "CATERING_";

/// Signing secret used when none is configured outside production
pub const FALLBACK_JWT_SECRET: &str = "supersecretjwtkeyfallback";

/// Longest accepted session lifetime: one year
pub const MAX_TOKEN_TTL_SECS: u64 = 365 * 24 * 60 * 60;

/// Application settings
///
/// Built from defaults, then an optional TOML file, then `CATERING_*`
/// environment variables, each layer overriding the previous one.
#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
	pub database_url: String,
	pub bind_address: String,
	pub jwt_secret: Option<String>,
	pub token_ttl_secs: u64,
	/// Adds `Secure` to every cookie and makes `jwt_secret` mandatory
	pub production: bool,
	/// `tracing` filter directive, overridden by `RUST_LOG`
	pub log_filter: String,
	pub shutdown_timeout_secs: u64,
}

impl Default for Settings {
	fn default() -> Self {
		Self {
			database_url: "sqlite://catering.db?mode=rwc".to_string(),
			bind_address: "127.0.0.1:8000".to_string(),
			jwt_secret: None,
			token_ttl_secs: 3600,
			production: false,
			log_filter: "info".to_string(),
			shutdown_timeout_secs: 30,
		}
	}
}

impl std::fmt::Debug for Settings {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Settings")
			.field("database_url", &self.database_url)
			.field("bind_address", &self.bind_address)
			.field("jwt_secret", &self.jwt_secret.as_ref().map(|_| "<redacted>"))
			.field("token_ttl_secs", &self.token_ttl_secs)
			.field("production", &self.production)
			.field("log_filter", &self.log_filter)
			.field("shutdown_timeout_secs", &self.shutdown_timeout_secs)
			.finish()
	}
}

impl Settings {
	/// Defaults overridden by the environment
	pub fn from_env() -> Result<Self, EnvError> {
		Self::default().with_env(&Env::new().with_prefix(ENV_PREFIX))
	}

	/// TOML file overridden by the environment.
	///
	/// Keys missing from the file keep their defaults.
	pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, EnvError> {
		let raw = std::fs::read_to_string(path.as_ref())?;
		let file: Settings =
			toml::from_str(&raw).map_err(|e| EnvError::InvalidFormat(e.to_string()))?;
		file.with_env(&Env::new().with_prefix(ENV_PREFIX))
	}

	/// Apply environment overrides and check the result
	pub fn with_env(mut self, env: &Env) -> Result<Self, EnvError> {
		if let Some(value) = env.get("DATABASE_URL")? {
			self.database_url = value;
		}
		if let Some(value) = env.get("BIND_ADDRESS")? {
			self.bind_address = value;
		}
		if let Some(value) = env.get("JWT_SECRET")? {
			self.jwt_secret = Some(value);
		}
		if let Some(value) = env.get("LOG")? {
			self.log_filter = value;
		}
		self.token_ttl_secs = env.u64_with_default("TOKEN_TTL_SECS", self.token_ttl_secs)?;
		self.production = env.bool_with_default("PRODUCTION", self.production)?;
		self.shutdown_timeout_secs =
			env.u64_with_default("SHUTDOWN_TIMEOUT_SECS", self.shutdown_timeout_secs)?;

		self.validate(env)?;
		Ok(self)
	}

	fn validate(&self, env: &Env) -> Result<(), EnvError> {
		let has_secret = self.jwt_secret.as_deref().is_some_and(|s| !s.is_empty());
		if self.production && !has_secret {
			return Err(EnvError::MissingVariable(env.key_name("JWT_SECRET")));
		}
		if self.token_ttl_secs == 0 || self.token_ttl_secs > MAX_TOKEN_TTL_SECS {
			return Err(EnvError::ParseError {
				key: env.key_name("TOKEN_TTL_SECS"),
				value_len: self.token_ttl_secs.to_string().len(),
				error: format!("token lifetime must be between 1 and {} seconds", MAX_TOKEN_TTL_SECS),
			});
		}
		Ok(())
	}

	/// Secret for signing session tokens
	pub fn jwt_secret(&self) -> &str {
		match self.jwt_secret.as_deref() {
			Some(secret) if !secret.is_empty() => secret,
			_ => {
				tracing::warn!("no JWT secret configured, using the development fallback");
				FALLBACK_JWT_SECRET
			}
		}
	}

	pub fn token_ttl(&self) -> Duration {
		Duration::from_secs(self.token_ttl_secs)
	}

	pub fn shutdown_timeout(&self) -> Duration {
		Duration::from_secs(self.shutdown_timeout_secs)
	}
}

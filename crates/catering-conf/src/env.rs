//! Prefixed environment variable access.

use std::env;

/// Environment variable reader with an optional key prefix
#[derive(Debug, Clone, Default)]
pub struct Env {
	/// Prepended to every key (e.g. `CATERING_`)
	pub prefix: Option<String>,
}

impl Env {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
		self.prefix = Some(prefix.into());
		self
	}

	/// Full variable name for `key`
	pub fn key_name(&self, key: &str) -> String {
		match &self.prefix {
			Some(prefix) => format!("{}{}", prefix, key),
			None => key.to_string(),
		}
	}

	/// Raw value, `None` when unset or not valid unicode
	pub fn get(&self, key: &str) -> Result<Option<String>, EnvError> {
		let full_key = self.key_name(key);
		validate_env_var_name(&full_key)?;
		Ok(env::var(&full_key).ok())
	}

	pub fn str(&self, key: &str) -> Result<String, EnvError> {
		self.get(key)?
			.ok_or_else(|| EnvError::MissingVariable(self.key_name(key)))
	}

	pub fn str_with_default(&self, key: &str, default: &str) -> Result<String, EnvError> {
		Ok(self.get(key)?.unwrap_or_else(|| default.to_string()))
	}

	pub fn bool_with_default(&self, key: &str, default: bool) -> Result<bool, EnvError> {
		match self.get(key)? {
			Some(value) => parse_bool(&value).map_err(|error| EnvError::ParseError {
				key: self.key_name(key),
				value_len: value.len(),
				error,
			}),
			None => Ok(default),
		}
	}

	pub fn u64_with_default(&self, key: &str, default: u64) -> Result<u64, EnvError> {
		match self.get(key)? {
			Some(value) => value.trim().parse::<u64>().map_err(|e| EnvError::ParseError {
				key: self.key_name(key),
				value_len: value.len(),
				error: e.to_string(),
			}),
			None => Ok(default),
		}
	}
}

/// Parse the usual spellings of a boolean flag.
///
/// # Examples
///
/// ```
/// use catering_conf::env::parse_bool;
///
/// assert_eq!(parse_bool("Yes"), Ok(true));
/// assert_eq!(parse_bool("0"), Ok(false));
/// assert!(parse_bool("maybe").is_err());
/// ```
pub fn parse_bool(value: &str) -> Result<bool, String> {
	match value.trim().to_ascii_lowercase().as_str() {
		"true" | "1" | "yes" | "on" => Ok(true),
		"false" | "0" | "no" | "off" => Ok(false),
		other => Err(format!("invalid boolean value: {:?}", other)),
	}
}

/// Reject names that are empty or contain `=` or control characters
pub fn validate_env_var_name(name: &str) -> Result<(), EnvError> {
	let reason = if name.is_empty() {
		Some("environment variable name must not be empty")
	} else if name.contains('=') {
		Some("environment variable name must not contain '='")
	} else if name.chars().any(char::is_control) {
		Some("environment variable name contains a control character")
	} else {
		None
	};

	match reason {
		Some(reason) => Err(EnvError::InvalidVariableName {
			name: name.to_string(),
			reason: reason.to_string(),
		}),
		None => Ok(()),
	}
}

/// Errors raised while loading settings
#[derive(Debug, thiserror::Error)]
pub enum EnvError {
	#[error("Missing environment variable: {0}")]
	MissingVariable(String),

	#[error("Failed to parse environment variable '{key}' (value length: {value_len}): {error}")]
	ParseError {
		key: String,
		/// Length of the value; the value itself may be a secret
		value_len: usize,
		error: String,
	},

	#[error("IO error: {0}")]
	IoError(#[from] std::io::Error),

	#[error("Invalid settings file: {0}")]
	InvalidFormat(String),

	#[error("Invalid environment variable name '{name}': {reason}")]
	InvalidVariableName { name: String, reason: String },
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;
	use serial_test::serial;

	#[rstest]
	#[case("")]
	#[case("A=B")]
	#[case("BAD\nNAME")]
	fn test_invalid_names(#[case] name: &str) {
		assert!(matches!(
			validate_env_var_name(name),
			Err(EnvError::InvalidVariableName { .. })
		));
	}

	#[rstest]
	#[serial(env)]
	fn test_prefixed_lookup() {
		// SAFETY: serialized with every other test touching the environment.
		unsafe {
			env::set_var("CATERING_TEST_PORT", "8080");
			env::set_var("CATERING_TEST_FLAG", "on");
		}

		let env = Env::new().with_prefix("CATERING_TEST_");
		assert_eq!(env.u64_with_default("PORT", 1).unwrap(), 8080);
		assert!(env.bool_with_default("FLAG", false).unwrap());
		assert_eq!(env.str_with_default("MISSING", "x").unwrap(), "x");
		assert!(matches!(env.str("MISSING"), Err(EnvError::MissingVariable(k)) if k == "CATERING_TEST_MISSING"));

		// SAFETY: as above.
		unsafe {
			env::remove_var("CATERING_TEST_PORT");
			env::remove_var("CATERING_TEST_FLAG");
		}
	}

	#[rstest]
	#[serial(env)]
	fn test_parse_error_hides_value() {
		// SAFETY: serialized with every other test touching the environment.
		unsafe {
			env::set_var("CATERING_TEST_TTL", "one-hour");
		}

		let err = Env::new()
			.with_prefix("CATERING_TEST_")
			.u64_with_default("TTL", 3600)
			.unwrap_err();
		let message = err.to_string();
		assert!(message.contains("CATERING_TEST_TTL"));
		assert!(!message.contains("one-hour"));

		// SAFETY: as above.
		unsafe {
			env::remove_var("CATERING_TEST_TTL");
		}
	}
}

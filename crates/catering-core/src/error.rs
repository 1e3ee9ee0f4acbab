//! Error taxonomy shared by every catering crate.
//!
//! Each variant maps onto exactly one HTTP status via [`Error::status_code`].
//! Views turn an [`Error`] into a `{"message": ...}` body; only validation
//! errors carry field-level detail to the client.

use http::StatusCode;
use serde::Serialize;
use thiserror::Error;

/// Client-facing message for a unique-constraint violation. The driver's
/// own text names tables and columns and stays server-side.
pub const DUPLICATE_RESOURCE: &str = "Resource already exists.";

/// A single failed field check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
	/// Path to the offending field, e.g. `["mealTypes"]`.
	pub path: Vec<String>,
	/// Localized, user-facing message.
	pub message: String,
}

/// Ordered collection of field errors for one payload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(Vec<FieldError>);

impl ValidationErrors {
	pub fn new() -> Self {
		Self::default()
	}

	/// Records a failed check against `field`.
	pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
		self.0.push(FieldError {
			path: vec![field.into()],
			message: message.into(),
		});
	}

	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	pub fn len(&self) -> usize {
		self.0.len()
	}

	pub fn errors(&self) -> &[FieldError] {
		&self.0
	}

	/// Messages recorded for `field`, in insertion order.
	pub fn messages_for(&self, field: &str) -> Vec<&str> {
		self.0
			.iter()
			.filter(|e| e.path.first().map(String::as_str) == Some(field))
			.map(|e| e.message.as_str())
			.collect()
	}

	/// Converts into `Ok(())` when nothing was recorded.
	pub fn into_result(self) -> Result<()> {
		if self.is_empty() {
			Ok(())
		} else {
			Err(Error::Validation(self))
		}
	}
}

impl std::fmt::Display for ValidationErrors {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		let joined = self
			.0
			.iter()
			.map(|e| format!("{}: {}", e.path.join("."), e.message))
			.collect::<Vec<_>>()
			.join("; ");
		write!(f, "{}", joined)
	}
}

/// Errors raised by catering operations
#[derive(Debug, Error)]
pub enum Error {
	/// Payload failed schema checks
	#[error("Validation failed: {0}")]
	Validation(ValidationErrors),

	/// Request body could not be decoded
	#[error("Bad request: {0}")]
	BadRequest(String),

	/// No session, or credentials did not match
	#[error("Authentication failed: {0}")]
	Authentication(String),

	/// Session token present but malformed or expired
	#[error("Invalid token: {0}")]
	InvalidToken(String),

	/// Session valid but lacks the required role
	#[error("Authorization failed: {0}")]
	Authorization(String),

	/// Double-submit token missing or mismatched
	#[error("Invalid CSRF token.")]
	Csrf,

	/// Unique constraint violated
	#[error("Conflict: {0}")]
	Conflict(String),

	/// Unknown id, or a resource owned by someone else
	#[error("Not found: {0}")]
	NotFound(String),

	/// Lifecycle transition not allowed from the current status
	#[error("Invalid state: {0}")]
	InvalidState(String),

	/// Storage failure
	#[error("Database error: {0}")]
	Database(String),

	/// Encoding failure
	#[error("Serialization error: {0}")]
	Serialization(String),

	/// Anything else
	#[error("Internal error: {0}")]
	Internal(String),
}

impl Error {
	/// HTTP status used when this error reaches a client.
	pub fn status_code(&self) -> StatusCode {
		match self {
			Error::Validation(_) | Error::BadRequest(_) => StatusCode::BAD_REQUEST,
			Error::Authentication(_) | Error::Authorization(_) => StatusCode::UNAUTHORIZED,
			Error::InvalidToken(_) | Error::Csrf => StatusCode::FORBIDDEN,
			Error::Conflict(_) | Error::InvalidState(_) => StatusCode::CONFLICT,
			Error::NotFound(_) => StatusCode::NOT_FOUND,
			Error::Database(_) | Error::Serialization(_) | Error::Internal(_) => {
				StatusCode::INTERNAL_SERVER_ERROR
			}
		}
	}

	/// Whether the message may be shown to the client verbatim.
	pub fn is_client_error(&self) -> bool {
		self.status_code().is_client_error()
	}

	/// Message suitable for the response body.
	///
	/// Server-side failures yield `None`; callers substitute their own
	/// generic message and log the detail instead.
	pub fn client_message(&self) -> Option<String> {
		match self {
			Error::Validation(_) => Some("Validation failed".to_string()),
			Error::Csrf => Some("Invalid CSRF token.".to_string()),
			Error::BadRequest(msg)
			| Error::Authentication(msg)
			| Error::InvalidToken(msg)
			| Error::Authorization(msg)
			| Error::Conflict(msg)
			| Error::NotFound(msg)
			| Error::InvalidState(msg) => Some(msg.clone()),
			Error::Database(_) | Error::Serialization(_) | Error::Internal(_) => None,
		}
	}
}

impl From<serde_json::Error> for Error {
	fn from(err: serde_json::Error) -> Self {
		Error::Serialization(err.to_string())
	}
}

#[cfg(feature = "sqlx")]
impl From<sqlx::Error> for Error {
	fn from(err: sqlx::Error) -> Self {
		match &err {
			sqlx::Error::RowNotFound => Error::NotFound(err.to_string()),
			sqlx::Error::Database(db) if db.is_unique_violation() => {
				Error::Conflict(DUPLICATE_RESOURCE.to_string())
			}
			_ => Error::Database(err.to_string()),
		}
	}
}

impl From<validator::ValidationErrors> for Error {
	fn from(err: validator::ValidationErrors) -> Self {
		Error::Validation(crate::validation::collect(err))
	}
}

/// Result type for catering operations
pub type Result<T> = std::result::Result<T, Error>;

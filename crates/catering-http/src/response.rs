use bytes::Bytes;
use catering_core::{Error, Result};
use hyper::header::{self, HeaderName, HeaderValue};
use hyper::{HeaderMap, StatusCode};
use serde::Serialize;
use serde_json::json;

use crate::cookie::SetCookie;

/// HTTP Response representation
#[derive(Debug)]
pub struct Response {
	pub status: StatusCode,
	pub headers: HeaderMap,
	pub body: Bytes,
}

impl Response {
	/// Create a new Response with the given status code
	///
	/// # Examples
	///
	/// ```
	/// use catering_http::Response;
	/// use hyper::StatusCode;
	///
	/// let response = Response::new(StatusCode::OK);
	/// assert_eq!(response.status, StatusCode::OK);
	/// assert!(response.body.is_empty());
	/// ```
	pub fn new(status: StatusCode) -> Self {
		Self {
			status,
			headers: HeaderMap::new(),
			body: Bytes::new(),
		}
	}

	pub fn ok() -> Self {
		Self::new(StatusCode::OK)
	}

	pub fn created() -> Self {
		Self::new(StatusCode::CREATED)
	}

	pub fn bad_request() -> Self {
		Self::new(StatusCode::BAD_REQUEST)
	}

	pub fn unauthorized() -> Self {
		Self::new(StatusCode::UNAUTHORIZED)
	}

	pub fn forbidden() -> Self {
		Self::new(StatusCode::FORBIDDEN)
	}

	pub fn not_found() -> Self {
		Self::new(StatusCode::NOT_FOUND)
	}

	pub fn internal_server_error() -> Self {
		Self::new(StatusCode::INTERNAL_SERVER_ERROR)
	}

	/// Create a 307 redirect, the status browsers keep the method for
	///
	/// # Examples
	///
	/// ```
	/// use catering_http::Response;
	/// use hyper::StatusCode;
	///
	/// let response = Response::temporary_redirect("/login?redirect_from=%2Fdashboard");
	/// assert_eq!(response.status, StatusCode::TEMPORARY_REDIRECT);
	/// assert_eq!(
	///     response.headers.get("location").unwrap().to_str().unwrap(),
	///     "/login?redirect_from=%2Fdashboard"
	/// );
	/// ```
	pub fn temporary_redirect(location: impl AsRef<str>) -> Self {
		Self::new(StatusCode::TEMPORARY_REDIRECT).with_location(location.as_ref())
	}

	pub fn with_status(mut self, status: StatusCode) -> Self {
		self.status = status;
		self
	}

	pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
		self.body = body.into();
		self
	}

	/// Set a header, replacing earlier values; invalid input is ignored
	pub fn with_header(mut self, name: &str, value: &str) -> Self {
		if let Ok(header_name) = HeaderName::from_bytes(name.as_bytes())
			&& let Ok(header_value) = HeaderValue::from_str(value)
		{
			self.headers.insert(header_name, header_value);
		}
		self
	}

	pub fn with_location(mut self, location: &str) -> Self {
		if let Ok(value) = HeaderValue::from_str(location) {
			self.headers.insert(header::LOCATION, value);
		}
		self
	}

	/// Append a `Set-Cookie` header; several cookies may be set at once
	///
	/// # Examples
	///
	/// ```
	/// use catering_http::Response;
	/// use catering_http::cookie::SetCookie;
	///
	/// let response = Response::ok()
	///     .with_cookie(&SetCookie::new("a", "1"))
	///     .with_cookie(&SetCookie::new("b", "2"));
	/// assert_eq!(response.headers.get_all("set-cookie").iter().count(), 2);
	/// ```
	pub fn with_cookie(mut self, cookie: &SetCookie) -> Self {
		if let Ok(value) = HeaderValue::from_str(&cookie.to_string()) {
			self.headers.append(header::SET_COOKIE, value);
		}
		self
	}

	/// Set the response body to JSON and add appropriate Content-Type header
	pub fn with_json<T: Serialize>(mut self, data: &T) -> Result<Self> {
		let json = serde_json::to_vec(data).map_err(|e| Error::Serialization(e.to_string()))?;
		self.body = Bytes::from(json);
		self.headers.insert(
			header::CONTENT_TYPE,
			HeaderValue::from_static("application/json"),
		);
		Ok(self)
	}

	/// `{"message": ...}` body with the given status
	pub fn message(status: StatusCode, message: &str) -> Self {
		Self::json_value(status, json!({ "message": message }))
	}

	/// Render an error for the client.
	///
	/// Client errors keep their own message; validation failures also list
	/// field errors. Server errors are logged and answered with `fallback`.
	pub fn from_error(error: &Error, fallback: &str) -> Self {
		let status = error.status_code();
		match error {
			Error::Validation(errors) => Self::json_value(
				status,
				json!({ "message": "Validation failed", "errors": errors }),
			),
			_ => match error.client_message() {
				Some(message) => Self::message(status, &message),
				None => {
					tracing::error!(error = %error, "request failed");
					Self::message(status, fallback)
				}
			},
		}
	}

	fn json_value(status: StatusCode, value: serde_json::Value) -> Self {
		let body = serde_json::to_vec(&value).unwrap_or_default();
		Self::new(status)
			.with_body(body)
			.with_header("content-type", "application/json")
	}

	/// Parse the body as JSON; used by tests and clients of the handlers
	pub fn json<T: serde::de::DeserializeOwned>(&self) -> Result<T> {
		Ok(serde_json::from_slice(&self.body)?)
	}

	/// All `Set-Cookie` values in order
	pub fn set_cookies(&self) -> Vec<String> {
		self.headers
			.get_all(header::SET_COOKIE)
			.iter()
			.filter_map(|v| v.to_str().ok())
			.map(str::to_string)
			.collect()
	}
}

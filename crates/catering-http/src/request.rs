//! Incoming request representation.

use bytes::Bytes;
use catering_core::{Error, Result};
use hyper::{HeaderMap, Method, Uri, Version};
use percent_encoding::percent_decode_str;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::net::SocketAddr;

use crate::cookie::parse_cookie_header;
use crate::extensions::Extensions;

/// HTTP request as seen by handlers and middleware.
#[derive(Debug)]
pub struct Request {
	pub method: Method,
	pub uri: Uri,
	pub version: Version,
	pub headers: HeaderMap,
	pub body: Bytes,
	/// Parameters captured by the router from `{name}` segments
	pub path_params: HashMap<String, String>,
	/// Percent-decoded query string pairs
	pub query_params: HashMap<String, String>,
	pub remote_addr: Option<SocketAddr>,
	pub extensions: Extensions,
}

impl Request {
	pub fn new(method: Method, uri: Uri, version: Version, headers: HeaderMap, body: Bytes) -> Self {
		let query_params = parse_query(&uri);
		Self {
			method,
			uri,
			version,
			headers,
			body,
			path_params: HashMap::new(),
			query_params,
			remote_addr: None,
			extensions: Extensions::new(),
		}
	}

	/// Starts building a request; used by tests and the server adapter.
	///
	/// # Examples
	///
	/// ```
	/// use catering_http::Request;
	/// use hyper::Method;
	///
	/// let request = Request::builder()
	///     .method(Method::GET)
	///     .uri("/api/subscriptions/me?status=active")
	///     .header("cookie", "token=abc")
	///     .build()
	///     .unwrap();
	///
	/// assert_eq!(request.path(), "/api/subscriptions/me");
	/// assert_eq!(request.query("status"), Some("active"));
	/// assert_eq!(request.cookie("token").as_deref(), Some("abc"));
	/// ```
	pub fn builder() -> RequestBuilder {
		RequestBuilder::default()
	}

	pub fn path(&self) -> &str {
		self.uri.path()
	}

	/// Query parameter by name; empty values count as absent.
	pub fn query(&self, name: &str) -> Option<&str> {
		self.query_params
			.get(name)
			.map(String::as_str)
			.filter(|v| !v.is_empty())
	}

	pub fn path_param(&self, name: &str) -> Option<&str> {
		self.path_params.get(name).map(String::as_str)
	}

	pub fn set_path_param(&mut self, key: impl Into<String>, value: impl Into<String>) {
		self.path_params.insert(key.into(), value.into());
	}

	/// Header value as text, if present and valid UTF-8.
	pub fn header(&self, name: &str) -> Option<&str> {
		self.headers.get(name).and_then(|v| v.to_str().ok())
	}

	/// Value of cookie `name`; empty values count as absent.
	pub fn cookie(&self, name: &str) -> Option<String> {
		let mut cookies = self
			.headers
			.get_all(hyper::header::COOKIE)
			.iter()
			.filter_map(|v| v.to_str().ok())
			.map(parse_cookie_header);
		cookies
			.find_map(|mut map| map.remove(name))
			.filter(|v| !v.is_empty())
	}

	/// Decodes the body as JSON.
	///
	/// An empty body decodes as `{}` so lenient payload types can report
	/// missing fields through validation.
	pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
		let body: &[u8] = if self.body.iter().all(u8::is_ascii_whitespace) {
			b"{}"
		} else {
			&self.body
		};
		serde_json::from_slice(body)
			.map_err(|e| Error::BadRequest(format!("Invalid JSON body: {}", e)))
	}
}

fn parse_query(uri: &Uri) -> HashMap<String, String> {
	uri.query()
		.map(|q| {
			q.split('&')
				.filter(|pair| !pair.is_empty())
				.map(|pair| {
					let mut parts = pair.splitn(2, '=');
					let key = decode(parts.next().unwrap_or(""));
					let value = decode(parts.next().unwrap_or(""));
					(key, value)
				})
				.collect()
		})
		.unwrap_or_default()
}

fn decode(raw: &str) -> String {
	let spaced = raw.replace('+', " ");
	percent_decode_str(&spaced).decode_utf8_lossy().into_owned()
}

/// Builder for [`Request`].
#[derive(Debug, Default)]
pub struct RequestBuilder {
	method: Option<Method>,
	uri: Option<String>,
	version: Option<Version>,
	headers: HeaderMap,
	body: Bytes,
	remote_addr: Option<SocketAddr>,
}

impl RequestBuilder {
	pub fn method(mut self, method: Method) -> Self {
		self.method = Some(method);
		self
	}

	pub fn uri(mut self, uri: impl Into<String>) -> Self {
		self.uri = Some(uri.into());
		self
	}

	pub fn version(mut self, version: Version) -> Self {
		self.version = Some(version);
		self
	}

	pub fn headers(mut self, headers: HeaderMap) -> Self {
		self.headers = headers;
		self
	}

	/// Appends one header; invalid names or values are ignored.
	pub fn header(mut self, name: &str, value: &str) -> Self {
		if let Ok(name) = hyper::header::HeaderName::from_bytes(name.as_bytes())
			&& let Ok(value) = hyper::header::HeaderValue::from_str(value)
		{
			self.headers.append(name, value);
		}
		self
	}

	pub fn body(mut self, body: impl Into<Bytes>) -> Self {
		self.body = body.into();
		self
	}

	/// Serializes `value` as the body and sets `Content-Type`.
	pub fn json<T: serde::Serialize>(self, value: &T) -> Self {
		let body = serde_json::to_vec(value).unwrap_or_default();
		self.header("content-type", "application/json").body(body)
	}

	pub fn remote_addr(mut self, addr: SocketAddr) -> Self {
		self.remote_addr = Some(addr);
		self
	}

	pub fn build(self) -> Result<Request> {
		let uri_str = self.uri.unwrap_or_else(|| "/".to_string());
		let uri = uri_str
			.parse::<Uri>()
			.map_err(|e| Error::BadRequest(format!("Invalid URI {}: {}", uri_str, e)))?;
		let mut request = Request::new(
			self.method.unwrap_or(Method::GET),
			uri,
			self.version.unwrap_or(Version::HTTP_11),
			self.headers,
			self.body,
		);
		request.remote_addr = self.remote_addr;
		Ok(request)
	}
}

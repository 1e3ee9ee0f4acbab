//! In-process API client for tests.
//!
//! Requests go straight into a [`Handler`] without a socket. The client
//! keeps a cookie jar fed by `Set-Cookie` and echoes the `csrfToken` cookie
//! in the `CSRF-Token` header on unsafe requests, the way the browser
//! client does. [`TestClient::echo_csrf`] turns the echo off.

use catering_http::{Handler, Request, Response};
use hyper::Method;
use parking_lot::Mutex;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

pub struct TestClient {
	handler: Arc<dyn Handler>,
	cookies: Mutex<BTreeMap<String, String>>,
	echo_csrf: AtomicBool,
}

impl TestClient {
	pub fn new(handler: Arc<dyn Handler>) -> Self {
		Self {
			handler,
			cookies: Mutex::new(BTreeMap::new()),
			echo_csrf: AtomicBool::new(true),
		}
	}

	/// Whether unsafe requests copy the `csrfToken` cookie into the
	/// `CSRF-Token` header. The cookie itself is still sent.
	pub fn echo_csrf(&self, on: bool) {
		self.echo_csrf.store(on, Ordering::SeqCst);
	}

	pub fn cookie(&self, name: &str) -> Option<String> {
		self.cookies.lock().get(name).cloned()
	}

	pub fn set_cookie(&self, name: &str, value: &str) {
		self.cookies.lock().insert(name.to_string(), value.to_string());
	}

	pub fn remove_cookie(&self, name: &str) {
		self.cookies.lock().remove(name);
	}

	pub fn clear_cookies(&self) {
		self.cookies.lock().clear();
	}

	pub async fn get(&self, path: &str) -> Response {
		self.send(Method::GET, path, None::<&()>, &[]).await
	}

	pub async fn post<T: Serialize>(&self, path: &str, body: &T) -> Response {
		self.send(Method::POST, path, Some(body), &[]).await
	}

	pub async fn put<T: Serialize>(&self, path: &str, body: &T) -> Response {
		self.send(Method::PUT, path, Some(body), &[]).await
	}

	/// Fetch a CSRF token; the jar then holds the matching cookie.
	pub async fn fetch_csrf_token(&self) -> String {
		let response = self.get("/api/csrf-token").await;
		let body: serde_json::Value = response.json().unwrap_or_default();
		body["csrfToken"].as_str().unwrap_or_default().to_string()
	}

	/// Send a request. Headers in `headers` win over the automatic
	/// `CSRF-Token` echo.
	pub async fn send<T: Serialize>(
		&self,
		method: Method,
		path: &str,
		body: Option<&T>,
		headers: &[(&str, &str)],
	) -> Response {
		let is_unsafe = !matches!(method, Method::GET | Method::HEAD | Method::OPTIONS);
		let mut builder = Request::builder().method(method).uri(path);

		if let Some(body) = body {
			builder = builder.json(body);
		}
		for (name, value) in headers {
			builder = builder.header(name, value);
		}

		let jar = self.cookies.lock().clone();
		if is_unsafe
			&& self.echo_csrf.load(Ordering::SeqCst)
			&& !headers.iter().any(|(n, _)| n.eq_ignore_ascii_case("csrf-token"))
			&& let Some(token) = jar.get("csrfToken")
		{
			builder = builder.header("CSRF-Token", token);
		}
		if !jar.is_empty() {
			let header = jar
				.iter()
				.map(|(k, v)| format!("{}={}", k, v))
				.collect::<Vec<_>>()
				.join("; ");
			builder = builder.header("cookie", &header);
		}

		let response = match builder.build() {
			Ok(request) => self.handler.handle(request).await,
			Err(err) => Err(err),
		}
		.unwrap_or_else(|err| Response::from_error(&err, "Internal server error."));

		self.store_cookies(&response);
		response
	}

	fn store_cookies(&self, response: &Response) {
		let mut jar = self.cookies.lock();
		for raw in response.set_cookies() {
			let mut attributes = raw.split(';').map(str::trim);
			let Some((name, value)) = attributes.next().and_then(|pair| pair.split_once('=')) else {
				continue;
			};
			let expired = attributes.any(|attr| attr.eq_ignore_ascii_case("Max-Age=0"));
			if expired || value.is_empty() {
				jar.remove(name);
			} else {
				jar.insert(name.to_string(), value.to_string());
			}
		}
	}
}

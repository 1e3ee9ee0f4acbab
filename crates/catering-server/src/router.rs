//! Method-aware router with `{name}` path parameters.

use async_trait::async_trait;
use catering_core::Result;
use catering_http::{Handler, Request, Response};
use hyper::{Method, StatusCode};
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
	Literal(String),
	Param(String),
}

/// A compiled route pattern such as `/api/subscriptions/{id}/pause`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathPattern {
	raw: String,
	segments: Vec<Segment>,
}

fn split(path: &str) -> impl Iterator<Item = &str> {
	path.split('/').filter(|s| !s.is_empty())
}

impl PathPattern {
	/// Compile a pattern; `{name}` segments capture one path segment.
	///
	/// # Examples
	///
	/// ```
	/// use catering_server::router::PathPattern;
	///
	/// let pattern = PathPattern::new("/api/subscriptions/{id}/pause");
	/// let params = pattern.match_path("/api/subscriptions/42/pause").unwrap();
	/// assert_eq!(params["id"], "42");
	/// assert!(pattern.match_path("/api/subscriptions/42").is_none());
	/// ```
	pub fn new(pattern: &str) -> Self {
		let segments = split(pattern)
			.map(|segment| {
				match segment
					.strip_prefix('{')
					.and_then(|s| s.strip_suffix('}'))
				{
					Some(name) => Segment::Param(name.to_string()),
					None => Segment::Literal(segment.to_string()),
				}
			})
			.collect();
		Self {
			raw: pattern.to_string(),
			segments,
		}
	}

	pub fn as_str(&self) -> &str {
		&self.raw
	}

	/// Captured parameters when `path` matches. A trailing slash is ignored.
	pub fn match_path(&self, path: &str) -> Option<HashMap<String, String>> {
		let parts: Vec<&str> = split(path).collect();
		if parts.len() != self.segments.len() {
			return None;
		}

		let mut params = HashMap::new();
		for (segment, part) in self.segments.iter().zip(parts) {
			match segment {
				Segment::Literal(literal) if literal == part => {}
				Segment::Literal(_) => return None,
				Segment::Param(name) => {
					params.insert(name.clone(), part.to_string());
				}
			}
		}
		Some(params)
	}
}

struct Route {
	pattern: PathPattern,
	handlers: Vec<(Method, Arc<dyn Handler>)>,
}

impl Route {
	fn allowed(&self) -> String {
		self.handlers
			.iter()
			.map(|(method, _)| method.as_str())
			.collect::<Vec<_>>()
			.join(", ")
	}
}

/// Dispatches on path pattern, then method.
///
/// Unknown paths answer 404; a known path with an unregistered method
/// answers 405 with an `Allow` header. `HEAD` falls back to `GET`.
#[derive(Default)]
pub struct Router {
	routes: Vec<Route>,
}

impl Router {
	pub fn new() -> Self {
		Self::default()
	}

	/// Register `handler` for `method` on `pattern`.
	pub fn route(mut self, method: Method, pattern: &str, handler: Arc<dyn Handler>) -> Self {
		let compiled = PathPattern::new(pattern);
		match self.routes.iter_mut().find(|r| r.pattern == compiled) {
			Some(route) => route.handlers.push((method, handler)),
			None => self.routes.push(Route {
				pattern: compiled,
				handlers: vec![(method, handler)],
			}),
		}
		self
	}

	pub fn get(self, pattern: &str, handler: Arc<dyn Handler>) -> Self {
		self.route(Method::GET, pattern, handler)
	}

	pub fn post(self, pattern: &str, handler: Arc<dyn Handler>) -> Self {
		self.route(Method::POST, pattern, handler)
	}

	pub fn put(self, pattern: &str, handler: Arc<dyn Handler>) -> Self {
		self.route(Method::PUT, pattern, handler)
	}

	/// Registered patterns in insertion order
	pub fn patterns(&self) -> Vec<&str> {
		self.routes.iter().map(|r| r.pattern.as_str()).collect()
	}

	fn find_handler<'a>(route: &'a Route, method: &Method) -> Option<&'a Arc<dyn Handler>> {
		let lookup = |wanted: &Method| {
			route
				.handlers
				.iter()
				.find(|(m, _)| m == wanted)
				.map(|(_, h)| h)
		};
		lookup(method).or_else(|| match *method {
			Method::HEAD => lookup(&Method::GET),
			_ => None,
		})
	}
}

#[async_trait]
impl Handler for Router {
	async fn handle(&self, mut request: Request) -> Result<Response> {
		let path = request.path().to_string();

		for route in &self.routes {
			let Some(params) = route.pattern.match_path(&path) else {
				continue;
			};
			return match Self::find_handler(route, &request.method) {
				Some(handler) => {
					request.path_params = params;
					handler.handle(request).await
				}
				None => Ok(Response::message(StatusCode::METHOD_NOT_ALLOWED, "Method not allowed.")
					.with_header("allow", &route.allowed())),
			};
		}

		tracing::debug!(path = %path, "no route matched");
		Ok(Response::message(StatusCode::NOT_FOUND, "Not found."))
	}
}

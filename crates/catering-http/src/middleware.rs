//! Handler and middleware traits for request processing.
//!
//! ## Handler
//!
//! ```rust
//! use catering_http::{Handler, Request, Response};
//! use async_trait::async_trait;
//!
//! struct Health;
//!
//! #[async_trait]
//! impl Handler for Health {
//!     async fn handle(&self, _request: Request) -> catering_core::Result<Response> {
//!         Ok(Response::ok().with_body("ok"))
//!     }
//! }
//! ```
//!
//! ## Middleware
//!
//! Middleware wraps the next handler and may short-circuit by returning a
//! response without calling it:
//!
//! ```rust
//! use catering_http::{Handler, Middleware, Request, Response};
//! use async_trait::async_trait;
//! use std::sync::Arc;
//!
//! struct RequireJson;
//!
//! #[async_trait]
//! impl Middleware for RequireJson {
//!     async fn process(&self, request: Request, next: Arc<dyn Handler>) -> catering_core::Result<Response> {
//!         if request.header("content-type") != Some("application/json") {
//!             return Ok(Response::bad_request());
//!         }
//!         next.handle(request).await
//!     }
//! }
//! ```

use async_trait::async_trait;
use catering_core::Result;
use std::sync::Arc;

use crate::{Request, Response};

/// Core request processing abstraction.
#[async_trait]
pub trait Handler: Send + Sync {
	/// Handles an HTTP request and produces a response.
	///
	/// # Errors
	///
	/// Returns an error if the request cannot be processed.
	async fn handle(&self, request: Request) -> Result<Response>;
}

#[async_trait]
impl<T: Handler + ?Sized> Handler for Arc<T> {
	async fn handle(&self, request: Request) -> Result<Response> {
		(**self).handle(request).await
	}
}

/// Request/response interceptor.
#[async_trait]
pub trait Middleware: Send + Sync {
	/// Processes a request, usually delegating to `next`.
	async fn process(&self, request: Request, next: Arc<dyn Handler>) -> Result<Response>;

	/// Whether this middleware runs for `request`. Defaults to always.
	fn should_continue(&self, _request: &Request) -> bool {
		true
	}
}

/// Composes middleware around a handler.
///
/// The first middleware added is the outermost: it sees the request first
/// and the response last.
pub struct MiddlewareChain {
	middlewares: Vec<Arc<dyn Middleware>>,
	handler: Arc<dyn Handler>,
}

impl MiddlewareChain {
	pub fn new(handler: Arc<dyn Handler>) -> Self {
		Self {
			middlewares: Vec::new(),
			handler,
		}
	}

	pub fn with_middleware(mut self, middleware: Arc<dyn Middleware>) -> Self {
		self.middlewares.push(middleware);
		self
	}

	pub fn add_middleware(&mut self, middleware: Arc<dyn Middleware>) {
		self.middlewares.push(middleware);
	}

	pub fn len(&self) -> usize {
		self.middlewares.len()
	}

	pub fn is_empty(&self) -> bool {
		self.middlewares.is_empty()
	}
}

#[async_trait]
impl Handler for MiddlewareChain {
	async fn handle(&self, request: Request) -> Result<Response> {
		let mut current: Arc<dyn Handler> = self.handler.clone();

		// Wrap innermost first so the first-added middleware ends up outermost.
		for middleware in self
			.middlewares
			.iter()
			.rev()
			.filter(|mw| mw.should_continue(&request))
		{
			current = Arc::new(Composed {
				middleware: middleware.clone(),
				next: current,
			});
		}

		current.handle(request).await
	}
}

struct Composed {
	middleware: Arc<dyn Middleware>,
	next: Arc<dyn Handler>,
}

#[async_trait]
impl Handler for Composed {
	async fn handle(&self, request: Request) -> Result<Response> {
		self.middleware.process(request, self.next.clone()).await
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	struct MockHandler {
		response_body: String,
	}

	#[async_trait]
	impl Handler for MockHandler {
		async fn handle(&self, _request: Request) -> Result<Response> {
			Ok(Response::ok().with_body(self.response_body.clone()))
		}
	}

	struct PrefixMiddleware {
		prefix: String,
	}

	#[async_trait]
	impl Middleware for PrefixMiddleware {
		async fn process(&self, request: Request, next: Arc<dyn Handler>) -> Result<Response> {
			let response = next.handle(request).await?;
			let current_body = String::from_utf8(response.body.to_vec()).unwrap_or_default();
			Ok(Response::ok().with_body(format!("{}{}", self.prefix, current_body)))
		}
	}

	struct ApiOnly;

	#[async_trait]
	impl Middleware for ApiOnly {
		async fn process(&self, request: Request, next: Arc<dyn Handler>) -> Result<Response> {
			let response = next.handle(request).await?;
			let body = String::from_utf8(response.body.to_vec()).unwrap_or_default();
			Ok(Response::ok().with_body(format!("api:{}", body)))
		}

		fn should_continue(&self, request: &Request) -> bool {
			request.path().starts_with("/api")
		}
	}

	struct Blocker;

	#[async_trait]
	impl Middleware for Blocker {
		async fn process(&self, _request: Request, _next: Arc<dyn Handler>) -> Result<Response> {
			Ok(Response::forbidden().with_body("blocked"))
		}
	}

	fn request(path: &str) -> Request {
		Request::builder().uri(path).build().unwrap()
	}

	fn body(response: &Response) -> String {
		String::from_utf8(response.body.to_vec()).unwrap()
	}

	fn handler() -> Arc<dyn Handler> {
		Arc::new(MockHandler {
			response_body: "Data".to_string(),
		})
	}

	#[rstest]
	#[tokio::test]
	async fn test_empty_chain_calls_handler() {
		let chain = MiddlewareChain::new(handler());
		let response = chain.handle(request("/")).await.unwrap();

		assert!(chain.is_empty());
		assert_eq!(body(&response), "Data");
	}

	#[rstest]
	#[tokio::test]
	async fn test_first_added_is_outermost() {
		let chain = MiddlewareChain::new(handler())
			.with_middleware(Arc::new(PrefixMiddleware {
				prefix: "M1:".to_string(),
			}))
			.with_middleware(Arc::new(PrefixMiddleware {
				prefix: "M2:".to_string(),
			}));

		let response = chain.handle(request("/")).await.unwrap();
		assert_eq!(chain.len(), 2);
		assert_eq!(body(&response), "M1:M2:Data");
	}

	#[rstest]
	#[case("/api/testimonials", "api:Data")]
	#[case("/menu", "Data")]
	#[tokio::test]
	async fn test_should_continue_skips(#[case] path: &str, #[case] expected: &str) {
		let chain = MiddlewareChain::new(handler()).with_middleware(Arc::new(ApiOnly));

		let response = chain.handle(request(path)).await.unwrap();
		assert_eq!(body(&response), expected);
	}

	#[rstest]
	#[tokio::test]
	async fn test_short_circuit_skips_inner() {
		let mut chain = MiddlewareChain::new(handler());
		chain.add_middleware(Arc::new(Blocker));
		chain.add_middleware(Arc::new(PrefixMiddleware {
			prefix: "never:".to_string(),
		}));

		let response = chain.handle(request("/")).await.unwrap();
		assert_eq!(response.status, hyper::StatusCode::FORBIDDEN);
		assert_eq!(body(&response), "blocked");
	}
}

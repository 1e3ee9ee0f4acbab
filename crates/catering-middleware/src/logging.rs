use async_trait::async_trait;
use catering_core::Result;
use catering_http::{Handler, Middleware, Request, Response};
use std::sync::Arc;
use std::time::Instant;

/// Logs method, path, status and latency of every request through
/// `tracing`.
///
/// Successful responses log at `info`, client errors at `warn` and server
/// errors or handler failures at `error`.
#[derive(Debug, Default)]
pub struct LoggingMiddleware;

impl LoggingMiddleware {
	pub fn new() -> Self {
		Self
	}
}

#[async_trait]
impl Middleware for LoggingMiddleware {
	async fn process(&self, request: Request, next: Arc<dyn Handler>) -> Result<Response> {
		let start = Instant::now();
		let method = request.method.to_string();
		let path = request.path().to_string();

		let result = next.handle(request).await;
		let elapsed_ms = start.elapsed().as_millis() as u64;

		match &result {
			Ok(response) => {
				let status = response.status.as_u16();
				if response.status.is_server_error() {
					tracing::error!(%method, %path, status, elapsed_ms, "request");
				} else if response.status.is_client_error() {
					tracing::warn!(%method, %path, status, elapsed_ms, "request");
				} else {
					tracing::info!(%method, %path, status, elapsed_ms, "request");
				}
			}
			Err(err) => {
				tracing::error!(%method, %path, error = %err, elapsed_ms, "request failed");
			}
		}

		result
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use catering_core::Error;
	use rstest::rstest;

	struct Failing;

	#[async_trait]
	impl Handler for Failing {
		async fn handle(&self, _request: Request) -> Result<Response> {
			Err(Error::Internal("boom".into()))
		}
	}

	struct Ok200;

	#[async_trait]
	impl Handler for Ok200 {
		async fn handle(&self, _request: Request) -> Result<Response> {
			Ok(Response::ok().with_body("fine"))
		}
	}

	#[rstest]
	#[tokio::test]
	async fn test_passes_response_through() {
		let request = Request::builder().uri("/api/testimonials").build().unwrap();
		let response = LoggingMiddleware::new()
			.process(request, Arc::new(Ok200))
			.await
			.unwrap();

		assert_eq!(response.body, bytes::Bytes::from("fine"));
	}

	#[rstest]
	#[tokio::test]
	async fn test_passes_error_through() {
		let request = Request::builder().uri("/api/testimonials").build().unwrap();
		let result = LoggingMiddleware::new().process(request, Arc::new(Failing)).await;

		assert!(matches!(result, Err(Error::Internal(_))));
	}
}

//! HTTP/1.1 server over hyper.

use bytes::Bytes;
use catering_http::{Handler, Middleware, MiddlewareChain, Request, Response};
use http_body_util::{BodyExt, Full};
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::Service;
use hyper_util::rt::TokioIo;
use std::future::Future;
use std::io;
use std::net::SocketAddr;
use std::pin::Pin;
use std::sync::Arc;
use tokio::net::{TcpListener, TcpStream};

use crate::shutdown::ShutdownCoordinator;

/// Body sent when a handler fails with an error nothing else rendered.
const FALLBACK_MESSAGE: &str = "Internal server error.";

/// HTTP server with middleware support
pub struct HttpServer {
	handler: Arc<dyn Handler>,
	middlewares: Vec<Arc<dyn Middleware>>,
}

impl HttpServer {
	/// Create a new server with the given handler
	///
	/// # Examples
	///
	/// ```
	/// use std::sync::Arc;
	/// use catering_http::{Handler, Request, Response};
	/// use catering_server::HttpServer;
	///
	/// struct Health;
	///
	/// #[async_trait::async_trait]
	/// impl Handler for Health {
	///     async fn handle(&self, _req: Request) -> catering_core::Result<Response> {
	///         Ok(Response::ok().with_body("ok"))
	///     }
	/// }
	///
	/// let server = HttpServer::new(Arc::new(Health));
	/// assert_eq!(server.middleware_count(), 0);
	/// ```
	pub fn new(handler: Arc<dyn Handler>) -> Self {
		Self {
			handler,
			middlewares: Vec::new(),
		}
	}

	/// Add a middleware; the first one added runs outermost.
	pub fn with_middleware(mut self, middleware: Arc<dyn Middleware>) -> Self {
		self.middlewares.push(middleware);
		self
	}

	pub fn middleware_count(&self) -> usize {
		self.middlewares.len()
	}

	/// The handler with every middleware applied.
	pub fn build_handler(&self) -> Arc<dyn Handler> {
		if self.middlewares.is_empty() {
			return self.handler.clone();
		}

		let mut chain = MiddlewareChain::new(self.handler.clone());
		for middleware in &self.middlewares {
			chain.add_middleware(middleware.clone());
		}
		Arc::new(chain)
	}

	/// Bind `addr` and serve until `coordinator` triggers shutdown.
	pub async fn listen_with_shutdown(
		self,
		addr: SocketAddr,
		coordinator: ShutdownCoordinator,
	) -> io::Result<()> {
		let listener = TcpListener::bind(addr).await?;
		self.serve_listener(listener, coordinator).await
	}

	/// Serve connections from an already bound listener.
	///
	/// On shutdown the accept loop stops, open connections finish their
	/// current request and close, and the coordinator is told that accepting
	/// has stopped.
	pub async fn serve_listener(
		self,
		listener: TcpListener,
		coordinator: ShutdownCoordinator,
	) -> io::Result<()> {
		let local_addr = listener.local_addr()?;
		tracing::info!(address = %local_addr, "server listening on http://{}", local_addr);

		let handler = self.build_handler();
		let mut shutdown_rx = coordinator.subscribe();

		loop {
			tokio::select! {
				result = listener.accept() => {
					let (stream, remote_addr) = match result {
						Ok(accepted) => accepted,
						Err(err) => {
							tracing::warn!(error = %err, "failed to accept connection");
							continue;
						}
					};
					let handler = handler.clone();
					let coordinator = coordinator.clone();

					tokio::spawn(async move {
						let _guard = coordinator.connection_guard();
						if let Err(err) =
							Self::handle_connection(stream, remote_addr, handler, &coordinator).await
						{
							tracing::debug!(error = %err, remote = %remote_addr, "connection error");
						}
					});
				}
				_ = shutdown_rx.recv() => {
					tracing::info!("shutdown signal received, no longer accepting connections");
					break;
				}
			}
		}

		coordinator.notify_shutdown_complete();
		Ok(())
	}

	async fn handle_connection(
		stream: TcpStream,
		remote_addr: SocketAddr,
		handler: Arc<dyn Handler>,
		coordinator: &ShutdownCoordinator,
	) -> Result<(), hyper::Error> {
		let io = TokioIo::new(stream);
		let service = RequestService {
			handler,
			remote_addr,
		};

		let connection = http1::Builder::new().serve_connection(io, service);
		tokio::pin!(connection);

		let mut shutdown_rx = coordinator.subscribe();
		if coordinator.is_shutting_down() {
			connection.as_mut().graceful_shutdown();
			return connection.await;
		}

		tokio::select! {
			result = connection.as_mut() => result,
			_ = shutdown_rx.recv() => {
				connection.as_mut().graceful_shutdown();
				connection.await
			}
		}
	}
}

/// Adapts a [`Handler`] to hyper's service interface
struct RequestService {
	handler: Arc<dyn Handler>,
	remote_addr: SocketAddr,
}

impl Service<hyper::Request<Incoming>> for RequestService {
	type Response = hyper::Response<Full<Bytes>>;
	type Error = hyper::Error;
	type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send + 'static>>;

	fn call(&self, req: hyper::Request<Incoming>) -> Self::Future {
		let handler = self.handler.clone();
		let remote_addr = self.remote_addr;

		Box::pin(async move {
			let (parts, body) = req.into_parts();
			let body = body.collect().await?.to_bytes();

			let mut request = Request::new(parts.method, parts.uri, parts.version, parts.headers, body);
			request.remote_addr = Some(remote_addr);

			let response = match handler.handle(request).await {
				Ok(response) => response,
				Err(err) => Response::from_error(&err, FALLBACK_MESSAGE),
			};
			Ok(into_hyper(response))
		})
	}
}

fn into_hyper(response: Response) -> hyper::Response<Full<Bytes>> {
	let mut out = hyper::Response::new(Full::new(response.body));
	*out.status_mut() = response.status;
	*out.headers_mut() = response.headers;
	out
}

/// Serve `handler` on `addr` until `coordinator` triggers shutdown.
pub async fn serve_with_shutdown(
	addr: SocketAddr,
	handler: Arc<dyn Handler>,
	coordinator: ShutdownCoordinator,
) -> io::Result<()> {
	HttpServer::new(handler)
		.listen_with_shutdown(addr, coordinator)
		.await
}

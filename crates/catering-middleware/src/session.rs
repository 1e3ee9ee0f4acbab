use async_trait::async_trait;
use catering_auth::{JwtAuth, SESSION_COOKIE, SessionState};
use catering_core::Result;
use catering_http::{Handler, Middleware, Request, Response};
use std::sync::Arc;

/// Resolves the `token` cookie into a [`SessionState`] stored in request
/// extensions.
///
/// Never rejects a request itself; handlers decide what an anonymous or
/// invalid session means for them.
pub struct SessionMiddleware {
	auth: Arc<JwtAuth>,
}

impl SessionMiddleware {
	pub fn new(auth: Arc<JwtAuth>) -> Self {
		Self { auth }
	}
}

/// Session state attached by [`SessionMiddleware`], anonymous when absent.
pub fn session_of(request: &Request) -> SessionState {
	request.extensions.get::<SessionState>().unwrap_or_default()
}

#[async_trait]
impl Middleware for SessionMiddleware {
	async fn process(&self, request: Request, next: Arc<dyn Handler>) -> Result<Response> {
		let token = request.cookie(SESSION_COOKIE);
		let state = SessionState::resolve(token.as_deref(), &self.auth);
		request.extensions.insert(state);
		next.handle(request).await
	}

	fn should_continue(&self, request: &Request) -> bool {
		request.path().starts_with("/api/")
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use catering_core::Role;
	use catering_http::MiddlewareChain;
	use rstest::rstest;

	struct EchoRole;

	#[async_trait]
	impl Handler for EchoRole {
		async fn handle(&self, request: Request) -> Result<Response> {
			let body = match session_of(&request) {
				SessionState::Anonymous => "anonymous".to_string(),
				SessionState::Invalid(_) => "invalid".to_string(),
				SessionState::Authenticated(identity) => identity.role.to_string(),
			};
			Ok(Response::ok().with_body(body))
		}
	}

	async fn run(cookie: Option<String>) -> String {
		let auth = Arc::new(JwtAuth::new(b"secret"));
		let chain = MiddlewareChain::new(Arc::new(EchoRole))
			.with_middleware(Arc::new(SessionMiddleware::new(auth)));

		let mut builder = Request::builder().uri("/api/auth/me");
		if let Some(cookie) = cookie {
			builder = builder.header("cookie", &cookie);
		}
		let response = chain.handle(builder.build().unwrap()).await.unwrap();
		String::from_utf8(response.body.to_vec()).unwrap()
	}

	#[rstest]
	#[tokio::test]
	async fn test_session_states() {
		let token = JwtAuth::new(b"secret")
			.issue("u-1", "a@example.com", Role::Admin)
			.unwrap();

		assert_eq!(run(None).await, "anonymous");
		assert_eq!(run(Some("token=forged".into())).await, "invalid");
		assert_eq!(run(Some(format!("token={}", token))).await, "admin");
	}
}

//! Page-level redirect gate.
//!
//! Looks only at whether a session cookie is present; signature and expiry
//! are verified later by the API handlers. This keeps logged-out visitors
//! away from member pages and logged-in visitors away from the login form,
//! but it is not an access-control boundary.

use async_trait::async_trait;
use catering_auth::SESSION_COOKIE;
use catering_core::Result;
use catering_http::{Handler, Middleware, Request, Response};
use percent_encoding::{NON_ALPHANUMERIC, utf8_percent_encode};
use std::sync::Arc;

/// How the gate treats a path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteClass {
	/// Requires a session cookie
	Protected,
	/// Only for visitors without a session cookie
	AuthOnly,
	Public,
}

#[derive(Debug, Clone)]
pub struct RouteGateConfig {
	pub protected: Vec<String>,
	pub auth_only: Vec<String>,
	/// Paths the gate never looks at (API, static assets)
	pub bypass: Vec<String>,
	pub login_path: String,
	pub dashboard_path: String,
}

impl Default for RouteGateConfig {
	fn default() -> Self {
		let owned = |items: &[&str]| items.iter().map(|s| s.to_string()).collect();
		Self {
			protected: owned(&["/subscription", "/dashboard", "/admin"]),
			auth_only: owned(&["/login", "/register"]),
			bypass: owned(&["/api", "/_next", "/images", "/favicon.ico"]),
			login_path: "/login".to_string(),
			dashboard_path: "/dashboard".to_string(),
		}
	}
}

pub struct RouteGate {
	config: RouteGateConfig,
}

impl RouteGate {
	pub fn new(config: RouteGateConfig) -> Self {
		Self { config }
	}

	pub fn classify(&self, path: &str) -> RouteClass {
		let matches = |prefixes: &[String]| prefixes.iter().any(|p| path.starts_with(p.as_str()));
		if matches(&self.config.protected) {
			RouteClass::Protected
		} else if matches(&self.config.auth_only) {
			RouteClass::AuthOnly
		} else {
			RouteClass::Public
		}
	}

	/// Redirect target for `path`, or `None` to let the request through.
	///
	/// # Examples
	///
	/// ```
	/// use catering_middleware::{RouteGate, RouteGateConfig};
	///
	/// let gate = RouteGate::new(RouteGateConfig::default());
	/// assert_eq!(
	///     gate.redirect_for("/dashboard", false).as_deref(),
	///     Some("/login?redirect_from=%2Fdashboard")
	/// );
	/// assert_eq!(gate.redirect_for("/login", true).as_deref(), Some("/dashboard"));
	/// assert_eq!(gate.redirect_for("/menu", false), None);
	/// ```
	pub fn redirect_for(&self, path: &str, has_session: bool) -> Option<String> {
		match (self.classify(path), has_session) {
			(RouteClass::Protected, false) => Some(format!(
				"{}?redirect_from={}",
				self.config.login_path,
				utf8_percent_encode(path, NON_ALPHANUMERIC)
			)),
			(RouteClass::AuthOnly, true) => Some(self.config.dashboard_path.clone()),
			_ => None,
		}
	}
}

impl Default for RouteGate {
	fn default() -> Self {
		Self::new(RouteGateConfig::default())
	}
}

#[async_trait]
impl Middleware for RouteGate {
	async fn process(&self, request: Request, next: Arc<dyn Handler>) -> Result<Response> {
		let has_session = request.cookie(SESSION_COOKIE).is_some();
		if let Some(location) = self.redirect_for(request.path(), has_session) {
			tracing::debug!(path = %request.path(), %location, "route gate redirect");
			return Ok(Response::temporary_redirect(location));
		}
		next.handle(request).await
	}

	fn should_continue(&self, request: &Request) -> bool {
		let path = request.path();
		!self
			.config
			.bypass
			.iter()
			.any(|prefix| path.starts_with(prefix.as_str()))
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use catering_http::MiddlewareChain;
	use hyper::StatusCode;
	use rstest::rstest;

	struct Page;

	#[async_trait]
	impl Handler for Page {
		async fn handle(&self, _request: Request) -> Result<Response> {
			Ok(Response::ok().with_body("page"))
		}
	}

	#[rstest]
	#[case("/subscription", RouteClass::Protected)]
	#[case("/dashboard", RouteClass::Protected)]
	#[case("/admin/dashboard", RouteClass::Protected)]
	#[case("/login", RouteClass::AuthOnly)]
	#[case("/register", RouteClass::AuthOnly)]
	#[case("/", RouteClass::Public)]
	#[case("/menu", RouteClass::Public)]
	#[case("/contact", RouteClass::Public)]
	fn test_classify(#[case] path: &str, #[case] expected: RouteClass) {
		assert_eq!(RouteGate::default().classify(path), expected);
	}

	async fn run(path: &str, cookie: Option<&str>) -> Response {
		let chain = MiddlewareChain::new(Arc::new(Page)).with_middleware(Arc::new(RouteGate::default()));
		let mut builder = Request::builder().uri(path);
		if let Some(cookie) = cookie {
			builder = builder.header("cookie", cookie);
		}
		chain.handle(builder.build().unwrap()).await.unwrap()
	}

	#[rstest]
	#[tokio::test]
	async fn test_protected_without_cookie_redirects_to_login() {
		let response = run("/admin/dashboard", None).await;

		assert_eq!(response.status, StatusCode::TEMPORARY_REDIRECT);
		assert_eq!(
			response.headers.get("location").unwrap(),
			"/login?redirect_from=%2Fadmin%2Fdashboard"
		);
	}

	#[rstest]
	#[tokio::test]
	async fn test_gate_ignores_signature() {
		let response = run("/dashboard", Some("token=not-even-a-jwt")).await;
		assert_eq!(response.status, StatusCode::OK);
	}

	#[rstest]
	#[tokio::test]
	async fn test_auth_only_with_cookie_redirects_to_dashboard() {
		let response = run("/register", Some("token=x")).await;

		assert_eq!(response.status, StatusCode::TEMPORARY_REDIRECT);
		assert_eq!(response.headers.get("location").unwrap(), "/dashboard");
	}

	#[rstest]
	#[case("/api/subscriptions/me")]
	#[case("/images/diet-plan.jpg")]
	#[case("/favicon.ico")]
	#[tokio::test]
	async fn test_bypassed_paths(#[case] path: &str) {
		let response = run(path, None).await;
		assert_eq!(response.status, StatusCode::OK);
	}

	#[rstest]
	#[tokio::test]
	async fn test_empty_cookie_counts_as_absent() {
		let response = run("/subscription", Some("token=")).await;
		assert_eq!(response.status, StatusCode::TEMPORARY_REDIRECT);
	}
}

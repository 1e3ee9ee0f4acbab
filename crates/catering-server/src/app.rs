//! Route table and middleware stack.

use catering_http::Handler;
use catering_middleware::{
	CsrfMiddleware, LoggingMiddleware, RouteGate, RouteGateConfig, SessionMiddleware,
};
use std::sync::Arc;

use crate::http::HttpServer;
use crate::router::Router;
use crate::state::AppState;
use crate::views::pages::{PAGES, PageShell};
use crate::views::{admin, auth, csrf, plans, subscriptions, testimonials, view};

/// Paths whose unsafe methods need a matching CSRF token.
pub const CSRF_GUARDED: &[&str] = &["/api/subscriptions", "/api/testimonials"];

/// Every endpoint, without middleware.
pub fn routes(state: &Arc<AppState>) -> Router {
	let mut router = Router::new()
		.post(
			"/api/auth/register",
			view(state, "Internal server error during registration.", auth::register),
		)
		.post(
			"/api/auth/login",
			view(state, "Internal server error during login.", auth::login),
		)
		.post(
			"/api/auth/logout",
			view(state, "Terjadi kesalahan pada server. Mohon coba lagi nanti.", auth::logout),
		)
		.get("/api/auth/me", view(state, "Internal server error.", auth::me))
		.get(
			"/api/csrf-token",
			view(state, "Failed to generate CSRF token.", csrf::issue),
		)
		.post(
			"/api/subscriptions",
			view(
				state,
				"Internal server error during subscription creation.",
				subscriptions::create,
			),
		)
		.get(
			"/api/subscriptions/me",
			view(
				state,
				"Internal server error while fetching subscriptions.",
				subscriptions::mine,
			),
		)
		.put(
			"/api/subscriptions/{id}/pause",
			view(
				state,
				"Internal server error while pausing subscription.",
				subscriptions::pause,
			),
		)
		.put(
			"/api/subscriptions/{id}/resume",
			view(
				state,
				"Internal server error while resuming subscription.",
				subscriptions::resume,
			),
		)
		.put(
			"/api/subscriptions/{id}/cancel",
			view(
				state,
				"Internal server error while cancelling subscription.",
				subscriptions::cancel,
			),
		)
		.get(
			"/api/admin/metrics",
			view(
				state,
				"Internal server error while fetching admin metrics.",
				admin::metrics,
			),
		)
		.get(
			"/api/testimonials",
			view(state, "Failed to fetch testimonials.", testimonials::list),
		)
		.post(
			"/api/testimonials",
			view(
				state,
				"Internal server error during testimonial submission.",
				testimonials::submit,
			),
		)
		.get("/api/meal-plans", view(state, "Failed to fetch meal plans.", plans::list))
		.get(
			"/api/meal-plans/{id}",
			view(state, "Failed to fetch meal plans.", plans::detail),
		);

	for &(path, title) in PAGES {
		router = router.get(path, Arc::new(PageShell::new(title)));
	}
	router
}

/// Server with the full middleware stack, outermost first:
/// logging, route gate, session resolution, CSRF, then the router.
pub fn build_app(state: Arc<AppState>) -> HttpServer {
	let csrf = CSRF_GUARDED
		.iter()
		.fold(CsrfMiddleware::new(state.csrf.clone()), |mw, prefix| mw.guard(*prefix));

	HttpServer::new(Arc::new(routes(&state)))
		.with_middleware(Arc::new(LoggingMiddleware::new()))
		.with_middleware(Arc::new(RouteGate::new(RouteGateConfig::default())))
		.with_middleware(Arc::new(SessionMiddleware::new(state.auth.clone())))
		.with_middleware(Arc::new(csrf))
}

/// The assembled handler, for in-process callers and tests.
pub fn build_handler(state: Arc<AppState>) -> Arc<dyn Handler> {
	build_app(state).build_handler()
}

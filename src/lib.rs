//! # SEA Catering
//!
//! Backend for a meal-subscription service: account registration and login
//! with JWT session cookies, a seeded meal-plan catalog, subscriptions with
//! a frozen monthly price and a pause/resume/cancel lifecycle, customer
//! testimonials and aggregate metrics for administrators.
//!
//! This crate re-exports the workspace crates under one roof.
//!
//! ## Feature Flags
//!
//! - `server` (default) - HTTP server, router, views and the `manage` CLI
//! - `minimal` - domain, persistence and middleware only
//!
//! ## Quick Example
//!
//! ```rust,no_run
//! use catering::prelude::*;
//! use std::sync::Arc;
//!
//! # async fn run() -> anyhow::Result<()> {
//! let settings = Settings::from_env()?;
//! let pool = catering::db::connect(&settings.database_url).await?;
//! catering::db::migrate(&pool).await?;
//! catering::db::seed_meal_plans(&pool).await?;
//!
//! let state = Arc::new(AppState::new(pool, &settings));
//! let coordinator = ShutdownCoordinator::new(settings.shutdown_timeout());
//! build_app(state)
//!     .listen_with_shutdown(settings.bind_address.parse()?, coordinator)
//!     .await?;
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod conf;
pub mod core;
pub mod db;
pub mod http;
pub mod middleware;
#[cfg(feature = "server")]
pub mod server;

pub use catering_core::{
	DeliveryDay, Error, MealType, Result, Role, SubscriptionStatus, Transition, monthly_price,
};
pub use catering_http::{Handler, Middleware, MiddlewareChain, Request, Response};

pub use catering_auth::{Argon2Hasher, JwtAuth, PasswordHasher, SessionIdentity, SessionState};
pub use catering_conf::Settings;
pub use catering_db::{
	AdminMetrics, MealPlan, SqlitePool, Subscription, SubscriptionQuery, Testimonial, User,
};
pub use catering_middleware::{CsrfMiddleware, LoggingMiddleware, RouteGate, SessionMiddleware};

#[cfg(feature = "server")]
pub use catering_server::{AppState, HttpServer, Router, ShutdownCoordinator, TestClient};

pub mod prelude {
	//! Commonly used types for wiring an application.

	pub use crate::{
		Error, Handler, Middleware, MiddlewareChain, Request, Response, Result, Role, Settings,
		SqlitePool,
	};

	#[cfg(feature = "server")]
	pub use crate::{AppState, HttpServer, Router, ShutdownCoordinator};
	#[cfg(feature = "server")]
	pub use catering_server::{build_app, build_handler};
}

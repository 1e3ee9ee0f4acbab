//! # Catering Server
//!
//! The HTTP surface of SEA Catering: a hyper HTTP/1.1 server with graceful
//! shutdown, a `{param}` router, JSON views and the management commands.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use catering_conf::Settings;
//! use catering_server::{AppState, ShutdownCoordinator, build_app, commands};
//! use std::sync::Arc;
//!
//! # async fn run() -> anyhow::Result<()> {
//! let settings = Settings::from_env()?;
//! let pool = commands::prepare_database(&settings.database_url).await?;
//! let state = Arc::new(AppState::new(pool, &settings));
//!
//! let coordinator = ShutdownCoordinator::new(settings.shutdown_timeout());
//! build_app(state)
//!     .listen_with_shutdown(settings.bind_address.parse()?, coordinator)
//!     .await?;
//! # Ok(())
//! # }
//! ```

pub mod app;
pub mod commands;
pub mod http;
pub mod router;
pub mod shutdown;
pub mod state;
pub mod testing;
pub mod views;

pub use app::{CSRF_GUARDED, build_app, build_handler, routes};
pub use http::{HttpServer, serve_with_shutdown};
pub use router::{PathPattern, Router};
pub use shutdown::{ShutdownCoordinator, shutdown_signal};
pub use state::AppState;
pub use testing::TestClient;

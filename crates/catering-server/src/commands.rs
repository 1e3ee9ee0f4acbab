//! Management commands behind the `manage` binary.

use anyhow::Context;
use catering_auth::PasswordHasher;
use catering_conf::Settings;
use catering_core::Role;
use catering_core::validation::RegisterInput;
use catering_db::{NewUser, SqlitePool, User, UserRepository};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use crate::app::build_app;
use crate::shutdown::{ShutdownCoordinator, shutdown_signal};
use crate::state::AppState;

/// Install the global `tracing` subscriber.
///
/// `RUST_LOG` wins over `default_filter`; an unparsable directive falls
/// back to `info`.
pub fn init_tracing(default_filter: &str) {
	let filter = EnvFilter::try_from_default_env()
		.or_else(|_| EnvFilter::try_new(default_filter))
		.unwrap_or_else(|_| EnvFilter::new("info"));

	// A second install (tests, embedding) keeps the first subscriber.
	let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

/// Connect, migrate and seed the catalog.
pub async fn prepare_database(database_url: &str) -> anyhow::Result<SqlitePool> {
	let pool = catering_db::connect(database_url)
		.await
		.context("failed to open the database")?;
	let applied = catering_db::migrate(&pool).await.context("migration failed")?;
	if !applied.is_empty() {
		tracing::info!(?applied, "migrations applied");
	}
	catering_db::seed_meal_plans(&pool)
		.await
		.context("seeding meal plans failed")?;
	Ok(pool)
}

/// Serve until Ctrl-C or SIGTERM, then drain open connections.
pub async fn runserver(settings: &Settings, address: Option<&str>) -> anyhow::Result<()> {
	let address = address.unwrap_or(&settings.bind_address);
	let addr: SocketAddr = address
		.parse()
		.with_context(|| format!("invalid address '{}'", address))?;

	let pool = prepare_database(&settings.database_url).await?;
	let state = Arc::new(AppState::new(pool.clone(), settings));
	let coordinator = ShutdownCoordinator::new(settings.shutdown_timeout());

	let trigger = coordinator.clone();
	tokio::spawn(async move {
		shutdown_signal().await;
		trigger.shutdown();
	});

	build_app(state)
		.listen_with_shutdown(addr, coordinator.clone())
		.await
		.with_context(|| format!("server on {} failed", addr))?;

	coordinator.wait_for_shutdown().await;
	pool.close().await;
	tracing::info!("server stopped");
	Ok(())
}

/// Create an admin account.
///
/// The same field and password rules as registration apply.
pub async fn create_superuser(
	pool: &SqlitePool,
	hasher: &dyn PasswordHasher,
	email: &str,
	full_name: &str,
	password: &str,
) -> catering_core::Result<User> {
	let input = RegisterInput {
		full_name: full_name.to_string(),
		email: email.to_string(),
		password: password.to_string(),
	}
	.validated()?;

	let user = UserRepository::new(pool.clone())
		.create(NewUser {
			full_name: input.full_name,
			email: input.email,
			password_hash: hasher.hash(&input.password)?,
			role: Role::Admin,
		})
		.await?;
	tracing::info!(user_id = %user.id, "superuser created");
	Ok(user)
}

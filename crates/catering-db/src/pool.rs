//! Connection pool setup.

use catering_core::Result;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;

/// Default pool size for file-backed databases
pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;

/// Open a pool for `url`, creating the database file if needed.
///
/// In-memory URLs get a single long-lived connection, since every SQLite
/// connection to `:memory:` would otherwise see its own empty database.
///
/// # Examples
///
/// ```
/// # tokio::runtime::Runtime::new().unwrap().block_on(async {
/// let pool = catering_db::connect("sqlite::memory:").await.unwrap();
/// let one: i64 = sqlx::query_scalar("SELECT 1").fetch_one(&pool).await.unwrap();
/// assert_eq!(one, 1);
/// # });
/// ```
pub async fn connect(url: &str) -> Result<SqlitePool> {
	let options = SqliteConnectOptions::from_str(url)?
		.create_if_missing(true)
		.foreign_keys(true);

	let pool = if is_memory(url) {
		SqlitePoolOptions::new()
			.max_connections(1)
			.idle_timeout(None)
			.max_lifetime(None)
			.connect_with(options)
			.await?
	} else {
		SqlitePoolOptions::new()
			.max_connections(DEFAULT_MAX_CONNECTIONS)
			.connect_with(options)
			.await?
	};

	tracing::debug!(url = %redact(url), "database pool opened");
	Ok(pool)
}

/// Fresh, migrated and seeded in-memory database; used by tests and demos
pub async fn connect_in_memory() -> Result<SqlitePool> {
	let pool = connect("sqlite::memory:").await?;
	crate::schema::migrate(&pool).await?;
	crate::seed::seed_meal_plans(&pool).await?;
	Ok(pool)
}

fn is_memory(url: &str) -> bool {
	url.contains(":memory:") || url.contains("mode=memory")
}

// Strip query parameters before logging.
fn redact(url: &str) -> &str {
	url.split('?').next().unwrap_or(url)
}

//! Table definitions and the migration runner.
//!
//! Every DDL statement is built with sea-query and rendered for SQLite.
//! Applied migrations are recorded in `catering_migrations`, so
//! [`migrate`] can run on every start.

use catering_core::Result;
use chrono::Utc;
use sea_query::{
	Alias, ColumnDef, Expr, ExprTrait, ForeignKey, ForeignKeyAction, Func, Index, Query,
	SchemaStatementBuilder, SqliteQueryBuilder, Table,
};
use sqlx::SqlitePool;

use crate::bind::build_query;
use crate::time::format_timestamp;

pub const USERS: &str = "users";
pub const MEAL_PLANS: &str = "meal_plans";
pub const SUBSCRIPTIONS: &str = "subscriptions";
pub const TESTIMONIALS: &str = "testimonials";
const MIGRATIONS_TABLE: &str = "catering_migrations";

fn build_table_sql<T: SchemaStatementBuilder>(statement: &T) -> String {
	statement.to_string(SqliteQueryBuilder)
}

fn build_index_sql(statement: &sea_query::IndexCreateStatement) -> String {
	statement.to_string(SqliteQueryBuilder)
}

/// A named, ordered set of DDL statements applied in one transaction
pub struct Migration {
	pub name: &'static str,
	statements: fn() -> Vec<String>,
}

impl Migration {
	pub fn statements(&self) -> Vec<String> {
		(self.statements)()
	}
}

/// All migrations in application order
pub const MIGRATIONS: &[Migration] = &[Migration {
	name: "0001_initial",
	statements: initial_schema,
}];

fn initial_schema() -> Vec<String> {
	let users = Table::create()
		.table(Alias::new(USERS))
		.if_not_exists()
		.col(ColumnDef::new(Alias::new("id")).text().not_null().primary_key())
		.col(ColumnDef::new(Alias::new("full_name")).text().not_null())
		.col(ColumnDef::new(Alias::new("email")).text().not_null().unique_key())
		.col(ColumnDef::new(Alias::new("password")).text().not_null())
		.col(
			ColumnDef::new(Alias::new("role"))
				.text()
				.not_null()
				.default("user"),
		)
		.col(ColumnDef::new(Alias::new("created_at")).text().not_null())
		.col(ColumnDef::new(Alias::new("updated_at")).text().not_null())
		.to_owned();

	let meal_plans = Table::create()
		.table(Alias::new(MEAL_PLANS))
		.if_not_exists()
		.col(ColumnDef::new(Alias::new("id")).text().not_null().primary_key())
		.col(ColumnDef::new(Alias::new("name")).text().not_null().unique_key())
		.col(ColumnDef::new(Alias::new("price")).big_integer().not_null())
		.col(ColumnDef::new(Alias::new("description")).text().not_null())
		.col(ColumnDef::new(Alias::new("details")).text().not_null())
		.col(ColumnDef::new(Alias::new("image")).text())
		.col(ColumnDef::new(Alias::new("created_at")).text().not_null())
		.col(ColumnDef::new(Alias::new("updated_at")).text().not_null())
		.to_owned();

	let subscriptions = Table::create()
		.table(Alias::new(SUBSCRIPTIONS))
		.if_not_exists()
		.col(ColumnDef::new(Alias::new("id")).text().not_null().primary_key())
		.col(ColumnDef::new(Alias::new("user_id")).text().not_null())
		.col(ColumnDef::new(Alias::new("customer_name")).text().not_null())
		.col(ColumnDef::new(Alias::new("phone_number")).text().not_null())
		.col(ColumnDef::new(Alias::new("plan_id")).text().not_null())
		// JSON arrays of wire names
		.col(ColumnDef::new(Alias::new("meal_types")).text().not_null())
		.col(ColumnDef::new(Alias::new("delivery_days")).text().not_null())
		.col(ColumnDef::new(Alias::new("allergies")).text())
		// Decimal rendered as text; exact, unlike REAL
		.col(ColumnDef::new(Alias::new("total_price")).text().not_null())
		.col(
			ColumnDef::new(Alias::new("status"))
				.text()
				.not_null()
				.default("active"),
		)
		.col(ColumnDef::new(Alias::new("pause_start_date")).text())
		.col(ColumnDef::new(Alias::new("pause_end_date")).text())
		.col(ColumnDef::new(Alias::new("created_at")).text().not_null())
		.col(ColumnDef::new(Alias::new("updated_at")).text().not_null())
		.foreign_key(
			ForeignKey::create()
				.name("fk_subscriptions_user")
				.from(Alias::new(SUBSCRIPTIONS), Alias::new("user_id"))
				.to(Alias::new(USERS), Alias::new("id"))
				.on_delete(ForeignKeyAction::Cascade),
		)
		.foreign_key(
			ForeignKey::create()
				.name("fk_subscriptions_plan")
				.from(Alias::new(SUBSCRIPTIONS), Alias::new("plan_id"))
				.to(Alias::new(MEAL_PLANS), Alias::new("id"))
				.on_delete(ForeignKeyAction::Restrict),
		)
		.to_owned();

	let testimonials = Table::create()
		.table(Alias::new(TESTIMONIALS))
		.if_not_exists()
		.col(ColumnDef::new(Alias::new("id")).text().not_null().primary_key())
		.col(ColumnDef::new(Alias::new("customer_name")).text().not_null())
		.col(ColumnDef::new(Alias::new("review_message")).text().not_null())
		.col(ColumnDef::new(Alias::new("rating")).integer().not_null())
		.col(ColumnDef::new(Alias::new("created_at")).text().not_null())
		.to_owned();

	let by_user = Index::create()
		.if_not_exists()
		.name("idx_subscriptions_user_id")
		.table(Alias::new(SUBSCRIPTIONS))
		.col(Alias::new("user_id"))
		.to_owned();

	let by_status = Index::create()
		.if_not_exists()
		.name("idx_subscriptions_status_created_at")
		.table(Alias::new(SUBSCRIPTIONS))
		.col(Alias::new("status"))
		.col(Alias::new("created_at"))
		.to_owned();

	vec![
		build_table_sql(&users),
		build_table_sql(&meal_plans),
		build_table_sql(&subscriptions),
		build_table_sql(&testimonials),
		build_index_sql(&by_user),
		build_index_sql(&by_status),
	]
}

async fn ensure_migrations_table(pool: &SqlitePool) -> Result<()> {
	let stmt = Table::create()
		.table(Alias::new(MIGRATIONS_TABLE))
		.if_not_exists()
		.col(ColumnDef::new(Alias::new("name")).text().not_null().primary_key())
		.col(ColumnDef::new(Alias::new("applied_at")).text().not_null())
		.to_owned();

	sqlx::query(&build_table_sql(&stmt)).execute(pool).await?;
	Ok(())
}

async fn is_applied(pool: &SqlitePool, name: &str) -> Result<bool> {
	let stmt = Query::select()
		.expr(Func::count(Expr::col(Alias::new("name"))))
		.from(Alias::new(MIGRATIONS_TABLE))
		.and_where(Expr::col(Alias::new("name")).eq(name))
		.to_owned();

	let (sql, args) = build_query(&stmt)?;
	let count: i64 = sqlx::query_scalar_with(&sql, args).fetch_one(pool).await?;
	Ok(count > 0)
}

/// Apply every pending migration and return the names applied.
///
/// # Examples
///
/// ```
/// # tokio::runtime::Runtime::new().unwrap().block_on(async {
/// let pool = catering_db::connect("sqlite::memory:").await.unwrap();
///
/// let applied = catering_db::migrate(&pool).await.unwrap();
/// assert_eq!(applied, vec!["0001_initial"]);
///
/// // Second run is a no-op
/// assert!(catering_db::migrate(&pool).await.unwrap().is_empty());
/// # });
/// ```
pub async fn migrate(pool: &SqlitePool) -> Result<Vec<&'static str>> {
	ensure_migrations_table(pool).await?;

	let mut applied = Vec::new();
	for migration in MIGRATIONS {
		if is_applied(pool, migration.name).await? {
			continue;
		}

		let mut tx = pool.begin().await?;
		for sql in migration.statements() {
			sqlx::query(&sql).execute(&mut *tx).await?;
		}

		let record = Query::insert()
			.into_table(Alias::new(MIGRATIONS_TABLE))
			.columns([Alias::new("name"), Alias::new("applied_at")])
			.values_panic([migration.name.into(), format_timestamp(Utc::now()).into()])
			.to_owned();
		let (sql, args) = build_query(&record)?;
		sqlx::query_with(&sql, args).execute(&mut *tx).await?;
		tx.commit().await?;

		tracing::info!(migration = migration.name, "applied migration");
		applied.push(migration.name);
	}

	Ok(applied)
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	fn test_initial_schema_is_sqlite_ddl() {
		let statements = initial_schema();
		assert_eq!(statements.len(), 6);
		assert!(statements[0].starts_with("CREATE TABLE IF NOT EXISTS \"users\""));
		assert!(statements[2].contains("FOREIGN KEY"));
		assert!(statements[4].starts_with("CREATE INDEX IF NOT EXISTS"));
	}

	#[rstest]
	#[tokio::test]
	async fn test_migrate_creates_tables() {
		let pool = crate::connect("sqlite::memory:").await.unwrap();
		migrate(&pool).await.unwrap();

		let tables: Vec<String> = sqlx::query_scalar(
			"SELECT name FROM sqlite_master WHERE type = 'table' AND name NOT LIKE 'sqlite_%' ORDER BY name",
		)
		.fetch_all(&pool)
		.await
		.unwrap();

		assert_eq!(
			tables,
			vec![
				"catering_migrations",
				"meal_plans",
				"subscriptions",
				"testimonials",
				"users"
			]
		);
	}
}

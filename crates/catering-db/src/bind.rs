//! Parameter binding for sea-query statements.
//!
//! Statements are rendered with `?` placeholders; their values travel
//! separately as [`SqliteArguments`], so user input never becomes SQL text.

use catering_core::{Error, Result};
use sea_query::{QueryStatementWriter, SqliteQueryBuilder, Value, Values};
use sqlx::Arguments;
use sqlx::sqlite::SqliteArguments;

/// Render `statement` for SQLite and collect its bound values.
///
/// # Examples
///
/// ```
/// use catering_db::bind::build_query;
/// use sea_query::{Alias, Expr, ExprTrait, Query};
///
/// let stmt = Query::select()
///     .column(Alias::new("id"))
///     .from(Alias::new("users"))
///     .and_where(Expr::col(Alias::new("email")).eq("o'brien@example.com"))
///     .to_owned();
///
/// let (sql, _args) = build_query(&stmt).unwrap();
/// assert_eq!(sql, r#"SELECT "id" FROM "users" WHERE "email" = ?"#);
/// ```
pub fn build_query<'q, T: QueryStatementWriter>(
	statement: &T,
) -> Result<(String, SqliteArguments<'q>)> {
	let (sql, values) = statement.build(SqliteQueryBuilder);
	Ok((sql, bind_values(values)?))
}

fn bind_values<'q>(values: Values) -> Result<SqliteArguments<'q>> {
	let mut args = SqliteArguments::default();
	for value in values.0 {
		bind_value(&mut args, value)?;
	}
	Ok(args)
}

fn bind_value<'q>(args: &mut SqliteArguments<'q>, value: Value) -> Result<()> {
	let added = match value {
		Value::Bool(v) => args.add(v),
		Value::TinyInt(v) => args.add(v.map(i64::from)),
		Value::SmallInt(v) => args.add(v.map(i64::from)),
		Value::Int(v) => args.add(v.map(i64::from)),
		Value::BigInt(v) => args.add(v),
		Value::TinyUnsigned(v) => args.add(v.map(i64::from)),
		Value::SmallUnsigned(v) => args.add(v.map(i64::from)),
		Value::Unsigned(v) => args.add(v.map(i64::from)),
		Value::BigUnsigned(v) => {
			let v = v
				.map(i64::try_from)
				.transpose()
				.map_err(|e| Error::Database(format!("integer out of range: {}", e)))?;
			args.add(v)
		}
		Value::Float(v) => args.add(v.map(f64::from)),
		Value::Double(v) => args.add(v),
		Value::String(v) => args.add(v.map(|s| s.to_string())),
		Value::Char(v) => args.add(v.map(|c| c.to_string())),
		Value::Bytes(v) => args.add(v.map(|b| b.to_vec())),
		other => return Err(Error::Database(format!("unsupported bind value {:?}", other))),
	};
	added.map_err(|e| Error::Database(format!("failed to bind value: {}", e)))
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;
	use sea_query::{Alias, Expr, ExprTrait, Query};

	#[rstest]
	fn test_values_stay_out_of_sql() {
		let stmt = Query::update()
			.table(Alias::new("subscriptions"))
			.value(Alias::new("status"), "paused")
			.value(Alias::new("pause_start_date"), None::<String>)
			.and_where(Expr::col(Alias::new("id")).eq("x' OR '1'='1"))
			.and_where(Expr::col(Alias::new("rating")).eq(5))
			.to_owned();

		let (sql, _args) = build_query(&stmt).unwrap();

		assert_eq!(sql.matches('?').count(), 4);
		assert!(!sql.contains("paused"));
		assert!(!sql.contains("OR '1'='1"));
	}

	#[rstest]
	#[tokio::test]
	async fn test_bound_values_round_trip() {
		let pool = crate::connect("sqlite::memory:").await.unwrap();
		sqlx::query("CREATE TABLE notes (body TEXT, stars INTEGER, missing TEXT)")
			.execute(&pool)
			.await
			.unwrap();

		let insert = Query::insert()
			.into_table(Alias::new("notes"))
			.columns([Alias::new("body"), Alias::new("stars"), Alias::new("missing")])
			.values_panic(["it's \"quoted\"; DROP TABLE notes;".into(), 4i32.into(), None::<String>.into()])
			.to_owned();
		let (sql, args) = build_query(&insert).unwrap();
		sqlx::query_with(&sql, args).execute(&pool).await.unwrap();

		let (body, stars, missing): (String, i64, Option<String>) =
			sqlx::query_as("SELECT body, stars, missing FROM notes")
				.fetch_one(&pool)
				.await
				.unwrap();
		assert_eq!(body, "it's \"quoted\"; DROP TABLE notes;");
		assert_eq!(stars, 4);
		assert_eq!(missing, None);
	}
}

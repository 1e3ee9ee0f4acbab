use catering_core::{Error, Result, Role};
use chrono::Utc;
use sea_query::{Alias, Expr, ExprTrait, Query};
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::models::User;
use crate::bind::build_query;
use crate::schema::USERS;
use crate::time::format_timestamp;

pub const DUPLICATE_EMAIL: &str = "Email already registered.";

/// Fields for a new account; the password is already hashed
#[derive(Debug, Clone)]
pub struct NewUser {
	pub full_name: String,
	pub email: String,
	pub password_hash: String,
	pub role: Role,
}

#[derive(Debug, Clone)]
pub struct UserRepository {
	pool: SqlitePool,
}

impl UserRepository {
	pub fn new(pool: SqlitePool) -> Self {
		Self { pool }
	}

	/// Insert an account.
	///
	/// # Errors
	///
	/// [`Error::Conflict`] when the email is taken, whether noticed by the
	/// lookup or by the unique index under a concurrent insert.
	pub async fn create(&self, new_user: NewUser) -> Result<User> {
		if self.find_by_email(&new_user.email).await?.is_some() {
			return Err(Error::Conflict(DUPLICATE_EMAIL.to_string()));
		}

		let id = Uuid::new_v4().to_string();
		let now = format_timestamp(Utc::now());
		let stmt = Query::insert()
			.into_table(Alias::new(USERS))
			.columns([
				Alias::new("id"),
				Alias::new("full_name"),
				Alias::new("email"),
				Alias::new("password"),
				Alias::new("role"),
				Alias::new("created_at"),
				Alias::new("updated_at"),
			])
			.values_panic([
				id.clone().into(),
				new_user.full_name.into(),
				new_user.email.into(),
				new_user.password_hash.into(),
				new_user.role.as_str().into(),
				now.clone().into(),
				now.into(),
			])
			.to_owned();

		let (sql, args) = build_query(&stmt)?;
		match sqlx::query_with(&sql, args).execute(&self.pool).await {
			Ok(_) => {}
			Err(sqlx::Error::Database(db)) if db.is_unique_violation() => {
				return Err(Error::Conflict(DUPLICATE_EMAIL.to_string()));
			}
			Err(err) => return Err(err.into()),
		}

		tracing::info!(user_id = %id, "user created");
		self.find_by_id(&id)
			.await?
			.ok_or_else(|| Error::Internal(format!("user {} vanished after insert", id)))
	}

	pub async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
		self.find_one("email", email).await
	}

	pub async fn find_by_id(&self, id: &str) -> Result<Option<User>> {
		self.find_one("id", id).await
	}

	async fn find_one(&self, column: &str, value: &str) -> Result<Option<User>> {
		let stmt = Query::select()
			.columns([
				Alias::new("id"),
				Alias::new("full_name"),
				Alias::new("email"),
				Alias::new("password"),
				Alias::new("role"),
				Alias::new("created_at"),
				Alias::new("updated_at"),
			])
			.from(Alias::new(USERS))
			.and_where(Expr::col(Alias::new(column)).eq(value))
			.limit(1)
			.to_owned();

		let (sql, args) = build_query(&stmt)?;
		let row = sqlx::query_with(&sql, args)
			.fetch_optional(&self.pool)
			.await?;
		row.as_ref().map(User::from_row).transpose()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::*;

	#[fixture]
	async fn repo() -> UserRepository {
		UserRepository::new(crate::connect_in_memory().await.unwrap())
	}

	fn alice() -> NewUser {
		NewUser {
			full_name: "Alice Wonder".into(),
			email: "alice@example.com".into(),
			password_hash: "$argon2id$v=19$hash".into(),
			role: Role::User,
		}
	}

	#[rstest]
	#[tokio::test]
	async fn test_create_and_lookup(#[future] repo: UserRepository) {
		let repo = repo.await;
		let user = repo.create(alice()).await.unwrap();

		assert_eq!(user.email, "alice@example.com");
		assert_eq!(user.role, Role::User);
		assert!(Uuid::parse_str(&user.id).is_ok());

		let by_email = repo.find_by_email("alice@example.com").await.unwrap().unwrap();
		assert_eq!(by_email, user);
		assert!(repo.find_by_id("missing").await.unwrap().is_none());
	}

	#[rstest]
	#[tokio::test]
	async fn test_duplicate_email_conflicts(#[future] repo: UserRepository) {
		let repo = repo.await;
		repo.create(alice()).await.unwrap();

		let err = repo.create(alice()).await.unwrap_err();
		assert!(matches!(err, Error::Conflict(ref m) if m == DUPLICATE_EMAIL));

		let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
			.fetch_one(&repo.pool)
			.await
			.unwrap();
		assert_eq!(count, 1);
	}

	#[rstest]
	#[tokio::test]
	async fn test_quotes_in_values_are_escaped(#[future] repo: UserRepository) {
		let repo = repo.await;
		let mut user = alice();
		user.full_name = "O'Brien \"Bob\"".into();
		let created = repo.create(user).await.unwrap();
		assert_eq!(created.full_name, "O'Brien \"Bob\"");
	}
}

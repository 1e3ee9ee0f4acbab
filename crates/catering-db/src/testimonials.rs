use catering_core::Result;
use catering_core::validation::NewTestimonial;
use chrono::Utc;
use sea_query::{Alias, Expr, ExprTrait, Order, Query};
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::models::Testimonial;
use crate::bind::build_query;
use crate::schema::TESTIMONIALS;
use crate::time::format_timestamp;

const COLUMNS: [&str; 5] = ["id", "customer_name", "review_message", "rating", "created_at"];

#[derive(Debug, Clone)]
pub struct TestimonialRepository {
	pool: SqlitePool,
}

impl TestimonialRepository {
	pub fn new(pool: SqlitePool) -> Self {
		Self { pool }
	}

	pub async fn create(&self, testimonial: NewTestimonial) -> Result<Testimonial> {
		let id = Uuid::new_v4().to_string();
		let stmt = Query::insert()
			.into_table(Alias::new(TESTIMONIALS))
			.columns(COLUMNS.map(Alias::new))
			.values_panic([
				id.clone().into(),
				testimonial.customer_name.into(),
				testimonial.review_message.into(),
				testimonial.rating.into(),
				format_timestamp(Utc::now()).into(),
			])
			.to_owned();
		let (sql, args) = build_query(&stmt)?;
		sqlx::query_with(&sql, args).execute(&self.pool).await?;

		let select = Query::select()
			.columns(COLUMNS.map(Alias::new))
			.from(Alias::new(TESTIMONIALS))
			.and_where(Expr::col(Alias::new("id")).eq(id.as_str()))
			.to_owned();
		let (sql, args) = build_query(&select)?;
		let row = sqlx::query_with(&sql, args).fetch_one(&self.pool).await?;
		Testimonial::from_row(&row)
	}

	/// All testimonials, newest first
	pub async fn list(&self) -> Result<Vec<Testimonial>> {
		let stmt = Query::select()
			.columns(COLUMNS.map(Alias::new))
			.from(Alias::new(TESTIMONIALS))
			.order_by(Alias::new("created_at"), Order::Desc)
			.order_by(Alias::new("id"), Order::Asc)
			.to_owned();

		let (sql, args) = build_query(&stmt)?;
		let rows = sqlx::query_with(&sql, args).fetch_all(&self.pool).await?;
		rows.iter().map(Testimonial::from_row).collect()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	#[tokio::test]
	async fn test_create_then_list_newest_first() {
		let repo = TestimonialRepository::new(crate::connect_in_memory().await.unwrap());

		let first = repo
			.create(NewTestimonial {
				customer_name: "Sari".into(),
				review_message: "Enak sekali!".into(),
				rating: 5,
			})
			.await
			.unwrap();
		tokio::time::sleep(std::time::Duration::from_millis(2)).await;
		let second = repo
			.create(NewTestimonial {
				customer_name: "Dewi".into(),
				review_message: "Porsinya pas.".into(),
				rating: 4,
			})
			.await
			.unwrap();

		let listed = repo.list().await.unwrap();
		assert_eq!(listed, vec![second, first]);
	}
}

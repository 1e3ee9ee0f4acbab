use catering_core::Result;
use sea_query::{Alias, Expr, ExprTrait, Order, Query, SelectStatement};
use sqlx::SqlitePool;

use crate::models::MealPlan;
use crate::bind::build_query;
use crate::schema::MEAL_PLANS;

/// Read access to the meal-plan catalog
#[derive(Debug, Clone)]
pub struct PlanRepository {
	pool: SqlitePool,
}

fn select_plans() -> SelectStatement {
	Query::select()
		.columns([
			Alias::new("id"),
			Alias::new("name"),
			Alias::new("price"),
			Alias::new("description"),
			Alias::new("details"),
			Alias::new("image"),
			Alias::new("created_at"),
			Alias::new("updated_at"),
		])
		.from(Alias::new(MEAL_PLANS))
		.to_owned()
}

impl PlanRepository {
	pub fn new(pool: SqlitePool) -> Self {
		Self { pool }
	}

	/// Every plan, cheapest first
	pub async fn list(&self) -> Result<Vec<MealPlan>> {
		let stmt = select_plans()
			.order_by(Alias::new("price"), Order::Asc)
			.order_by(Alias::new("id"), Order::Asc)
			.to_owned();

		let (sql, args) = build_query(&stmt)?;
		let rows = sqlx::query_with(&sql, args).fetch_all(&self.pool).await?;
		rows.iter().map(MealPlan::from_row).collect()
	}

	pub async fn get(&self, id: &str) -> Result<Option<MealPlan>> {
		let stmt = select_plans()
			.and_where(Expr::col(Alias::new("id")).eq(id))
			.to_owned();

		let (sql, args) = build_query(&stmt)?;
		let row = sqlx::query_with(&sql, args)
			.fetch_optional(&self.pool)
			.await?;
		row.as_ref().map(MealPlan::from_row).transpose()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	#[tokio::test]
	async fn test_list_is_ordered_by_price() {
		let repo = PlanRepository::new(crate::connect_in_memory().await.unwrap());
		let prices: Vec<i64> = repo.list().await.unwrap().iter().map(|p| p.price).collect();
		assert_eq!(prices, vec![25000, 30000, 35000, 40000, 60000]);
	}

	#[rstest]
	#[case("plan-royal", Some("Royal Plan"))]
	#[case("plan-unknown", None)]
	#[tokio::test]
	async fn test_get(#[case] id: &str, #[case] name: Option<&str>) {
		let repo = PlanRepository::new(crate::connect_in_memory().await.unwrap());
		let plan = repo.get(id).await.unwrap();
		assert_eq!(plan.as_ref().map(|p| p.name.as_str()), name);
	}

	#[rstest]
	#[tokio::test]
	async fn test_unique_violation_hides_driver_text() {
		let pool = crate::connect_in_memory().await.unwrap();
		let err = sqlx::query(
			"INSERT INTO meal_plans (id, name, price, description, details, image, created_at, updated_at) \
			 SELECT id, name, price, description, details, image, created_at, updated_at FROM meal_plans",
		)
		.execute(&pool)
		.await
		.unwrap_err();

		let err = catering_core::Error::from(err);
		assert!(matches!(err, catering_core::Error::Conflict(ref m) if m == catering_core::DUPLICATE_RESOURCE));
		assert!(!err.to_string().contains("UNIQUE"));
		assert!(!err.to_string().contains("meal_plans"));
	}
}

use catering_core::lifecycle::{LifecycleState, Transition};
use catering_core::validation::NewSubscription;
use catering_core::{Error, Result, monthly_price};
use chrono::Utc;
use sea_query::{Alias, Expr, ExprTrait, Query};
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::models::Subscription;
use crate::plans::PlanRepository;
use crate::query::{SubscriptionQuery, select_with_plan};
use crate::bind::build_query;
use crate::schema::SUBSCRIPTIONS;
use crate::time::{format_date, format_timestamp};

pub const PLAN_NOT_FOUND: &str = "Selected meal plan not found.";
pub const NOT_FOUND_OR_FORBIDDEN: &str = "Subscription not found or you do not have permission.";

fn wire_names<T, F: Fn(&T) -> &'static str>(items: &[T], name: F) -> Result<String> {
	let names: Vec<&str> = items.iter().map(name).collect();
	Ok(serde_json::to_string(&names)?)
}

#[derive(Debug, Clone)]
pub struct SubscriptionRepository {
	pool: SqlitePool,
	plans: PlanRepository,
}

impl SubscriptionRepository {
	pub fn new(pool: SqlitePool) -> Self {
		let plans = PlanRepository::new(pool.clone());
		Self { pool, plans }
	}

	/// Price and store a validated order for `user_id`.
	///
	/// The monthly total is computed here from the plan's current price and
	/// never recomputed.
	///
	/// # Errors
	///
	/// [`Error::NotFound`] when the plan does not exist.
	pub async fn create(&self, user_id: &str, order: NewSubscription) -> Result<Subscription> {
		let plan = self
			.plans
			.get(&order.plan_id)
			.await?
			.ok_or_else(|| Error::NotFound(PLAN_NOT_FOUND.to_string()))?;

		let total_price = monthly_price(plan.price, order.meal_types.len(), order.delivery_days.len());
		let id = Uuid::new_v4().to_string();
		let now = format_timestamp(Utc::now());

		let stmt = Query::insert()
			.into_table(Alias::new(SUBSCRIPTIONS))
			.columns([
				Alias::new("id"),
				Alias::new("user_id"),
				Alias::new("customer_name"),
				Alias::new("phone_number"),
				Alias::new("plan_id"),
				Alias::new("meal_types"),
				Alias::new("delivery_days"),
				Alias::new("allergies"),
				Alias::new("total_price"),
				Alias::new("status"),
				Alias::new("created_at"),
				Alias::new("updated_at"),
			])
			.values_panic([
				id.clone().into(),
				user_id.into(),
				order.customer_name.into(),
				order.phone_number.into(),
				plan.id.clone().into(),
				wire_names(&order.meal_types, |m| m.as_str())?.into(),
				wire_names(&order.delivery_days, |d| d.as_str())?.into(),
				order.allergies.into(),
				total_price.to_string().into(),
				LifecycleState::active().status.as_str().into(),
				now.clone().into(),
				now.into(),
			])
			.to_owned();

		let (sql, args) = build_query(&stmt)?;
		sqlx::query_with(&sql, args).execute(&self.pool).await?;
		tracing::info!(subscription_id = %id, %user_id, plan_id = %plan.id, %total_price, "subscription created");

		self.find_owned(&id, user_id)
			.await?
			.ok_or_else(|| Error::Internal(format!("subscription {} vanished after insert", id)))
	}

	/// Subscriptions of one user, filtered and sorted, each with its plan
	pub async fn list(&self, query: &SubscriptionQuery) -> Result<Vec<Subscription>> {
		let (sql, args) = build_query(&query.to_statement())?;
		let rows = sqlx::query_with(&sql, args)
			.fetch_all(&self.pool)
			.await?;
		rows.iter().map(|row| Subscription::from_row(row, true)).collect()
	}

	/// A subscription only if `user_id` owns it
	pub async fn find_owned(&self, id: &str, user_id: &str) -> Result<Option<Subscription>> {
		let mut stmt = select_with_plan();
		stmt.and_where(Expr::col((Alias::new(SUBSCRIPTIONS), Alias::new("id"))).eq(id))
			.and_where(Expr::col((Alias::new(SUBSCRIPTIONS), Alias::new("user_id"))).eq(user_id));

		let (sql, args) = build_query(&stmt)?;
		let row = sqlx::query_with(&sql, args)
			.fetch_optional(&self.pool)
			.await?;
		row.as_ref().map(|row| Subscription::from_row(row, true)).transpose()
	}

	/// Apply a lifecycle transition on behalf of `user_id`.
	///
	/// The write is a compare-and-set on the status read beforehand, so two
	/// racing transitions cannot both succeed.
	///
	/// # Errors
	///
	/// * [`Error::NotFound`] when the row is missing or owned by someone else
	/// * [`Error::InvalidState`] when the transition is not allowed from the
	///   current status
	pub async fn transition(
		&self,
		id: &str,
		user_id: &str,
		transition: Transition,
	) -> Result<Subscription> {
		let current = self
			.find_owned(id, user_id)
			.await?
			.ok_or_else(|| Error::NotFound(NOT_FOUND_OR_FORBIDDEN.to_string()))?;

		let before = LifecycleState::from_parts(
			current.status,
			current.pause_start_date,
			current.pause_end_date,
		);
		let after = before.apply(transition)?;

		let stmt = Query::update()
			.table(Alias::new(SUBSCRIPTIONS))
			.values([
				(Alias::new("status"), after.status.as_str().into()),
				(
					Alias::new("pause_start_date"),
					after.pause.map(|w| format_date(w.start)).into(),
				),
				(
					Alias::new("pause_end_date"),
					after.pause.map(|w| format_date(w.end)).into(),
				),
				(Alias::new("updated_at"), format_timestamp(Utc::now()).into()),
			])
			.and_where(Expr::col(Alias::new("id")).eq(id))
			.and_where(Expr::col(Alias::new("user_id")).eq(user_id))
			.and_where(Expr::col(Alias::new("status")).eq(before.status.as_str()))
			.to_owned();

		let (sql, args) = build_query(&stmt)?;
		let result = sqlx::query_with(&sql, args).execute(&self.pool).await?;
		if result.rows_affected() == 0 {
			// Lost a race; report against whatever state won.
			let latest = self
				.find_owned(id, user_id)
				.await?
				.ok_or_else(|| Error::NotFound(NOT_FOUND_OR_FORBIDDEN.to_string()))?;
			LifecycleState::from_parts(latest.status, latest.pause_start_date, latest.pause_end_date)
				.apply(transition)?;
			return Err(Error::Conflict(
				"Subscription was modified concurrently, please retry.".to_string(),
			));
		}

		tracing::info!(
			subscription_id = %id,
			transition = transition.name(),
			from = %before.status,
			to = %after.status,
			"subscription transitioned"
		);

		self.find_owned(id, user_id)
			.await?
			.ok_or_else(|| Error::NotFound(NOT_FOUND_OR_FORBIDDEN.to_string()))
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::query::{SortField, SortOrder};
	use crate::users::{NewUser, UserRepository};
	use catering_core::lifecycle::PauseWindow;
	use catering_core::{DeliveryDay, MealType, Role, SubscriptionStatus};
	use chrono::{Duration, NaiveDate};
	use rstest::*;
	use rust_decimal::Decimal;

	struct Ctx {
		repo: SubscriptionRepository,
		owner: String,
		other: String,
	}

	#[fixture]
	async fn ctx() -> Ctx {
		let pool = crate::connect_in_memory().await.unwrap();
		let users = UserRepository::new(pool.clone());
		let mut ids = Vec::new();
		for email in ["owner@example.com", "other@example.com"] {
			let user = users
				.create(NewUser {
					full_name: "Test".into(),
					email: email.into(),
					password_hash: "hash".into(),
					role: Role::User,
				})
				.await
				.unwrap();
			ids.push(user.id);
		}
		Ctx {
			repo: SubscriptionRepository::new(pool),
			owner: ids[0].clone(),
			other: ids[1].clone(),
		}
	}

	fn order(plan_id: &str, meals: usize, days: usize) -> NewSubscription {
		NewSubscription {
			customer_name: "Budi".into(),
			phone_number: "081234567890".into(),
			plan_id: plan_id.into(),
			meal_types: MealType::ALL[..meals].to_vec(),
			delivery_days: DeliveryDay::ALL[..days].to_vec(),
			allergies: None,
		}
	}

	fn pause_window() -> PauseWindow {
		let today = Utc::now().date_naive();
		PauseWindow {
			start: today + Duration::days(1),
			end: today + Duration::days(7),
		}
	}

	#[rstest]
	#[tokio::test]
	async fn test_create_prices_from_plan(#[future] ctx: Ctx) {
		let ctx = ctx.await;
		let sub = ctx.repo.create(&ctx.owner, order("plan-diet", 2, 3)).await.unwrap();

		assert_eq!(sub.total_price, Decimal::from(774000));
		assert_eq!(sub.status, SubscriptionStatus::Active);
		assert_eq!(sub.plan.as_ref().unwrap().name, "Diet Plan");
		assert_eq!(sub.meal_types, vec![MealType::Breakfast, MealType::Lunch]);
	}

	#[rstest]
	#[tokio::test]
	async fn test_create_unknown_plan(#[future] ctx: Ctx) {
		let ctx = ctx.await;
		let err = ctx.repo.create(&ctx.owner, order("plan-x", 1, 1)).await.unwrap_err();
		assert!(matches!(err, Error::NotFound(ref m) if m == PLAN_NOT_FOUND));
	}

	#[rstest]
	#[tokio::test]
	async fn test_price_is_frozen_after_plan_change(#[future] ctx: Ctx) {
		let ctx = ctx.await;
		let sub = ctx.repo.create(&ctx.owner, order("plan-diet", 1, 1)).await.unwrap();
		sqlx::query("UPDATE meal_plans SET price = 99999 WHERE id = 'plan-diet'")
			.execute(&ctx.repo.pool)
			.await
			.unwrap();

		let paused = ctx
			.repo
			.transition(&sub.id, &ctx.owner, Transition::Pause(pause_window()))
			.await
			.unwrap();
		let resumed = ctx.repo.transition(&sub.id, &ctx.owner, Transition::Resume).await.unwrap();

		assert_eq!(paused.total_price, sub.total_price);
		assert_eq!(resumed.total_price, Decimal::from(129000));
	}

	#[rstest]
	#[tokio::test]
	async fn test_pause_resume_cancel(#[future] ctx: Ctx) {
		let ctx = ctx.await;
		let sub = ctx.repo.create(&ctx.owner, order("plan-protein", 1, 2)).await.unwrap();
		let window = pause_window();

		let paused = ctx
			.repo
			.transition(&sub.id, &ctx.owner, Transition::Pause(window))
			.await
			.unwrap();
		assert_eq!(paused.status, SubscriptionStatus::Paused);
		assert_eq!(paused.pause_start_date, Some(window.start));
		assert_eq!(paused.pause_end_date, Some(window.end));

		let resumed = ctx.repo.transition(&sub.id, &ctx.owner, Transition::Resume).await.unwrap();
		assert_eq!(resumed.status, SubscriptionStatus::Active);
		assert_eq!(resumed.pause_start_date, None);
		assert_eq!(resumed.pause_end_date, None);

		let cancelled = ctx.repo.transition(&sub.id, &ctx.owner, Transition::Cancel).await.unwrap();
		assert_eq!(cancelled.status, SubscriptionStatus::Cancelled);
	}

	#[rstest]
	#[case(Transition::Resume)]
	#[case(Transition::Cancel)]
	#[tokio::test]
	async fn test_cancelled_is_terminal(#[future] ctx: Ctx, #[case] transition: Transition) {
		let ctx = ctx.await;
		let sub = ctx.repo.create(&ctx.owner, order("plan-kids", 1, 1)).await.unwrap();
		ctx.repo.transition(&sub.id, &ctx.owner, Transition::Cancel).await.unwrap();

		let err = ctx.repo.transition(&sub.id, &ctx.owner, transition).await.unwrap_err();
		assert!(matches!(err, Error::InvalidState(_)));

		let pause_err = ctx
			.repo
			.transition(&sub.id, &ctx.owner, Transition::Pause(pause_window()))
			.await
			.unwrap_err();
		assert!(matches!(pause_err, Error::InvalidState(_)));

		let stored = ctx.repo.find_owned(&sub.id, &ctx.owner).await.unwrap().unwrap();
		assert_eq!(stored.status, SubscriptionStatus::Cancelled);
	}

	#[rstest]
	#[tokio::test]
	async fn test_non_owner_gets_not_found_and_no_mutation(#[future] ctx: Ctx) {
		let ctx = ctx.await;
		let sub = ctx.repo.create(&ctx.owner, order("plan-royal", 1, 1)).await.unwrap();

		for transition in [Transition::Cancel, Transition::Pause(pause_window()), Transition::Resume] {
			let err = ctx.repo.transition(&sub.id, &ctx.other, transition).await.unwrap_err();
			assert!(matches!(err, Error::NotFound(ref m) if m == NOT_FOUND_OR_FORBIDDEN));
		}

		let stored = ctx.repo.find_owned(&sub.id, &ctx.owner).await.unwrap().unwrap();
		assert_eq!(stored.status, SubscriptionStatus::Active);
		assert_eq!(stored.updated_at, sub.updated_at);
	}

	#[rstest]
	#[tokio::test]
	async fn test_list_filters_and_sorts(#[future] ctx: Ctx) {
		let ctx = ctx.await;
		let cheap = ctx.repo.create(&ctx.owner, order("plan-kids", 1, 1)).await.unwrap();
		let pricey = ctx.repo.create(&ctx.owner, order("plan-royal", 3, 7)).await.unwrap();
		let mid = ctx.repo.create(&ctx.owner, order("plan-diet", 2, 2)).await.unwrap();
		ctx.repo.create(&ctx.other, order("plan-diet", 1, 1)).await.unwrap();
		ctx.repo.transition(&mid.id, &ctx.owner, Transition::Cancel).await.unwrap();

		let by_price = ctx
			.repo
			.list(&SubscriptionQuery::for_user(&ctx.owner).sort(SortField::TotalPrice, SortOrder::Asc))
			.await
			.unwrap();
		let ids: Vec<&str> = by_price.iter().map(|s| s.id.as_str()).collect();
		assert_eq!(ids, vec![cheap.id.as_str(), mid.id.as_str(), pricey.id.as_str()]);
		assert!(by_price.iter().all(|s| s.plan.is_some()));

		let cancelled = ctx
			.repo
			.list(&SubscriptionQuery::for_user(&ctx.owner).status(SubscriptionStatus::Cancelled))
			.await
			.unwrap();
		assert_eq!(cancelled.len(), 1);
		assert_eq!(cancelled[0].id, mid.id);

		let royal = ctx
			.repo
			.list(&SubscriptionQuery::for_user(&ctx.owner).plan_name("Royal Plan"))
			.await
			.unwrap();
		assert_eq!(royal.len(), 1);
		assert_eq!(royal[0].id, pricey.id);
	}

	#[rstest]
	#[tokio::test]
	async fn test_pause_dates_round_trip_as_calendar_dates(#[future] ctx: Ctx) {
		let ctx = ctx.await;
		let sub = ctx.repo.create(&ctx.owner, order("plan-diet", 1, 1)).await.unwrap();
		let window = PauseWindow {
			start: NaiveDate::from_ymd_opt(2099, 2, 27).unwrap(),
			end: NaiveDate::from_ymd_opt(2099, 3, 2).unwrap(),
		};

		ctx.repo
			.transition(&sub.id, &ctx.owner, Transition::Pause(window))
			.await
			.unwrap();
		let raw: (String, String) = sqlx::query_as(
			"SELECT pause_start_date, pause_end_date FROM subscriptions WHERE id = ?",
		)
		.bind(&sub.id)
		.fetch_one(&ctx.repo.pool)
		.await
		.unwrap();
		assert_eq!(raw, ("2099-02-27".to_string(), "2099-03-02".to_string()));
	}
}

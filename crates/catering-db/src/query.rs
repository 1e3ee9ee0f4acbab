//! Typed filter and sort for a user's subscription list.
//!
//! Query-string values are parsed once into [`SubscriptionQuery`]; the SQL
//! is then generated from the typed form, never from raw strings.

use catering_core::{Error, Result, SubscriptionStatus};
use sea_query::{Alias, Expr, ExprTrait, Order, Query, SelectStatement};

use crate::schema::{MEAL_PLANS, SUBSCRIPTIONS};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortField {
	#[default]
	CreatedAt,
	TotalPrice,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
	Asc,
	#[default]
	Desc,
}

impl From<SortOrder> for Order {
	fn from(order: SortOrder) -> Self {
		match order {
			SortOrder::Asc => Order::Asc,
			SortOrder::Desc => Order::Desc,
		}
	}
}

/// Filter and sort for `GET /api/subscriptions/me`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubscriptionQuery {
	pub user_id: String,
	pub status: Option<SubscriptionStatus>,
	pub plan_name: Option<String>,
	pub sort_field: SortField,
	pub sort_order: SortOrder,
}

// Absent, empty and "all" all mean "no filter".
fn filter_value(raw: Option<&str>) -> Option<&str> {
	raw.map(str::trim)
		.filter(|value| !value.is_empty() && *value != "all")
}

impl SubscriptionQuery {
	/// Every subscription of `user_id`, newest first
	pub fn for_user(user_id: impl Into<String>) -> Self {
		Self {
			user_id: user_id.into(),
			status: None,
			plan_name: None,
			sort_field: SortField::default(),
			sort_order: SortOrder::default(),
		}
	}

	pub fn status(mut self, status: SubscriptionStatus) -> Self {
		self.status = Some(status);
		self
	}

	pub fn plan_name(mut self, name: impl Into<String>) -> Self {
		self.plan_name = Some(name.into());
		self
	}

	pub fn sort(mut self, field: SortField, order: SortOrder) -> Self {
		self.sort_field = field;
		self.sort_order = order;
		self
	}

	/// Build from raw query-string values.
	///
	/// Unknown `sortBy` values fall back to creation time and any
	/// `sortOrder` other than `asc` sorts descending.
	///
	/// # Errors
	///
	/// [`Error::BadRequest`] for a `status` that is neither `all` nor a
	/// known status.
	///
	/// # Examples
	///
	/// ```
	/// use catering_db::query::{SortField, SortOrder, SubscriptionQuery};
	///
	/// let query = SubscriptionQuery::from_params("u-1", Some("all"), None, Some("totalPrice"), Some("asc"))
	///     .unwrap();
	/// assert_eq!(query.status, None);
	/// assert_eq!(query.sort_field, SortField::TotalPrice);
	/// assert_eq!(query.sort_order, SortOrder::Asc);
	/// ```
	pub fn from_params(
		user_id: impl Into<String>,
		status: Option<&str>,
		plan_name: Option<&str>,
		sort_by: Option<&str>,
		sort_order: Option<&str>,
	) -> Result<Self> {
		let status = filter_value(status)
			.map(|raw| {
				raw.parse::<SubscriptionStatus>()
					.map_err(|_| Error::BadRequest("Invalid status filter.".to_string()))
			})
			.transpose()?;

		let sort_field = match sort_by {
			Some("totalPrice") => SortField::TotalPrice,
			_ => SortField::CreatedAt,
		};
		let sort_order = match sort_order {
			Some("asc") => SortOrder::Asc,
			_ => SortOrder::Desc,
		};

		Ok(Self {
			user_id: user_id.into(),
			status,
			plan_name: filter_value(plan_name).map(str::to_string),
			sort_field,
			sort_order,
		})
	}

	/// Render as a join of subscriptions with their plan.
	///
	/// Plan columns are aliased `plan_<column>`.
	pub fn to_statement(&self) -> SelectStatement {
		let mut stmt = select_with_plan();
		stmt.and_where(Expr::col((Alias::new(SUBSCRIPTIONS), Alias::new("user_id"))).eq(self.user_id.as_str()));

		if let Some(status) = self.status {
			stmt.and_where(Expr::col((Alias::new(SUBSCRIPTIONS), Alias::new("status"))).eq(status.as_str()));
		}
		if let Some(name) = &self.plan_name {
			stmt.and_where(Expr::col((Alias::new(MEAL_PLANS), Alias::new("name"))).eq(name.as_str()));
		}

		let order: Order = self.sort_order.into();
		match self.sort_field {
			SortField::CreatedAt => {
				stmt.order_by((Alias::new(SUBSCRIPTIONS), Alias::new("created_at")), order);
			}
			SortField::TotalPrice => {
				// Stored as decimal text; compare numerically
				stmt.order_by_expr(
					Expr::cust("CAST(\"subscriptions\".\"total_price\" AS REAL)"),
					order,
				);
			}
		}
		stmt.order_by((Alias::new(SUBSCRIPTIONS), Alias::new("id")), Order::Asc);
		stmt
	}
}

const SUBSCRIPTION_COLUMNS: [&str; 14] = [
	"id",
	"user_id",
	"customer_name",
	"phone_number",
	"plan_id",
	"meal_types",
	"delivery_days",
	"allergies",
	"total_price",
	"status",
	"pause_start_date",
	"pause_end_date",
	"created_at",
	"updated_at",
];

const PLAN_COLUMNS: [&str; 8] = [
	"id",
	"name",
	"price",
	"description",
	"details",
	"image",
	"created_at",
	"updated_at",
];

/// Subscriptions inner-joined with their plan, without filters
pub(crate) fn select_with_plan() -> SelectStatement {
	let mut stmt = Query::select();
	for column in SUBSCRIPTION_COLUMNS {
		stmt.column((Alias::new(SUBSCRIPTIONS), Alias::new(column)));
	}
	for column in PLAN_COLUMNS {
		stmt.expr_as(
			Expr::col((Alias::new(MEAL_PLANS), Alias::new(column))),
			Alias::new(format!("plan_{}", column)),
		);
	}
	stmt.from(Alias::new(SUBSCRIPTIONS)).inner_join(
		Alias::new(MEAL_PLANS),
		Expr::col((Alias::new(SUBSCRIPTIONS), Alias::new("plan_id")))
			.equals((Alias::new(MEAL_PLANS), Alias::new("id"))),
	);
	stmt
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::bind::build_query;
	use rstest::rstest;

	#[rstest]
	#[case(None, None)]
	#[case(Some("all"), None)]
	#[case(Some(""), None)]
	#[case(Some("paused"), Some(SubscriptionStatus::Paused))]
	fn test_status_filter(#[case] raw: Option<&str>, #[case] expected: Option<SubscriptionStatus>) {
		let query = SubscriptionQuery::from_params("u-1", raw, None, None, None).unwrap();
		assert_eq!(query.status, expected);
	}

	#[rstest]
	fn test_unknown_status_is_rejected() {
		let err = SubscriptionQuery::from_params("u-1", Some("frozen"), None, None, None).unwrap_err();
		assert!(matches!(err, Error::BadRequest(_)));
	}

	#[rstest]
	#[case(None, None, SortField::CreatedAt, SortOrder::Desc)]
	#[case(Some("createdAt"), Some("asc"), SortField::CreatedAt, SortOrder::Asc)]
	#[case(Some("totalPrice"), Some("desc"), SortField::TotalPrice, SortOrder::Desc)]
	#[case(Some("totalPrice"), Some("ASC"), SortField::TotalPrice, SortOrder::Desc)]
	#[case(Some("name"), Some("asc"), SortField::CreatedAt, SortOrder::Asc)]
	fn test_sort_params(
		#[case] sort_by: Option<&str>,
		#[case] sort_order: Option<&str>,
		#[case] field: SortField,
		#[case] order: SortOrder,
	) {
		let query = SubscriptionQuery::from_params("u-1", None, None, sort_by, sort_order).unwrap();
		assert_eq!((query.sort_field, query.sort_order), (field, order));
	}

	#[rstest]
	fn test_statement_shape() {
		let (sql, _args) = build_query(
			&SubscriptionQuery::for_user("u-1")
				.plan_name("Diet Plan")
				.sort(SortField::TotalPrice, SortOrder::Asc)
				.to_statement(),
		)
		.unwrap();

		assert!(sql.contains("INNER JOIN \"meal_plans\""));
		assert!(sql.contains("\"subscriptions\".\"user_id\" = ?"));
		assert!(sql.contains("\"meal_plans\".\"name\" = ?"));
		assert!(!sql.contains("Diet Plan"));
		assert!(sql.contains("CAST(\"subscriptions\".\"total_price\" AS REAL) ASC"));
		assert!(!sql.contains("\"subscriptions\".\"status\" ="));
	}
}

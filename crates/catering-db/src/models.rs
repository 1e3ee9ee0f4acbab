//! Row types as they leave the storage layer.
//!
//! All of them serialize in camelCase, matching the JSON the API returns.

use catering_core::{DeliveryDay, MealType, Result, Role, SubscriptionStatus};
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::Row;
use sqlx::sqlite::SqliteRow;

use crate::time::{parse_date, parse_timestamp};

/// A registered account. The password hash never serializes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
	pub id: String,
	pub full_name: String,
	pub email: String,
	#[serde(skip_serializing)]
	pub password_hash: String,
	pub role: Role,
	pub created_at: DateTime<Utc>,
	#[serde(skip_serializing)]
	pub updated_at: DateTime<Utc>,
}

/// Catalog entry; `price` is the per-meal base price in rupiah.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MealPlan {
	pub id: String,
	pub name: String,
	pub price: i64,
	pub description: String,
	pub details: String,
	pub image: Option<String>,
	pub created_at: DateTime<Utc>,
	pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Subscription {
	pub id: String,
	pub user_id: String,
	pub customer_name: String,
	pub phone_number: String,
	pub plan_id: String,
	pub meal_types: Vec<MealType>,
	pub delivery_days: Vec<DeliveryDay>,
	pub allergies: Option<String>,
	/// Monthly price frozen at creation time
	#[serde(with = "rust_decimal::serde::float")]
	pub total_price: Decimal,
	pub status: SubscriptionStatus,
	pub pause_start_date: Option<NaiveDate>,
	pub pause_end_date: Option<NaiveDate>,
	pub created_at: DateTime<Utc>,
	pub updated_at: DateTime<Utc>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub plan: Option<MealPlan>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Testimonial {
	pub id: String,
	pub customer_name: String,
	pub review_message: String,
	pub rating: i32,
	pub created_at: DateTime<Utc>,
}

fn parse_enum<T: std::str::FromStr<Err = String>>(raw: &str) -> Result<T> {
	raw.parse::<T>()
		.map_err(|e| catering_core::Error::Database(format!("corrupt enum value: {}", e)))
}

fn parse_list<T: std::str::FromStr<Err = String>>(raw: &str) -> Result<Vec<T>> {
	let names: Vec<String> = serde_json::from_str(raw)?;
	names.iter().map(|name| parse_enum(name)).collect()
}

fn parse_opt_date(raw: Option<String>) -> Result<Option<NaiveDate>> {
	raw.as_deref().map(parse_date).transpose()
}

impl User {
	pub(crate) fn from_row(row: &SqliteRow) -> Result<Self> {
		Ok(Self {
			id: row.try_get("id")?,
			full_name: row.try_get("full_name")?,
			email: row.try_get("email")?,
			password_hash: row.try_get("password")?,
			role: parse_enum(&row.try_get::<String, _>("role")?)?,
			created_at: parse_timestamp(&row.try_get::<String, _>("created_at")?)?,
			updated_at: parse_timestamp(&row.try_get::<String, _>("updated_at")?)?,
		})
	}
}

impl MealPlan {
	/// Read a plan from columns named `{prefix}{column}`.
	///
	/// Joined queries alias plan columns with a `plan_` prefix to keep them
	/// apart from the subscription's own `id` and timestamps.
	pub(crate) fn from_row_prefixed(row: &SqliteRow, prefix: &str) -> Result<Self> {
		let col = |name: &str| format!("{}{}", prefix, name);
		Ok(Self {
			id: row.try_get(col("id").as_str())?,
			name: row.try_get(col("name").as_str())?,
			price: row.try_get(col("price").as_str())?,
			description: row.try_get(col("description").as_str())?,
			details: row.try_get(col("details").as_str())?,
			image: row.try_get(col("image").as_str())?,
			created_at: parse_timestamp(&row.try_get::<String, _>(col("created_at").as_str())?)?,
			updated_at: parse_timestamp(&row.try_get::<String, _>(col("updated_at").as_str())?)?,
		})
	}

	pub(crate) fn from_row(row: &SqliteRow) -> Result<Self> {
		Self::from_row_prefixed(row, "")
	}
}

impl Subscription {
	pub(crate) fn from_row(row: &SqliteRow, with_plan: bool) -> Result<Self> {
		let total_price: String = row.try_get("total_price")?;
		let total_price = total_price.parse::<Decimal>().map_err(|e| {
			catering_core::Error::Database(format!("corrupt total_price {:?}: {}", total_price, e))
		})?;

		let plan = if with_plan {
			Some(MealPlan::from_row_prefixed(row, "plan_")?)
		} else {
			None
		};

		Ok(Self {
			id: row.try_get("id")?,
			user_id: row.try_get("user_id")?,
			customer_name: row.try_get("customer_name")?,
			phone_number: row.try_get("phone_number")?,
			plan_id: row.try_get("plan_id")?,
			meal_types: parse_list(&row.try_get::<String, _>("meal_types")?)?,
			delivery_days: parse_list(&row.try_get::<String, _>("delivery_days")?)?,
			allergies: row.try_get("allergies")?,
			total_price,
			status: parse_enum(&row.try_get::<String, _>("status")?)?,
			pause_start_date: parse_opt_date(row.try_get("pause_start_date")?)?,
			pause_end_date: parse_opt_date(row.try_get("pause_end_date")?)?,
			created_at: parse_timestamp(&row.try_get::<String, _>("created_at")?)?,
			updated_at: parse_timestamp(&row.try_get::<String, _>("updated_at")?)?,
			plan,
		})
	}
}

impl Testimonial {
	pub(crate) fn from_row(row: &SqliteRow) -> Result<Self> {
		Ok(Self {
			id: row.try_get("id")?,
			customer_name: row.try_get("customer_name")?,
			review_message: row.try_get("review_message")?,
			rating: row.try_get("rating")?,
			created_at: parse_timestamp(&row.try_get::<String, _>("created_at")?)?,
		})
	}
}

//! Admin dashboard aggregates.
//!
//! `reactivations` counts active subscriptions whose row was touched inside
//! the window. That includes brand-new subscriptions as well as resumed
//! ones; there is no transition log to tell them apart.

use catering_core::{Error, Result, SubscriptionStatus};
use chrono::{DateTime, Duration, NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_query::{Alias, Expr, ExprTrait, Func, Query, SelectStatement};
use serde::Serialize;
use sqlx::SqlitePool;

use crate::bind::build_query;
use crate::schema::SUBSCRIPTIONS;
use crate::time::format_timestamp;

pub const INVALID_DATE_RANGE: &str = "Invalid date range provided.";

/// Half-open interval `[start, end)` in UTC
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateWindow {
	pub start: DateTime<Utc>,
	pub end: DateTime<Utc>,
}

fn parse_day_start(raw: &str) -> Option<DateTime<Utc>> {
	let raw = raw.trim();
	if let Ok(at) = DateTime::parse_from_rfc3339(raw) {
		return Some(at.with_timezone(&Utc));
	}
	NaiveDate::parse_from_str(raw, "%Y-%m-%d")
		.ok()
		.and_then(|date| date.and_hms_opt(0, 0, 0))
		.map(|naive| naive.and_utc())
}

impl DateWindow {
	/// Window from the `startDate`/`endDate` query parameters.
	///
	/// The window only applies when both are given; the end date counts
	/// as a whole day. `Ok(None)` means all time.
	///
	/// # Errors
	///
	/// [`Error::BadRequest`] with "Invalid date range provided." for
	/// unparsable dates, an end before the start or an end on the last
	/// representable day.
	///
	/// # Examples
	///
	/// ```
	/// use catering_db::metrics::DateWindow;
	///
	/// let window = DateWindow::from_params(Some("2025-01-01"), Some("2025-01-31"))
	///     .unwrap()
	///     .unwrap();
	/// assert_eq!(window.end.to_rfc3339(), "2025-02-01T00:00:00+00:00");
	///
	/// assert!(DateWindow::from_params(Some("2025-01-01"), None).unwrap().is_none());
	/// assert!(DateWindow::from_params(Some("2025-02-01"), Some("2025-01-01")).is_err());
	/// ```
	pub fn from_params(start: Option<&str>, end: Option<&str>) -> Result<Option<Self>> {
		let (Some(start), Some(end)) = (
			start.filter(|s| !s.trim().is_empty()),
			end.filter(|s| !s.trim().is_empty()),
		) else {
			return Ok(None);
		};

		let invalid = || Error::BadRequest(INVALID_DATE_RANGE.to_string());
		let start = parse_day_start(start).ok_or_else(invalid)?;
		let end = parse_day_start(end).ok_or_else(invalid)?;
		if end < start {
			return Err(invalid());
		}
		let end = end.checked_add_signed(Duration::days(1)).ok_or_else(invalid)?;

		Ok(Some(Self { start, end }))
	}

	fn restrict(&self, stmt: &mut SelectStatement, column: &str) {
		stmt.and_where(Expr::col(Alias::new(column)).gte(format_timestamp(self.start)))
			.and_where(Expr::col(Alias::new(column)).lt(format_timestamp(self.end)));
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminMetrics {
	pub new_subscriptions: i64,
	#[serde(with = "rust_decimal::serde::float")]
	pub monthly_recurring_revenue: Decimal,
	pub reactivations: i64,
	pub total_active_subscriptions: i64,
	pub total_cancelled_subscriptions: i64,
	pub total_paused_subscriptions: i64,
}

#[derive(Debug, Clone)]
pub struct MetricsAggregator {
	pool: SqlitePool,
}

impl MetricsAggregator {
	pub fn new(pool: SqlitePool) -> Self {
		Self { pool }
	}

	pub async fn collect(&self, window: Option<DateWindow>) -> Result<AdminMetrics> {
		let new_subscriptions = self.count(None, window.map(|w| (w, "created_at"))).await?;
		let reactivations = self
			.count(Some(SubscriptionStatus::Active), window.map(|w| (w, "updated_at")))
			.await?;
		let monthly_recurring_revenue = self.active_revenue(window).await?;

		Ok(AdminMetrics {
			new_subscriptions,
			monthly_recurring_revenue,
			reactivations,
			total_active_subscriptions: self.count(Some(SubscriptionStatus::Active), None).await?,
			total_cancelled_subscriptions: self
				.count(Some(SubscriptionStatus::Cancelled), None)
				.await?,
			total_paused_subscriptions: self.count(Some(SubscriptionStatus::Paused), None).await?,
		})
	}

	async fn count(
		&self,
		status: Option<SubscriptionStatus>,
		window: Option<(DateWindow, &str)>,
	) -> Result<i64> {
		let mut stmt = Query::select()
			.expr(Func::count(Expr::col(Alias::new("id"))))
			.from(Alias::new(SUBSCRIPTIONS))
			.to_owned();
		if let Some(status) = status {
			stmt.and_where(Expr::col(Alias::new("status")).eq(status.as_str()));
		}
		if let Some((window, column)) = window {
			window.restrict(&mut stmt, column);
		}

		let (sql, args) = build_query(&stmt)?;
		Ok(sqlx::query_scalar_with(&sql, args).fetch_one(&self.pool).await?)
	}

	// Summed in Decimal; SQLite would go through floating point.
	async fn active_revenue(&self, window: Option<DateWindow>) -> Result<Decimal> {
		let mut stmt = Query::select()
			.column(Alias::new("total_price"))
			.from(Alias::new(SUBSCRIPTIONS))
			.and_where(Expr::col(Alias::new("status")).eq(SubscriptionStatus::Active.as_str()))
			.to_owned();
		if let Some(window) = window {
			window.restrict(&mut stmt, "created_at");
		}

		let (sql, args) = build_query(&stmt)?;
		let prices: Vec<String> = sqlx::query_scalar_with(&sql, args)
			.fetch_all(&self.pool)
			.await?;
		prices.iter().try_fold(Decimal::ZERO, |sum, raw| {
			raw.parse::<Decimal>()
				.map(|price| sum + price)
				.map_err(|e| Error::Database(format!("corrupt total_price {:?}: {}", raw, e)))
		})
	}
}

//! Monthly price projection for a subscription order.

use rust_decimal::Decimal;

/// Weeks per month used to project a weekly cadence onto a monthly charge.
pub const WEEKS_PER_MONTH: Decimal = Decimal::from_parts(43, 0, 0, false, 1);

/// `base_price × meal_count × day_count × 4.3`, computed exactly.
///
/// The result is frozen into the subscription row at creation time and is
/// never recomputed.
pub fn monthly_price(base_price: i64, meal_count: usize, day_count: usize) -> Decimal {
	Decimal::from(base_price)
		* Decimal::from(meal_count as u64)
		* Decimal::from(day_count as u64)
		* WEEKS_PER_MONTH
}

#[cfg(test)]
mod tests {
	use super::*;
	use proptest::prelude::*;
	use rstest::rstest;
	use std::str::FromStr;

	#[rstest]
	fn test_weeks_per_month_constant() {
		assert_eq!(WEEKS_PER_MONTH, Decimal::from_str("4.3").unwrap());
	}

	#[rstest]
	#[case(30000, 2, 3, "774000")]
	#[case(30000, 1, 1, "129000")]
	#[case(60000, 3, 7, "5418000")]
	#[case(25001, 1, 1, "107504.3")]
	fn test_monthly_price(
		#[case] base: i64,
		#[case] meals: usize,
		#[case] days: usize,
		#[case] expected: &str,
	) {
		assert_eq!(
			monthly_price(base, meals, days),
			Decimal::from_str(expected).unwrap()
		);
	}

	proptest! {
		#[test]
		fn price_is_linear_in_each_factor(
			base in 1i64..1_000_000,
			meals in 1usize..=3,
			days in 1usize..=7,
		) {
			let one = monthly_price(base, 1, 1);
			prop_assert_eq!(
				monthly_price(base, meals, days),
				one * Decimal::from(meals as u64) * Decimal::from(days as u64)
			);
			prop_assert!(monthly_price(base, meals, days) > Decimal::ZERO);
		}
	}
}

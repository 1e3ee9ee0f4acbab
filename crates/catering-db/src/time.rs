//! Column encodings for timestamps and calendar dates.
//!
//! Timestamps are stored as fixed-width UTC RFC 3339 text so that string
//! comparison in SQL orders them chronologically.

use catering_core::{Error, Result};
use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};

pub fn format_timestamp(at: DateTime<Utc>) -> String {
	at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>> {
	DateTime::parse_from_rfc3339(raw)
		.map(|at| at.with_timezone(&Utc))
		.map_err(|e| Error::Database(format!("corrupt timestamp {:?}: {}", raw, e)))
}

pub fn format_date(date: NaiveDate) -> String {
	date.format("%Y-%m-%d").to_string()
}

pub fn parse_date(raw: &str) -> Result<NaiveDate> {
	NaiveDate::parse_from_str(raw, "%Y-%m-%d")
		.map_err(|e| Error::Database(format!("corrupt date {:?}: {}", raw, e)))
}

#[cfg(test)]
mod tests {
	use super::*;
	use chrono::TimeZone;
	use rstest::rstest;

	#[rstest]
	fn test_timestamps_sort_lexically() {
		let early = Utc.with_ymd_and_hms(2025, 1, 9, 23, 59, 59).unwrap();
		let late = Utc.with_ymd_and_hms(2025, 1, 10, 0, 0, 0).unwrap();

		let (a, b) = (format_timestamp(early), format_timestamp(late));
		assert!(a < b);
		assert_eq!(a, "2025-01-09T23:59:59.000000Z");
		assert_eq!(parse_timestamp(&b).unwrap(), late);
	}

	#[rstest]
	fn test_corrupt_values_are_database_errors() {
		assert!(matches!(parse_timestamp("yesterday"), Err(Error::Database(_))));
		assert!(matches!(parse_date("2025-13-01"), Err(Error::Database(_))));
	}
}

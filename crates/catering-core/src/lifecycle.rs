//! Subscription lifecycle state machine.
//!
//! ```text
//!   active ──pause──▶ paused ──resume──▶ active
//!     │                 │
//!     └────cancel───────┴──────▶ cancelled (terminal)
//! ```
//!
//! Transitions are pure: [`LifecycleState::apply`] returns the next state or
//! an error, and persistence writes the result with a compare-and-set on the
//! previous status. Ownership is checked by the caller before any transition.

use chrono::NaiveDate;
use serde::Serialize;

use crate::error::{Error, Result, ValidationErrors};
use crate::types::SubscriptionStatus;

/// Inclusive date range a subscription is paused for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PauseWindow {
	pub start: NaiveDate,
	pub end: NaiveDate,
}

fn parse_date(raw: &str) -> Option<NaiveDate> {
	let raw = raw.trim();
	// Accept full timestamps by keeping only the calendar date.
	let date_part = raw.get(..10).unwrap_or(raw);
	NaiveDate::parse_from_str(date_part, "%Y-%m-%d").ok()
}

impl PauseWindow {
	/// Parses and checks a pause request relative to `today`.
	///
	/// Both dates are required, must be `YYYY-MM-DD`, the end may not precede
	/// the start, and the start may not lie before today.
	pub fn parse(start: &str, end: &str, today: NaiveDate) -> Result<Self> {
		let mut errors = ValidationErrors::new();

		if start.trim().is_empty() || end.trim().is_empty() {
			errors.add("pauseStartDate", "Tanggal mulai dan akhir jeda diperlukan.");
			return Err(Error::Validation(errors));
		}

		let (Some(start), Some(end)) = (parse_date(start), parse_date(end)) else {
			errors.add("pauseStartDate", "Format tanggal tidak valid.");
			return Err(Error::Validation(errors));
		};

		if end < start {
			errors.add("pauseEndDate", "Tanggal akhir tidak boleh sebelum tanggal mulai.");
		}
		if start < today {
			errors.add("pauseStartDate", "Tanggal mulai tidak boleh di masa lalu.");
		}
		errors.into_result()?;

		Ok(Self { start, end })
	}

	/// Number of calendar days covered, both ends included.
	pub fn days(&self) -> i64 {
		(self.end - self.start).num_days() + 1
	}

	pub fn contains(&self, date: NaiveDate) -> bool {
		self.start <= date && date <= self.end
	}
}

/// Requested lifecycle change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
	Pause(PauseWindow),
	Resume,
	Cancel,
}

impl Transition {
	pub fn name(&self) -> &'static str {
		match self {
			Transition::Pause(_) => "pause",
			Transition::Resume => "resume",
			Transition::Cancel => "cancel",
		}
	}

	/// Statuses this transition may start from.
	pub fn allowed_from(&self) -> &'static [SubscriptionStatus] {
		match self {
			Transition::Pause(_) => &[SubscriptionStatus::Active],
			Transition::Resume => &[SubscriptionStatus::Paused],
			Transition::Cancel => &[SubscriptionStatus::Active, SubscriptionStatus::Paused],
		}
	}
}

/// Status plus pause window; the window is `Some` only while paused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LifecycleState {
	pub status: SubscriptionStatus,
	pub pause: Option<PauseWindow>,
}

impl LifecycleState {
	pub fn active() -> Self {
		Self {
			status: SubscriptionStatus::Active,
			pause: None,
		}
	}

	/// Rebuilds a state from stored columns, dropping a stray window on
	/// rows that are not paused.
	pub fn from_parts(
		status: SubscriptionStatus,
		start: Option<NaiveDate>,
		end: Option<NaiveDate>,
	) -> Self {
		let pause = match (status, start, end) {
			(SubscriptionStatus::Paused, Some(start), Some(end)) => Some(PauseWindow { start, end }),
			_ => None,
		};
		Self { status, pause }
	}

	/// Computes the state after `transition`.
	///
	/// # Errors
	///
	/// [`Error::InvalidState`] when the transition is not defined for the
	/// current status. Nothing leaves `cancelled`.
	pub fn apply(&self, transition: Transition) -> Result<Self> {
		if !transition.allowed_from().contains(&self.status) {
			return Err(Error::InvalidState(format!(
				"Cannot {} a subscription that is {}.",
				transition.name(),
				self.status
			)));
		}

		let next = match transition {
			Transition::Pause(window) => Self {
				status: SubscriptionStatus::Paused,
				pause: Some(window),
			},
			Transition::Resume => Self::active(),
			Transition::Cancel => Self {
				status: SubscriptionStatus::Cancelled,
				pause: None,
			},
		};
		Ok(next)
	}
}

//! Domain enumerations with their wire spellings.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Account role embedded in every session token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
	User,
	Admin,
}

impl Role {
	pub fn as_str(&self) -> &'static str {
		match self {
			Role::User => "user",
			Role::Admin => "admin",
		}
	}
}

impl fmt::Display for Role {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl FromStr for Role {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"user" => Ok(Role::User),
			"admin" => Ok(Role::Admin),
			other => Err(format!("unknown role: {}", other)),
		}
	}
}

/// Meal slot a subscriber can pick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MealType {
	Breakfast,
	Lunch,
	Dinner,
}

impl MealType {
	pub const ALL: [MealType; 3] = [MealType::Breakfast, MealType::Lunch, MealType::Dinner];

	pub fn as_str(&self) -> &'static str {
		match self {
			MealType::Breakfast => "Breakfast",
			MealType::Lunch => "Lunch",
			MealType::Dinner => "Dinner",
		}
	}
}

impl FromStr for MealType {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		MealType::ALL
			.into_iter()
			.find(|m| m.as_str() == s)
			.ok_or_else(|| format!("unknown meal type: {}", s))
	}
}

/// Weekday a delivery can be scheduled on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeliveryDay {
	Monday,
	Tuesday,
	Wednesday,
	Thursday,
	Friday,
	Saturday,
	Sunday,
}

impl DeliveryDay {
	pub const ALL: [DeliveryDay; 7] = [
		DeliveryDay::Monday,
		DeliveryDay::Tuesday,
		DeliveryDay::Wednesday,
		DeliveryDay::Thursday,
		DeliveryDay::Friday,
		DeliveryDay::Saturday,
		DeliveryDay::Sunday,
	];

	pub fn as_str(&self) -> &'static str {
		match self {
			DeliveryDay::Monday => "Monday",
			DeliveryDay::Tuesday => "Tuesday",
			DeliveryDay::Wednesday => "Wednesday",
			DeliveryDay::Thursday => "Thursday",
			DeliveryDay::Friday => "Friday",
			DeliveryDay::Saturday => "Saturday",
			DeliveryDay::Sunday => "Sunday",
		}
	}
}

impl FromStr for DeliveryDay {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		DeliveryDay::ALL
			.into_iter()
			.find(|d| d.as_str() == s)
			.ok_or_else(|| format!("unknown delivery day: {}", s))
	}
}

/// Lifecycle state of a subscription. `Cancelled` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionStatus {
	Active,
	Paused,
	Cancelled,
}

impl SubscriptionStatus {
	pub fn as_str(&self) -> &'static str {
		match self {
			SubscriptionStatus::Active => "active",
			SubscriptionStatus::Paused => "paused",
			SubscriptionStatus::Cancelled => "cancelled",
		}
	}

	pub fn is_terminal(&self) -> bool {
		matches!(self, SubscriptionStatus::Cancelled)
	}
}

impl fmt::Display for SubscriptionStatus {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl FromStr for SubscriptionStatus {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"active" => Ok(SubscriptionStatus::Active),
			"paused" => Ok(SubscriptionStatus::Paused),
			"cancelled" => Ok(SubscriptionStatus::Cancelled),
			other => Err(format!("unknown subscription status: {}", other)),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	#[case("Breakfast", MealType::Breakfast)]
	#[case("Lunch", MealType::Lunch)]
	#[case("Dinner", MealType::Dinner)]
	fn test_meal_type_parse(#[case] input: &str, #[case] expected: MealType) {
		assert_eq!(input.parse::<MealType>().unwrap(), expected);
	}

	#[rstest]
	#[case("breakfast")]
	#[case("Brunch")]
	#[case("")]
	fn test_meal_type_rejects_unknown(#[case] input: &str) {
		assert!(input.parse::<MealType>().is_err());
	}

	#[rstest]
	fn test_delivery_day_spellings() {
		for day in DeliveryDay::ALL {
			assert_eq!(day.as_str().parse::<DeliveryDay>().unwrap(), day);
		}
		assert!("Funday".parse::<DeliveryDay>().is_err());
	}

	#[rstest]
	fn test_status_serializes_lowercase() {
		let json = serde_json::to_string(&SubscriptionStatus::Cancelled).unwrap();
		assert_eq!(json, "\"cancelled\"");
		assert!(SubscriptionStatus::Cancelled.is_terminal());
		assert!(!SubscriptionStatus::Paused.is_terminal());
	}

	#[rstest]
	fn test_role_round_trip() {
		assert_eq!("admin".parse::<Role>().unwrap(), Role::Admin);
		assert_eq!(Role::User.to_string(), "user");
		assert!("root".parse::<Role>().is_err());
	}
}

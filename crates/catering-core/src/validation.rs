//! Payload schemas for registration, login, subscriptions, pauses and
//! testimonials.
//!
//! Inputs deserialize leniently (every field defaults) so that a missing
//! field surfaces as a field-level message instead of a decode error.
//! Field checks are declared with `validator`; cross-field and
//! multi-message rules are applied by the `validated` methods.

use std::borrow::Cow;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use validator::{Validate, ValidationError};

use crate::error::{Result, ValidationErrors};
use crate::types::{DeliveryDay, MealType};

/// Indonesian mobile numbers: `08` followed by 8 to 11 digits.
pub static PHONE_RE: Lazy<Regex> =
	Lazy::new(|| Regex::new(r"^08[0-9]{8,11}$").expect("phone pattern compiles"));

pub const PASSWORD_MIN_LENGTH: usize = 8;
pub const REVIEW_MAX_LENGTH: usize = 500;

/// Returns every password-policy rule `password` breaks, in a stable order.
pub fn password_policy_violations(password: &str) -> Vec<&'static str> {
	let mut failures = Vec::new();
	if password.chars().count() < PASSWORD_MIN_LENGTH {
		failures.push("Password minimal 8 karakter.");
	}
	if !password.chars().any(|c| c.is_ascii_uppercase()) {
		failures.push("Password harus mengandung huruf kapital.");
	}
	if !password.chars().any(|c| c.is_ascii_lowercase()) {
		failures.push("Password harus mengandung huruf kecil.");
	}
	if !password.chars().any(|c| c.is_ascii_digit()) {
		failures.push("Password harus mengandung angka.");
	}
	if password.chars().all(|c| c.is_ascii_alphanumeric()) {
		failures.push("Password harus mengandung karakter khusus.");
	}
	failures
}

fn message(code: &'static str, text: &'static str) -> ValidationError {
	ValidationError::new(code).with_message(Cow::Borrowed(text))
}

fn validate_meal_types(items: &[String]) -> std::result::Result<(), ValidationError> {
	if items.iter().all(|item| item.parse::<MealType>().is_ok()) {
		Ok(())
	} else {
		Err(message("meal_types", "Jenis makanan tidak valid."))
	}
}

fn validate_delivery_days(items: &[String]) -> std::result::Result<(), ValidationError> {
	if items.iter().all(|item| item.parse::<DeliveryDay>().is_ok()) {
		Ok(())
	} else {
		Err(message("delivery_days", "Hari pengiriman tidak valid."))
	}
}

fn validate_review_message(text: &str) -> std::result::Result<(), ValidationError> {
	let len = text.chars().count();
	if len == 0 {
		Err(message("review_message", "Pesan ulasan wajib diisi."))
	} else if len > REVIEW_MAX_LENGTH {
		Err(message("review_message", "Pesan ulasan terlalu panjang."))
	} else {
		Ok(())
	}
}

fn validate_rating(rating: f64) -> std::result::Result<(), ValidationError> {
	let rating = rating;
	if rating.fract() != 0.0 {
		Err(message("rating", "Rating harus berupa bilangan bulat."))
	} else if rating < 1.0 {
		Err(message("rating", "Rating minimal 1."))
	} else if rating > 5.0 {
		Err(message("rating", "Rating maksimal 5."))
	} else {
		Ok(())
	}
}

fn camel_case(field: &str) -> String {
	let mut out = String::with_capacity(field.len());
	let mut upper = false;
	for c in field.chars() {
		if c == '_' {
			upper = true;
		} else if upper {
			out.extend(c.to_uppercase());
			upper = false;
		} else {
			out.push(c);
		}
	}
	out
}

/// Flattens `validator` output into wire-shaped [`ValidationErrors`].
///
/// Fields are emitted in alphabetical order; messages within a field keep
/// declaration order.
pub fn collect(errors: validator::ValidationErrors) -> ValidationErrors {
	let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
	fields.sort_by(|a, b| a.0.cmp(&b.0));

	let mut out = ValidationErrors::new();
	for (field, errs) in fields {
		for err in errs {
			let text = err
				.message
				.as_ref()
				.map(|m| m.to_string())
				.unwrap_or_else(|| err.code.to_string());
			out.add(camel_case(&field), text);
		}
	}
	out
}

fn run<T: Validate>(input: &T) -> ValidationErrors {
	match input.validate() {
		Ok(()) => ValidationErrors::new(),
		Err(errors) => collect(errors),
	}
}

/// `POST /api/auth/register` body.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase", default)]
pub struct RegisterInput {
	#[validate(length(min = 1, message = "Nama lengkap wajib diisi."))]
	pub full_name: String,
	#[validate(
		email(message = "Format email tidak valid."),
		length(min = 1, message = "Email wajib diisi.")
	)]
	pub email: String,
	pub password: String,
}

impl RegisterInput {
	/// Runs field checks plus the full password policy.
	pub fn validated(self) -> Result<Self> {
		let mut errors = run(&self);
		for failure in password_policy_violations(&self.password) {
			errors.add("password", failure);
		}
		errors.into_result().map(|()| self)
	}
}

/// `POST /api/auth/login` body.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(default)]
pub struct LoginInput {
	#[validate(
		email(message = "Format email tidak valid."),
		length(min = 1, message = "Email wajib diisi.")
	)]
	pub email: String,
	#[validate(length(min = 1, message = "Password wajib diisi."))]
	pub password: String,
}

impl LoginInput {
	pub fn validated(self) -> Result<Self> {
		run(&self).into_result().map(|()| self)
	}
}

/// `POST /api/subscriptions` body as received.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase", default)]
pub struct SubscriptionInput {
	#[validate(length(min = 1, message = "Nama pelanggan wajib diisi."))]
	pub customer_name: String,
	#[validate(regex(
		path = *PHONE_RE,
		message = "Nomor telepon tidak valid (contoh: 08123456789)."
	))]
	pub phone_number: String,
	#[validate(length(min = 1, message = "ID paket wajib diisi."))]
	pub plan_id: String,
	#[validate(
		length(min = 1, message = "Setidaknya satu jenis makanan harus dipilih."),
		custom(function = "validate_meal_types")
	)]
	pub meal_types: Vec<String>,
	#[validate(
		length(min = 1, message = "Setidaknya satu hari pengiriman harus dipilih."),
		custom(function = "validate_delivery_days")
	)]
	pub delivery_days: Vec<String>,
	pub allergies: Option<String>,
}

/// A subscription order that passed every check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSubscription {
	pub customer_name: String,
	pub phone_number: String,
	pub plan_id: String,
	pub meal_types: Vec<MealType>,
	pub delivery_days: Vec<DeliveryDay>,
	pub allergies: Option<String>,
}

fn dedup_parse<T, F>(items: &[String], parse: F) -> Vec<T>
where
	T: PartialEq,
	F: Fn(&str) -> Option<T>,
{
	let mut out = Vec::new();
	for parsed in items.iter().filter_map(|item| parse(item)) {
		if !out.contains(&parsed) {
			out.push(parsed);
		}
	}
	out
}

impl SubscriptionInput {
	/// Validates and converts into typed selections.
	///
	/// Meal types and delivery days are sets: repeated entries collapse.
	/// Blank allergy notes become `None`.
	pub fn validated(self) -> Result<NewSubscription> {
		run(&self).into_result()?;

		let meal_types = dedup_parse(&self.meal_types, |s| s.parse::<MealType>().ok());
		let delivery_days = dedup_parse(&self.delivery_days, |s| s.parse::<DeliveryDay>().ok());
		let allergies = self.allergies.filter(|a| !a.trim().is_empty());

		Ok(NewSubscription {
			customer_name: self.customer_name,
			phone_number: self.phone_number,
			plan_id: self.plan_id,
			meal_types,
			delivery_days,
			allergies,
		})
	}
}

/// `PUT /api/subscriptions/{id}/pause` body.
///
/// Date semantics live in [`crate::lifecycle::PauseWindow::parse`].
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PauseInput {
	pub pause_start_date: String,
	pub pause_end_date: String,
}

/// `POST /api/testimonials` body.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase", default)]
pub struct TestimonialInput {
	#[validate(length(min = 1, message = "Nama pelanggan wajib diisi."))]
	pub customer_name: String,
	#[validate(custom(function = "validate_review_message"))]
	pub review_message: String,
	#[validate(custom(function = "validate_rating"))]
	pub rating: f64,
}

/// A testimonial that passed every check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTestimonial {
	pub customer_name: String,
	pub review_message: String,
	pub rating: i32,
}

impl TestimonialInput {
	pub fn validated(self) -> Result<NewTestimonial> {
		run(&self).into_result()?;
		Ok(NewTestimonial {
			customer_name: self.customer_name,
			review_message: self.review_message,
			rating: self.rating as i32,
		})
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::Error;
	use rstest::rstest;

	fn field_errors(result: Result<impl std::fmt::Debug>) -> ValidationErrors {
		match result {
			Err(Error::Validation(errors)) => errors,
			other => panic!("expected validation failure, got {:?}", other),
		}
	}

	fn subscription() -> SubscriptionInput {
		SubscriptionInput {
			customer_name: "Budi".to_string(),
			phone_number: "08123456789".to_string(),
			plan_id: "plan-diet".to_string(),
			meal_types: vec!["Breakfast".to_string(), "Dinner".to_string()],
			delivery_days: vec!["Monday".to_string()],
			allergies: None,
		}
	}

	#[rstest]
	fn test_strong_password_passes_policy() {
		assert!(password_policy_violations("Secr3t!pass").is_empty());
	}

	#[rstest]
	#[case("short1!", "Password minimal 8 karakter.")]
	#[case("lowercase1!", "Password harus mengandung huruf kapital.")]
	#[case("UPPERCASE1!", "Password harus mengandung huruf kecil.")]
	#[case("NoDigits!!", "Password harus mengandung angka.")]
	#[case("NoSpecial12", "Password harus mengandung karakter khusus.")]
	fn test_password_policy_reports_rule(#[case] password: &str, #[case] expected: &str) {
		assert!(password_policy_violations(password).contains(&expected));
	}

	#[rstest]
	fn test_register_collects_every_failure() {
		let input = RegisterInput {
			full_name: String::new(),
			email: "not-an-email".to_string(),
			password: "abc".to_string(),
		};

		let errors = field_errors(input.validated());
		assert_eq!(errors.messages_for("fullName"), vec!["Nama lengkap wajib diisi."]);
		assert_eq!(errors.messages_for("email"), vec!["Format email tidak valid."]);
		assert_eq!(errors.messages_for("password").len(), 4);
	}

	#[rstest]
	fn test_register_accepts_valid_payload() {
		let input: RegisterInput = serde_json::from_value(serde_json::json!({
			"fullName": "Siti Aminah",
			"email": "siti@example.com",
			"password": "Rahasia#2024"
		}))
		.unwrap();

		let input = input.validated().unwrap();
		assert_eq!(input.full_name, "Siti Aminah");
	}

	#[rstest]
	fn test_login_missing_fields_default_to_empty() {
		let input: LoginInput = serde_json::from_value(serde_json::json!({})).unwrap();
		let errors = field_errors(input.validated());

		assert!(errors.messages_for("email").contains(&"Email wajib diisi."));
		assert_eq!(errors.messages_for("password"), vec!["Password wajib diisi."]);
	}

	#[rstest]
	#[case("08123456789", true)]
	#[case("0812345678", true)]
	#[case("0812345678901", true)]
	#[case("081234567", false)]
	#[case("08123456789012", false)]
	#[case("+628123456789", false)]
	#[case("09123456789", false)]
	fn test_phone_pattern(#[case] phone: &str, #[case] valid: bool) {
		assert_eq!(PHONE_RE.is_match(phone), valid);
	}

	#[rstest]
	fn test_subscription_converts_and_dedups() {
		let mut input = subscription();
		input.meal_types.push("Breakfast".to_string());
		input.allergies = Some("   ".to_string());

		let order = input.validated().unwrap();
		assert_eq!(order.meal_types, vec![MealType::Breakfast, MealType::Dinner]);
		assert_eq!(order.delivery_days, vec![DeliveryDay::Monday]);
		assert_eq!(order.allergies, None);
	}

	#[rstest]
	fn test_subscription_rejects_unknown_meal_type() {
		let mut input = subscription();
		input.meal_types = vec!["Brunch".to_string()];

		let errors = field_errors(input.validated());
		assert_eq!(errors.messages_for("mealTypes"), vec!["Jenis makanan tidak valid."]);
	}

	#[rstest]
	fn test_subscription_requires_selections() {
		let mut input = subscription();
		input.meal_types.clear();
		input.delivery_days.clear();
		input.phone_number = "12345".to_string();

		let errors = field_errors(input.validated());
		assert_eq!(
			errors.messages_for("mealTypes"),
			vec!["Setidaknya satu jenis makanan harus dipilih."]
		);
		assert_eq!(
			errors.messages_for("deliveryDays"),
			vec!["Setidaknya satu hari pengiriman harus dipilih."]
		);
		assert_eq!(
			errors.messages_for("phoneNumber"),
			vec!["Nomor telepon tidak valid (contoh: 08123456789)."]
		);
	}

	#[rstest]
	#[case(0.0, "Rating minimal 1.")]
	#[case(6.0, "Rating maksimal 5.")]
	#[case(4.5, "Rating harus berupa bilangan bulat.")]
	fn test_testimonial_rating_bounds(#[case] rating: f64, #[case] expected: &str) {
		let input = TestimonialInput {
			customer_name: "Andi".to_string(),
			review_message: "Enak!".to_string(),
			rating,
		};

		let errors = field_errors(input.validated());
		assert_eq!(errors.messages_for("rating"), vec![expected]);
	}

	#[rstest]
	fn test_testimonial_review_length() {
		let input = TestimonialInput {
			customer_name: "Andi".to_string(),
			review_message: "a".repeat(REVIEW_MAX_LENGTH + 1),
			rating: 5.0,
		};
		let errors = field_errors(input.validated());
		assert_eq!(
			errors.messages_for("reviewMessage"),
			vec!["Pesan ulasan terlalu panjang."]
		);

		let input = TestimonialInput {
			customer_name: "Andi".to_string(),
			review_message: "a".repeat(REVIEW_MAX_LENGTH),
			rating: 5.0,
		};
		assert_eq!(input.validated().unwrap().rating, 5);
	}

	#[rstest]
	fn test_camel_case_conversion() {
		assert_eq!(camel_case("review_message"), "reviewMessage");
		assert_eq!(camel_case("mealTypes"), "mealTypes");
		assert_eq!(camel_case("email"), "email");
	}
}

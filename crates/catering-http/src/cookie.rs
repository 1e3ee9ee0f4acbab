//! `Cookie` header parsing and `Set-Cookie` header construction.

use std::collections::HashMap;
use std::fmt;

/// Parses a `Cookie` request header into name/value pairs.
///
/// Pairs split on the first `=` so values may contain `=`. Entries without
/// a name are skipped; a repeated name keeps its first value.
pub fn parse_cookie_header(header: &str) -> HashMap<String, String> {
	let mut cookies = HashMap::new();
	for pair in header.split(';') {
		let mut parts = pair.trim().splitn(2, '=');
		let Some(name) = parts.next().filter(|n| !n.is_empty()) else {
			continue;
		};
		let value = parts.next().unwrap_or("").trim_matches('"');
		cookies
			.entry(name.to_string())
			.or_insert_with(|| value.to_string());
	}
	cookies
}

/// `SameSite` cookie attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SameSite {
	Strict,
	#[default]
	Lax,
	None,
}

impl fmt::Display for SameSite {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			SameSite::Strict => f.write_str("Strict"),
			SameSite::Lax => f.write_str("Lax"),
			SameSite::None => f.write_str("None"),
		}
	}
}

/// Builder for a single `Set-Cookie` header value.
///
/// # Examples
///
/// ```
/// use catering_http::cookie::SetCookie;
///
/// let header = SetCookie::new("token", "abc")
///     .http_only(true)
///     .max_age(3600)
///     .to_string();
/// assert_eq!(header, "token=abc; Path=/; HttpOnly; SameSite=Lax; Max-Age=3600");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetCookie {
	name: String,
	value: String,
	path: String,
	secure: bool,
	http_only: bool,
	same_site: SameSite,
	max_age: Option<i64>,
}

impl SetCookie {
	pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			value: value.into(),
			path: "/".to_string(),
			secure: false,
			http_only: false,
			same_site: SameSite::Lax,
			max_age: None,
		}
	}

	/// A cookie that tells the browser to drop `name` immediately.
	pub fn expired(name: impl Into<String>) -> Self {
		Self::new(name, "").max_age(0)
	}

	pub fn path(mut self, path: impl Into<String>) -> Self {
		self.path = path.into();
		self
	}

	pub fn secure(mut self, secure: bool) -> Self {
		self.secure = secure;
		self
	}

	pub fn http_only(mut self, http_only: bool) -> Self {
		self.http_only = http_only;
		self
	}

	pub fn same_site(mut self, same_site: SameSite) -> Self {
		self.same_site = same_site;
		self
	}

	pub fn max_age(mut self, seconds: i64) -> Self {
		self.max_age = Some(seconds);
		self
	}

	pub fn name(&self) -> &str {
		&self.name
	}

	pub fn value(&self) -> &str {
		&self.value
	}
}

impl fmt::Display for SetCookie {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}={}; Path={}", self.name, self.value, self.path)?;
		if self.secure {
			f.write_str("; Secure")?;
		}
		if self.http_only {
			f.write_str("; HttpOnly")?;
		}
		write!(f, "; SameSite={}", self.same_site)?;
		if let Some(max_age) = self.max_age {
			write!(f, "; Max-Age={}", max_age)?;
		}
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	fn test_parse_cookie_header() {
		let cookies = parse_cookie_header("token=abc.def; csrfToken=00ff;theme=dark");

		assert_eq!(cookies.get("token").map(String::as_str), Some("abc.def"));
		assert_eq!(cookies.get("csrfToken").map(String::as_str), Some("00ff"));
		assert_eq!(cookies.get("theme").map(String::as_str), Some("dark"));
	}

	#[rstest]
	fn test_parse_keeps_equals_in_value() {
		let cookies = parse_cookie_header("data=a=b==");
		assert_eq!(cookies.get("data").map(String::as_str), Some("a=b=="));
	}

	#[rstest]
	#[case("")]
	#[case(";;")]
	#[case("=orphan")]
	fn test_parse_skips_nameless(#[case] header: &str) {
		assert!(parse_cookie_header(header).is_empty());
	}

	#[rstest]
	fn test_parse_first_value_wins() {
		let cookies = parse_cookie_header("token=first; token=second");
		assert_eq!(cookies.get("token").map(String::as_str), Some("first"));
	}

	#[rstest]
	fn test_set_cookie_all_attributes() {
		let header = SetCookie::new("csrfToken", "beef")
			.secure(true)
			.http_only(true)
			.same_site(SameSite::Strict)
			.max_age(3600)
			.to_string();

		assert_eq!(
			header,
			"csrfToken=beef; Path=/; Secure; HttpOnly; SameSite=Strict; Max-Age=3600"
		);
	}

	#[rstest]
	fn test_expired_cookie() {
		let header = SetCookie::expired("token").http_only(true).to_string();
		assert_eq!(header, "token=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0");
	}
}

//! Minimal HTML shell for the browser-facing paths.
//!
//! The pages themselves are rendered client-side; the server only needs to
//! answer each path so the route gate has something to guard.

use async_trait::async_trait;
use catering_core::Result;
use catering_http::{Handler, Request, Response};

/// Browser paths and their titles.
pub const PAGES: &[(&str, &str)] = &[
	("/", "Healthy Meals, Anytime"),
	("/menu", "Menu"),
	("/contact", "Contact Us"),
	("/subscription", "Subscription"),
	("/dashboard", "My Dashboard"),
	("/admin/dashboard", "Admin Dashboard"),
	("/login", "Login"),
	("/register", "Register"),
];

pub struct PageShell {
	title: &'static str,
}

impl PageShell {
	pub fn new(title: &'static str) -> Self {
		Self { title }
	}

	pub fn render(&self) -> String {
		format!(
			"<!DOCTYPE html>\n<html lang=\"id\">\n<head>\n<meta charset=\"utf-8\">\n\
			 <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n\
			 <title>{} | SEA Catering</title>\n</head>\n<body>\n<div id=\"root\"></div>\n</body>\n</html>\n",
			self.title
		)
	}
}

#[async_trait]
impl Handler for PageShell {
	async fn handle(&self, _request: Request) -> Result<Response> {
		Ok(Response::ok()
			.with_header("content-type", "text/html; charset=utf-8")
			.with_body(self.render()))
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	#[tokio::test]
	async fn test_shell_is_html() {
		let request = Request::builder().uri("/menu").build().unwrap();
		let response = PageShell::new("Menu").handle(request).await.unwrap();

		assert_eq!(
			response.headers.get("content-type").unwrap(),
			"text/html; charset=utf-8"
		);
		let body = String::from_utf8(response.body.to_vec()).unwrap();
		assert!(body.contains("<title>Menu | SEA Catering</title>"));
	}
}

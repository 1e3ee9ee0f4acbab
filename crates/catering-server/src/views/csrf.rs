use catering_core::Result;
use catering_http::{Request, Response};
use catering_middleware::generate_token;
use hyper::StatusCode;
use serde_json::json;
use std::sync::Arc;

use super::json;
use crate::state::AppState;

/// `GET /api/csrf-token`: mint a token, set it as a cookie and echo it.
pub async fn issue(state: Arc<AppState>, _request: Request) -> Result<Response> {
	let token = generate_token();
	Ok(json(StatusCode::OK, &json!({ "csrfToken": token }))?.with_cookie(&state.csrf.cookie(&token)))
}

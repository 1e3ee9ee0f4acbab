use catering_core::Result;
use catering_core::validation::TestimonialInput;
use catering_http::{Request, Response};
use hyper::StatusCode;
use serde_json::json;
use std::sync::Arc;

use super::json;
use crate::state::AppState;

/// `GET /api/testimonials`, newest first
pub async fn list(state: Arc<AppState>, _request: Request) -> Result<Response> {
	json(StatusCode::OK, &state.testimonials.list().await?)
}

/// `POST /api/testimonials`; open to anonymous visitors
pub async fn submit(state: Arc<AppState>, request: Request) -> Result<Response> {
	let input = request.json::<TestimonialInput>()?.validated()?;
	let testimonial = state.testimonials.create(input).await?;

	json(
		StatusCode::CREATED,
		&json!({ "message": "Testimonial submitted successfully!", "testimonial": testimonial }),
	)
}

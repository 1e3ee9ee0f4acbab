use catering_core::{Error, Result};
use catering_http::{Request, Response};
use hyper::StatusCode;
use std::sync::Arc;

use super::{json, path_id};
use crate::state::AppState;

/// `GET /api/meal-plans`, cheapest first
pub async fn list(state: Arc<AppState>, _request: Request) -> Result<Response> {
	json(StatusCode::OK, &state.plans.list().await?)
}

/// `GET /api/meal-plans/{id}`
pub async fn detail(state: Arc<AppState>, request: Request) -> Result<Response> {
	let id = path_id(&request)?;
	let plan = state
		.plans
		.get(&id)
		.await?
		.ok_or_else(|| Error::NotFound("Meal plan not found.".to_string()))?;
	json(StatusCode::OK, &plan)
}

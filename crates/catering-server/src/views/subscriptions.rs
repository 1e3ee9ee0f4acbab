//! Subscription creation, listing and lifecycle endpoints.
//!
//! CSRF is checked by middleware before any of these run. Every endpoint
//! requires a verified session; lifecycle calls also require ownership,
//! which the repository enforces by answering 404 for foreign rows.

use catering_core::validation::{PauseInput, SubscriptionInput};
use catering_core::{PauseWindow, Result, Transition};
use catering_db::SubscriptionQuery;
use catering_http::{Request, Response};
use chrono::Utc;
use hyper::StatusCode;
use serde_json::json;
use std::sync::Arc;

use super::{json, path_id, require_user};
use crate::state::AppState;

/// `POST /api/subscriptions`
pub async fn create(state: Arc<AppState>, request: Request) -> Result<Response> {
	let identity = require_user(&request)?;
	let order = request.json::<SubscriptionInput>()?.validated()?;

	let subscription = state.subscriptions.create(&identity.user_id, order).await?;

	json(
		StatusCode::CREATED,
		&json!({ "message": "Subscription created successfully!", "subscription": subscription }),
	)
}

/// `GET /api/subscriptions/me?status=&planName=&sortBy=&sortOrder=`
pub async fn mine(state: Arc<AppState>, request: Request) -> Result<Response> {
	let identity = require_user(&request)?;
	let query = SubscriptionQuery::from_params(
		identity.user_id,
		request.query("status"),
		request.query("planName"),
		request.query("sortBy"),
		request.query("sortOrder"),
	)?;

	let subscriptions = state.subscriptions.list(&query).await?;
	json(StatusCode::OK, &subscriptions)
}

async fn apply(
	state: &AppState,
	request: &Request,
	transition: Transition,
	message: &str,
) -> Result<Response> {
	let identity = require_user(request)?;
	let id = path_id(request)?;

	let subscription = state
		.subscriptions
		.transition(&id, &identity.user_id, transition)
		.await?;

	json(
		StatusCode::OK,
		&json!({ "message": message, "subscription": subscription }),
	)
}

/// `PUT /api/subscriptions/{id}/pause`
pub async fn pause(state: Arc<AppState>, request: Request) -> Result<Response> {
	require_user(&request)?;
	let input = request.json::<PauseInput>()?;
	let window = PauseWindow::parse(
		&input.pause_start_date,
		&input.pause_end_date,
		Utc::now().date_naive(),
	)?;

	apply(&state, &request, Transition::Pause(window), "Langganan berhasil dijeda!").await
}

/// `PUT /api/subscriptions/{id}/resume`
pub async fn resume(state: Arc<AppState>, request: Request) -> Result<Response> {
	apply(&state, &request, Transition::Resume, "Langganan berhasil dilanjutkan!").await
}

/// `PUT /api/subscriptions/{id}/cancel`
pub async fn cancel(state: Arc<AppState>, request: Request) -> Result<Response> {
	apply(&state, &request, Transition::Cancel, "Langganan berhasil dibatalkan!").await
}

use catering_auth::{SessionState, require_role};
use catering_core::{Error, Result, Role};
use catering_db::DateWindow;
use catering_http::{Request, Response};
use catering_middleware::session_of;
use hyper::StatusCode;
use std::sync::Arc;

use super::json;
use crate::state::AppState;

/// `GET /api/admin/metrics?startDate=&endDate=`
///
/// The window applies only when both dates are given.
pub async fn metrics(state: Arc<AppState>, request: Request) -> Result<Response> {
	let session = session_of(&request);
	if let SessionState::Invalid(_) = session {
		return Err(Error::InvalidToken("Invalid or expired token.".to_string()));
	}
	let identity = require_role(&session, Role::Admin)?;

	let window = DateWindow::from_params(request.query("startDate"), request.query("endDate"))?;
	let metrics = state.metrics.collect(window).await?;
	tracing::debug!(admin_id = %identity.user_id, windowed = window.is_some(), "admin metrics served");

	json(StatusCode::OK, &metrics)
}

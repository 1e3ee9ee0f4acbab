//! Registration, login, logout and the current-user lookup.

use catering_core::validation::{LoginInput, RegisterInput};
use catering_core::{Error, Result, Role};
use catering_db::NewUser;
use catering_http::{Request, Response};
use catering_middleware::session_of;
use hyper::StatusCode;
use serde_json::json;
use std::sync::Arc;

use super::json;
use crate::state::AppState;

/// Same message for an unknown email and a wrong password.
pub const INVALID_CREDENTIALS: &str = "Invalid credentials.";

/// `POST /api/auth/register`
pub async fn register(state: Arc<AppState>, request: Request) -> Result<Response> {
	let input = request.json::<RegisterInput>()?.validated()?;
	let password_hash = state.hasher.hash(&input.password)?;

	let user = state
		.users
		.create(NewUser {
			full_name: input.full_name,
			email: input.email,
			password_hash,
			role: Role::User,
		})
		.await?;
	tracing::info!(user_id = %user.id, "user registered");

	json(
		StatusCode::CREATED,
		&json!({ "message": "User registered successfully!", "user": user }),
	)
}

/// `POST /api/auth/login`
///
/// Issues a session token in the `token` cookie.
pub async fn login(state: Arc<AppState>, request: Request) -> Result<Response> {
	let input = request.json::<LoginInput>()?.validated()?;
	let invalid = || Error::Authentication(INVALID_CREDENTIALS.to_string());

	let Some(user) = state.users.find_by_email(&input.email).await? else {
		if let Err(err) = state.verify_placeholder(&input.password) {
			tracing::warn!(error = %err, "placeholder password check failed");
		}
		return Err(invalid());
	};
	if !state.hasher.verify(&input.password, &user.password_hash)? {
		tracing::debug!(user_id = %user.id, "password mismatch");
		return Err(invalid());
	}

	let token = state.auth.issue(&user.id, &user.email, user.role)?;
	tracing::info!(user_id = %user.id, role = %user.role, "user logged in");

	Ok(json(
		StatusCode::OK,
		&json!({ "message": "Login successful!", "user": user }),
	)?
	.with_cookie(&state.session_cookie(&token)))
}

/// `POST /api/auth/logout`
pub async fn logout(state: Arc<AppState>, _request: Request) -> Result<Response> {
	Ok(Response::message(StatusCode::OK, "Anda berhasil keluar.")
		.with_cookie(&state.cleared_session_cookie()))
}

/// `GET /api/auth/me`
///
/// A missing cookie is 401, a cookie that fails verification is 403 so the
/// client can drop its stale session.
pub async fn me(state: Arc<AppState>, request: Request) -> Result<Response> {
	let session = session_of(&request);
	let identity = session.require_verified("Authentication token required.")?;

	let user = state
		.users
		.find_by_id(&identity.user_id)
		.await?
		.ok_or_else(|| Error::NotFound("User not found.".to_string()))?;

	json(StatusCode::OK, &json!({ "user": user }))
}

//! JSON endpoints and the page shell.
//!
//! Each view is a plain `async fn(Arc<AppState>, Request) -> Result<Response>`
//! wrapped by [`view`], which renders any error with the endpoint's generic
//! server-error message.

pub mod admin;
pub mod auth;
pub mod csrf;
pub mod pages;
pub mod plans;
pub mod subscriptions;
pub mod testimonials;

use async_trait::async_trait;
use catering_auth::{SessionIdentity, require_role};
use catering_core::{Error, Result, Role};
use catering_http::{Handler, Request, Response};
use catering_middleware::session_of;
use hyper::StatusCode;
use serde::Serialize;
use std::future::Future;
use std::sync::Arc;

use crate::state::AppState;

/// A view function bound to the shared state.
pub struct View<F> {
	state: Arc<AppState>,
	fallback: &'static str,
	view: F,
}

/// Wrap `view` as a handler; server errors answer with `fallback`.
pub fn view<F, Fut>(state: &Arc<AppState>, fallback: &'static str, view: F) -> Arc<dyn Handler>
where
	F: Fn(Arc<AppState>, Request) -> Fut + Send + Sync + 'static,
	Fut: Future<Output = Result<Response>> + Send + 'static,
{
	Arc::new(View {
		state: state.clone(),
		fallback,
		view,
	})
}

#[async_trait]
impl<F, Fut> Handler for View<F>
where
	F: Fn(Arc<AppState>, Request) -> Fut + Send + Sync,
	Fut: Future<Output = Result<Response>> + Send,
{
	async fn handle(&self, request: Request) -> Result<Response> {
		match (self.view)(self.state.clone(), request).await {
			Ok(response) => Ok(response),
			Err(err) => Ok(Response::from_error(&err, self.fallback)),
		}
	}
}

pub(crate) fn json<T: Serialize>(status: StatusCode, value: &T) -> Result<Response> {
	Response::new(status).with_json(value)
}

/// Verified identity holding at least the user role.
pub(crate) fn require_user(request: &Request) -> Result<SessionIdentity> {
	require_role(&session_of(request), Role::User).cloned()
}

pub(crate) fn path_id(request: &Request) -> Result<String> {
	request
		.path_param("id")
		.map(str::to_string)
		.ok_or_else(|| Error::BadRequest("Missing id.".to_string()))
}

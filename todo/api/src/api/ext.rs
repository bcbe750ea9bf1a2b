use std::sync::Arc;

use common::http::ext::{OptionExt, RequestGlobalExt};
use common::http::RouteError;
use hyper::body::HttpBody;
use hyper::{Body, Request, StatusCode};
use routerify::prelude::RequestExt as _;
use serde::de::DeserializeOwned;

use super::auth::{AuthData, AuthError};
use super::error::{ApiError, Result};
use super::request_context::RequestContext;

pub trait RequestExt {
	fn get_global<G: Sync + Send + 'static>(&self) -> Result<Arc<G>>;

	/// The caller's identity, or 401 if the request carried no valid token.
	fn auth(&self) -> Result<AuthData>;

	/// A positive integer path parameter.
	fn path_id(&self, name: &str) -> Result<i64>;
}

impl RequestExt for Request<Body> {
	#[track_caller]
	fn get_global<G: Sync + Send + 'static>(&self) -> Result<Arc<G>> {
		<Self as RequestGlobalExt<ApiError>>::get_global::<G>(self)
	}

	fn auth(&self) -> Result<AuthData> {
		match self.context::<RequestContext>() {
			Some(context) => context.auth().cloned().map_err(|err| RouteError::from(err.clone())),
			None => Err(AuthError::NotLoggedIn.into()),
		}
	}

	fn path_id(&self, name: &str) -> Result<i64> {
		self.param(name)
			.and_then(|id| id.parse::<i64>().ok())
			.filter(|id| *id > 0)
			.map_err_route((StatusCode::BAD_REQUEST, "invalid id"))
	}
}

/// Reads the whole body, refusing anything larger than `limit` bytes.
pub async fn read_json<T: DeserializeOwned>(req: &mut Request<Body>, limit: usize) -> Result<T> {
	let mut body = Vec::new();

	while let Some(chunk) = req.body_mut().data().await {
		let chunk = chunk.map_err(|err| (StatusCode::BAD_REQUEST, "failed to read request body", err))?;

		if body.len() + chunk.len() > limit {
			return Err((StatusCode::PAYLOAD_TOO_LARGE, "request body too large").into());
		}

		body.extend_from_slice(&chunk);
	}

	let value = serde_json::from_slice(&body).map_err(|err| (StatusCode::BAD_REQUEST, format!("invalid request body: {err}"), err))?;

	Ok(value)
}

pub fn trimmed(value: Option<String>) -> Option<String> {
	value.map(|value| value.trim().to_string())
}

use std::sync::Arc;

use common::http::RouteError;
use hyper::http::header;
use hyper::Body;
use routerify::prelude::RequestExt as _;
use routerify::Middleware;

use crate::api::auth::{AuthData, AuthError};
use crate::api::error::ApiError;
use crate::api::ext::RequestExt as _;
use crate::api::jwt::{AuthJwtPayload, JwtState};
use crate::api::request_context::RequestContext;
use crate::global::ApiGlobal;

/// Resolves the bearer token into an identity. It never fails the request,
/// handlers decide whether they need a caller.
pub fn auth_middleware<G: ApiGlobal>(_: &Arc<G>) -> Middleware<Body, RouteError<ApiError>> {
	Middleware::pre(|req| async move {
		let auth = match req.headers().get(header::AUTHORIZATION) {
			None => Err(AuthError::NotLoggedIn),
			Some(token) => {
				let global = req.get_global::<G>()?;
				authenticate(&global, token)
			}
		};

		if let Err(err) = &auth {
			if *err != AuthError::NotLoggedIn {
				tracing::debug!(path = %req.uri().path(), error = %err, "rejected bearer token");
			}
		}

		req.set_context(RequestContext::new(auth));

		Ok(req)
	})
}

fn authenticate<G: ApiGlobal>(global: &Arc<G>, token: &header::HeaderValue) -> Result<AuthData, AuthError> {
	let token = token
		.to_str()
		.map_err(|_| AuthError::HeaderToStr)?
		.strip_prefix("Bearer ")
		.ok_or(AuthError::NotBearerToken)?;

	let jwt = AuthJwtPayload::verify(global, token.trim()).ok_or(AuthError::InvalidToken)?;

	Ok(jwt.into())
}

use std::sync::Arc;

use common::http::{error_body, RouteError};
use common::make_response;
use common::ratelimiter::RateLimitResponse;
use hyper::header::HeaderValue;
use hyper::{Body, HeaderMap, Method, StatusCode};
use routerify::prelude::RequestExt as _;
use routerify::Middleware;

use crate::api::error::ApiError;
use crate::api::ext::RequestExt as _;
use crate::global::ApiGlobal;

const REMAINING_HEADER: &str = "x-ratelimit-remaining";
const RESET_HEADER: &str = "x-ratelimit-reset";

fn insert_headers(headers: &mut HeaderMap, limit: &RateLimitResponse) {
	headers.insert(REMAINING_HEADER, HeaderValue::from(limit.remaining.max(0)));
	headers.insert(RESET_HEADER, HeaderValue::from(limit.reset.as_secs()));
}

/// Counts `/api/auth` requests against the auth limiter and every other
/// `/api` request against the general one, per client address. Pre-flights
/// are never counted.
pub fn ratelimit_middleware<G: ApiGlobal>(_: &Arc<G>) -> Middleware<Body, RouteError<ApiError>> {
	Middleware::pre(|req| async move {
		let path = req.uri().path();
		if req.method() == Method::OPTIONS || !path.starts_with("/api/") {
			return Ok(req);
		}

		let global = req.get_global::<G>()?;
		let limiter = if path.starts_with("/api/auth/") {
			global.auth_limiter()
		} else {
			global.api_limiter()
		};

		let ip = req.remote_addr().ip();
		let limit = limiter.ratelimit(&ip).await;

		if !limit.can_request() {
			tracing::debug!(%ip, path, "rate limited");

			let mut resp = make_response!(StatusCode::TOO_MANY_REQUESTS, error_body("too many requests"));
			insert_headers(resp.headers_mut(), &limit);

			return Err(RouteError::from(resp));
		}

		req.set_context(limit);

		Ok(req)
	})
}

pub fn ratelimit_headers_middleware<G: ApiGlobal>(_: &Arc<G>) -> Middleware<Body, RouteError<ApiError>> {
	Middleware::post_with_info(|mut resp, info| async move {
		if let Some(limit) = info.context::<RateLimitResponse>() {
			insert_headers(resp.headers_mut(), &limit);
		}

		Ok(resp)
	})
}

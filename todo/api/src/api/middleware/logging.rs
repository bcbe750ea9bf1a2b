use std::sync::Arc;

use common::http::RouteError;
use hyper::Body;
use routerify::prelude::RequestExt as _;
use routerify::Middleware;

use crate::api::error::ApiError;
use crate::global::ApiGlobal;

pub fn request_log_middleware<G: ApiGlobal>(_: &Arc<G>) -> Middleware<Body, RouteError<ApiError>> {
	Middleware::pre(|req| async move {
		tracing::debug!(method = %req.method(), path = %req.uri().path(), remote = %req.remote_addr(), "request");

		Ok(req)
	})
}

use hyper::{Body, Request, Response, StatusCode};
use serde_json::json;

use super::error::Result;
use super::response::success;

pub async fn health(_: Request<Body>) -> Result<Response<Body>> {
	Ok(success(StatusCode::OK, "ok", json!({ "status": "ok" })))
}

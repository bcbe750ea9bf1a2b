use common::make_response;
use hyper::{Body, Response, StatusCode};
use serde_json::{json, Value};

/// `{ "success": true, "message": ..., ...payload }`, the payload must be an
/// object to be merged in.
pub fn success(status: StatusCode, message: &str, payload: Value) -> Response<Body> {
	let mut body = json!({
		"success": true,
		"message": message,
	});

	if let (Some(body), Value::Object(payload)) = (body.as_object_mut(), payload) {
		body.extend(payload);
	}

	make_response!(status, body)
}

use common::http::RouteError;
use hyper::StatusCode;

use super::error::ApiError;
use super::jwt::AuthJwtPayload;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
	#[error("not logged in")]
	NotLoggedIn,
	#[error("token must be ascii only")]
	HeaderToStr,
	#[error("token must be a bearer token")]
	NotBearerToken,
	#[error("invalid token")]
	InvalidToken,
}

impl From<AuthError> for RouteError<ApiError> {
	#[track_caller]
	fn from(value: AuthError) -> Self {
		let message = value.to_string();
		RouteError::from((StatusCode::UNAUTHORIZED, message, value))
	}
}

/// The identity carried by a verified token.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct AuthData {
	#[serde(rename = "id")]
	pub user_id: i64,
	pub username: String,
	pub email: String,
}

impl From<AuthJwtPayload> for AuthData {
	fn from(payload: AuthJwtPayload) -> Self {
		Self {
			user_id: payload.user_id,
			username: payload.username,
			email: payload.email,
		}
	}
}

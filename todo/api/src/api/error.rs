use common::http::RouteError;
use hyper::StatusCode;

use super::auth::AuthError;
use crate::service::{AccountError, ErrorKind, ServiceError, TeamError, TodoError};

pub type Result<T, E = RouteError<ApiError>> = std::result::Result<T, E>;

#[derive(thiserror::Error, Debug)]
pub enum ApiError {
	#[error("failed to read http body: {0}")]
	ParseHttpBody(#[from] hyper::Error),
	#[error("failed to parse json body: {0}")]
	ParseJson(#[from] serde_json::Error),
	#[error("auth: {0}")]
	Auth(#[from] AuthError),
	#[error("account: {0}")]
	Account(#[from] AccountError),
	#[error("team: {0}")]
	Team(#[from] TeamError),
	#[error("todo: {0}")]
	Todo(#[from] TodoError),
}

fn status(kind: ErrorKind) -> StatusCode {
	match kind {
		ErrorKind::BadRequest => StatusCode::BAD_REQUEST,
		ErrorKind::Unauthorized => StatusCode::UNAUTHORIZED,
		ErrorKind::Forbidden => StatusCode::FORBIDDEN,
		ErrorKind::NotFound => StatusCode::NOT_FOUND,
		ErrorKind::Conflict => StatusCode::CONFLICT,
		ErrorKind::ServerError => StatusCode::INTERNAL_SERVER_ERROR,
	}
}

macro_rules! impl_service_error {
	($($error:ty),* $(,)?) => {
		$(
			impl From<$error> for RouteError<ApiError> {
				#[track_caller]
				fn from(err: $error) -> Self {
					let status = status(err.kind());

					// Store failures are logged through the source, never echoed.
					let message = if status.is_server_error() {
						"Internal Server Error".to_string()
					} else {
						err.to_string()
					};

					RouteError::from((status, message, err))
				}
			}
		)*
	};
}

impl_service_error!(AccountError, TeamError, TodoError);

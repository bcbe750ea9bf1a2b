use super::auth::{AuthData, AuthError};

/// Per request state set by the middlewares.
#[derive(Debug, Clone)]
pub struct RequestContext {
	auth: Result<AuthData, AuthError>,
}

impl RequestContext {
	pub fn new(auth: Result<AuthData, AuthError>) -> Self {
		Self { auth }
	}

	pub fn auth(&self) -> Result<&AuthData, &AuthError> {
		self.auth.as_ref()
	}
}

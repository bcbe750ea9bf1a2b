use crate::database::{NewUser, User};
use crate::service::{ErrorKind, ServiceError};
use crate::store::{Store, StoreError};

#[derive(Debug, thiserror::Error)]
pub enum AccountError {
	#[error("missing fields")]
	MissingFields,
	#[error("{0}")]
	InvalidInput(&'static str),
	#[error("username or email is already in use")]
	UserExists,
	#[error("invalid credentials")]
	InvalidCredentials,
	#[error("user not found")]
	UserNotFound,
	#[error("failed to hash password: {0}")]
	Hash(argon2::password_hash::Error),
	#[error(transparent)]
	Store(StoreError),
}

impl From<StoreError> for AccountError {
	fn from(err: StoreError) -> Self {
		match err {
			StoreError::Conflict(_) => Self::UserExists,
			err => Self::Store(err),
		}
	}
}

impl ServiceError for AccountError {
	fn kind(&self) -> ErrorKind {
		match self {
			Self::MissingFields | Self::InvalidInput(_) => ErrorKind::BadRequest,
			Self::UserExists => ErrorKind::Conflict,
			Self::InvalidCredentials => ErrorKind::Unauthorized,
			Self::UserNotFound => ErrorKind::NotFound,
			Self::Hash(_) | Self::Store(_) => ErrorKind::ServerError,
		}
	}
}

pub struct AccountService<'a, S> {
	store: &'a S,
}

impl<'a, S: Store> AccountService<'a, S> {
	pub fn new(store: &'a S) -> Self {
		Self { store }
	}

	pub async fn register(&self, username: &str, email: &str, password: &str) -> Result<User, AccountError> {
		if username.is_empty() || email.is_empty() || password.is_empty() {
			return Err(AccountError::MissingFields);
		}

		User::validate_username(username).map_err(AccountError::InvalidInput)?;
		User::validate_email(email).map_err(AccountError::InvalidInput)?;
		User::validate_password(password).map_err(AccountError::InvalidInput)?;

		if self.store.user_exists(username, email).await? {
			tracing::debug!(username, "registration rejected, user exists");
			return Err(AccountError::UserExists);
		}

		let password_hash = User::hash_password(password).map_err(AccountError::Hash)?;

		let user = self
			.store
			.create_user(NewUser {
				username: username.to_string(),
				email: email.to_string(),
				password_hash,
			})
			.await?;

		tracing::info!(user_id = user.id, "user registered");

		Ok(user)
	}

	/// `login` may be either the username or the email.
	pub async fn login(&self, login: &str, password: &str) -> Result<User, AccountError> {
		if login.is_empty() || password.is_empty() {
			return Err(AccountError::MissingFields);
		}

		let user = self
			.store
			.user_by_login(login)
			.await?
			.ok_or(AccountError::InvalidCredentials)?;

		if !user.verify_password(password) {
			tracing::debug!(user_id = user.id, "login rejected, wrong password");
			return Err(AccountError::InvalidCredentials);
		}

		Ok(user)
	}

	pub async fn profile(&self, user_id: i64) -> Result<User, AccountError> {
		self.store.user_by_id(user_id).await?.ok_or(AccountError::UserNotFound)
	}
}

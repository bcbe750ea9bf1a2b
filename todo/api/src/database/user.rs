use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::SaltString;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use chrono::{DateTime, Utc};

/// Characters counted as "special" when checking password strength.
const SPECIAL_CHARACTERS: &str = "!@#$%^&*(),.?\":{}|<>";

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct User {
	/// The unique identifier for the user.
	pub id: i64,
	/// The username of the user.
	pub username: String,
	/// The email of the user.
	pub email: String,
	/// The hashed password of the user. (argon2)
	pub password_hash: String,
	/// The time the user was created.
	pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewUser {
	pub username: String,
	pub email: String,
	pub password_hash: String,
}

/// The public view of a user, safe to hand out in responses.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct UserInfo {
	pub id: i64,
	pub username: String,
	pub email: String,
}

impl From<&User> for UserInfo {
	fn from(user: &User) -> Self {
		Self {
			id: user.id,
			username: user.username.clone(),
			email: user.email.clone(),
		}
	}
}

impl User {
	/// Uses argon2 to verify the password hash against the provided password.
	pub fn verify_password(&self, password: &str) -> bool {
		let hash = match PasswordHash::new(&self.password_hash) {
			Ok(hash) => hash,
			Err(err) => {
				tracing::error!(user_id = self.id, "failed to parse password hash: {}", err);
				return false;
			}
		};

		Argon2::default().verify_password(password.as_bytes(), &hash).is_ok()
	}

	/// Generates a new password hash using argon2.
	pub fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
		let salt = SaltString::generate(&mut OsRng);

		Ok(Argon2::default().hash_password(password.as_bytes(), &salt)?.to_string())
	}

	/// Validates a username.
	pub fn validate_username(username: &str) -> Result<(), &'static str> {
		if username.len() < 3 || username.len() > 20 {
			return Err("Username must be between 3 and 20 characters long");
		}

		if !username
			.chars()
			.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
		{
			return Err("Username may only contain letters, digits, underscores and hyphens");
		}

		Ok(())
	}

	/// Validates a password.
	pub fn validate_password(password: &str) -> Result<(), &'static str> {
		if password.chars().count() < 8 {
			return Err("Password must be at least 8 characters long");
		}

		if password.len() > 100 {
			return Err("Password must be at most 100 characters long");
		}

		let lower = password.chars().any(|c| c.is_ascii_lowercase());
		let upper = password.chars().any(|c| c.is_ascii_uppercase());
		let digit = password.chars().any(|c| c.is_ascii_digit());
		let special = password.chars().any(|c| SPECIAL_CHARACTERS.contains(c));

		if !(lower && upper && digit && special) {
			return Err("Password must contain uppercase and lowercase letters, a digit and a special character");
		}

		Ok(())
	}

	/// Validates an email.
	pub fn validate_email(email: &str) -> Result<(), &'static str> {
		if email.len() > 100 {
			return Err("Email must be at most 100 characters long");
		}

		// email_address accepts dotless domains such as `user@localhost`.
		let has_dotted_domain = email
			.rsplit_once('@')
			.map(|(_, domain)| domain.contains('.') && !domain.starts_with('.') && !domain.ends_with('.'))
			.unwrap_or(false);

		if !has_dotted_domain || !email_address::EmailAddress::is_valid(email) {
			return Err("Email is not a valid email address");
		}

		Ok(())
	}
}

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, TimeZone, Utc};
use hmac::{Hmac, Mac};
use jwt::{Claims, Header, RegisteredClaims, SignWithKey, Token, VerifyWithKey};
use sha2::Sha256;

use crate::config::JwtConfig;
use crate::database::User;
use crate::global::ApiGlobal;

pub struct AuthJwtPayload {
	pub user_id: i64,
	pub username: String,
	pub email: String,
	pub expiration: Option<DateTime<Utc>>,
	pub issued_at: DateTime<Utc>,
}

pub trait JwtState: Sized {
	fn to_claims(&self) -> Claims;

	fn from_claims(claims: &Claims) -> Option<Self>;

	fn serialize<G: ApiGlobal>(&self, global: &Arc<G>) -> Option<String> {
		let config = global.config::<JwtConfig>();

		let key = Hmac::<Sha256>::new_from_slice(config.secret.as_bytes()).ok()?;
		let mut claims = self.to_claims();

		claims.registered.issuer = Some(config.issuer.clone());

		if claims.registered.issued_at.is_none() {
			claims.registered.issued_at = Some(Utc::now().timestamp() as u64);
		}

		claims.sign_with_key(&key).ok()
	}

	fn verify<G: ApiGlobal>(global: &Arc<G>, token: &str) -> Option<Self> {
		let config = global.config::<JwtConfig>();

		let key = Hmac::<Sha256>::new_from_slice(config.secret.as_bytes()).ok()?;
		let token: Token<Header, Claims, _> = token.verify_with_key(&key).ok()?;

		let claims = token.claims();

		if claims.registered.issuer.as_ref() != Some(&config.issuer) {
			return None;
		}

		let iat = Utc.timestamp_opt(claims.registered.issued_at? as i64, 0).single()?;
		if iat > Utc::now() {
			return None;
		}

		let nbf = claims
			.registered
			.not_before
			.and_then(|x| Utc.timestamp_opt(x as i64, 0).single());
		if let Some(nbf) = nbf {
			if nbf > Utc::now() {
				return None;
			}
		}

		let exp = claims
			.registered
			.expiration
			.and_then(|x| Utc.timestamp_opt(x as i64, 0).single());
		if let Some(exp) = exp {
			if exp < Utc::now() {
				return None;
			}
		}

		Self::from_claims(claims)
	}
}

impl AuthJwtPayload {
	/// A fresh token payload for `user`, valid for the configured lifetime.
	pub fn new<G: ApiGlobal>(global: &Arc<G>, user: &User) -> Self {
		let config = global.config::<JwtConfig>();
		let issued_at = Utc::now();

		Self {
			user_id: user.id,
			username: user.username.clone(),
			email: user.email.clone(),
			expiration: Some(issued_at + Duration::seconds(config.expiration as i64)),
			issued_at,
		}
	}
}

impl JwtState for AuthJwtPayload {
	fn to_claims(&self) -> Claims {
		let mut private = BTreeMap::new();
		private.insert("username".to_string(), serde_json::Value::from(self.username.clone()));
		private.insert("email".to_string(), serde_json::Value::from(self.email.clone()));

		Claims {
			registered: RegisteredClaims {
				issuer: None,
				subject: Some(self.user_id.to_string()),
				audience: None,
				expiration: self.expiration.map(|x| x.timestamp() as u64),
				not_before: None,
				issued_at: Some(self.issued_at.timestamp() as u64),
				json_web_token_id: None,
			},
			private,
		}
	}

	fn from_claims(claims: &Claims) -> Option<Self> {
		let private = |name: &str| claims.private.get(name).and_then(|x| x.as_str()).map(str::to_string);

		Some(Self {
			user_id: claims.registered.subject.as_ref().and_then(|x| x.parse().ok())?,
			username: private("username")?,
			email: private("email")?,
			expiration: claims
				.registered
				.expiration
				.and_then(|x| Utc.timestamp_opt(x as i64, 0).single()),
			issued_at: Utc.timestamp_opt(claims.registered.issued_at? as i64, 0).single()?,
		})
	}
}

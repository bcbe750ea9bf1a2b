use chrono::{Duration, Utc};

use crate::api::jwt::{AuthJwtPayload, JwtState};
use crate::tests::global::{mock_global_state, test_config};

fn payload() -> AuthJwtPayload {
	AuthJwtPayload {
		user_id: 42,
		username: "alice".to_string(),
		email: "alice@example.com".to_string(),
		expiration: Some(Utc::now() + Duration::hours(1)),
		issued_at: Utc::now(),
	}
}

#[test]
fn test_jwt_round_trip() {
	let (global, _handler) = mock_global_state(test_config());

	let token = payload().serialize(&global).expect("failed to sign token");
	let verified = AuthJwtPayload::verify(&global, &token).expect("failed to verify token");

	assert_eq!(verified.user_id, 42);
	assert_eq!(verified.username, "alice");
	assert_eq!(verified.email, "alice@example.com");
	assert!(verified.expiration.is_some());
}

#[test]
fn test_jwt_rejects_foreign_tokens() {
	let (global, _handler) = mock_global_state(test_config());

	let mut other = test_config();
	other.jwt.secret = "another-secret".to_string();
	let (other, _other_handler) = mock_global_state(other);
	let token = payload().serialize(&other).expect("failed to sign token");
	assert!(AuthJwtPayload::verify(&global, &token).is_none());

	let mut other = test_config();
	other.jwt.issuer = "someone-else".to_string();
	let (other, _other_handler) = mock_global_state(other);
	let token = payload().serialize(&other).expect("failed to sign token");
	assert!(AuthJwtPayload::verify(&global, &token).is_none());

	assert!(AuthJwtPayload::verify(&global, "not.a.token").is_none());
}

#[test]
fn test_jwt_rejects_expired_and_future_tokens() {
	let (global, _handler) = mock_global_state(test_config());

	let mut expired = payload();
	expired.issued_at = Utc::now() - Duration::hours(2);
	expired.expiration = Some(Utc::now() - Duration::hours(1));
	let token = expired.serialize(&global).expect("failed to sign token");
	assert!(AuthJwtPayload::verify(&global, &token).is_none());

	let mut future = payload();
	future.issued_at = Utc::now() + Duration::hours(1);
	let token = future.serialize(&global).expect("failed to sign token");
	assert!(AuthJwtPayload::verify(&global, &token).is_none());
}

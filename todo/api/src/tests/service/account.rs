use crate::service::{AccountError, AccountService, ErrorKind, ServiceError};
use crate::tests::store::MemoryStore;

const PASSWORD: &str = "Sup3r$ecret";

#[tokio::test]
async fn test_register_and_login() {
	let store = MemoryStore::new();
	let service = AccountService::new(&store);

	let user = service.register("alice", "alice@example.com", PASSWORD).await.unwrap();
	assert_eq!(user.username, "alice");
	assert_ne!(user.password_hash, PASSWORD);

	let by_name = service.login("alice", PASSWORD).await.unwrap();
	assert_eq!(by_name.id, user.id);

	let by_email = service.login("alice@example.com", PASSWORD).await.unwrap();
	assert_eq!(by_email.id, user.id);

	let err = service.login("alice", "Wr0ng$password").await.unwrap_err();
	assert!(matches!(err, AccountError::InvalidCredentials));
	assert_eq!(err.kind(), ErrorKind::Unauthorized);

	assert!(matches!(
		service.login("nobody", PASSWORD).await,
		Err(AccountError::InvalidCredentials)
	));

	assert_eq!(service.profile(user.id).await.unwrap().email, "alice@example.com");
	assert!(matches!(service.profile(user.id + 100).await, Err(AccountError::UserNotFound)));
}

#[tokio::test]
async fn test_register_conflict() {
	let store = MemoryStore::new();
	store.insert_user("alice");

	let service = AccountService::new(&store);

	for (username, email) in [("alice", "new@example.com"), ("other", "alice@example.com")] {
		let err = service.register(username, email, PASSWORD).await.unwrap_err();
		assert!(matches!(err, AccountError::UserExists), "{username}");
		assert_eq!(err.kind(), ErrorKind::Conflict);
	}
}

#[tokio::test]
async fn test_register_validation() {
	let store = MemoryStore::new();
	let service = AccountService::new(&store);

	let cases = [
		("", "alice@example.com", PASSWORD),
		("al", "alice@example.com", PASSWORD),
		("alice!", "alice@example.com", PASSWORD),
		("alice", "not-an-email", PASSWORD),
		("alice", "alice@localhost", PASSWORD),
		("alice", "alice@example.com", "short1!"),
		("alice", "alice@example.com", "alllowercase1!"),
		("alice", "alice@example.com", "NoSpecial123"),
	];

	for (username, email, password) in cases {
		let err = service.register(username, email, password).await.unwrap_err();
		assert_eq!(err.kind(), ErrorKind::BadRequest, "{username} {email} {password}: {err}");
	}

	assert!(matches!(
		service.register("alice", "", PASSWORD).await,
		Err(AccountError::MissingFields)
	));
	assert!(matches!(
		service.login("alice", PASSWORD).await,
		Err(AccountError::InvalidCredentials)
	));
}

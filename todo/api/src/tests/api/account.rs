use reqwest::Method;
use serde_json::json;

use super::TestServer;
use crate::tests::global::test_config;

#[tokio::test]
async fn test_register_login_profile() {
	let server = TestServer::start(test_config()).await;

	let (status, body) = server
		.send(
			Method::POST,
			"/api/auth/register",
			None,
			Some(json!({
				"username": "  alice ",
				"email": "alice@example.com",
				"password": "Sup3r$ecret",
			})),
		)
		.await;
	assert_eq!(status, 201, "{body}");
	assert_eq!(body["success"], true);
	assert_eq!(body["user"]["username"], "alice");
	let token = body["token"].as_str().expect("missing token").to_string();

	let (status, body) = server
		.send(
			Method::POST,
			"/api/auth/register",
			None,
			Some(json!({
				"username": "alice",
				"email": "other@example.com",
				"password": "Sup3r$ecret",
			})),
		)
		.await;
	assert_eq!(status, 409, "{body}");
	assert_eq!(body["success"], false);

	let (status, body) = server
		.send(
			Method::POST,
			"/api/auth/login",
			None,
			Some(json!({ "username": "alice@example.com", "password": "Sup3r$ecret" })),
		)
		.await;
	assert_eq!(status, 200, "{body}");
	assert!(body["token"].is_string());

	let (status, body) = server
		.send(
			Method::POST,
			"/api/auth/login",
			None,
			Some(json!({ "username": "alice", "password": "nope" })),
		)
		.await;
	assert_eq!(status, 401);
	assert_eq!(body, json!({ "success": false, "message": "invalid credentials" }));

	let (status, body) = server.get("/api/auth/profile", &token).await;
	assert_eq!(status, 200, "{body}");
	assert_eq!(body["user"]["email"], "alice@example.com");
	assert!(body["user"]["created_at"].is_string());
	assert!(body["user"].get("password_hash").is_none());

	let (status, body) = server.get("/api/auth/verify", &token).await;
	assert_eq!(status, 200);
	assert_eq!(body["user"]["username"], "alice");

	server.shutdown().await;
}

#[tokio::test]
async fn test_register_validation() {
	let server = TestServer::start(test_config()).await;

	let (status, body) = server
		.send(
			Method::POST,
			"/api/auth/register",
			None,
			Some(json!({ "username": "alice", "password": "Sup3r$ecret" })),
		)
		.await;
	assert_eq!(status, 400);
	assert_eq!(body["message"], "missing fields");

	let (status, _) = server
		.send(
			Method::POST,
			"/api/auth/register",
			None,
			Some(json!({ "username": "alice", "email": "alice@example.com", "password": "weak" })),
		)
		.await;
	assert_eq!(status, 400);

	server.shutdown().await;
}

#[tokio::test]
async fn test_protected_routes_require_token() {
	let server = TestServer::start(test_config()).await;

	for path in ["/api/auth/profile", "/api/auth/verify", "/api/teams", "/api/todos"] {
		let (status, body) = server.send(Method::GET, path, None, None).await;
		assert_eq!(status, 401, "{path}");
		assert_eq!(body, json!({ "success": false, "message": "not logged in" }));
	}

	let (status, body) = server.get("/api/teams", "garbage").await;
	assert_eq!(status, 401);
	assert_eq!(body["message"], "invalid token");

	let resp = server
		.client
		.get(server.url("/api/teams"))
		.header(reqwest::header::AUTHORIZATION, "Basic abc")
		.send()
		.await
		.expect("failed to send request");
	assert_eq!(resp.status().as_u16(), 401);

	server.shutdown().await;
}

#[tokio::test]
async fn test_profile_of_deleted_user() {
	let server = TestServer::start(test_config()).await;

	// A token for a user id the store has never seen.
	let token = {
		use crate::api::jwt::{AuthJwtPayload, JwtState};

		AuthJwtPayload {
			user_id: 9999,
			username: "ghost".to_string(),
			email: "ghost@example.com".to_string(),
			expiration: None,
			issued_at: chrono::Utc::now(),
		}
		.serialize(&server.global)
		.expect("failed to sign token")
	};

	let (status, body) = server.get("/api/auth/profile", &token).await;
	assert_eq!(status, 404);
	assert_eq!(body["message"], "user not found");

	server.shutdown().await;
}

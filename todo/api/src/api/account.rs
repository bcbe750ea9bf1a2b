use std::sync::Arc;

use common::http::ext::OptionExt;
use hyper::{Body, Request, Response, StatusCode};
use serde_json::json;

use super::error::Result;
use super::ext::{read_json, trimmed, RequestExt};
use super::jwt::{AuthJwtPayload, JwtState};
use super::response::success;
use crate::config::ApiConfig;
use crate::database::{User, UserInfo};
use crate::global::ApiGlobal;
use crate::service::AccountService;

#[derive(serde::Deserialize)]
struct RegisterRequest {
	username: Option<String>,
	email: Option<String>,
	password: Option<String>,
}

#[derive(serde::Deserialize)]
struct LoginRequest {
	/// Either the username or the email.
	username: Option<String>,
	password: Option<String>,
}

fn issue_token<G: ApiGlobal>(global: &Arc<G>, user: &User) -> Result<String> {
	AuthJwtPayload::new(global, user)
		.serialize(global)
		.map_err_route((StatusCode::INTERNAL_SERVER_ERROR, "failed to issue token"))
}

pub async fn register<G: ApiGlobal>(mut req: Request<Body>) -> Result<Response<Body>> {
	let global = req.get_global::<G>()?;
	let body: RegisterRequest = read_json(&mut req, global.config::<ApiConfig>().max_body_size).await?;

	let username = trimmed(body.username).unwrap_or_default();
	let email = trimmed(body.email).unwrap_or_default();
	// Passwords are taken as typed.
	let password = body.password.unwrap_or_default();

	let user = AccountService::new(global.store())
		.register(&username, &email, &password)
		.await?;

	let token = issue_token(&global, &user)?;

	Ok(success(
		StatusCode::CREATED,
		"registration successful",
		json!({ "token": token, "user": UserInfo::from(&user) }),
	))
}

pub async fn login<G: ApiGlobal>(mut req: Request<Body>) -> Result<Response<Body>> {
	let global = req.get_global::<G>()?;
	let body: LoginRequest = read_json(&mut req, global.config::<ApiConfig>().max_body_size).await?;

	let login = trimmed(body.username).unwrap_or_default();
	let password = body.password.unwrap_or_default();

	let user = AccountService::new(global.store()).login(&login, &password).await?;

	let token = issue_token(&global, &user)?;

	tracing::debug!(user_id = user.id, "user logged in");

	Ok(success(
		StatusCode::OK,
		"login successful",
		json!({ "token": token, "user": UserInfo::from(&user) }),
	))
}

pub async fn profile<G: ApiGlobal>(req: Request<Body>) -> Result<Response<Body>> {
	let global = req.get_global::<G>()?;
	let auth = req.auth()?;

	let user = AccountService::new(global.store()).profile(auth.user_id).await?;

	Ok(success(
		StatusCode::OK,
		"profile loaded",
		json!({
			"user": {
				"id": user.id,
				"username": user.username,
				"email": user.email,
				"created_at": user.created_at,
			}
		}),
	))
}

/// Checks the token without touching the store.
pub async fn verify(req: Request<Body>) -> Result<Response<Body>> {
	let auth = req.auth()?;

	Ok(success(StatusCode::OK, "token is valid", json!({ "user": auth })))
}

use hyper::{Body, Request, Response, StatusCode};
use serde_json::json;

use super::error::Result;
use super::ext::{read_json, trimmed, RequestExt};
use super::response::success;
use crate::config::ApiConfig;
use crate::database::{NewTeam, TeamPatch, DEFAULT_TEAM_COLOR};
use crate::global::ApiGlobal;
use crate::service::TeamService;

const MAX_NAME_LENGTH: usize = 50;
const MAX_DESCRIPTION_LENGTH: usize = 500;

#[derive(serde::Deserialize)]
struct TeamRequest {
	name: Option<String>,
	description: Option<String>,
	color: Option<String>,
}

#[derive(serde::Deserialize)]
struct AddMemberRequest {
	email: Option<String>,
}

fn validate_name(name: &str) -> Result<(), &'static str> {
	if name.is_empty() {
		return Err("team name is required");
	}

	if name.chars().count() > MAX_NAME_LENGTH {
		return Err("team name must be at most 50 characters long");
	}

	Ok(())
}

fn validate_description(description: &str) -> Result<(), &'static str> {
	if description.chars().count() > MAX_DESCRIPTION_LENGTH {
		return Err("team description must be at most 500 characters long");
	}

	Ok(())
}

/// `#rrggbb`
fn validate_color(color: &str) -> Result<(), &'static str> {
	match color.strip_prefix('#') {
		Some(hex) if hex.len() == 6 && hex.chars().all(|c| c.is_ascii_hexdigit()) => Ok(()),
		_ => Err("team color must be a hex color such as #667eea"),
	}
}

fn bad_request<T>(result: Result<T, &'static str>) -> Result<T> {
	Ok(result.map_err(|message| (StatusCode::BAD_REQUEST, message))?)
}

pub async fn list<G: ApiGlobal>(req: Request<Body>) -> Result<Response<Body>> {
	let global = req.get_global::<G>()?;
	let auth = req.auth()?;

	let teams = TeamService::new(global.store()).list(auth.user_id).await?;

	Ok(success(StatusCode::OK, "teams loaded", json!({ "teams": teams })))
}

pub async fn create<G: ApiGlobal>(mut req: Request<Body>) -> Result<Response<Body>> {
	let global = req.get_global::<G>()?;
	let auth = req.auth()?;
	let body: TeamRequest = read_json(&mut req, global.config::<ApiConfig>().max_body_size).await?;

	let name = trimmed(body.name).unwrap_or_default();
	let description = trimmed(body.description).unwrap_or_default();
	let color = trimmed(body.color)
		.filter(|color| !color.is_empty())
		.unwrap_or_else(|| DEFAULT_TEAM_COLOR.to_string());

	bad_request(validate_name(&name))?;
	bad_request(validate_description(&description))?;
	bad_request(validate_color(&color))?;

	let team = TeamService::new(global.store())
		.create(
			auth.user_id,
			NewTeam {
				name,
				description,
				color,
			},
		)
		.await?;

	Ok(success(StatusCode::CREATED, "team created", json!({ "team": team })))
}

pub async fn update<G: ApiGlobal>(mut req: Request<Body>) -> Result<Response<Body>> {
	let global = req.get_global::<G>()?;
	let auth = req.auth()?;
	let team_id = req.path_id("id")?;
	let body: TeamRequest = read_json(&mut req, global.config::<ApiConfig>().max_body_size).await?;

	let patch = TeamPatch {
		name: trimmed(body.name),
		description: trimmed(body.description),
		color: trimmed(body.color),
	};

	if let Some(name) = &patch.name {
		bad_request(validate_name(name))?;
	}
	if let Some(description) = &patch.description {
		bad_request(validate_description(description))?;
	}
	if let Some(color) = &patch.color {
		bad_request(validate_color(color))?;
	}

	TeamService::new(global.store()).update(team_id, auth.user_id, patch).await?;

	Ok(success(StatusCode::OK, "team updated", json!({})))
}

pub async fn delete<G: ApiGlobal>(req: Request<Body>) -> Result<Response<Body>> {
	let global = req.get_global::<G>()?;
	let auth = req.auth()?;
	let team_id = req.path_id("id")?;

	TeamService::new(global.store()).delete(team_id, auth.user_id).await?;

	Ok(success(StatusCode::OK, "team deleted", json!({})))
}

pub async fn members<G: ApiGlobal>(req: Request<Body>) -> Result<Response<Body>> {
	let global = req.get_global::<G>()?;
	let auth = req.auth()?;
	let team_id = req.path_id("id")?;

	let members = TeamService::new(global.store()).members(team_id, auth.user_id).await?;

	Ok(success(StatusCode::OK, "members loaded", json!({ "members": members })))
}

pub async fn add_member<G: ApiGlobal>(mut req: Request<Body>) -> Result<Response<Body>> {
	let global = req.get_global::<G>()?;
	let auth = req.auth()?;
	let team_id = req.path_id("id")?;
	let body: AddMemberRequest = read_json(&mut req, global.config::<ApiConfig>().max_body_size).await?;

	let email = trimmed(body.email)
		.filter(|email| !email.is_empty())
		.ok_or((StatusCode::BAD_REQUEST, "email is required"))?;

	let user = TeamService::new(global.store())
		.add_member(team_id, auth.user_id, &email)
		.await?;

	Ok(success(StatusCode::CREATED, "member added", json!({ "user": user })))
}

pub async fn remove_member<G: ApiGlobal>(req: Request<Body>) -> Result<Response<Body>> {
	let global = req.get_global::<G>()?;
	let auth = req.auth()?;
	let team_id = req.path_id("id")?;
	let user_id = req.path_id("userId")?;

	TeamService::new(global.store())
		.remove_member(team_id, auth.user_id, user_id)
		.await?;

	Ok(success(StatusCode::OK, "member removed", json!({})))
}

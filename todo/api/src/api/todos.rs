use chrono::NaiveDate;
use hyper::{Body, Request, Response, StatusCode};
use serde::{Deserialize, Deserializer};
use serde_json::json;

use super::error::Result;
use super::ext::{read_json, trimmed, RequestExt};
use super::response::success;
use crate::config::ApiConfig;
use crate::database::{NewTodo, Priority, TodoPatch};
use crate::global::ApiGlobal;
use crate::service::{TodoService, TodoUpdate};

const MAX_TITLE_LENGTH: usize = 200;
const MAX_CONTENT_LENGTH: usize = 2000;

#[derive(Deserialize)]
struct CreateTodoRequest {
	title: Option<String>,
	content: Option<String>,
	priority: Option<Priority>,
	team_id: Option<i64>,
	start_date: Option<NaiveDate>,
	due_date: Option<NaiveDate>,
	#[serde(default)]
	assignees: Vec<i64>,
}

#[derive(Deserialize)]
struct UpdateTodoRequest {
	title: Option<String>,
	content: Option<String>,
	priority: Option<Priority>,
	completed: Option<bool>,
	#[serde(default, deserialize_with = "nullable")]
	start_date: Option<Option<NaiveDate>>,
	#[serde(default, deserialize_with = "nullable")]
	due_date: Option<Option<NaiveDate>>,
	assignees: Option<Vec<i64>>,
}

/// Tells an explicit `null` (`Some(None)`) apart from a missing field (`None`).
fn nullable<'de, D, T>(deserializer: D) -> std::result::Result<Option<Option<T>>, D::Error>
where
	D: Deserializer<'de>,
	T: Deserialize<'de>,
{
	Option::<T>::deserialize(deserializer).map(Some)
}

fn validate_title(title: &str) -> Result<(), &'static str> {
	if title.is_empty() {
		return Err("title is required");
	}

	if title.chars().count() > MAX_TITLE_LENGTH {
		return Err("title must be at most 200 characters long");
	}

	Ok(())
}

fn validate_content(content: &str) -> Result<(), &'static str> {
	if content.chars().count() > MAX_CONTENT_LENGTH {
		return Err("content must be at most 2000 characters long");
	}

	Ok(())
}

fn bad_request<T>(result: Result<T, &'static str>) -> Result<T> {
	Ok(result.map_err(|message| (StatusCode::BAD_REQUEST, message))?)
}

/// The optional `team_id` query filter.
fn team_filter(req: &Request<Body>) -> Result<Option<i64>> {
	let Some(value) = req.uri().query().and_then(|query| {
		url::form_urlencoded::parse(query.as_bytes()).find_map(|(key, value)| (key == "team_id").then(|| value.into_owned()))
	}) else {
		return Ok(None);
	};

	if value.is_empty() {
		return Ok(None);
	}

	match value.parse::<i64>() {
		Ok(id) if id > 0 => Ok(Some(id)),
		_ => Err((StatusCode::BAD_REQUEST, "invalid team_id").into()),
	}
}

pub async fn list<G: ApiGlobal>(req: Request<Body>) -> Result<Response<Body>> {
	let global = req.get_global::<G>()?;
	let auth = req.auth()?;
	let team_id = team_filter(&req)?;

	let todos = TodoService::new(global.store()).list(auth.user_id, team_id).await?;

	Ok(success(StatusCode::OK, "todos loaded", json!({ "todos": todos })))
}

pub async fn create<G: ApiGlobal>(mut req: Request<Body>) -> Result<Response<Body>> {
	let global = req.get_global::<G>()?;
	let auth = req.auth()?;
	let body: CreateTodoRequest = read_json(&mut req, global.config::<ApiConfig>().max_body_size).await?;

	let title = trimmed(body.title).unwrap_or_default();
	let content = trimmed(body.content).unwrap_or_default();

	bad_request(validate_title(&title))?;
	bad_request(validate_content(&content))?;

	let todo = TodoService::new(global.store())
		.create(
			auth.user_id,
			NewTodo {
				team_id: body.team_id,
				title,
				content,
				priority: body.priority.unwrap_or_default(),
				start_date: body.start_date,
				due_date: body.due_date,
			},
			body.assignees,
		)
		.await?;

	Ok(success(StatusCode::CREATED, "todo created", json!({ "todo": todo })))
}

pub async fn update<G: ApiGlobal>(mut req: Request<Body>) -> Result<Response<Body>> {
	let global = req.get_global::<G>()?;
	let auth = req.auth()?;
	let todo_id = req.path_id("id")?;
	let body: UpdateTodoRequest = read_json(&mut req, global.config::<ApiConfig>().max_body_size).await?;

	let patch = TodoPatch {
		title: trimmed(body.title),
		content: trimmed(body.content),
		priority: body.priority,
		completed: body.completed,
		start_date: body.start_date,
		due_date: body.due_date,
	};

	if let Some(title) = &patch.title {
		bad_request(validate_title(title))?;
	}
	if let Some(content) = &patch.content {
		bad_request(validate_content(content))?;
	}

	let outcome = TodoService::new(global.store())
		.update(todo_id, auth.user_id, patch, body.assignees)
		.await?;

	let resp = match outcome {
		TodoUpdate::Applied => success(StatusCode::OK, "todo updated", json!({})),
		TodoUpdate::AssigneesSkipped => success(
			StatusCode::OK,
			"todo updated, only the creator can change assignees",
			json!({ "assignees_updated": false }),
		),
	};

	Ok(resp)
}

pub async fn delete<G: ApiGlobal>(req: Request<Body>) -> Result<Response<Body>> {
	let global = req.get_global::<G>()?;
	let auth = req.auth()?;
	let todo_id = req.path_id("id")?;

	TodoService::new(global.store()).delete(todo_id, auth.user_id).await?;

	Ok(success(StatusCode::OK, "todo deleted", json!({})))
}

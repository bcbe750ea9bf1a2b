use chrono::{DateTime, NaiveDate, Utc};

#[derive(
	Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, sqlx::Type, serde::Serialize, serde::Deserialize,
)]
#[sqlx(type_name = "todo_priority", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Priority {
	Low,
	#[default]
	Medium,
	High,
}

#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow, serde::Serialize)]
pub struct Todo {
	pub id: i64,
	/// The creator, the only user allowed to delete the todo or change its
	/// assignees.
	pub user_id: i64,
	/// `None` for personal todos.
	pub team_id: Option<i64>,
	pub title: String,
	pub content: String,
	pub priority: Priority,
	pub completed: bool,
	pub start_date: Option<NaiveDate>,
	pub due_date: Option<NaiveDate>,
	pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow, serde::Serialize)]
pub struct TodoWithCreator {
	#[sqlx(flatten)]
	#[serde(flatten)]
	pub todo: Todo,
	pub creator_name: String,
	pub creator_email: String,
}

#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow, serde::Serialize)]
pub struct Assignee {
	pub user_id: i64,
	pub username: String,
	pub email: String,
}

/// A todo enriched for listing.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct TodoView {
	#[serde(flatten)]
	pub todo: TodoWithCreator,
	pub assignees: Vec<Assignee>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTodo {
	pub team_id: Option<i64>,
	pub title: String,
	pub content: String,
	pub priority: Priority,
	pub start_date: Option<NaiveDate>,
	pub due_date: Option<NaiveDate>,
}

/// Field level update, `None` leaves a column untouched. The dates use a
/// nested option so they can be cleared.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TodoPatch {
	pub title: Option<String>,
	pub content: Option<String>,
	pub priority: Option<Priority>,
	pub completed: Option<bool>,
	pub start_date: Option<Option<NaiveDate>>,
	pub due_date: Option<Option<NaiveDate>>,
}

impl TodoPatch {
	pub fn is_empty(&self) -> bool {
		self.title.is_none()
			&& self.content.is_none()
			&& self.priority.is_none()
			&& self.completed.is_none()
			&& self.start_date.is_none()
			&& self.due_date.is_none()
	}
}

use crate::database::{NewTodo, Todo, TodoPatch, TodoView};
use crate::service::{ErrorKind, ServiceError};
use crate::store::{Store, StoreError};

#[derive(Debug, thiserror::Error)]
pub enum TodoError {
	#[error("todo not found")]
	NotFound,
	#[error("you are not a member of this team")]
	NotTeamMember,
	#[error("user {0} is not a member of this team")]
	InvalidAssignee(i64),
	#[error(transparent)]
	Store(#[from] StoreError),
}

impl ServiceError for TodoError {
	fn kind(&self) -> ErrorKind {
		match self {
			Self::NotFound => ErrorKind::NotFound,
			Self::NotTeamMember => ErrorKind::Forbidden,
			Self::InvalidAssignee(_) => ErrorKind::BadRequest,
			Self::Store(_) => ErrorKind::ServerError,
		}
	}
}

/// What an update ended up changing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TodoUpdate {
	Applied,
	/// The fields were updated but the caller is not the creator, so the
	/// supplied assignees were ignored.
	AssigneesSkipped,
}

pub struct TodoService<'a, S> {
	store: &'a S,
}

impl<'a, S: Store> TodoService<'a, S> {
	pub fn new(store: &'a S) -> Self {
		Self { store }
	}

	/// De-duplicates `assignees` and checks every one of them belongs to the
	/// team.
	async fn validate_assignees(&self, team_id: i64, assignees: Vec<i64>) -> Result<Vec<i64>, TodoError> {
		let mut unique = Vec::with_capacity(assignees.len());
		for id in assignees {
			if !unique.contains(&id) {
				unique.push(id);
			}
		}

		if unique.is_empty() {
			return Ok(unique);
		}

		let members = self.store.team_member_ids(team_id, &unique).await?;
		if let Some(outsider) = unique.iter().find(|id| !members.contains(id)) {
			tracing::debug!(team_id, user_id = outsider, "assignee is not a team member");
			return Err(TodoError::InvalidAssignee(*outsider));
		}

		Ok(unique)
	}

	/// Todos the caller created or is assigned to, with creator and assignee
	/// details.
	pub async fn list(&self, caller: i64, team_id: Option<i64>) -> Result<Vec<TodoView>, TodoError> {
		let todos = self.store.todos_for_user(caller, team_id).await?;

		let mut views = Vec::with_capacity(todos.len());
		for todo in todos {
			let assignees = self.store.todo_assignees(todo.todo.id).await?;
			views.push(TodoView { todo, assignees });
		}

		Ok(views)
	}

	/// Assignees are only kept for team todos; on personal todos they are
	/// dropped.
	pub async fn create(&self, caller: i64, todo: NewTodo, assignees: Vec<i64>) -> Result<Todo, TodoError> {
		let assignees = match todo.team_id {
			Some(team_id) => {
				if self.store.member_role(team_id, caller).await?.is_none() {
					tracing::debug!(team_id, user_id = caller, "cannot create todo outside own team");
					return Err(TodoError::NotTeamMember);
				}

				self.validate_assignees(team_id, assignees).await?
			}
			None => {
				if !assignees.is_empty() {
					tracing::debug!(user_id = caller, "ignoring assignees on personal todo");
				}

				Vec::new()
			}
		};

		let todo = self.store.create_todo(caller, todo, &assignees).await?;

		tracing::debug!(todo_id = todo.id, user_id = caller, assignees = assignees.len(), "todo created");

		Ok(todo)
	}

	/// The creator and assignees may update fields, only the creator may
	/// replace the assignees.
	pub async fn update(
		&self,
		todo_id: i64,
		caller: i64,
		patch: TodoPatch,
		assignees: Option<Vec<i64>>,
	) -> Result<TodoUpdate, TodoError> {
		let todo = self.store.visible_todo(todo_id, caller).await?.ok_or(TodoError::NotFound)?;

		let mut outcome = TodoUpdate::Applied;

		let assignees = match (assignees, todo.team_id) {
			(None, _) => None,
			(Some(_), _) if todo.user_id != caller => {
				tracing::debug!(todo_id, user_id = caller, "assignee change by non-creator skipped");
				outcome = TodoUpdate::AssigneesSkipped;
				None
			}
			(Some(assignees), Some(team_id)) => Some(self.validate_assignees(team_id, assignees).await?),
			(Some(_), None) => None,
		};

		if patch.is_empty() && assignees.is_none() {
			return Ok(outcome);
		}

		self.store.update_todo(todo_id, patch, assignees.as_deref()).await?;

		Ok(outcome)
	}

	/// Only the creator may delete a todo.
	pub async fn delete(&self, todo_id: i64, caller: i64) -> Result<(), TodoError> {
		if !self.store.delete_todo(todo_id, caller).await? {
			return Err(TodoError::NotFound);
		}

		Ok(())
	}
}

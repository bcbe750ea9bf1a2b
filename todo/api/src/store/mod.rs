use crate::database::{
	Assignee, NewTeam, NewTodo, NewUser, Team, TeamMember, TeamPatch, TeamRole, TeamSummary, Todo, TodoPatch,
	TodoWithCreator, User,
};

mod postgres;

pub use postgres::PgStore;

pub type Result<T, E = StoreError> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
	#[error("database error: {0}")]
	Database(#[from] sqlx::Error),
	#[error("{0} already exists")]
	Conflict(&'static str),
}

/// Every query the services issue. Mutations that touch more than one row
/// are all-or-nothing.
#[async_trait::async_trait]
pub trait Store: Send + Sync + 'static {
	/// Fails with [`StoreError::Conflict`] if the username or email is taken.
	async fn create_user(&self, user: NewUser) -> Result<User>;

	async fn user_exists(&self, username: &str, email: &str) -> Result<bool>;

	/// Looks a user up by username or email.
	async fn user_by_login(&self, login: &str) -> Result<Option<User>>;

	async fn user_by_id(&self, id: i64) -> Result<Option<User>>;

	async fn user_by_email(&self, email: &str) -> Result<Option<User>>;

	/// Teams the user belongs to, newest first.
	async fn teams_for_user(&self, user_id: i64) -> Result<Vec<TeamSummary>>;

	/// Inserts the team together with an owner membership for `owner`.
	async fn create_team(&self, owner: i64, team: NewTeam) -> Result<Team>;

	async fn update_team(&self, team_id: i64, patch: TeamPatch) -> Result<()>;

	/// Removes the team along with its assignments, todos and memberships.
	async fn delete_team(&self, team_id: i64) -> Result<()>;

	async fn member_role(&self, team_id: i64, user_id: i64) -> Result<Option<TeamRole>>;

	/// Owners first, then by join time.
	async fn team_members(&self, team_id: i64) -> Result<Vec<TeamMember>>;

	/// The subset of `user_ids` that are members of the team.
	async fn team_member_ids(&self, team_id: i64, user_ids: &[i64]) -> Result<Vec<i64>>;

	/// Fails with [`StoreError::Conflict`] if the user is already a member.
	async fn add_member(&self, team_id: i64, user_id: i64, role: TeamRole) -> Result<()>;

	/// Drops the user's assignments on the team's todos, then the membership.
	async fn remove_member(&self, team_id: i64, user_id: i64) -> Result<()>;

	/// Todos created by or assigned to the user, newest first, each at most once.
	async fn todos_for_user(&self, user_id: i64, team_id: Option<i64>) -> Result<Vec<TodoWithCreator>>;

	async fn todo_assignees(&self, todo_id: i64) -> Result<Vec<Assignee>>;

	async fn create_todo(&self, creator: i64, todo: NewTodo, assignees: &[i64]) -> Result<Todo>;

	/// The todo if `user_id` created it or is assigned to it.
	async fn visible_todo(&self, todo_id: i64, user_id: i64) -> Result<Option<Todo>>;

	/// Applies the patch and, when given, replaces the assignee set.
	async fn update_todo(&self, todo_id: i64, patch: TodoPatch, assignees: Option<&[i64]>) -> Result<()>;

	/// Deletes the todo if `creator` created it. Returns whether a row was removed.
	async fn delete_todo(&self, todo_id: i64, creator: i64) -> Result<bool>;
}

use sqlx::PgPool;

use super::{Result, Store, StoreError};
use crate::database::{
	Assignee, NewTeam, NewTodo, NewUser, Team, TeamMember, TeamPatch, TeamRole, TeamSummary, Todo, TodoPatch,
	TodoWithCreator, User,
};

/// [`Store`] backed by Postgres.
#[derive(Clone)]
pub struct PgStore {
	pool: PgPool,
}

impl PgStore {
	pub fn new(pool: PgPool) -> Self {
		Self { pool }
	}

	pub fn pool(&self) -> &PgPool {
		&self.pool
	}

	pub async fn migrate(&self) -> Result<(), sqlx::migrate::MigrateError> {
		sqlx::migrate!("./migrations").run(&self.pool).await
	}
}

fn conflict_on_unique(err: sqlx::Error, what: &'static str) -> StoreError {
	match &err {
		sqlx::Error::Database(db) if db.is_unique_violation() => StoreError::Conflict(what),
		_ => StoreError::Database(err),
	}
}

#[async_trait::async_trait]
impl Store for PgStore {
	async fn create_user(&self, user: NewUser) -> Result<User> {
		sqlx::query_as(
			r#"
			INSERT INTO users (username, email, password_hash)
			VALUES ($1, $2, $3)
			RETURNING *
			"#,
		)
		.bind(user.username)
		.bind(user.email)
		.bind(user.password_hash)
		.fetch_one(&self.pool)
		.await
		.map_err(|err| conflict_on_unique(err, "user"))
	}

	async fn user_exists(&self, username: &str, email: &str) -> Result<bool> {
		Ok(
			sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM users WHERE username = $1 OR email = $2)")
				.bind(username)
				.bind(email)
				.fetch_one(&self.pool)
				.await?,
		)
	}

	async fn user_by_login(&self, login: &str) -> Result<Option<User>> {
		Ok(
			sqlx::query_as("SELECT * FROM users WHERE username = $1 OR email = $1 ORDER BY id LIMIT 1")
				.bind(login)
				.fetch_optional(&self.pool)
				.await?,
		)
	}

	async fn user_by_id(&self, id: i64) -> Result<Option<User>> {
		Ok(sqlx::query_as("SELECT * FROM users WHERE id = $1")
			.bind(id)
			.fetch_optional(&self.pool)
			.await?)
	}

	async fn user_by_email(&self, email: &str) -> Result<Option<User>> {
		Ok(sqlx::query_as("SELECT * FROM users WHERE email = $1")
			.bind(email)
			.fetch_optional(&self.pool)
			.await?)
	}

	async fn teams_for_user(&self, user_id: i64) -> Result<Vec<TeamSummary>> {
		Ok(sqlx::query_as(
			r#"
			SELECT
				t.*,
				tm.role,
				(SELECT COUNT(*) FROM team_members WHERE team_id = t.id) AS member_count
			FROM
				teams t
				INNER JOIN team_members tm ON t.id = tm.team_id
			WHERE
				tm.user_id = $1
			ORDER BY
				t.created_at DESC,
				t.id DESC
			"#,
		)
		.bind(user_id)
		.fetch_all(&self.pool)
		.await?)
	}

	async fn create_team(&self, owner: i64, team: NewTeam) -> Result<Team> {
		let mut transaction = self.pool.begin().await?;

		let team: Team = sqlx::query_as(
			r#"
			INSERT INTO teams (name, description, color, created_by)
			VALUES ($1, $2, $3, $4)
			RETURNING *
			"#,
		)
		.bind(team.name)
		.bind(team.description)
		.bind(team.color)
		.bind(owner)
		.fetch_one(&mut *transaction)
		.await?;

		sqlx::query("INSERT INTO team_members (team_id, user_id, role) VALUES ($1, $2, $3)")
			.bind(team.id)
			.bind(owner)
			.bind(TeamRole::Owner)
			.execute(&mut *transaction)
			.await?;

		transaction.commit().await?;

		Ok(team)
	}

	async fn update_team(&self, team_id: i64, patch: TeamPatch) -> Result<()> {
		sqlx::query(
			r#"
			UPDATE teams
			SET
				name = COALESCE($2, name),
				description = COALESCE($3, description),
				color = COALESCE($4, color)
			WHERE
				id = $1
			"#,
		)
		.bind(team_id)
		.bind(patch.name)
		.bind(patch.description)
		.bind(patch.color)
		.execute(&self.pool)
		.await?;

		Ok(())
	}

	async fn delete_team(&self, team_id: i64) -> Result<()> {
		let mut transaction = self.pool.begin().await?;

		sqlx::query("DELETE FROM todo_assignments WHERE todo_id IN (SELECT id FROM todos WHERE team_id = $1)")
			.bind(team_id)
			.execute(&mut *transaction)
			.await?;

		sqlx::query("DELETE FROM todos WHERE team_id = $1")
			.bind(team_id)
			.execute(&mut *transaction)
			.await?;

		sqlx::query("DELETE FROM team_members WHERE team_id = $1")
			.bind(team_id)
			.execute(&mut *transaction)
			.await?;

		sqlx::query("DELETE FROM teams WHERE id = $1")
			.bind(team_id)
			.execute(&mut *transaction)
			.await?;

		transaction.commit().await?;

		Ok(())
	}

	async fn member_role(&self, team_id: i64, user_id: i64) -> Result<Option<TeamRole>> {
		Ok(
			sqlx::query_scalar("SELECT role FROM team_members WHERE team_id = $1 AND user_id = $2")
				.bind(team_id)
				.bind(user_id)
				.fetch_optional(&self.pool)
				.await?,
		)
	}

	async fn team_members(&self, team_id: i64) -> Result<Vec<TeamMember>> {
		Ok(sqlx::query_as(
			r#"
			SELECT
				u.id AS user_id,
				u.username,
				u.email,
				tm.role,
				tm.joined_at
			FROM
				team_members tm
				INNER JOIN users u ON tm.user_id = u.id
			WHERE
				tm.team_id = $1
			ORDER BY
				tm.role DESC,
				tm.joined_at ASC,
				tm.id ASC
			"#,
		)
		.bind(team_id)
		.fetch_all(&self.pool)
		.await?)
	}

	async fn team_member_ids(&self, team_id: i64, user_ids: &[i64]) -> Result<Vec<i64>> {
		Ok(
			sqlx::query_scalar("SELECT user_id FROM team_members WHERE team_id = $1 AND user_id = ANY($2)")
				.bind(team_id)
				.bind(user_ids)
				.fetch_all(&self.pool)
				.await?,
		)
	}

	async fn add_member(&self, team_id: i64, user_id: i64, role: TeamRole) -> Result<()> {
		sqlx::query("INSERT INTO team_members (team_id, user_id, role) VALUES ($1, $2, $3)")
			.bind(team_id)
			.bind(user_id)
			.bind(role)
			.execute(&self.pool)
			.await
			.map_err(|err| conflict_on_unique(err, "team member"))?;

		Ok(())
	}

	async fn remove_member(&self, team_id: i64, user_id: i64) -> Result<()> {
		let mut transaction = self.pool.begin().await?;

		sqlx::query(
			r#"
			DELETE FROM todo_assignments
			WHERE
				user_id = $1
				AND todo_id IN (SELECT id FROM todos WHERE team_id = $2)
			"#,
		)
		.bind(user_id)
		.bind(team_id)
		.execute(&mut *transaction)
		.await?;

		sqlx::query("DELETE FROM team_members WHERE team_id = $1 AND user_id = $2")
			.bind(team_id)
			.bind(user_id)
			.execute(&mut *transaction)
			.await?;

		transaction.commit().await?;

		Ok(())
	}

	async fn todos_for_user(&self, user_id: i64, team_id: Option<i64>) -> Result<Vec<TodoWithCreator>> {
		Ok(sqlx::query_as(
			r#"
			SELECT DISTINCT
				t.*,
				u.username AS creator_name,
				u.email AS creator_email
			FROM
				todos t
				INNER JOIN users u ON t.user_id = u.id
				LEFT JOIN todo_assignments ta ON t.id = ta.todo_id
			WHERE
				(t.user_id = $1 OR ta.user_id = $1)
				AND ($2::BIGINT IS NULL OR t.team_id = $2)
			ORDER BY
				t.created_at DESC,
				t.id DESC
			"#,
		)
		.bind(user_id)
		.bind(team_id)
		.fetch_all(&self.pool)
		.await?)
	}

	async fn todo_assignees(&self, todo_id: i64) -> Result<Vec<Assignee>> {
		Ok(sqlx::query_as(
			r#"
			SELECT
				u.id AS user_id,
				u.username,
				u.email
			FROM
				todo_assignments ta
				INNER JOIN users u ON ta.user_id = u.id
			WHERE
				ta.todo_id = $1
			ORDER BY
				ta.id
			"#,
		)
		.bind(todo_id)
		.fetch_all(&self.pool)
		.await?)
	}

	async fn create_todo(&self, creator: i64, todo: NewTodo, assignees: &[i64]) -> Result<Todo> {
		let mut transaction = self.pool.begin().await?;

		let todo: Todo = sqlx::query_as(
			r#"
			INSERT INTO todos (user_id, team_id, title, content, priority, start_date, due_date)
			VALUES ($1, $2, $3, $4, $5, $6, $7)
			RETURNING *
			"#,
		)
		.bind(creator)
		.bind(todo.team_id)
		.bind(todo.title)
		.bind(todo.content)
		.bind(todo.priority)
		.bind(todo.start_date)
		.bind(todo.due_date)
		.fetch_one(&mut *transaction)
		.await?;

		sqlx::query(
			r#"
			INSERT INTO todo_assignments (todo_id, user_id)
			SELECT $1, UNNEST($2::BIGINT[])
			ON CONFLICT DO NOTHING
			"#,
		)
		.bind(todo.id)
		.bind(assignees)
		.execute(&mut *transaction)
		.await?;

		transaction.commit().await?;

		Ok(todo)
	}

	async fn visible_todo(&self, todo_id: i64, user_id: i64) -> Result<Option<Todo>> {
		Ok(sqlx::query_as(
			r#"
			SELECT
				t.*
			FROM
				todos t
			WHERE
				t.id = $1
				AND (
					t.user_id = $2
					OR EXISTS (SELECT 1 FROM todo_assignments ta WHERE ta.todo_id = t.id AND ta.user_id = $2)
				)
			"#,
		)
		.bind(todo_id)
		.bind(user_id)
		.fetch_optional(&self.pool)
		.await?)
	}

	async fn update_todo(&self, todo_id: i64, patch: TodoPatch, assignees: Option<&[i64]>) -> Result<()> {
		let mut transaction = self.pool.begin().await?;

		if !patch.is_empty() {
			sqlx::query(
				r#"
				UPDATE todos
				SET
					title = COALESCE($2, title),
					content = COALESCE($3, content),
					priority = COALESCE($4, priority),
					completed = COALESCE($5, completed),
					start_date = CASE WHEN $6 THEN $7 ELSE start_date END,
					due_date = CASE WHEN $8 THEN $9 ELSE due_date END
				WHERE
					id = $1
				"#,
			)
			.bind(todo_id)
			.bind(patch.title)
			.bind(patch.content)
			.bind(patch.priority)
			.bind(patch.completed)
			.bind(patch.start_date.is_some())
			.bind(patch.start_date.flatten())
			.bind(patch.due_date.is_some())
			.bind(patch.due_date.flatten())
			.execute(&mut *transaction)
			.await?;
		}

		if let Some(assignees) = assignees {
			sqlx::query("DELETE FROM todo_assignments WHERE todo_id = $1")
				.bind(todo_id)
				.execute(&mut *transaction)
				.await?;

			sqlx::query(
				r#"
				INSERT INTO todo_assignments (todo_id, user_id)
				SELECT $1, UNNEST($2::BIGINT[])
				ON CONFLICT DO NOTHING
				"#,
			)
			.bind(todo_id)
			.bind(assignees)
			.execute(&mut *transaction)
			.await?;
		}

		transaction.commit().await?;

		Ok(())
	}

	async fn delete_todo(&self, todo_id: i64, creator: i64) -> Result<bool> {
		let mut transaction = self.pool.begin().await?;

		sqlx::query(
			r#"
			DELETE FROM todo_assignments ta
			USING todos t
			WHERE
				ta.todo_id = t.id
				AND t.id = $1
				AND t.user_id = $2
			"#,
		)
		.bind(todo_id)
		.bind(creator)
		.execute(&mut *transaction)
		.await?;

		let result = sqlx::query("DELETE FROM todos WHERE id = $1 AND user_id = $2")
			.bind(todo_id)
			.bind(creator)
			.execute(&mut *transaction)
			.await?;

		transaction.commit().await?;

		Ok(result.rows_affected() > 0)
	}
}

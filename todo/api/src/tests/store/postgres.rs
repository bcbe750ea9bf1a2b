use chrono::NaiveDate;

use crate::database::{NewTeam, NewTodo, NewUser, Priority, TeamPatch, TeamRole, TodoPatch, DEFAULT_TEAM_COLOR};
use crate::store::{PgStore, Store, StoreError};

async fn connect() -> PgStore {
	dotenvy::dotenv().ok();

	let pool = sqlx::PgPool::connect(&std::env::var("DATABASE_URL").expect("DATABASE_URL not set"))
		.await
		.expect("failed to connect to database");

	let store = PgStore::new(pool);
	store.migrate().await.expect("failed to run migrations");

	sqlx::query("TRUNCATE users, teams, team_members, todos, todo_assignments RESTART IDENTITY CASCADE")
		.execute(store.pool())
		.await
		.expect("failed to clear tables");

	store
}

async fn user(store: &PgStore, name: &str) -> i64 {
	store
		.create_user(NewUser {
			username: name.to_string(),
			email: format!("{name}@example.com"),
			password_hash: "hash".to_string(),
		})
		.await
		.expect("failed to create user")
		.id
}

async fn count(store: &PgStore, query: &str, team_id: i64) -> i64 {
	sqlx::query_scalar(query)
		.bind(team_id)
		.fetch_one(store.pool())
		.await
		.expect("failed to count rows")
}

fn new_todo(team_id: Option<i64>, title: &str) -> NewTodo {
	NewTodo {
		team_id,
		title: title.to_string(),
		content: String::new(),
		priority: Priority::High,
		start_date: None,
		due_date: NaiveDate::from_ymd_opt(2024, 5, 1),
	}
}

#[tokio::test]
#[serial_test::serial]
#[ignore = "requires DATABASE_URL"]
async fn test_pg_store_team_lifecycle() {
	let store = connect().await;

	let alice = user(&store, "alice").await;
	let bob = user(&store, "bob").await;

	let err = store
		.create_user(NewUser {
			username: "alice".to_string(),
			email: "other@example.com".to_string(),
			password_hash: "hash".to_string(),
		})
		.await
		.expect_err("duplicate username accepted");
	assert!(matches!(err, StoreError::Conflict(_)));

	let team = store
		.create_team(
			alice,
			NewTeam {
				name: "Eng".to_string(),
				description: String::new(),
				color: DEFAULT_TEAM_COLOR.to_string(),
			},
		)
		.await
		.expect("failed to create team");

	assert_eq!(store.member_role(team.id, alice).await.unwrap(), Some(TeamRole::Owner));

	store.add_member(team.id, bob, TeamRole::Member).await.unwrap();
	assert!(matches!(
		store.add_member(team.id, bob, TeamRole::Member).await,
		Err(StoreError::Conflict(_))
	));

	let members = store.team_members(team.id).await.unwrap();
	assert_eq!(members.len(), 2);
	assert_eq!(members[0].role, TeamRole::Owner);

	let teams = store.teams_for_user(bob).await.unwrap();
	assert_eq!(teams.len(), 1);
	assert_eq!(teams[0].role, TeamRole::Member);
	assert_eq!(teams[0].member_count, 2);

	store
		.update_team(
			team.id,
			TeamPatch {
				name: Some("Platform".to_string()),
				..Default::default()
			},
		)
		.await
		.unwrap();
	assert_eq!(store.teams_for_user(alice).await.unwrap()[0].team.name, "Platform");

	let todo = store
		.create_todo(alice, new_todo(Some(team.id), "ship it"), &[bob, alice])
		.await
		.unwrap();
	assert_eq!(store.todo_assignees(todo.id).await.unwrap().len(), 2);

	store.remove_member(team.id, bob).await.unwrap();
	assert_eq!(store.member_role(team.id, bob).await.unwrap(), None);
	assert!(store.visible_todo(todo.id, bob).await.unwrap().is_none());

	store.delete_team(team.id).await.unwrap();

	for query in [
		"SELECT COUNT(*) FROM team_members WHERE team_id = $1",
		"SELECT COUNT(*) FROM todos WHERE team_id = $1",
		"SELECT COUNT(*) FROM todo_assignments a JOIN todos t ON t.id = a.todo_id WHERE t.team_id = $1",
		"SELECT COUNT(*) FROM teams WHERE id = $1",
	] {
		assert_eq!(count(&store, query, team.id).await, 0, "{query}");
	}

	let orphans: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM todo_assignments WHERE todo_id = $1")
		.bind(todo.id)
		.fetch_one(store.pool())
		.await
		.unwrap();
	assert_eq!(orphans, 0);
}

#[tokio::test]
#[serial_test::serial]
#[ignore = "requires DATABASE_URL"]
async fn test_pg_store_todos() {
	let store = connect().await;

	let alice = user(&store, "alice").await;
	let bob = user(&store, "bob").await;

	let team = store
		.create_team(
			alice,
			NewTeam {
				name: "Eng".to_string(),
				description: String::new(),
				color: DEFAULT_TEAM_COLOR.to_string(),
			},
		)
		.await
		.unwrap();
	store.add_member(team.id, bob, TeamRole::Member).await.unwrap();

	let personal = store.create_todo(alice, new_todo(None, "personal"), &[]).await.unwrap();
	let shared = store
		.create_todo(alice, new_todo(Some(team.id), "shared"), &[alice, bob])
		.await
		.unwrap();

	let todos = store.todos_for_user(alice, None).await.unwrap();
	assert_eq!(
		todos.iter().map(|t| t.todo.id).collect::<Vec<_>>(),
		vec![shared.id, personal.id]
	);
	assert_eq!(todos[0].creator_name, "alice");

	let todos = store.todos_for_user(bob, None).await.unwrap();
	assert_eq!(todos.len(), 1);

	let todos = store.todos_for_user(alice, Some(team.id)).await.unwrap();
	assert_eq!(todos.len(), 1);

	store
		.update_todo(
			shared.id,
			TodoPatch {
				completed: Some(true),
				due_date: Some(None),
				..Default::default()
			},
			Some(&[bob]),
		)
		.await
		.unwrap();

	let todo = store.visible_todo(shared.id, bob).await.unwrap().expect("todo not visible");
	assert!(todo.completed);
	assert_eq!(todo.due_date, None);
	assert_eq!(todo.title, "shared");
	assert!(store.visible_todo(shared.id, alice).await.unwrap().is_some());

	let assignees = store.todo_assignees(shared.id).await.unwrap();
	assert_eq!(assignees.len(), 1);
	assert_eq!(assignees[0].user_id, bob);

	assert!(!store.delete_todo(shared.id, bob).await.unwrap());
	assert!(store.delete_todo(shared.id, alice).await.unwrap());
	assert!(store.visible_todo(shared.id, bob).await.unwrap().is_none());
}

async fn total(store: &PgStore, table: &str) -> i64 {
	sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {table}"))
		.fetch_one(store.pool())
		.await
		.expect("failed to count rows")
}

fn foreign_key_violation(err: &StoreError) -> bool {
	matches!(err, StoreError::Database(sqlx::Error::Database(db)) if db.is_foreign_key_violation())
}

#[tokio::test]
#[serial_test::serial]
#[ignore = "requires DATABASE_URL"]
async fn test_pg_store_failed_mutations_roll_back() {
	let store = connect().await;

	let alice = user(&store, "alice").await;
	let missing = alice + 1000;

	let err = store
		.create_team(
			missing,
			NewTeam {
				name: "Ghost".to_string(),
				description: String::new(),
				color: DEFAULT_TEAM_COLOR.to_string(),
			},
		)
		.await
		.expect_err("team created for a missing owner");
	assert!(foreign_key_violation(&err), "{err:?}");
	assert_eq!(total(&store, "teams").await, 0);
	assert_eq!(total(&store, "team_members").await, 0);

	let team = store
		.create_team(
			alice,
			NewTeam {
				name: "Eng".to_string(),
				description: String::new(),
				color: DEFAULT_TEAM_COLOR.to_string(),
			},
		)
		.await
		.unwrap();

	// The todo row is written before the assignment that fails.
	let err = store
		.create_todo(alice, new_todo(Some(team.id), "doomed"), &[alice, missing])
		.await
		.expect_err("todo created with a missing assignee");
	assert!(foreign_key_violation(&err), "{err:?}");
	assert_eq!(total(&store, "todos").await, 0);
	assert_eq!(total(&store, "todo_assignments").await, 0);

	let todo = store
		.create_todo(alice, new_todo(Some(team.id), "kept"), &[alice])
		.await
		.unwrap();

	let err = store
		.update_todo(
			todo.id,
			TodoPatch {
				title: Some("renamed".to_string()),
				completed: Some(true),
				..Default::default()
			},
			Some(&[missing]),
		)
		.await
		.expect_err("assignees replaced with a missing user");
	assert!(foreign_key_violation(&err), "{err:?}");

	let todo = store.visible_todo(todo.id, alice).await.unwrap().expect("todo lost");
	assert_eq!(todo.title, "kept");
	assert!(!todo.completed);

	let assignees = store.todo_assignees(todo.id).await.unwrap();
	assert_eq!(assignees.len(), 1);
	assert_eq!(assignees[0].user_id, alice);
}

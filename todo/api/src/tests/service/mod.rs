use crate::database::{NewTeam, NewTodo, Priority, DEFAULT_TEAM_COLOR};
use crate::service::TeamService;
use crate::tests::store::MemoryStore;

mod account;

async fn create_team(store: &MemoryStore, owner: i64, name: &str) -> i64 {
	TeamService::new(store)
		.create(
			owner,
			NewTeam {
				name: name.to_string(),
				description: String::new(),
				color: DEFAULT_TEAM_COLOR.to_string(),
			},
		)
		.await
		.expect("failed to create team")
		.team
		.id
}

async fn add_member(store: &MemoryStore, team_id: i64, owner: i64, username: &str) {
	TeamService::new(store)
		.add_member(team_id, owner, &format!("{username}@example.com"))
		.await
		.expect("failed to add member");
}

fn new_todo(team_id: Option<i64>, title: &str) -> NewTodo {
	NewTodo {
		team_id,
		title: title.to_string(),
		content: format!("{title} content"),
		priority: Priority::default(),
		start_date: None,
		due_date: None,
	}
}

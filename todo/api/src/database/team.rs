use chrono::{DateTime, Utc};

/// Color given to teams created without one.
pub const DEFAULT_TEAM_COLOR: &str = "#667eea";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, sqlx::Type, serde::Serialize, serde::Deserialize)]
#[sqlx(type_name = "team_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TeamRole {
	Member,
	/// Can manage membership and delete the team.
	Owner,
}

#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow, serde::Serialize)]
pub struct Team {
	pub id: i64,
	pub name: String,
	pub description: String,
	/// Hex color, `#rrggbb`.
	pub color: String,
	/// The user who created the team. Ownership afterwards is tracked through
	/// the membership role, not this column.
	pub created_by: i64,
	pub created_at: DateTime<Utc>,
}

/// A team as seen by one of its members.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow, serde::Serialize)]
pub struct TeamSummary {
	#[sqlx(flatten)]
	#[serde(flatten)]
	pub team: Team,
	/// The viewer's role.
	pub role: TeamRole,
	pub member_count: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow, serde::Serialize)]
pub struct TeamMember {
	pub user_id: i64,
	pub username: String,
	pub email: String,
	pub role: TeamRole,
	pub joined_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTeam {
	pub name: String,
	pub description: String,
	pub color: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TeamPatch {
	pub name: Option<String>,
	pub description: Option<String>,
	pub color: Option<String>,
}

impl TeamPatch {
	pub fn is_empty(&self) -> bool {
		self.name.is_none() && self.description.is_none() && self.color.is_none()
	}
}

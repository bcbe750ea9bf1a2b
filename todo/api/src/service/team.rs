use crate::database::{NewTeam, TeamMember, TeamPatch, TeamRole, TeamSummary, UserInfo};
use crate::service::{ErrorKind, ServiceError};
use crate::store::{Store, StoreError};

#[derive(Debug, thiserror::Error)]
pub enum TeamError {
	#[error("you are not a member of this team")]
	NotMember,
	#[error("only the team owner can {0}")]
	OwnerRequired(&'static str),
	#[error("nothing to update")]
	NothingToUpdate,
	#[error("no user with this email")]
	UserNotFound,
	#[error("user is already a member of this team")]
	AlreadyMember,
	#[error("member not found")]
	MemberNotFound,
	#[error("the team owner cannot be removed")]
	CannotRemoveOwner,
	#[error(transparent)]
	Store(#[from] StoreError),
}

impl ServiceError for TeamError {
	fn kind(&self) -> ErrorKind {
		match self {
			Self::NotMember | Self::OwnerRequired(_) => ErrorKind::Forbidden,
			Self::NothingToUpdate | Self::CannotRemoveOwner => ErrorKind::BadRequest,
			Self::UserNotFound | Self::MemberNotFound => ErrorKind::NotFound,
			Self::AlreadyMember => ErrorKind::Conflict,
			Self::Store(_) => ErrorKind::ServerError,
		}
	}
}

pub struct TeamService<'a, S> {
	store: &'a S,
}

impl<'a, S: Store> TeamService<'a, S> {
	pub fn new(store: &'a S) -> Self {
		Self { store }
	}

	async fn role(&self, team_id: i64, user_id: i64) -> Result<TeamRole, TeamError> {
		self.store.member_role(team_id, user_id).await?.ok_or_else(|| {
			tracing::debug!(team_id, user_id, "caller is not a team member");
			TeamError::NotMember
		})
	}

	async fn require_owner(&self, team_id: i64, user_id: i64, action: &'static str) -> Result<(), TeamError> {
		match self.store.member_role(team_id, user_id).await? {
			Some(TeamRole::Owner) => Ok(()),
			role => {
				tracing::debug!(team_id, user_id, ?role, action, "owner role required");
				Err(TeamError::OwnerRequired(action))
			}
		}
	}

	pub async fn list(&self, caller: i64) -> Result<Vec<TeamSummary>, TeamError> {
		Ok(self.store.teams_for_user(caller).await?)
	}

	/// Creates the team with the caller as its owner.
	pub async fn create(&self, caller: i64, team: NewTeam) -> Result<TeamSummary, TeamError> {
		let team = self.store.create_team(caller, team).await?;

		tracing::info!(team_id = team.id, owner = caller, "team created");

		Ok(TeamSummary {
			team,
			role: TeamRole::Owner,
			member_count: 1,
		})
	}

	/// Any member may edit the team details.
	pub async fn update(&self, team_id: i64, caller: i64, patch: TeamPatch) -> Result<(), TeamError> {
		self.role(team_id, caller).await?;

		if patch.is_empty() {
			return Err(TeamError::NothingToUpdate);
		}

		Ok(self.store.update_team(team_id, patch).await?)
	}

	pub async fn delete(&self, team_id: i64, caller: i64) -> Result<(), TeamError> {
		self.require_owner(team_id, caller, "delete the team").await?;

		self.store.delete_team(team_id).await?;

		tracing::info!(team_id, owner = caller, "team deleted");

		Ok(())
	}

	pub async fn members(&self, team_id: i64, caller: i64) -> Result<Vec<TeamMember>, TeamError> {
		self.role(team_id, caller).await?;

		Ok(self.store.team_members(team_id).await?)
	}

	/// Adds the user registered under `email` as a plain member.
	pub async fn add_member(&self, team_id: i64, caller: i64, email: &str) -> Result<UserInfo, TeamError> {
		self.require_owner(team_id, caller, "add members").await?;

		let user = self.store.user_by_email(email).await?.ok_or(TeamError::UserNotFound)?;

		if self.store.member_role(team_id, user.id).await?.is_some() {
			return Err(TeamError::AlreadyMember);
		}

		match self.store.add_member(team_id, user.id, TeamRole::Member).await {
			Ok(()) => {}
			// Lost a race against a concurrent add.
			Err(StoreError::Conflict(_)) => return Err(TeamError::AlreadyMember),
			Err(err) => return Err(err.into()),
		}

		tracing::info!(team_id, user_id = user.id, "team member added");

		Ok(UserInfo::from(&user))
	}

	/// Removes a non-owner member along with their assignments on the team's
	/// todos.
	pub async fn remove_member(&self, team_id: i64, caller: i64, target: i64) -> Result<(), TeamError> {
		self.require_owner(team_id, caller, "remove members").await?;

		match self.store.member_role(team_id, target).await? {
			None => return Err(TeamError::MemberNotFound),
			Some(TeamRole::Owner) => return Err(TeamError::CannotRemoveOwner),
			Some(TeamRole::Member) => {}
		}

		self.store.remove_member(team_id, target).await?;

		tracing::info!(team_id, user_id = target, "team member removed");

		Ok(())
	}
}

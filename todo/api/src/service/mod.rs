//! Authorization and integrity rules for accounts, teams and todos.
//!
//! Every check is derived from the store on each call, nothing about a
//! caller's role is cached between requests.

mod account;
mod team;
mod todo;

pub use account::{AccountError, AccountService};
pub use team::{TeamError, TeamService};
pub use todo::{TodoError, TodoService, TodoUpdate};

/// How a failure should be reported to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
	/// Missing or invalid input.
	BadRequest,
	/// No or invalid caller identity.
	Unauthorized,
	/// The caller lacks the role required for the target.
	Forbidden,
	/// The target does not exist or the caller cannot see it.
	NotFound,
	/// The target already exists.
	Conflict,
	/// The store failed.
	ServerError,
}

pub trait ServiceError: std::error::Error {
	fn kind(&self) -> ErrorKind;
}

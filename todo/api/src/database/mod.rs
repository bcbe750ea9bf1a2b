mod team;
mod todo;
mod user;

pub use team::*;
pub use todo::*;
pub use user::*;

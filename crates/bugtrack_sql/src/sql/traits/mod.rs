pub mod bug;
pub mod environment;
pub mod membership;
pub mod project;
pub mod user;

pub use bug::{BugListing, BugSqlLogic, BUG_TIE_BREAK_KEY};
pub use environment::EnvironmentSqlLogic;
pub use membership::MembershipSqlLogic;
pub use project::ProjectSqlLogic;
pub use user::UserSqlLogic;

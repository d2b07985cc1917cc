pub mod auth;
pub mod bug;
pub mod health;
pub mod home;
pub mod project;

pub use auth::*;
pub use bug::*;
pub use health::*;
pub use home::*;
pub use project::*;

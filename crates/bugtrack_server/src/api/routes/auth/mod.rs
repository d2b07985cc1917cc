pub mod middleware;
pub mod route;

pub use middleware::{login_required, CurrentUser, SESSION_COOKIE};
pub use route::*;

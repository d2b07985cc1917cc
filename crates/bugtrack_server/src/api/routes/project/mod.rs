pub mod route;
pub mod schema;

pub use route::*;

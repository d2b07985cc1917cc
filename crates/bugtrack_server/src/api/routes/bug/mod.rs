pub mod feed;
pub mod route;
pub mod schema;

pub use route::*;

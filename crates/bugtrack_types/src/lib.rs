pub mod contracts;
pub mod role;

pub use contracts::{Alive, JwtToken, LoginRequest, ServerErrorBody, ValidationErrors};
pub use role::Role;

pub mod auth;
pub mod error;
pub mod permission;
pub mod strategy;

pub use auth::{AuthManager, Claims};
pub use error::AuthError;
pub use permission::{
    admin_login_required, membership_required, owner_login_required, RoleRequirement,
};
pub use strategy::{build_strategy, AuthStrategy, AuthStrategyKind, Credentials};

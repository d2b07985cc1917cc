use bugtrack_types::Role;
use password_auth::VerifyError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("No credentials provided")]
    MissingCredentials,

    #[error("Invalid username provided")]
    InvalidUser,

    #[error("User account is inactive")]
    InactiveUser,

    #[error("Invalid password provided")]
    InvalidPassword(#[source] VerifyError),

    #[error("JWT token provided is invalid")]
    InvalidJwtToken(#[source] jsonwebtoken::errors::Error),

    #[error("Failed to encode JWT token")]
    EncodeJwtError(#[source] jsonwebtoken::errors::Error),

    #[error("Unknown authentication strategy: {0}")]
    UnknownStrategy(String),

    #[error("No role on this project")]
    NotAMember,

    #[error("Role {actual} is not allowed, {required} required")]
    InsufficientRole { actual: Role, required: &'static str },
}

impl AuthError {
    /// Authorization failures, as opposed to failures to identify the actor
    pub fn is_forbidden(&self) -> bool {
        matches!(
            self,
            AuthError::NotAMember | AuthError::InsufficientRole { .. }
        )
    }
}

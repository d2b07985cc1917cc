use crate::sql::pagination::PaginationError;
use sqlx::Error as SqlxError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SqlError {
    #[error(transparent)]
    SqlxError(#[from] SqlxError),

    #[error("Failed to run migrations: {0}")]
    MigrationError(String),

    #[error(transparent)]
    PaginationError(#[from] PaginationError),

    #[error("Invalid role stored for membership: {0}")]
    InvalidRoleError(String),
}

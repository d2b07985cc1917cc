use crate::sql::error::SqlError;
use crate::sql::query::Queries;
use crate::sql::schema::User;

use async_trait::async_trait;
use sqlx::{Pool, Postgres};
use tracing::error;

#[async_trait]
pub trait UserSqlLogic {
    /// Inserts a new user into the database.
    ///
    /// # Arguments
    /// * `pool` - The database connection pool
    /// * `username` - Unique login name
    /// * `password_hash` - PHC string produced by `password_auth::generate_hash`
    ///
    /// # Returns
    /// * The stored user
    async fn insert_user(
        pool: &Pool<Postgres>,
        username: &str,
        password_hash: &str,
    ) -> Result<User, SqlError> {
        let query = Queries::InsertUser.get_query();

        let user: User = sqlx::query_as(query)
            .bind(username)
            .bind(password_hash)
            .bind(true)
            .fetch_one(pool)
            .await
            .inspect_err(|e| error!("Failed to insert user: {:?}", e))?;

        Ok(user)
    }

    /// Retrieves a user from the database by username.
    ///
    /// # Returns
    /// * The user if found, or None
    async fn get_user(pool: &Pool<Postgres>, username: &str) -> Result<Option<User>, SqlError> {
        let query = Queries::GetUser.get_query();

        let user: Option<User> = sqlx::query_as(query)
            .bind(username)
            .fetch_optional(pool)
            .await?;

        Ok(user)
    }
}

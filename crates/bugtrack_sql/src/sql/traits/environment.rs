use crate::sql::error::SqlError;
use crate::sql::query::Queries;
use crate::sql::schema::Environment;

use async_trait::async_trait;
use sqlx::{Pool, Postgres};
use tracing::error;

#[async_trait]
pub trait EnvironmentSqlLogic {
    async fn insert_environment(
        pool: &Pool<Postgres>,
        project_id: i64,
        name: &str,
    ) -> Result<Environment, SqlError> {
        let query = Queries::InsertEnvironment.get_query();

        let environment: Environment = sqlx::query_as(query)
            .bind(project_id)
            .bind(name)
            .fetch_one(pool)
            .await
            .inspect_err(|e| error!("Failed to insert environment: {:?}", e))?;

        Ok(environment)
    }

    /// Looks up a project's environment by name
    async fn get_environment(
        pool: &Pool<Postgres>,
        project_id: i64,
        name: &str,
    ) -> Result<Option<Environment>, SqlError> {
        let query = Queries::GetEnvironment.get_query();

        let environment: Option<Environment> = sqlx::query_as(query)
            .bind(project_id)
            .bind(name)
            .fetch_optional(pool)
            .await?;

        Ok(environment)
    }
}

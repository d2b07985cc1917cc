use crate::sql::error::SqlError;
use crate::sql::query::Queries;
use crate::sql::schema::Project;

use async_trait::async_trait;
use sqlx::{Pool, Postgres};
use tracing::error;

#[async_trait]
pub trait ProjectSqlLogic {
    async fn insert_project(
        pool: &Pool<Postgres>,
        slug: &str,
        name: &str,
        owner_id: i64,
        default_environment: Option<&str>,
    ) -> Result<Project, SqlError> {
        let query = Queries::InsertProject.get_query();

        let project: Project = sqlx::query_as(query)
            .bind(slug)
            .bind(name)
            .bind(owner_id)
            .bind(default_environment)
            .fetch_one(pool)
            .await
            .inspect_err(|e| error!("Failed to insert project: {:?}", e))?;

        Ok(project)
    }

    /// Looks up a project by its URL slug
    async fn get_project_by_slug(
        pool: &Pool<Postgres>,
        slug: &str,
    ) -> Result<Option<Project>, SqlError> {
        let query = Queries::GetProjectBySlug.get_query();

        let project: Option<Project> = sqlx::query_as(query)
            .bind(slug)
            .fetch_optional(pool)
            .await?;

        Ok(project)
    }

    async fn update_project(pool: &Pool<Postgres>, project: &Project) -> Result<(), SqlError> {
        let query = Queries::UpdateProject.get_query();

        sqlx::query(query)
            .bind(&project.name)
            .bind(&project.default_environment)
            .bind(project.id)
            .execute(pool)
            .await
            .inspect_err(|e| error!("Failed to update project: {:?}", e))?;

        Ok(())
    }

    async fn delete_project(pool: &Pool<Postgres>, project_id: i64) -> Result<(), SqlError> {
        let query = Queries::DeleteProject.get_query();

        sqlx::query(query)
            .bind(project_id)
            .execute(pool)
            .await
            .inspect_err(|e| error!("Failed to delete project: {:?}", e))?;

        Ok(())
    }
}

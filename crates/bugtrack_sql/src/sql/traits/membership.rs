use crate::sql::error::SqlError;
use crate::sql::query::Queries;

use async_trait::async_trait;
use bugtrack_types::Role;
use sqlx::{Pool, Postgres};
use std::str::FromStr;
use tracing::error;

#[async_trait]
pub trait MembershipSqlLogic {
    /// Grants `role` on a project, replacing any existing role
    async fn insert_membership(
        pool: &Pool<Postgres>,
        user_id: i64,
        project_id: i64,
        role: Role,
    ) -> Result<(), SqlError> {
        let query = Queries::InsertMembership.get_query();

        sqlx::query(query)
            .bind(user_id)
            .bind(project_id)
            .bind(role.to_string())
            .execute(pool)
            .await
            .inspect_err(|e| error!("Failed to insert membership: {:?}", e))?;

        Ok(())
    }

    /// Resolves a user's role on a project.
    ///
    /// The project owner is always `Role::Owner`; everyone else gets the role
    /// stored on their membership, or `None` without one.
    async fn get_role(
        pool: &Pool<Postgres>,
        user_id: i64,
        project_id: i64,
    ) -> Result<Option<Role>, SqlError> {
        let query = Queries::GetMembershipRole.get_query();

        let role: Option<Option<String>> = sqlx::query_scalar(query)
            .bind(user_id)
            .bind(project_id)
            .fetch_optional(pool)
            .await?;

        role.flatten()
            .map(|r| Role::from_str(&r).map_err(|_| SqlError::InvalidRoleError(r)))
            .transpose()
    }
}

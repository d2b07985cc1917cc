//! Resource lookups shared by the route handlers.
//!
//! Each lookup turns a missing row into `ApiError::RecordNotFound`.

use crate::api::error::ApiError;
use crate::api::state::AppState;
use bugtrack_auth::RoleRequirement;
use bugtrack_sql::sql::schema::{Bug, Environment, Project, User};
use bugtrack_sql::sql::traits::{
    BugSqlLogic, EnvironmentSqlLogic, MembershipSqlLogic, ProjectSqlLogic,
};
use bugtrack_sql::PostgresClient;
use bugtrack_types::Role;
use tracing::debug;

pub async fn find_project(state: &AppState, slug: &str) -> Result<Project, ApiError> {
    PostgresClient::get_project_by_slug(&state.db_pool, slug)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("Project {}", slug)))
}

pub async fn find_environment(
    state: &AppState,
    project: &Project,
    name: &str,
) -> Result<Environment, ApiError> {
    PostgresClient::get_environment(&state.db_pool, project.id, name)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("Environment {}", name)))
}

/// Bug numbers arrive as path text; anything that is not a number cannot exist
pub fn bug_number(raw: &str) -> Result<i64, ApiError> {
    raw.parse()
        .map_err(|_| ApiError::not_found(format!("Bug {}", raw)))
}

pub async fn find_bug(
    state: &AppState,
    environment: &Environment,
    number: i64,
) -> Result<Bug, ApiError> {
    PostgresClient::get_bug(&state.db_pool, environment.id, number)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("Bug {}", number)))
}

/// The user's role on the project, owners included
pub async fn role(state: &AppState, user: &User, project: &Project) -> Result<Option<Role>, ApiError> {
    if project.owner_id == user.id {
        return Ok(Some(Role::Owner));
    }

    Ok(PostgresClient::get_role(&state.db_pool, user.id, project.id).await?)
}

/// Resolves the user's role and applies a role gate to it
pub async fn authorize(
    state: &AppState,
    user: &User,
    project: &Project,
    requirement: RoleRequirement,
) -> Result<Role, ApiError> {
    let role = role(state, user, project).await?;

    requirement.check(role).map_err(|e| {
        debug!("{} denied on {}: {}", user.username, project.slug, e);
        ApiError::from(e)
    })
}

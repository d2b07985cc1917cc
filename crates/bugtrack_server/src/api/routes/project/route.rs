use crate::api::error::ApiError;
use crate::api::flash::{set_flash, take_flash};
use crate::api::format::Format;
use crate::api::lookup::{authorize, find_project};
use crate::api::params::{json_params, permitted, Params};
use crate::api::routes::auth::CurrentUser;
use crate::api::routes::project::schema::{ProjectResponse, ProjectUpdate, PROJECT_PARAMS};
use crate::api::state::AppState;
use crate::api::views::{escape, layout};
use anyhow::{Context, Result};
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::routing::get;
use axum::{Extension, Json, Router};
use axum_extra::extract::cookie::CookieJar;
use bugtrack_auth::RoleRequirement;
use bugtrack_sql::sql::schema::Project;
use bugtrack_sql::sql::traits::{EnvironmentSqlLogic, ProjectSqlLogic};
use bugtrack_sql::PostgresClient;
use bugtrack_types::{Role, ValidationErrors};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use tracing::{error, info, instrument};

fn project_page(project: &Project, role: Role, flash: Option<&str>) -> String {
    let environment = project
        .default_environment
        .as_deref()
        .map(|name| {
            format!(
                "<p><a href=\"/projects/{}/environments/{}/bugs\">{}</a></p>",
                escape(&project.slug),
                escape(name),
                escape(name)
            )
        })
        .unwrap_or_default();

    layout(
        &project.name,
        flash,
        &format!(
            "<h1>{}</h1>\n<p>Your role: {}</p>\n{}",
            escape(&project.name),
            role,
            environment
        ),
    )
}

/// A present `name` key must hold a non-blank string
fn apply_name(project: &mut Project, name: Option<&str>, errors: &mut ValidationErrors) {
    match name.map(str::trim).filter(|name| !name.is_empty()) {
        Some(name) => project.name = name.to_string(),
        None => errors.add("project", "name", "is required"),
    }
}

/// Applies an update to the project, collecting field errors
async fn apply_update(
    state: &AppState,
    project: &mut Project,
    update: ProjectUpdate,
) -> Result<(), ApiError> {
    let mut errors = ValidationErrors::new();

    if let Some(name) = update.name {
        apply_name(project, name.as_deref(), &mut errors);
    }

    match update.default_environment {
        Some(Some(name)) => {
            let exists = PostgresClient::get_environment(&state.db_pool, project.id, &name)
                .await?
                .is_some();

            if exists {
                project.default_environment = Some(name);
            } else {
                errors.add(
                    "project",
                    "default_environment",
                    "is not an environment of this project",
                );
            }
        }
        Some(None) => project.default_environment = None,
        None => {}
    }

    errors.into_result().map_err(ApiError::from)
}

#[instrument(skip_all)]
pub async fn get_project(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    format: Format,
    jar: CookieJar,
    Path(slug): Path<String>,
) -> Result<Response, ApiError> {
    let project = find_project(&state, &slug).await?;
    let role = authorize(&state, &user, &project, RoleRequirement::Membership).await?;

    match format {
        Format::Json => Ok(Json(ProjectResponse::new(&project, role)).into_response()),
        Format::Html => {
            let (jar, flash) = take_flash(jar);
            Ok((jar, Html(project_page(&project, role, flash.as_deref()))).into_response())
        }
        Format::Atom => Err(ApiError::NotAcceptable),
    }
}

/// Update a project's settings
///
/// Requires the admin role
#[instrument(skip_all)]
pub async fn update_project(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    format: Format,
    jar: CookieJar,
    Path(slug): Path<String>,
    body: Result<Json<Params>, JsonRejection>,
) -> Result<Response, ApiError> {
    let mut project = find_project(&state, &slug).await?;
    let role = authorize(&state, &user, &project, RoleRequirement::Admin).await?;

    if format == Format::Atom {
        return Err(ApiError::NotAcceptable);
    }

    let update: ProjectUpdate = permitted(json_params(body)?, PROJECT_PARAMS)?;
    apply_update(&state, &mut project, update).await?;

    PostgresClient::update_project(&state.db_pool, &project)
        .await
        .inspect_err(|e| error!("Failed to update project {}: {}", project.slug, e))?;

    info!("Project {} updated by {}", project.slug, user.username);

    match format {
        Format::Json => Ok(Json(ProjectResponse::new(&project, role)).into_response()),
        _ => Ok((
            set_flash(jar, "Project updated"),
            Redirect::to(&format!("/projects/{}", project.slug)),
        )
            .into_response()),
    }
}

/// Delete a project with all of its environments and bugs
///
/// Requires the owner role
#[instrument(skip_all)]
pub async fn delete_project(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    format: Format,
    jar: CookieJar,
    Path(slug): Path<String>,
) -> Result<Response, ApiError> {
    let project = find_project(&state, &slug).await?;
    authorize(&state, &user, &project, RoleRequirement::Owner).await?;

    if format == Format::Atom {
        return Err(ApiError::NotAcceptable);
    }

    PostgresClient::delete_project(&state.db_pool, project.id)
        .await
        .inspect_err(|e| error!("Failed to delete project {}: {}", project.slug, e))?;

    info!("Project {} deleted by {}", project.slug, user.username);

    match format {
        Format::Json => Ok(StatusCode::NO_CONTENT.into_response()),
        _ => Ok((set_flash(jar, "Project deleted"), Redirect::to("/")).into_response()),
    }
}

pub async fn get_project_router() -> Result<Router<Arc<AppState>>> {
    let result = catch_unwind(AssertUnwindSafe(|| {
        Router::new().route(
            "/projects/{slug}",
            get(get_project).patch(update_project).delete(delete_project),
        )
    }));

    match result {
        Ok(router) => Ok(router),
        Err(_) => {
            error!("Failed to create project router");
            Err(anyhow::anyhow!("Failed to create project router"))
                .context("Panic occurred while creating the router")
        }
    }
}

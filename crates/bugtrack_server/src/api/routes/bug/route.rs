use crate::api::error::ApiError;
use crate::api::flash::{set_flash, take_flash};
use crate::api::format::Format;
use crate::api::lookup::{authorize, bug_number, find_bug, find_environment, find_project};
use crate::api::markdown::MarkdownRenderer;
use crate::api::params::{json_params, permitted, Params};
use crate::api::routes::auth::CurrentUser;
use crate::api::routes::bug::feed::render_feed;
use crate::api::routes::bug::schema::{
    BugListQuery, BugPage, BugResponse, BugUpdate, BUG_PARAMS,
};
use crate::api::state::AppState;
use crate::api::views::{escape, layout};
use anyhow::{Context, Result};
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::header::CONTENT_TYPE;
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::routing::get;
use axum::{Extension, Json, Router};
use axum_extra::extract::cookie::CookieJar;
use bugtrack_auth::RoleRequirement;
use bugtrack_sql::sql::pagination::{Page, PageDirection};
use bugtrack_sql::sql::schema::{Bug, Project};
use bugtrack_sql::sql::traits::{BugListing, BugSqlLogic, MembershipSqlLogic};
use bugtrack_sql::PostgresClient;
use bugtrack_types::ValidationErrors;
use chrono::Utc;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use tracing::{debug, error, info, instrument};

fn bugs_path(slug: &str, environment: &str) -> String {
    format!("/projects/{}/environments/{}/bugs", slug, environment)
}

fn next_page_query(sort: &str, direction: PageDirection, last: i64, limit: i64) -> String {
    let dir = match direction {
        PageDirection::Ascending => "asc",
        PageDirection::Descending => "desc",
    };
    format!("?sort={}&dir={}&last={}&limit={}", sort, dir, last, limit)
}

fn bug_list_page(
    base: &str,
    title: &str,
    page: &Page<Bug>,
    next: Option<String>,
    flash: Option<&str>,
) -> String {
    let rows: String = page
        .items
        .iter()
        .map(|bug| {
            format!(
                "<tr><td><a href=\"{}/{}\">#{}</a></td><td>{}: {}</td><td>{}</td><td>{}</td></tr>\n",
                escape(base),
                bug.number,
                bug.number,
                escape(&bug.class_name),
                escape(&bug.message),
                bug.occurrences_count,
                bug.latest_occurrence.format("%Y-%m-%d %H:%M")
            )
        })
        .collect();

    let more = next
        .map(|query| format!("<p><a href=\"{}{}\">More</a></p>", escape(base), escape(&query)))
        .unwrap_or_default();

    layout(
        title,
        flash,
        &format!(
            "<h1>{}</h1>\n<table>\n{}</table>\n{}",
            escape(title),
            rows,
            more
        ),
    )
}

fn bug_page(bug: &Bug, renderer: &MarkdownRenderer, flash: Option<&str>) -> String {
    let notes = bug
        .notes
        .as_deref()
        .map(|notes| format!("<h2>Notes</h2>\n{}", renderer.render(notes)))
        .unwrap_or_default();

    let status = match (bug.fixed, bug.irrelevant) {
        (true, _) => "fixed",
        (false, true) => "irrelevant",
        (false, false) => "open",
    };

    layout(
        &bug.class_name,
        flash,
        &format!(
            "<h1>#{} {}</h1>\n<p>{}</p>\n<p>Status: {}, {} occurrences</p>\n{}\n{}",
            bug.number,
            escape(&bug.class_name),
            escape(&bug.message),
            status,
            bug.occurrences_count,
            renderer.render(&bug.description),
            notes
        ),
    )
}

/// Applies an update to the bug, collecting field errors
async fn apply_update(
    state: &AppState,
    project: &Project,
    bug: &mut Bug,
    update: BugUpdate,
) -> Result<(), ApiError> {
    let mut errors = ValidationErrors::new();

    if let Some(fixed) = update.fixed {
        bug.fixed = fixed;
    }

    if let Some(irrelevant) = update.irrelevant {
        bug.irrelevant = irrelevant;
    }

    if let Some(notes) = update.notes {
        bug.notes = notes.filter(|notes| !notes.trim().is_empty());
    }

    match update.assigned_user_id {
        Some(Some(user_id)) => {
            let is_member = user_id == project.owner_id
                || PostgresClient::get_role(&state.db_pool, user_id, project.id)
                    .await?
                    .is_some();

            if is_member {
                bug.assigned_user_id = Some(user_id);
            } else {
                errors.add(
                    "bug",
                    "assigned_user_id",
                    "is not a member of this project",
                );
            }
        }
        Some(None) => bug.assigned_user_id = None,
        None => {}
    }

    errors.into_result().map_err(ApiError::from)
}

/// One keyset page of an environment's bugs
///
/// `last` names the final bug of the previous page; omit it for the first page.
#[instrument(skip_all)]
pub async fn list_bugs(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    format: Format,
    jar: CookieJar,
    Path((slug, environment)): Path<(String, String)>,
    query: Result<Query<BugListQuery>, QueryRejection>,
) -> Result<Response, ApiError> {
    let Query(query) = query.map_err(|e| ApiError::BadRequest(e.body_text()))?;

    let project = find_project(&state, &slug).await?;
    authorize(&state, &user, &project, RoleRequirement::Membership).await?;
    let environment = find_environment(&state, &project, &environment).await?;

    let sort = query.sort_column()?;
    let direction = query.direction()?;
    let limit = state.config.http_settings.clamp_limit(query.limit);

    let after = match query.last {
        Some(number) => Some(find_bug(&state, &environment, number).await?),
        None => None,
    };

    let listing = BugListing {
        environment_id: environment.id,
        sort: &sort,
        direction,
        after: after.as_ref(),
        limit,
    };

    let page = PostgresClient::list_bugs(&state.db_pool, &listing).await?;

    debug!(
        "Listed {} bugs in {}/{}, has_more: {}",
        page.items.len(),
        project.slug,
        environment.name,
        page.has_more
    );

    match format {
        Format::Json => Ok(Json(BugPage::from(&page)).into_response()),
        Format::Atom => {
            let feed = render_feed(&project, &environment, &page.items, Utc::now());
            Ok(([(CONTENT_TYPE, Format::Atom.content_type())], feed).into_response())
        }
        Format::Html => {
            let base = bugs_path(&project.slug, &environment.name);
            let next = page
                .items
                .last()
                .filter(|_| page.has_more)
                .map(|bug| next_page_query(query.sort_name().unwrap_or_default(), direction, bug.number, limit));
            let title = format!("{} ({})", project.name, environment.name);
            let (jar, flash) = take_flash(jar);

            Ok((jar, Html(bug_list_page(&base, &title, &page, next, flash.as_deref()))).into_response())
        }
    }
}

#[instrument(skip_all)]
pub async fn get_bug(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    format: Format,
    jar: CookieJar,
    Path((slug, environment, number)): Path<(String, String, String)>,
) -> Result<Response, ApiError> {
    let project = find_project(&state, &slug).await?;
    authorize(&state, &user, &project, RoleRequirement::Membership).await?;
    let environment = find_environment(&state, &project, &environment).await?;
    let bug = find_bug(&state, &environment, bug_number(&number)?).await?;

    match format {
        Format::Json => Ok(Json(BugResponse::detailed(&bug, &state.markdown)).into_response()),
        Format::Html => {
            let (jar, flash) = take_flash(jar);
            Ok((jar, Html(bug_page(&bug, &state.markdown, flash.as_deref()))).into_response())
        }
        Format::Atom => Err(ApiError::NotAcceptable),
    }
}

/// Triage a bug: mark it fixed or irrelevant, assign it, or annotate it
#[instrument(skip_all)]
pub async fn update_bug(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    format: Format,
    jar: CookieJar,
    Path((slug, environment, number)): Path<(String, String, String)>,
    body: Result<Json<Params>, JsonRejection>,
) -> Result<Response, ApiError> {
    let project = find_project(&state, &slug).await?;
    authorize(&state, &user, &project, RoleRequirement::Membership).await?;
    let environment = find_environment(&state, &project, &environment).await?;
    let mut bug = find_bug(&state, &environment, bug_number(&number)?).await?;

    if format == Format::Atom {
        return Err(ApiError::NotAcceptable);
    }

    let update: BugUpdate = permitted(json_params(body)?, BUG_PARAMS)?;
    apply_update(&state, &project, &mut bug, update).await?;

    PostgresClient::update_bug(&state.db_pool, &bug)
        .await
        .inspect_err(|e| error!("Failed to update bug {}: {}", bug.number, e))?;

    info!(
        "Bug {} in {}/{} updated by {}",
        bug.number, project.slug, environment.name, user.username
    );

    match format {
        Format::Json => Ok(Json(BugResponse::detailed(&bug, &state.markdown)).into_response()),
        _ => Ok((
            set_flash(jar, "Bug updated"),
            Redirect::to(&format!(
                "{}/{}",
                bugs_path(&project.slug, &environment.name),
                bug.number
            )),
        )
            .into_response()),
    }
}

pub async fn get_bug_router() -> Result<Router<Arc<AppState>>> {
    let result = catch_unwind(AssertUnwindSafe(|| {
        Router::new()
            .route(
                "/projects/{slug}/environments/{environment}/bugs",
                get(list_bugs),
            )
            .route(
                "/projects/{slug}/environments/{environment}/bugs/{number}",
                get(get_bug).patch(update_bug),
            )
    }));

    match result {
        Ok(router) => Ok(router),
        Err(_) => {
            error!("Failed to create bug router");
            Err(anyhow::anyhow!("Failed to create bug router"))
                .context("Panic occurred while creating the router")
        }
    }
}

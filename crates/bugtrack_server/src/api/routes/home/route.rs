use crate::api::csrf::CsrfToken;
use crate::api::error::ApiError;
use crate::api::flash::take_flash;
use crate::api::format::Format;
use crate::api::routes::auth::CurrentUser;
use crate::api::state::AppState;
use crate::api::views::{escape, form_action, layout};
use anyhow::{Context, Result};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;
use axum::{Extension, Json, Router};
use axum_extra::extract::cookie::CookieJar;
use serde::Serialize;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

#[derive(Serialize, Debug)]
pub struct SessionResponse {
    pub username: String,
}

/// Landing page for signed-in users, also the target of flash redirects
pub async fn home(
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Extension(CsrfToken(token)): Extension<CsrfToken>,
    format: Format,
    jar: CookieJar,
) -> Result<Response, ApiError> {
    match format {
        Format::Json => Ok(Json(SessionResponse {
            username: user.username,
        })
        .into_response()),
        Format::Html => {
            let (jar, flash) = take_flash(jar);
            let body = format!(
                "<p>Signed in as {}</p>\n<form method=\"post\" action=\"{}\"><button type=\"submit\">Sign out</button></form>",
                escape(&user.username),
                form_action("/auth/logout", &token)
            );
            Ok((jar, Html(layout("Bugtrack", flash.as_deref(), &body))).into_response())
        }
        Format::Atom => Err(ApiError::NotAcceptable),
    }
}

pub async fn get_home_router() -> Result<Router<Arc<AppState>>> {
    let result = catch_unwind(AssertUnwindSafe(|| Router::new().route("/", get(home))));

    match result {
        Ok(router) => Ok(router),
        Err(_) => Err(anyhow::anyhow!("Failed to create home router"))
            .context("Panic occurred while creating the router"),
    }
}

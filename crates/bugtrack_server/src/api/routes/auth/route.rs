use crate::api::csrf::CsrfToken;
use crate::api::error::ApiError;
use crate::api::flash::{set_flash, take_flash};
use crate::api::format::Format;
use crate::api::routes::auth::middleware::SESSION_COOKIE;
use crate::api::state::AppState;
use crate::api::views::{form_action, layout};
use anyhow::{Context, Result};
use axum::extract::{FromRequest, Request, State};
use axum::http::header::CONTENT_TYPE;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::routing::{get, post};
use axum::{Extension, Form, Json, Router};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use bugtrack_sql::sql::traits::UserSqlLogic;
use bugtrack_sql::PostgresClient;
use bugtrack_types::{JwtToken, LoginRequest};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use tracing::{error, info, instrument};

const INVALID_LOGIN: &str = "Invalid username or password";

fn session_cookie(token: String) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build()
}

/// Accepts either a JSON body or an urlencoded form
async fn read_login(request: Request) -> Result<LoginRequest, ApiError> {
    let is_json = request
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.starts_with("application/json"));

    if is_json {
        Json::<LoginRequest>::from_request(request, &())
            .await
            .map(|Json(login)| login)
            .map_err(|e| ApiError::BadRequest(e.body_text()))
    } else {
        Form::<LoginRequest>::from_request(request, &())
            .await
            .map(|Form(login)| login)
            .map_err(|e| ApiError::BadRequest(e.body_text()))
    }
}

fn login_form(token: &str) -> String {
    format!(
        "<h1>Sign in</h1>\n<form method=\"post\" action=\"{}\">\n<input name=\"username\">\n<input name=\"password\" type=\"password\">\n<button type=\"submit\">Sign in</button>\n</form>",
        form_action("/auth/login", token)
    )
}

async fn authenticate(state: &AppState, login: &LoginRequest) -> Result<String, ApiError> {
    let user = PostgresClient::get_user(&state.db_pool, &login.username)
        .await?
        .ok_or_else(|| {
            error!("Login attempt for unknown user {}", login.username);
            ApiError::Unauthenticated
        })?;

    state
        .auth_manager
        .validate_user(&user, &login.password)
        .inspect_err(|e| error!("Login failed for {}: {}", user.username, e))?;

    Ok(state.auth_manager.generate_jwt(&user)?)
}

/// Bad credentials from the sign-in form bounce back to it with a flash
fn rejected_login(format: Format, jar: CookieJar, error: ApiError) -> Response {
    if format == Format::Html && matches!(error, ApiError::Unauthenticated) {
        (set_flash(jar, INVALID_LOGIN), error).into_response()
    } else {
        error.into_response()
    }
}

#[instrument(skip_all)]
pub async fn login_page(
    State(state): State<Arc<AppState>>,
    format: Format,
    jar: CookieJar,
    Extension(CsrfToken(token)): Extension<CsrfToken>,
) -> Result<Response, ApiError> {
    if !state.strategy.supports_password_login() {
        return Err(ApiError::not_found("Login"));
    }

    if format != Format::Html {
        return Err(ApiError::NotAcceptable);
    }

    let (jar, flash) = take_flash(jar);
    let page = layout("Sign in", flash.as_deref(), &login_form(&token));

    Ok((jar, Html(page)).into_response())
}

/// Exchange a username and password for a session
///
/// JSON clients receive the JWT in the body as well as the session cookie.
#[instrument(skip_all)]
pub async fn login(
    State(state): State<Arc<AppState>>,
    format: Format,
    jar: CookieJar,
    request: Request,
) -> Result<Response, ApiError> {
    if !state.strategy.supports_password_login() {
        return Err(ApiError::not_found("Login"));
    }

    let login = read_login(request).await?;

    let token = match authenticate(&state, &login).await {
        Ok(token) => token,
        Err(error) => return Ok(rejected_login(format, jar, error)),
    };
    let jar = jar.add(session_cookie(token.clone()));

    info!("User {} logged in", login.username);

    match format {
        Format::Json => Ok((jar, Json(JwtToken { token })).into_response()),
        _ => Ok((set_flash(jar, "Signed in"), Redirect::to("/")).into_response()),
    }
}

#[instrument(skip_all)]
pub async fn logout(format: Format, jar: CookieJar) -> Response {
    let jar = jar.remove(Cookie::build(SESSION_COOKIE).path("/"));

    match format {
        Format::Json => (jar, StatusCode::NO_CONTENT).into_response(),
        _ => (set_flash(jar, "Signed out"), Redirect::to("/login")).into_response(),
    }
}

pub async fn get_auth_router() -> Result<Router<Arc<AppState>>> {
    let result = catch_unwind(AssertUnwindSafe(|| {
        Router::new()
            .route("/login", get(login_page))
            .route("/auth/login", post(login))
            .route("/auth/logout", post(logout))
    }));

    match result {
        Ok(router) => Ok(router),
        Err(_) => {
            error!("Failed to create auth router");
            Err(anyhow::anyhow!("Failed to create auth router"))
                .context("Panic occurred while creating the router")
        }
    }
}

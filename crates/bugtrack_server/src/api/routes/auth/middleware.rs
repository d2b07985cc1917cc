use crate::api::error::ApiError;
use crate::api::state::AppState;
use axum::extract::{Request, State};
use axum::http::header::AUTHORIZATION;
use axum::http::HeaderMap;
use axum::middleware::Next;
use axum::response::Response;
use axum_extra::extract::cookie::CookieJar;
use bugtrack_auth::Credentials;
use bugtrack_sql::sql::schema::User;
use bugtrack_sql::sql::traits::UserSqlLogic;
use bugtrack_sql::PostgresClient;
use std::sync::Arc;
use tracing::debug;

pub const SESSION_COOKIE: &str = "session";

/// The authenticated user, available to every gated handler
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

pub fn extract_credentials(
    headers: &HeaderMap,
    jar: &CookieJar,
    remote_user_header: &str,
) -> Credentials {
    let header_value = |name: &str| {
        headers
            .get(name)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|value| !value.is_empty())
    };

    Credentials {
        bearer_token: header_value(AUTHORIZATION.as_str())
            .and_then(|value| value.strip_prefix("Bearer "))
            .map(|token| token.trim().to_string()),
        session_token: jar
            .get(SESSION_COOKIE)
            .map(|cookie| cookie.value().to_string()),
        remote_user: header_value(remote_user_header).map(str::to_string),
    }
}

pub async fn login_required(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let credentials = extract_credentials(
        request.headers(),
        &jar,
        &state.config.auth_settings.remote_user_header,
    );

    let username = state.strategy.identify(&credentials)?;

    let user = PostgresClient::get_user(&state.db_pool, &username)
        .await?
        .filter(|user| user.active)
        .ok_or_else(|| {
            debug!("No active user named {}", username);
            ApiError::Unauthenticated
        })?;

    request.extensions_mut().insert(CurrentUser(user));

    Ok(next.run(request).await)
}

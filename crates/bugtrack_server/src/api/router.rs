use crate::api::csrf::{csrf_protection, CSRF_HEADER};
use crate::api::error::{render_errors, ApiError};
use crate::api::format::strip_format_suffix;
use crate::api::routes::{
    get_auth_router, get_bug_router, get_health_router, get_home_router, get_project_router,
    login_required,
};
use crate::api::state::AppState;
use anyhow::Result;
use axum::extract::Request;
use axum::http::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use axum::http::{HeaderName, Method};
use axum::middleware;
use axum::Router;
use std::sync::Arc;
use tower::util::MapRequest;
use tower::ServiceExt;
use tower_http::cors::CorsLayer;

/// The router behind the format-suffix rewrite
pub type App = MapRequest<Router, fn(Request) -> Request>;

async fn route_not_found() -> ApiError {
    ApiError::not_found("Route")
}

/// Create the main router for the application
///
/// Resource routes sit behind the login gate. CSRF checks and error
/// rendering wrap every route, health included.
///
/// # Parameters
/// - `app_state` - The application state shared across all handlers
pub async fn create_router(app_state: Arc<AppState>) -> Result<Router> {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::DELETE])
        .allow_credentials(true)
        .allow_headers([
            AUTHORIZATION,
            ACCEPT,
            CONTENT_TYPE,
            HeaderName::from_static(CSRF_HEADER),
        ]);

    let health_routes = get_health_router().await?;
    let auth_routes = get_auth_router().await?;
    let home_routes = get_home_router().await?;
    let project_routes = get_project_router().await?;
    let bug_routes = get_bug_router().await?;

    let gated_routes = Router::new()
        .merge(home_routes)
        .merge(project_routes)
        .merge(bug_routes)
        .route_layer(middleware::from_fn_with_state(
            app_state.clone(),
            login_required,
        ));

    Ok(Router::new()
        .merge(gated_routes)
        .merge(health_routes)
        .merge(auth_routes)
        .fallback(route_not_found)
        .layer(middleware::from_fn(csrf_protection))
        .layer(middleware::from_fn(render_errors))
        .layer(cors)
        .with_state(app_state))
}

/// Strip format suffixes before the router sees the path
pub fn with_format_suffixes(router: Router) -> App {
    router.map_request(strip_format_suffix as fn(Request) -> Request)
}

pub mod api;

use crate::api::markdown::MarkdownRenderer;
use crate::api::router::{create_router, with_format_suffixes, App};
use crate::api::setup::setup_components;
use crate::api::shutdown::shutdown_signal;
use crate::api::state::AppState;
use anyhow::Context;
use axum::extract::Request;
use bugtrack_auth::{build_strategy, AuthManager};
use bugtrack_settings::ServerConfig;
use sqlx::{Pool, Postgres};
use std::sync::Arc;
use tracing::info;

/// Create the main server
///
/// # Arguments
///
/// * `config` - The server configuration
/// * `db_pool` - Pool for every database lookup
///
/// # Returns
///
/// The application service and its shared state
pub async fn create_app(
    config: ServerConfig,
    db_pool: Pool<Postgres>,
) -> Result<(App, Arc<AppState>), anyhow::Error> {
    let auth_manager = Arc::new(AuthManager::new(
        &config.auth_settings.jwt_secret,
        config.auth_settings.token_ttl_minutes,
    ));

    let strategy = build_strategy(&config.auth_settings, auth_manager.clone())
        .with_context(|| "Failed to select authentication strategy")?;

    let app_state = Arc::new(AppState {
        db_pool,
        auth_manager,
        strategy,
        markdown: MarkdownRenderer::new(),
        config: Arc::new(config),
    });

    let router = create_router(app_state.clone())
        .await
        .with_context(|| "Failed to create router")?;

    Ok((with_format_suffixes(router), app_state))
}

/// Start the main server
pub async fn start_main_server() -> Result<(), anyhow::Error> {
    let (config, db_pool) = setup_components().await?;
    let addr = format!("0.0.0.0:{}", config.http_settings.port);

    let (app, app_state) = create_app(config, db_pool).await?;

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    info!("🚀 Bugtrack server started successfully on {}", addr);

    axum::serve(
        listener,
        axum::ServiceExt::<Request>::into_make_service(app),
    )
    .with_graceful_shutdown(shutdown_signal(app_state))
    .await
    .with_context(|| "Failed to start main server")?;

    Ok(())
}

use crate::api::state::AppState;
use anyhow::{Context, Result};
use axum::{routing::get, Json, Router};
use bugtrack_types::Alive;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

pub async fn health_check() -> Json<Alive> {
    Json(Alive::default())
}

pub async fn get_health_router() -> Result<Router<Arc<AppState>>> {
    let result = catch_unwind(AssertUnwindSafe(|| {
        Router::new().route("/healthcheck", get(health_check))
    }));

    match result {
        Ok(router) => Ok(router),
        Err(_) => Err(anyhow::anyhow!("Failed to create health router"))
            .context("Panic occurred while creating the router"),
    }
}

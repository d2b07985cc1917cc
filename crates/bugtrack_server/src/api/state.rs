use crate::api::markdown::MarkdownRenderer;
use bugtrack_auth::{AuthManager, AuthStrategy};
use bugtrack_settings::ServerConfig;
use sqlx::{Pool, Postgres};
use std::sync::Arc;

pub struct AppState {
    pub db_pool: Pool<Postgres>,
    pub auth_manager: Arc<AuthManager>,
    pub strategy: Arc<dyn AuthStrategy>,
    pub markdown: MarkdownRenderer,
    pub config: Arc<ServerConfig>,
}

impl AppState {
    /// Shutdown the application gracefully
    pub async fn shutdown(&self) {
        self.db_pool.close().await;
    }
}

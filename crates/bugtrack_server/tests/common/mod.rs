use axum::body::Body;
use axum::http::Request;
use axum::response::Response;
use bugtrack_server::api::router::App;
use bugtrack_server::create_app;
use bugtrack_settings::ServerConfig;
use bugtrack_sql::PostgresClient;
use http_body_util::BodyExt;
use tower::ServiceExt;

pub const CSRF_TOKEN: &str = "test-authenticity-token";

/// Drives the application without binding a socket.
///
/// The pool connects lazily, so only requests that stop before a query can
/// run without Postgres.
pub struct TestHelper {
    app: App,
}

impl TestHelper {
    pub async fn new() -> Self {
        Self::with_config(ServerConfig::default()).await
    }

    pub async fn with_strategy(strategy: &str) -> Self {
        let mut config = ServerConfig::default();
        config.auth_settings.strategy = strategy.to_string();
        Self::with_config(config).await
    }

    async fn with_config(config: ServerConfig) -> Self {
        let db_pool = PostgresClient::create_lazy_pool(&config.database_settings).unwrap();
        let (app, _state) = create_app(config, db_pool).await.unwrap();

        Self { app }
    }

    pub async fn send_oneshot(&self, request: Request<Body>) -> Response<Body> {
        self.app.clone().oneshot(request).await.unwrap()
    }
}

/// Request carrying a matching authenticity cookie and header
pub fn with_csrf(builder: axum::http::request::Builder) -> axum::http::request::Builder {
    builder
        .header("cookie", format!("csrf_token={}", CSRF_TOKEN))
        .header("x-csrf-token", CSRF_TOKEN)
}

pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    response
        .into_body()
        .collect()
        .await
        .unwrap()
        .to_bytes()
        .to_vec()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

pub fn set_cookies(response: &Response<Body>) -> Vec<String> {
    response
        .headers()
        .get_all("set-cookie")
        .iter()
        .map(|value| value.to_str().unwrap().to_string())
        .collect()
}

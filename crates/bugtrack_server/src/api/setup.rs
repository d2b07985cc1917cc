use anyhow::Context;
use bugtrack_settings::ServerConfig;
use bugtrack_sql::PostgresClient;
use sqlx::{Pool, Postgres};
use std::io;
use tracing_subscriber::fmt::time::UtcTime;
use tracing_subscriber::EnvFilter;

const DEFAULT_TIME_PATTERN: &str =
    "[year]-[month]-[day]T[hour repr:24]:[minute]:[second]::[subsecond digits:4]";

fn env_filter() -> EnvFilter {
    std::env::var("LOG_LEVEL")
        .ok()
        .and_then(|level| EnvFilter::try_new(level).ok())
        .or_else(|| EnvFilter::try_from_default_env().ok())
        .unwrap_or_else(|| EnvFilter::new("info"))
}

pub fn setup_logging() -> Result<(), anyhow::Error> {
    let time_format = time::format_description::parse(DEFAULT_TIME_PATTERN)
        .with_context(|| "Invalid log time format")?;

    tracing_subscriber::fmt()
        .json()
        .with_target(false)
        .flatten_event(true)
        .with_thread_ids(true)
        .with_timer(UtcTime::new(time_format))
        .with_env_filter(env_filter())
        .with_writer(io::stdout)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to install subscriber: {}", e))?;

    Ok(())
}

/// Load configuration and connect to the database
pub async fn setup_components() -> Result<(ServerConfig, Pool<Postgres>), anyhow::Error> {
    let config = ServerConfig::from_env().with_context(|| "Failed to load configuration")?;

    let db_pool = PostgresClient::create_db_pool(&config.database_settings)
        .await
        .with_context(|| "Failed to create Postgres pool")?;

    Ok((config, db_pool))
}

use base64::prelude::*;
use serde::Serialize;
use std::env;
use std::str::FromStr;

pub mod auth;
pub mod database;
pub mod error;
pub mod http;

pub use auth::AuthSettings;
pub use database::DatabaseSettings;
pub use error::SettingsError;
pub use http::HttpSettings;

fn generate_default_secret() -> String {
    // Creates a deterministic key for development purposes
    // Should be replaced with a proper secret in production
    let mut key = [0u8; 32];
    for (i, item) in key.iter_mut().enumerate() {
        *item = i as u8;
    }

    BASE64_STANDARD.encode(key)
}

pub(crate) fn env_or(name: &str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| default.to_string())
}

pub(crate) fn parse_env<T: FromStr>(name: &str, default: T) -> Result<T, SettingsError> {
    match env::var(name) {
        Ok(value) => value
            .trim()
            .parse::<T>()
            .map_err(|_| SettingsError::InvalidNumber {
                name: name.to_string(),
                value,
            }),
        Err(_) => Ok(default),
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ServerConfig {
    pub database_settings: DatabaseSettings,
    pub auth_settings: AuthSettings,
    pub http_settings: HttpSettings,
}

impl ServerConfig {
    /// Load every settings group from the environment
    pub fn from_env() -> Result<Self, SettingsError> {
        Ok(Self {
            database_settings: DatabaseSettings::from_env()?,
            auth_settings: AuthSettings::from_env()?,
            http_settings: HttpSettings::from_env()?,
        })
    }
}

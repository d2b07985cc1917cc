use crate::error::SettingsError;
use crate::{env_or, generate_default_secret, parse_env};
use serde::Serialize;
use std::env;
use tracing::warn;

#[derive(Debug, Clone, Serialize)]
pub struct AuthSettings {
    pub jwt_secret: String,

    /// Name of the authentication strategy used by the login gate
    pub strategy: String,

    /// Header trusted by the `remote_user` strategy
    pub remote_user_header: String,

    pub token_ttl_minutes: i64,
}

impl AuthSettings {
    pub fn from_env() -> Result<Self, SettingsError> {
        let jwt_secret = env::var("BUGTRACK_ENCRYPT_SECRET").unwrap_or_else(|_| {
            warn!("BUGTRACK_ENCRYPT_SECRET not set, using the development secret");
            generate_default_secret()
        });

        let token_ttl_minutes = parse_env::<i64>("JWT_TTL_MINUTES", 60)?;
        if token_ttl_minutes <= 0 {
            return Err(SettingsError::NotPositive {
                name: "JWT_TTL_MINUTES".to_string(),
            });
        }

        Ok(Self {
            jwt_secret,
            strategy: env_or("AUTHENTICATION_STRATEGY", "password"),
            remote_user_header: env_or("REMOTE_USER_HEADER", "x-remote-user").to_lowercase(),
            token_ttl_minutes,
        })
    }
}

impl Default for AuthSettings {
    fn default() -> Self {
        Self {
            jwt_secret: generate_default_secret(),
            strategy: "password".to_string(),
            remote_user_header: "x-remote-user".to_string(),
            token_ttl_minutes: 60,
        }
    }
}

//! Pluggable ways of identifying the actor behind a request.
//!
//! The strategy is chosen once at startup from `AUTHENTICATION_STRATEGY` and
//! shared by every request through the login gate.

use crate::auth::AuthManager;
use crate::error::AuthError;
use bugtrack_settings::AuthSettings;
use std::fmt::Debug;
use std::str::FromStr;
use std::sync::Arc;
use strum_macros::{Display, EnumString};
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum AuthStrategyKind {
    /// Username/password login that issues a session JWT
    Password,

    /// Identity asserted by a trusted fronting proxy header
    RemoteUser,
}

/// Raw credential material pulled off a request
#[derive(Debug, Clone, Default)]
pub struct Credentials {
    pub bearer_token: Option<String>,
    pub session_token: Option<String>,
    pub remote_user: Option<String>,
}

pub trait AuthStrategy: Debug + Send + Sync {
    fn kind(&self) -> AuthStrategyKind;

    /// Resolve the username making the request
    fn identify(&self, credentials: &Credentials) -> Result<String, AuthError>;

    /// Whether `/auth/login` accepts username and password for this strategy
    fn supports_password_login(&self) -> bool {
        false
    }
}

pub struct PasswordStrategy {
    manager: Arc<AuthManager>,
}

impl Debug for PasswordStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PasswordStrategy").finish_non_exhaustive()
    }
}

impl PasswordStrategy {
    pub fn new(manager: Arc<AuthManager>) -> Self {
        Self { manager }
    }
}

impl AuthStrategy for PasswordStrategy {
    fn kind(&self) -> AuthStrategyKind {
        AuthStrategyKind::Password
    }

    fn identify(&self, credentials: &Credentials) -> Result<String, AuthError> {
        // an explicit bearer token wins over the browser session
        let token = credentials
            .bearer_token
            .as_deref()
            .or(credentials.session_token.as_deref())
            .ok_or(AuthError::MissingCredentials)?;

        let claims = self.manager.validate_jwt(token)?;
        Ok(claims.sub)
    }

    fn supports_password_login(&self) -> bool {
        true
    }
}

#[derive(Debug, Default)]
pub struct RemoteUserStrategy;

impl AuthStrategy for RemoteUserStrategy {
    fn kind(&self) -> AuthStrategyKind {
        AuthStrategyKind::RemoteUser
    }

    fn identify(&self, credentials: &Credentials) -> Result<String, AuthError> {
        credentials
            .remote_user
            .as_deref()
            .map(str::trim)
            .filter(|user| !user.is_empty())
            .map(str::to_string)
            .ok_or(AuthError::MissingCredentials)
    }
}

/// Select the strategy named in the settings
pub fn build_strategy(
    settings: &AuthSettings,
    manager: Arc<AuthManager>,
) -> Result<Arc<dyn AuthStrategy>, AuthError> {
    let kind = AuthStrategyKind::from_str(&settings.strategy)
        .map_err(|_| AuthError::UnknownStrategy(settings.strategy.clone()))?;

    info!("Using {} authentication strategy", kind);

    let strategy: Arc<dyn AuthStrategy> = match kind {
        AuthStrategyKind::Password => Arc::new(PasswordStrategy::new(manager)),
        AuthStrategyKind::RemoteUser => Arc::new(RemoteUserStrategy),
    };

    Ok(strategy)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bugtrack_sql::sql::schema::User;
    use chrono::Utc;

    fn manager() -> Arc<AuthManager> {
        Arc::new(AuthManager::new("secret", 60))
    }

    fn token_for(manager: &AuthManager, username: &str) -> String {
        let user = User {
            id: 1,
            username: username.to_string(),
            password_hash: String::new(),
            active: true,
            created_at: Utc::now(),
        };
        manager.generate_jwt(&user).unwrap()
    }

    fn settings(strategy: &str) -> AuthSettings {
        AuthSettings {
            strategy: strategy.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_build_strategy_from_settings() {
        let strategy = build_strategy(&settings("password"), manager()).unwrap();
        assert_eq!(strategy.kind(), AuthStrategyKind::Password);
        assert!(strategy.supports_password_login());

        let strategy = build_strategy(&settings("Remote_User"), manager()).unwrap();
        assert_eq!(strategy.kind(), AuthStrategyKind::RemoteUser);
        assert!(!strategy.supports_password_login());

        let err = build_strategy(&settings("ldap"), manager()).unwrap_err();
        assert!(matches!(err, AuthError::UnknownStrategy(name) if name == "ldap"));
    }

    #[test]
    fn test_password_strategy_prefers_bearer() {
        let manager = manager();
        let strategy = PasswordStrategy::new(manager.clone());

        let credentials = Credentials {
            bearer_token: Some(token_for(&manager, "api")),
            session_token: Some(token_for(&manager, "browser")),
            remote_user: None,
        };
        assert_eq!(strategy.identify(&credentials).unwrap(), "api");

        let credentials = Credentials {
            session_token: Some(token_for(&manager, "browser")),
            ..Default::default()
        };
        assert_eq!(strategy.identify(&credentials).unwrap(), "browser");
    }

    #[test]
    fn test_password_strategy_rejects() {
        let strategy = PasswordStrategy::new(manager());

        assert!(matches!(
            strategy.identify(&Credentials::default()),
            Err(AuthError::MissingCredentials)
        ));

        let credentials = Credentials {
            bearer_token: Some("garbage".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            strategy.identify(&credentials),
            Err(AuthError::InvalidJwtToken(_))
        ));

        // the remote user header means nothing to the password strategy
        let credentials = Credentials {
            remote_user: Some("admin".to_string()),
            ..Default::default()
        };
        assert!(strategy.identify(&credentials).is_err());
    }

    #[test]
    fn test_remote_user_strategy() {
        let strategy = RemoteUserStrategy;

        let credentials = Credentials {
            remote_user: Some(" jdoe ".to_string()),
            ..Default::default()
        };
        assert_eq!(strategy.identify(&credentials).unwrap(), "jdoe");

        let credentials = Credentials {
            remote_user: Some("   ".to_string()),
            ..Default::default()
        };
        assert!(strategy.identify(&credentials).is_err());
        assert!(strategy.identify(&Credentials::default()).is_err());
    }
}

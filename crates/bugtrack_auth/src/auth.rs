use crate::error::AuthError;
use bugtrack_sql::sql::schema::User;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use password_auth::verify_password;
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Claims {
    /// Username of the token holder
    pub sub: String,
    pub exp: usize,
    pub iat: usize,
}

/// Issues and validates session tokens and checks passwords
#[derive(Clone)]
pub struct AuthManager {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    token_ttl: Duration,
}

impl AuthManager {
    pub fn new(jwt_secret: &str, token_ttl_minutes: i64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(jwt_secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(jwt_secret.as_bytes()),
            token_ttl: Duration::minutes(token_ttl_minutes),
        }
    }

    pub fn generate_jwt(&self, user: &User) -> Result<String, AuthError> {
        let now = Utc::now();
        let claims = Claims {
            sub: user.username.clone(),
            iat: now.timestamp() as usize,
            exp: (now + self.token_ttl).timestamp() as usize,
        };

        encode(&Header::default(), &claims, &self.encoding_key).map_err(AuthError::EncodeJwtError)
    }

    /// Decode a token, checking signature and expiry
    pub fn validate_jwt(&self, token: &str) -> Result<Claims, AuthError> {
        let data = decode::<Claims>(token, &self.decoding_key, &Validation::default())
            .map_err(AuthError::InvalidJwtToken)?;

        Ok(data.claims)
    }

    /// Verify a login attempt against the stored password hash
    pub fn validate_user(&self, user: &User, password: &str) -> Result<(), AuthError> {
        if !user.active {
            return Err(AuthError::InactiveUser);
        }

        verify_password(password, &user.password_hash).map_err(AuthError::InvalidPassword)?;
        debug!("Validated password for {}", user.username);

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use password_auth::generate_hash;

    fn user(username: &str, password: &str, active: bool) -> User {
        User {
            id: 1,
            username: username.to_string(),
            password_hash: generate_hash(password),
            active,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_jwt_round_trip() {
        let manager = AuthManager::new("secret", 60);
        let token = manager.generate_jwt(&user("guest", "guest", true)).unwrap();

        let claims = manager.validate_jwt(&token).unwrap();
        assert_eq!(claims.sub, "guest");
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn test_jwt_wrong_secret() {
        let issuer = AuthManager::new("secret", 60);
        let other = AuthManager::new("another-secret", 60);
        let token = issuer.generate_jwt(&user("guest", "guest", true)).unwrap();

        assert!(matches!(
            other.validate_jwt(&token),
            Err(AuthError::InvalidJwtToken(_))
        ));
        assert!(issuer.validate_jwt("not-a-token").is_err());
    }

    #[test]
    fn test_validate_user() {
        let manager = AuthManager::new("secret", 60);

        assert!(manager
            .validate_user(&user("admin", "hunter2", true), "hunter2")
            .is_ok());
        assert!(matches!(
            manager.validate_user(&user("admin", "hunter2", true), "wrong"),
            Err(AuthError::InvalidPassword(_))
        ));
        assert!(matches!(
            manager.validate_user(&user("admin", "hunter2", false), "hunter2"),
            Err(AuthError::InactiveUser)
        ));
    }
}

pub mod jwt;
pub mod middleware;

use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::{Duration, Utc};
use rand_core::OsRng;
use serde::{Deserialize, Serialize};

use crate::config::MAX_SESSION_TTL_HOURS;
use crate::{AppError, Result};
use jwt::JwtService;

pub use middleware::{AuthenticatedUser, CurrentUser};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub user_id: i64,
    pub username: String,
    pub iat: usize,
    pub exp: usize, // Expiration time
}

pub struct AuthService {
    jwt: JwtService,
    session_ttl: Duration,
}

impl AuthService {
    /// The lifetime is clamped to `1..=MAX_SESSION_TTL_HOURS`.
    pub fn new(jwt_secret: &str, session_ttl_hours: i64) -> Self {
        Self {
            jwt: JwtService::new(jwt_secret),
            session_ttl: Duration::hours(session_ttl_hours.clamp(1, MAX_SESSION_TTL_HOURS)),
        }
    }

    pub fn session_ttl(&self) -> Duration {
        self.session_ttl
    }

    pub fn generate_token(&self, user_id: i64, username: &str) -> Result<String> {
        let now = Utc::now();
        let expires = now
            .checked_add_signed(self.session_ttl)
            .ok_or_else(|| AppError::InternalError("Session expiry out of range".to_string()))?;
        let claims = Claims {
            user_id,
            username: username.to_string(),
            iat: now.timestamp() as usize,
            exp: expires.timestamp() as usize,
        };
        self.jwt.encode_token(&claims)
    }

    pub fn verify_token(&self, token: &str) -> Result<Claims> {
        self.jwt.decode_token(token)
    }

    /// Argon2id with a random salt, stored as a PHC string.
    pub fn hash_password(&self, password: &str) -> Result<String> {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| AppError::InternalError(format!("Password hashing failed: {}", e)))
    }

    pub fn verify_password(&self, password: &str, hash: &str) -> Result<bool> {
        let parsed = PasswordHash::new(hash)
            .map_err(|e| AppError::InternalError(format!("Stored password hash is invalid: {}", e)))?;
        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_hash_and_verify() {
        let auth = AuthService::new("secret", 1);
        let hash = auth.hash_password("correct horse").unwrap();

        assert!(hash.starts_with("$argon2id$"));
        assert!(auth.verify_password("correct horse", &hash).unwrap());
        assert!(!auth.verify_password("wrong horse", &hash).unwrap());
    }

    #[test]
    fn test_malformed_hash_is_an_error() {
        let auth = AuthService::new("secret", 1);
        assert!(auth.verify_password("anything", "not-a-hash").is_err());
    }

    #[test]
    fn test_generated_token_carries_user() {
        let auth = AuthService::new("secret", 2);
        let token = auth.generate_token(5, "ivan").unwrap();
        let claims = auth.verify_token(&token).unwrap();

        assert_eq!(claims.user_id, 5);
        assert_eq!(claims.username, "ivan");
        assert_eq!(claims.exp - claims.iat, 2 * 3600);
    }

    #[test]
    fn test_oversized_session_lifetime_is_clamped() {
        let auth = AuthService::new("s", 1_000_000_000_000);
        assert_eq!(auth.session_ttl(), Duration::hours(MAX_SESSION_TTL_HOURS));

        let token = auth.generate_token(1, "x").unwrap();
        let claims = auth.verify_token(&token).unwrap();
        assert_eq!(claims.exp - claims.iat, (MAX_SESSION_TTL_HOURS * 3600) as usize);

        assert_eq!(AuthService::new("s", 0).session_ttl(), Duration::hours(1));
    }
}

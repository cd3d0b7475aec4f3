//! JWT authentication and password hashing.
//!
//! ## Session model
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  POST /api/auth/login                                                   │
//! │       │                                                                 │
//! │       ├── argon2id verify against users.password_hash                   │
//! │       ├── token = JWT { sub, role, store_code, exp }                    │
//! │       └── SPA keeps token + profile in local storage                    │
//! │                                                                         │
//! │  Every other /api route extracts AuthUser from the bearer header.       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::header;
use axum::http::request::Parts;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, TokenData, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ApiError;
use crate::state::AppState;
use backbar_core::UserRole;

// =============================================================================
// Password hashing
// =============================================================================

/// Hashes a password with argon2id and a fresh salt.
pub fn hash_password(password: &str) -> Result<String, ApiError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| ApiError::Internal(format!("password hashing failed: {}", e)))
}

/// Verifies a password against a stored PHC string.
pub fn verify_password(password: &str, stored_hash: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(stored_hash) else {
        return false;
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

// =============================================================================
// JWT
// =============================================================================

/// JWT claims structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user name)
    pub sub: String,

    /// Role at issue time
    pub role: UserRole,

    /// Primary store assignment, if any
    pub store_code: Option<String>,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration (Unix timestamp)
    pub exp: i64,

    /// JWT ID (unique identifier for this token)
    pub jti: String,
}

/// JWT token manager.
pub struct JwtManager {
    secret: String,
    lifetime_secs: i64,
}

impl JwtManager {
    pub fn new(secret: String, lifetime_secs: i64) -> Self {
        JwtManager {
            secret,
            lifetime_secs,
        }
    }

    /// Generates a session token.
    pub fn generate_token(
        &self,
        user_name: &str,
        role: UserRole,
        store_code: Option<String>,
    ) -> Result<String, ApiError> {
        let now = Utc::now();
        let exp = now + Duration::seconds(self.lifetime_secs);

        let claims = Claims {
            sub: user_name.to_string(),
            role,
            store_code,
            iat: now.timestamp(),
            exp: exp.timestamp(),
            jti: Uuid::new_v4().to_string(),
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .map_err(|e| ApiError::Internal(format!("failed to generate token: {}", e)))
    }

    /// Validates and decodes a token.
    pub fn validate_token(&self, token: &str) -> Result<Claims, ApiError> {
        let validation = Validation::default();

        let token_data: TokenData<Claims> = decode(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &validation,
        )
        .map_err(|e| ApiError::Unauthorized(format!("invalid token: {}", e)))?;

        Ok(token_data.claims)
    }
}

// =============================================================================
// Extractor
// =============================================================================

/// The authenticated caller, extracted from the bearer header.
///
/// Adding `AuthUser` as a handler argument is what protects a route.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_name: String,
    pub role: UserRole,
    pub store_code: Option<String>,
}

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header_value = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| ApiError::Unauthorized("missing authorization header".to_string()))?;

        let token = header_value
            .strip_prefix("Bearer ")
            .ok_or_else(|| ApiError::Unauthorized("expected bearer token".to_string()))?;

        let claims = state.jwt.validate_token(token)?;

        Ok(AuthUser {
            user_name: claims.sub,
            role: claims.role,
            store_code: claims.store_code,
        })
    }
}

impl AuthUser {
    /// Admin-gated operations (user management, voucher configuration).
    pub fn require_admin(&self) -> Result<(), ApiError> {
        if self.role != UserRole::Admin {
            return Err(ApiError::Unauthorized(
                "administrator role required".to_string(),
            ));
        }
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_round_trip() {
        let hash = hash_password("counter@123").unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password("counter@123", &hash));
        assert!(!verify_password("wrong", &hash));
        assert!(!verify_password("counter@123", "not-a-phc-string"));
    }

    #[test]
    fn test_token_round_trip() {
        let jwt = JwtManager::new("test-secret".to_string(), 3600);
        let token = jwt
            .generate_token("counter1", UserRole::Store, Some("S001".to_string()))
            .unwrap();

        let claims = jwt.validate_token(&token).unwrap();
        assert_eq!(claims.sub, "counter1");
        assert_eq!(claims.role, UserRole::Store);
        assert_eq!(claims.store_code.as_deref(), Some("S001"));
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn test_token_wrong_secret_rejected() {
        let jwt = JwtManager::new("secret-a".to_string(), 3600);
        let other = JwtManager::new("secret-b".to_string(), 3600);

        let token = jwt.generate_token("counter1", UserRole::Store, None).unwrap();
        assert!(other.validate_token(&token).is_err());
    }
}

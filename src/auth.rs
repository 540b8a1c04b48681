use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use axum::{
    extract::{FromRef, FromRequestParts},
    http::{header, request::Parts},
};
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{config::AppConfig, error::ApiError};

/// How long an issued token stays valid.
const TOKEN_TTL_HOURS: i64 = 24;

/// Claims
///
/// The payload signed into every bearer token. Claims are self-contained:
/// the subject and role carried here are trusted for the token's lifetime,
/// so authenticated requests never touch the database.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the authenticated user's id.
    pub sub: Uuid,
    /// Role baked in at login time.
    pub role: String,
    /// Issued-at timestamp (seconds).
    pub iat: usize,
    /// Expiration timestamp (seconds). Tokens live 24 hours.
    pub exp: usize,
}

/// Signs a 24-hour token for the given user.
pub fn issue_token(
    user_id: Uuid,
    role: &str,
    config: &AppConfig,
) -> Result<String, ApiError> {
    let now = Utc::now();
    let claims = Claims {
        sub: user_id,
        role: role.to_string(),
        iat: now.timestamp() as usize,
        exp: (now + Duration::hours(TOKEN_TTL_HOURS)).timestamp() as usize,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.jwt_secret.as_bytes()),
    )
    .map_err(|e| ApiError::Internal(format!("token signing failed: {e}")))
}

/// AuthUser
///
/// The resolved identity of an authenticated request. Produced by the
/// extractor below; handlers take it as an argument to require a valid token.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: Uuid,
    pub role: String,
}

/// AuthUser Extractor
///
/// Implements Axum's FromRequestParts so any handler (or the admin route
/// middleware) can demand authentication by taking an `AuthUser` parameter.
/// Pulls the JWT secret from AppConfig, expects a `Bearer` token in the
/// Authorization header, and validates signature and expiry.
///
/// Rejection: 401 with the generic unauthorized body on any failure.
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    AppConfig: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let config = AppConfig::from_ref(state);

        let auth_header = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or(ApiError::Unauthorized)?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or(ApiError::Unauthorized)?;

        let decoding_key = DecodingKey::from_secret(config.jwt_secret.as_bytes());
        let mut validation = Validation::default();
        validation.validate_exp = true;

        let token_data =
            decode::<Claims>(token, &decoding_key, &validation).map_err(|_| {
                // Expired, tampered, and malformed tokens all collapse to 401.
                ApiError::Unauthorized
            })?;

        Ok(AuthUser {
            id: token_data.claims.sub,
            role: token_data.claims.role,
        })
    }
}

/// Hashes a password with argon2id and a fresh random salt.
pub fn hash_password(password: &str) -> Result<String, ApiError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| ApiError::Internal(format!("password hashing failed: {e}")))
}

/// Verifies a password against a stored argon2 hash. A malformed stored hash
/// verifies as false rather than erroring, so login stays undifferentiated.
pub fn verify_password(password: &str, stored_hash: &str) -> bool {
    match PasswordHash::new(stored_hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> AppConfig {
        AppConfig::default()
    }

    #[test]
    fn issued_token_decodes_with_role() {
        let config = test_config();
        let id = Uuid::new_v4();
        let token = issue_token(id, "admin", &config).unwrap();

        let decoded = decode::<Claims>(
            &token,
            &DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            &Validation::default(),
        )
        .unwrap();

        assert_eq!(decoded.claims.sub, id);
        assert_eq!(decoded.claims.role, "admin");
        assert_eq!(
            decoded.claims.exp - decoded.claims.iat,
            (TOKEN_TTL_HOURS * 3600) as usize
        );
    }

    #[test]
    fn tampered_token_fails_decode() {
        let config = test_config();
        let token = issue_token(Uuid::new_v4(), "admin", &config).unwrap();
        let tampered = format!("{token}x");

        let result = decode::<Claims>(
            &tampered,
            &DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            &Validation::default(),
        );
        assert!(result.is_err());
    }

    #[test]
    fn wrong_secret_fails_decode() {
        let config = test_config();
        let token = issue_token(Uuid::new_v4(), "admin", &config).unwrap();

        let result = decode::<Claims>(
            &token,
            &DecodingKey::from_secret(b"some-other-secret"),
            &Validation::default(),
        );
        assert!(result.is_err());
    }

    #[test]
    fn password_roundtrip() {
        let hash = hash_password("correct horse battery staple").unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password("correct horse battery staple", &hash));
        assert!(!verify_password("wrong password", &hash));
    }

    #[test]
    fn malformed_stored_hash_verifies_false() {
        assert!(!verify_password("anything", "not-a-phc-string"));
    }
}

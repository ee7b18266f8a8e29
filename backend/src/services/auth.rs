//! Bearer token issuance/verification and password hashing.
//!
//! Verification is stateless: a token is accepted when its HS256 signature
//! checks out and it has not expired. There is no refresh or revocation.

use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::constants::{BEARER_PREFIX, TOKEN_LEEWAY_SECS};
use crate::error::{codes, AppError, AppResult};
use crate::utils::Config;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: user id.
    pub sub: String,
    pub email: String,
    /// Issued at (unix timestamp).
    pub iat: i64,
    /// Expiration (unix timestamp).
    pub exp: i64,
}

/// Verified caller identity, passed explicitly into every protected operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user_id: Uuid,
    pub email: String,
}

#[derive(Clone)]
pub struct AuthGate {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    token_ttl: Duration,
    bcrypt_cost: u32,
}

impl AuthGate {
    pub fn new(secret: &str, token_ttl: Duration, bcrypt_cost: u32) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = TOKEN_LEEWAY_SECS;

        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            token_ttl,
            bcrypt_cost,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(&config.jwt_secret, config.token_ttl, config.bcrypt_cost)
    }

    pub fn issue_token(&self, user_id: Uuid, email: &str) -> AppResult<String> {
        let now = Utc::now();
        let claims = Claims {
            sub: user_id.to_string(),
            email: email.to_string(),
            iat: now.timestamp(),
            exp: (now + self.token_ttl).timestamp(),
        };

        jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AppError::internal(format!("failed to sign token: {}", e)))
    }

    pub fn validate_token(&self, token: &str) -> AppResult<Identity> {
        let data = jsonwebtoken::decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| {
                tracing::warn!("Rejected bearer token: {}", e);
                invalid_token()
            })?;

        let user_id = Uuid::parse_str(&data.claims.sub).map_err(|_| invalid_token())?;

        Ok(Identity {
            user_id,
            email: data.claims.email,
        })
    }

    /// Validate a raw `Authorization` header value of the form `Bearer <token>`.
    pub fn authenticate_header(&self, header: Option<&str>) -> AppResult<Identity> {
        let header = header.ok_or_else(|| {
            AppError::unauthorized(codes::UNAUTHORIZED, "Authorization header required")
        })?;

        let token = header
            .strip_prefix(BEARER_PREFIX)
            .filter(|token| !token.is_empty() && !token.contains(' '))
            .ok_or_else(|| {
                AppError::unauthorized(codes::UNAUTHORIZED, "Invalid authorization header format")
            })?;

        self.validate_token(token)
    }

    /// bcrypt is CPU-bound, so it runs on the blocking pool.
    pub async fn hash_password(&self, password: &str) -> AppResult<String> {
        let password = password.to_string();
        let cost = self.bcrypt_cost;

        tokio::task::spawn_blocking(move || bcrypt::hash(password, cost))
            .await
            .map_err(|e| AppError::internal(format!("hash task failed: {}", e)))?
            .map_err(|e| AppError::internal(format!("failed to hash password: {}", e)))
    }

    pub async fn verify_password(&self, password: &str, hash: &str) -> AppResult<bool> {
        let password = password.to_string();
        let hash = hash.to_string();

        tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash))
            .await
            .map_err(|e| AppError::internal(format!("verify task failed: {}", e)))?
            .map_err(|e| AppError::internal(format!("failed to verify password: {}", e)))
    }
}

fn invalid_token() -> AppError {
    AppError::unauthorized(codes::UNAUTHORIZED, "Invalid or expired token")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gate() -> AuthGate {
        AuthGate::new("test-secret", Duration::hours(24), 4)
    }

    #[test]
    fn test_issued_token_validates_to_same_identity() {
        let gate = gate();
        let user_id = Uuid::new_v4();

        let token = gate.issue_token(user_id, "john@example.com").unwrap();
        let identity = gate.validate_token(&token).unwrap();

        assert_eq!(identity.user_id, user_id);
        assert_eq!(identity.email, "john@example.com");
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let expired = AuthGate::new("test-secret", Duration::hours(-2), 4);
        let token = expired.issue_token(Uuid::new_v4(), "john@example.com").unwrap();

        let err = gate().validate_token(&token).unwrap_err();
        assert!(matches!(err, AppError::Unauthorized { .. }));
    }

    #[test]
    fn test_token_signed_with_other_secret_is_rejected() {
        let other = AuthGate::new("other-secret", Duration::hours(24), 4);
        let token = other.issue_token(Uuid::new_v4(), "john@example.com").unwrap();

        assert!(gate().validate_token(&token).is_err());
        assert!(gate().validate_token("not.a.token").is_err());
    }

    #[test]
    fn test_authorization_header_format() {
        let gate = gate();
        let token = gate.issue_token(Uuid::new_v4(), "john@example.com").unwrap();

        assert!(gate.authenticate_header(Some(&format!("Bearer {}", token))).is_ok());
        assert!(gate.authenticate_header(None).is_err());
        assert!(gate.authenticate_header(Some(&token)).is_err());
        assert!(gate.authenticate_header(Some(&format!("bearer {}", token))).is_err());
        assert!(gate.authenticate_header(Some("Bearer ")).is_err());
        assert!(gate.authenticate_header(Some(&format!("Bearer {} extra", token))).is_err());
        assert!(gate.authenticate_header(Some(&format!("Bearer  {}", token))).is_err());
    }

    #[tokio::test]
    async fn test_password_hash_round_trip() {
        let gate = gate();
        let hash = gate.hash_password("correct horse").await.unwrap();

        assert_ne!(hash, "correct horse");
        assert!(gate.verify_password("correct horse", &hash).await.unwrap());
        assert!(!gate.verify_password("wrong horse", &hash).await.unwrap());
    }
}

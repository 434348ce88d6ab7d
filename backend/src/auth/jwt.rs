//! JWT token generation and validation
//!
//! Issues access, refresh and password-reset tokens with pre-computed keys.
//! Access and refresh tokens can be signed with distinct secrets; reset
//! tokens share the access secret.

use anyhow::Result;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

pub const TOKEN_TYPE_ACCESS: &str = "access";
pub const TOKEN_TYPE_REFRESH: &str = "refresh";
pub const TOKEN_TYPE_RESET: &str = "reset";

/// JWT claims
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID)
    pub sub: String,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Issued at (Unix timestamp); compared against the per-user
    /// revocation stamp on refresh
    pub iat: i64,
    /// Token type: "access", "refresh" or "reset"
    pub token_type: String,
}

/// Pre-computed JWT keys for efficient token operations
///
/// Keys are expensive to derive, so they are created once at startup and
/// cached in AppState.
#[derive(Clone)]
pub struct JwtKeys {
    encoding: Arc<EncodingKey>,
    decoding: Arc<DecodingKey>,
}

impl JwtKeys {
    pub fn new(secret: &str) -> Self {
        Self {
            encoding: Arc::new(EncodingKey::from_secret(secret.as_bytes())),
            decoding: Arc::new(DecodingKey::from_secret(secret.as_bytes())),
        }
    }
}

/// Token lifetime configuration
#[derive(Clone)]
pub struct JwtConfig {
    pub access_token_expiry_secs: i64,
    pub refresh_token_expiry_secs: i64,
    pub reset_token_expiry_secs: i64,
}

/// JWT service for token operations
///
/// Uses pre-computed keys wrapped in Arc for cheap cloning. Create once at
/// application startup and store in AppState, not per-request.
#[derive(Clone)]
pub struct JwtService {
    access_keys: JwtKeys,
    refresh_keys: JwtKeys,
    config: JwtConfig,
}

impl JwtService {
    /// Create a new JWT service with pre-computed keys
    ///
    /// When `refresh_secret` is None the refresh keys reuse `secret`.
    pub fn new(secret: &str, refresh_secret: Option<&str>, config: JwtConfig) -> Self {
        let access_keys = JwtKeys::new(secret);
        let refresh_keys = match refresh_secret {
            Some(refresh_secret) => JwtKeys::new(refresh_secret),
            None => access_keys.clone(),
        };
        Self {
            access_keys,
            refresh_keys,
            config,
        }
    }

    /// Generate an access token for a user
    #[inline]
    pub fn generate_access_token(&self, user_id: Uuid) -> Result<String> {
        self.generate_token(
            &self.access_keys,
            user_id,
            TOKEN_TYPE_ACCESS,
            self.config.access_token_expiry_secs,
        )
    }

    /// Generate a refresh token for a user
    #[inline]
    pub fn generate_refresh_token(&self, user_id: Uuid) -> Result<String> {
        self.generate_token(
            &self.refresh_keys,
            user_id,
            TOKEN_TYPE_REFRESH,
            self.config.refresh_token_expiry_secs,
        )
    }

    /// Generate a short-lived password-reset token
    #[inline]
    pub fn generate_reset_token(&self, user_id: Uuid) -> Result<String> {
        self.generate_token(
            &self.access_keys,
            user_id,
            TOKEN_TYPE_RESET,
            self.config.reset_token_expiry_secs,
        )
    }

    fn generate_token(
        &self,
        keys: &JwtKeys,
        user_id: Uuid,
        token_type: &str,
        expiry_secs: i64,
    ) -> Result<String> {
        let now = Utc::now();
        let exp = now + Duration::seconds(expiry_secs);

        let claims = Claims {
            sub: user_id.to_string(),
            exp: exp.timestamp(),
            iat: now.timestamp(),
            token_type: token_type.to_string(),
        };

        encode(&Header::default(), &claims, &keys.encoding)
            .map_err(|e| anyhow::anyhow!("Failed to generate {} token: {}", token_type, e))
    }

    fn validate_token(&self, keys: &JwtKeys, token: &str, token_type: &str) -> Result<Claims> {
        let token_data = decode::<Claims>(token, &keys.decoding, &Validation::default())
            .map_err(|e| anyhow::anyhow!("Invalid token: {}", e))?;

        if token_data.claims.token_type != token_type {
            anyhow::bail!("Not a {} token", token_type);
        }
        Ok(token_data.claims)
    }

    /// Validate an access token and return its claims
    #[inline]
    pub fn validate_access_token(&self, token: &str) -> Result<Claims> {
        self.validate_token(&self.access_keys, token, TOKEN_TYPE_ACCESS)
    }

    /// Validate a refresh token and return its claims
    #[inline]
    pub fn validate_refresh_token(&self, token: &str) -> Result<Claims> {
        self.validate_token(&self.refresh_keys, token, TOKEN_TYPE_REFRESH)
    }

    /// Validate a password-reset token and return its claims
    #[inline]
    pub fn validate_reset_token(&self, token: &str) -> Result<Claims> {
        self.validate_token(&self.access_keys, token, TOKEN_TYPE_RESET)
    }

    /// Get access token expiry in seconds
    #[inline]
    pub fn access_token_expiry_secs(&self) -> i64 {
        self.config.access_token_expiry_secs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> JwtConfig {
        JwtConfig {
            access_token_expiry_secs: 900,
            refresh_token_expiry_secs: 604800,
            reset_token_expiry_secs: 1800,
        }
    }

    fn create_test_service() -> JwtService {
        JwtService::new("test-secret", None, test_config())
    }

    #[test]
    fn test_generate_and_validate_access_token() {
        let service = create_test_service();
        let user_id = Uuid::new_v4();

        let token = service.generate_access_token(user_id).unwrap();
        let claims = service.validate_access_token(&token).unwrap();

        assert_eq!(claims.sub, user_id.to_string());
        assert_eq!(claims.token_type, TOKEN_TYPE_ACCESS);
    }

    #[test]
    fn test_generate_and_validate_refresh_token() {
        let service = create_test_service();
        let user_id = Uuid::new_v4();

        let token = service.generate_refresh_token(user_id).unwrap();
        let claims = service.validate_refresh_token(&token).unwrap();

        assert_eq!(claims.sub, user_id.to_string());
        assert_eq!(claims.token_type, TOKEN_TYPE_REFRESH);
    }

    #[test]
    fn test_access_token_rejected_as_refresh() {
        let service = create_test_service();
        let user_id = Uuid::new_v4();

        let token = service.generate_access_token(user_id).unwrap();
        assert!(service.validate_refresh_token(&token).is_err());
    }

    #[test]
    fn test_reset_token_rejected_as_access() {
        let service = create_test_service();
        let user_id = Uuid::new_v4();

        let token = service.generate_reset_token(user_id).unwrap();
        assert!(service.validate_access_token(&token).is_err());
        assert!(service.validate_reset_token(&token).is_ok());
    }

    #[test]
    fn test_invalid_token_rejected() {
        let service = create_test_service();
        assert!(service.validate_access_token("invalid.token.here").is_err());
    }

    #[test]
    fn test_expired_access_token_rejected_while_refresh_survives() {
        // Past-dated expiry beyond the decoder's 60s leeway
        let config = JwtConfig {
            access_token_expiry_secs: -120,
            refresh_token_expiry_secs: 604800,
            reset_token_expiry_secs: 1800,
        };
        let service = JwtService::new("test-secret", None, config);
        let user_id = Uuid::new_v4();

        let expired = service.generate_access_token(user_id).unwrap();
        assert!(service.validate_access_token(&expired).is_err());

        // The paired refresh token outlives the access window
        let refresh = service.generate_refresh_token(user_id).unwrap();
        assert!(service.validate_refresh_token(&refresh).is_ok());
    }

    #[test]
    fn test_distinct_refresh_secret_separates_key_spaces() {
        let service = JwtService::new("access-secret", Some("refresh-secret"), test_config());
        let same_secret = JwtService::new("access-secret", None, test_config());
        let user_id = Uuid::new_v4();

        let refresh = service.generate_refresh_token(user_id).unwrap();
        // A verifier without the refresh secret must reject it
        assert!(same_secret.validate_refresh_token(&refresh).is_err());
        assert!(service.validate_refresh_token(&refresh).is_ok());
    }

    #[test]
    fn test_service_is_clone_cheap() {
        let service = create_test_service();
        let _cloned = service.clone(); // Should be cheap due to Arc
    }
}

// JWT token service for authentication
// Decision: Use HS256 algorithm for simplicity (symmetric key)
// Decision: Access tokens only; sessions end when the token expires

use anyhow::{Context, Result};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::config::JwtConfig;

/// JWT claims for access tokens
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AccessTokenClaims {
    /// Subject (user ID)
    pub sub: String,
    /// User email
    pub email: String,
    /// Admin role at the time the token was issued
    pub is_admin: bool,
    /// Token type
    pub token_type: String,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Issued at (Unix timestamp)
    pub iat: i64,
}

/// JWT service for token generation and validation
#[derive(Clone)]
pub struct JwtService {
    config: JwtConfig,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl JwtService {
    pub fn new(config: JwtConfig) -> Self {
        let encoding_key = EncodingKey::from_secret(config.secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.secret.as_bytes());

        Self {
            config,
            encoding_key,
            decoding_key,
        }
    }

    /// Generate access token for a user
    pub fn generate_access_token(&self, user_id: Uuid, email: &str, is_admin: bool) -> Result<String> {
        let now = Utc::now();
        let exp = now + Duration::from_std(self.config.access_token_lifetime)?;

        let claims = AccessTokenClaims {
            sub: user_id.to_string(),
            email: email.to_string(),
            is_admin,
            token_type: "access".to_string(),
            exp: exp.timestamp(),
            iat: now.timestamp(),
        };

        encode(&Header::default(), &claims, &self.encoding_key)
            .context("Failed to encode access token")
    }

    /// Validate and decode an access token
    pub fn validate_access_token(&self, token: &str) -> Result<AccessTokenClaims> {
        let mut validation = Validation::default();
        validation.validate_exp = true;

        let token_data = decode::<AccessTokenClaims>(token, &self.decoding_key, &validation)
            .context("Invalid access token")?;

        if token_data.claims.token_type != "access" {
            anyhow::bail!("Invalid token type");
        }

        Ok(token_data.claims)
    }

    /// Get access token lifetime in seconds
    pub fn access_token_lifetime_secs(&self) -> i64 {
        self.config.access_token_lifetime.as_secs() as i64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration as StdDuration;

    fn test_config() -> JwtConfig {
        JwtConfig {
            secret: "test-secret-key-for-testing".to_string(),
            access_token_lifetime: StdDuration::from_secs(900),
        }
    }

    #[test]
    fn test_generate_access_token() {
        let service = JwtService::new(test_config());
        let user_id = Uuid::now_v7();
        let token = service
            .generate_access_token(user_id, "test@example.com", true)
            .unwrap();

        assert!(!token.is_empty());

        let claims = service.validate_access_token(&token).unwrap();
        assert_eq!(claims.sub, user_id.to_string());
        assert_eq!(claims.email, "test@example.com");
        assert!(claims.is_admin);
        assert_eq!(claims.token_type, "access");
        assert_eq!(claims.exp - claims.iat, 900);
        assert_eq!(service.access_token_lifetime_secs(), 900);
    }

    #[test]
    fn test_invalid_token() {
        let service = JwtService::new(test_config());
        assert!(service.validate_access_token("invalid-token").is_err());
    }

    #[test]
    fn test_token_from_other_secret_rejected() {
        let service = JwtService::new(test_config());
        let other = JwtService::new(JwtConfig {
            secret: "a-different-secret".to_string(),
            ..test_config()
        });

        let token = other
            .generate_access_token(Uuid::nil(), "test@example.com", false)
            .unwrap();
        assert!(service.validate_access_token(&token).is_err());
    }

    #[test]
    fn test_wrong_token_type() {
        let service = JwtService::new(test_config());
        let now = Utc::now().timestamp();
        let claims = AccessTokenClaims {
            sub: Uuid::nil().to_string(),
            email: "test@example.com".to_string(),
            is_admin: false,
            token_type: "refresh".to_string(),
            exp: now + 600,
            iat: now,
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(b"test-secret-key-for-testing"),
        )
        .unwrap();

        assert!(service.validate_access_token(&token).is_err());
    }
}

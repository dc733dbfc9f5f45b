//! Session token creation and validation (JWT, HS512).
//!
//! A successful SSO callback issues a short-lived session token; there is no
//! refresh flow — when the session expires the user signs in again through
//! the provider.

use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum JwtError {
    #[error("Token has expired")]
    TokenExpired,

    #[error("Invalid token format or signature")]
    InvalidToken,

    #[error("Failed to create token")]
    TokenCreation,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: i64,
    pub jti: String,
    pub iss: String,
    pub aud: String,
    pub exp: usize,
    pub iat: usize,
}

#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
pub trait TokenManager: Send + Sync {
    fn create_session_token(&self, account_id: i64) -> Result<String, JwtError>;
    fn validate_session_token(&self, token: &str) -> Result<Claims, JwtError>;
}

pub struct JwtConfig {
    pub secret: String,
    pub session_exp_secs: i64,
    pub issuer: String,
    pub audience: String,
}

pub struct JwtService {
    config: JwtConfig,
}

impl JwtService {
    pub fn new(config: JwtConfig) -> Self {
        Self { config }
    }
}

impl TokenManager for JwtService {
    fn create_session_token(&self, account_id: i64) -> Result<String, JwtError> {
        let now = Utc::now();
        let exp = (now + Duration::seconds(self.config.session_exp_secs)).timestamp() as usize;

        let claims = Claims {
            sub: account_id,
            jti: Uuid::new_v4().to_string(),
            iss: self.config.issuer.clone(),
            aud: self.config.audience.clone(),
            exp,
            iat: now.timestamp() as usize,
        };

        let header = Header::new(Algorithm::HS512);
        encode(&header, &claims, &EncodingKey::from_secret(self.config.secret.as_ref()))
            .map_err(|_| JwtError::TokenCreation)
    }

    fn validate_session_token(&self, token: &str) -> Result<Claims, JwtError> {
        let mut validation = Validation::new(Algorithm::HS512);
        validation.set_issuer(&[&self.config.issuer]);
        validation.set_audience(&[&self.config.audience]);

        decode::<Claims>(token, &DecodingKey::from_secret(self.config.secret.as_ref()), &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => JwtError::TokenExpired,
                _ => JwtError::InvalidToken,
            })
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    fn create_service() -> JwtService {
        JwtService::new(JwtConfig {
            secret: "test_session_secret_key_12345".to_string(),
            session_exp_secs: 3600,
            issuer: "test_issuer".to_string(),
            audience: "test_audience".to_string(),
        })
    }

    #[test]
    fn test_create_and_validate_token() {
        let service = create_service();

        let token = service.create_session_token(123).unwrap();
        assert!(token.contains("."));

        let claims = service.validate_session_token(&token).unwrap();
        assert_eq!(claims.sub, 123);
        assert_eq!(claims.iss, "test_issuer");
        assert_eq!(claims.aud, "test_audience");
        assert!(!claims.jti.is_empty());
    }

    #[test]
    fn test_unique_jti_per_token() {
        let service = create_service();

        let claims1 = service.validate_session_token(&service.create_session_token(1).unwrap()).unwrap();
        let claims2 = service.validate_session_token(&service.create_session_token(1).unwrap()).unwrap();

        assert_ne!(claims1.jti, claims2.jti);
    }

    #[test]
    fn test_claims_timestamps() {
        let service = create_service();

        let before = Utc::now().timestamp() as usize;
        let token = service.create_session_token(7).unwrap();
        let after = Utc::now().timestamp() as usize;

        let claims = service.validate_session_token(&token).unwrap();
        assert!(claims.iat >= before && claims.iat <= after);
        assert_eq!(claims.exp, claims.iat + 3600);
    }

    #[test]
    fn test_validate_with_wrong_secret() {
        let service = create_service();
        let other = JwtService::new(JwtConfig {
            secret: "another_secret_entirely_123456".to_string(),
            session_exp_secs: 3600,
            issuer: "test_issuer".to_string(),
            audience: "test_audience".to_string(),
        });

        let token = service.create_session_token(1).unwrap();
        let result = other.validate_session_token(&token);

        assert!(matches!(result.unwrap_err(), JwtError::InvalidToken));
    }

    #[test]
    fn test_validate_malformed_token() {
        let service = create_service();

        let result = service.validate_session_token("not_a_valid_jwt_at_all");

        assert!(matches!(result.unwrap_err(), JwtError::InvalidToken));
    }

    #[test]
    fn test_expired_token() {
        let service = JwtService::new(JwtConfig {
            secret: "test_session_secret_key_12345".to_string(),
            session_exp_secs: -1_000_000,
            issuer: "test_issuer".to_string(),
            audience: "test_audience".to_string(),
        });

        let token = service.create_session_token(1).unwrap();
        let result = service.validate_session_token(&token);

        assert!(matches!(result.unwrap_err(), JwtError::TokenExpired));
    }
}

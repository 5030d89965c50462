//! JWT token service
//!
//! Generation, validation and parsing of access tokens. Claims carry only
//! identity hints; authorization always re-reads the user row, so a stale
//! token cannot keep a demoted leader's powers alive.

use chrono::{Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use rand::Rng;
use rand::distributions::Alphanumeric;
use serde::{Deserialize, Serialize};
use shared::models::User;
use thiserror::Error;

/// JWT configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtConfig {
    /// Signing secret (at least 32 bytes)
    pub secret: String,
    /// Token lifetime in minutes
    pub expiration_minutes: i64,
    pub issuer: String,
    pub audience: String,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            secret: load_jwt_secret(),
            expiration_minutes: std::env::var("JWT_EXPIRATION_MINUTES")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(1440),
            issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| "flock-server".to_string()),
            audience: std::env::var("JWT_AUDIENCE").unwrap_or_else(|_| "flock-clients".to_string()),
        }
    }
}

fn load_jwt_secret() -> String {
    match std::env::var("JWT_SECRET") {
        Ok(secret) if secret.len() >= 32 => secret,
        Ok(_) => {
            tracing::warn!("JWT_SECRET shorter than 32 characters, generating a temporary key");
            generate_dev_secret()
        }
        Err(_) => {
            #[cfg(debug_assertions)]
            {
                tracing::warn!("JWT_SECRET not set, generating a temporary development key");
                generate_dev_secret()
            }
            #[cfg(not(debug_assertions))]
            {
                panic!("JWT_SECRET environment variable must be set in production");
            }
        }
    }
}

fn generate_dev_secret() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(64)
        .map(char::from)
        .collect()
}

/// Claims stored in the token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User ID (subject)
    pub sub: String,
    pub email: String,
    /// Role at issue time. Informational only; see module docs.
    pub role: String,
    pub token_type: String,
    pub exp: i64,
    pub iat: i64,
    pub iss: String,
    pub aud: String,
}

#[derive(Error, Debug)]
pub enum JwtError {
    #[error("invalid token: {0}")]
    InvalidToken(String),

    #[error("token expired")]
    ExpiredToken,

    #[error("invalid signature")]
    InvalidSignature,

    #[error("token generation failed: {0}")]
    GenerationFailed(String),
}

/// JWT token service
#[derive(Debug, Clone)]
pub struct JwtService {
    pub config: JwtConfig,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl JwtService {
    pub fn new() -> Self {
        Self::with_config(JwtConfig::default())
    }

    pub fn with_config(config: JwtConfig) -> Self {
        let encoding_key = EncodingKey::from_secret(config.secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.secret.as_bytes());

        Self {
            config,
            encoding_key,
            decoding_key,
        }
    }

    pub fn generate_token(&self, user: &User) -> Result<String, JwtError> {
        let now = Utc::now();
        let expiration = now + Duration::minutes(self.config.expiration_minutes);

        let claims = Claims {
            sub: user.id.clone(),
            email: user.email.clone(),
            role: user.role.as_str().to_string(),
            token_type: "access".to_string(),
            exp: expiration.timestamp(),
            iat: now.timestamp(),
            iss: self.config.issuer.clone(),
            aud: self.config.audience.clone(),
        };

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| JwtError::GenerationFailed(e.to_string()))
    }

    pub fn validate_token(&self, token: &str) -> Result<Claims, JwtError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_audience(&[&self.config.audience]);
        validation.set_issuer(&[&self.config.issuer]);
        validation.set_required_spec_claims(&["sub", "exp", "iat", "iss", "aud"]);

        let token_data = decode::<Claims>(token, &self.decoding_key, &validation).map_err(|e| {
            match e.kind() {
                ErrorKind::ExpiredSignature => JwtError::ExpiredToken,
                ErrorKind::InvalidSignature => JwtError::InvalidSignature,
                ErrorKind::InvalidToken => JwtError::InvalidToken(e.to_string()),
                _ => JwtError::InvalidToken(format!("Token validation failed: {}", e)),
            }
        })?;

        Ok(token_data.claims)
    }

    /// Extract the token from an `Authorization` header value.
    pub fn extract_from_header(header: &str) -> Option<&str> {
        header.strip_prefix("Bearer ")
    }
}

impl Default for JwtService {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::models::Role;

    fn test_config() -> JwtConfig {
        JwtConfig {
            secret: "0123456789abcdef0123456789abcdef".to_string(),
            expiration_minutes: 60,
            issuer: "flock-server".to_string(),
            audience: "flock-clients".to_string(),
        }
    }

    fn test_user(role: Role) -> User {
        User {
            id: "user-1".to_string(),
            email: "pastor@example.org".to_string(),
            username: None,
            password: "hash".to_string(),
            first_name: Some("Jane".to_string()),
            last_name: Some("Doe".to_string()),
            role,
            title: None,
            group_id: Some(10),
            pcf_id: None,
            cell_id: None,
            member_id: None,
            force_password_change: false,
            created_at: 0,
            updated_at: 0,
        }
    }

    #[test]
    fn test_generation_and_validation() {
        let service = JwtService::with_config(test_config());
        let token = service.generate_token(&test_user(Role::GroupPastor)).unwrap();
        let claims = service.validate_token(&token).unwrap();

        assert_eq!(claims.sub, "user-1");
        assert_eq!(claims.email, "pastor@example.org");
        assert_eq!(claims.role, "group_pastor");
        assert_eq!(claims.token_type, "access");
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let service = JwtService::with_config(test_config());
        let token = service.generate_token(&test_user(Role::Admin)).unwrap();

        let other = JwtService::with_config(JwtConfig {
            secret: "ffffffffffffffffffffffffffffffff".to_string(),
            ..test_config()
        });
        assert!(matches!(
            other.validate_token(&token),
            Err(JwtError::InvalidSignature)
        ));
    }

    #[test]
    fn test_extract_from_header() {
        assert_eq!(JwtService::extract_from_header("Bearer abc"), Some("abc"));
        assert_eq!(JwtService::extract_from_header("Basic abc"), None);
    }
}

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};

use crate::models::auth::{AuthUser, JwtClaims};
use crate::models::user::{User, UserRole};
use crate::utils::errors::{AppError, AppResult};

/// JWT settings
#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub algorithm: Algorithm,
    pub access_token_duration: Duration,
}

impl JwtConfig {
    pub fn new(secret: impl Into<String>, expire_hours: i64) -> Self {
        Self {
            secret: secret.into(),
            algorithm: Algorithm::HS256,
            access_token_duration: Duration::hours(expire_hours),
        }
    }
}

/// Issues and verifies access tokens
pub struct JwtService {
    config: JwtConfig,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl JwtService {
    pub fn new(config: JwtConfig) -> Self {
        let encoding_key = EncodingKey::from_secret(config.secret.as_ref());
        let decoding_key = DecodingKey::from_secret(config.secret.as_ref());

        Self {
            config,
            encoding_key,
            decoding_key,
        }
    }

    /// Returns the token and its expiry as a unix timestamp.
    pub fn generate_access_token(&self, user: &User) -> AppResult<(String, i64)> {
        let now = Utc::now();
        let exp = now + self.config.access_token_duration;

        let claims = JwtClaims {
            sub: user.id.to_string(),
            username: user.username.clone(),
            role: user.role.as_str().to_string(),
            exp: exp.timestamp(),
            iat: now.timestamp(),
        };

        let token = encode(&Header::new(self.config.algorithm), &claims, &self.encoding_key)?;
        Ok((token, claims.exp))
    }

    /// Validates signature and expiry and decodes the claims
    pub fn validate_token(&self, token: &str) -> AppResult<JwtClaims> {
        let validation = Validation::new(self.config.algorithm);

        decode::<JwtClaims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(AppError::from)
    }

    /// Verified identity carried by a token
    pub fn authenticate(&self, token: &str) -> AppResult<AuthUser> {
        let claims = self.validate_token(token)?;
        let id = claims
            .sub
            .parse::<i64>()
            .map_err(|_| AppError::Unauthorized("invalid token subject".to_string()))?;
        let role = UserRole::try_from(claims.role)
            .map_err(|_| AppError::Unauthorized("invalid role in token".to_string()))?;

        Ok(AuthUser {
            id,
            username: claims.username,
            role,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> User {
        User {
            id: 42,
            username: "dispatcher".to_string(),
            password_hash: String::new(),
            role: UserRole::Operator,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_generate_and_validate_token() {
        let jwt_service = JwtService::new(JwtConfig::new("test-secret", 24));

        let (token, expires_at) = jwt_service.generate_access_token(&user()).unwrap();
        assert!(!token.is_empty());
        assert!(expires_at > Utc::now().timestamp());

        let claims = jwt_service.validate_token(&token).unwrap();
        assert_eq!(claims.sub, "42");
        assert_eq!(claims.username, "dispatcher");
        assert_eq!(claims.role, "operator");

        let auth = jwt_service.authenticate(&token).unwrap();
        assert_eq!(auth.id, 42);
        assert_eq!(auth.role, UserRole::Operator);
    }

    #[test]
    fn test_wrong_secret_is_rejected() {
        let issuer = JwtService::new(JwtConfig::new("secret-a", 24));
        let verifier = JwtService::new(JwtConfig::new("secret-b", 24));

        let (token, _) = issuer.generate_access_token(&user()).unwrap();
        assert!(matches!(verifier.authenticate(&token), Err(AppError::Jwt(_))));
    }

    #[test]
    fn test_expired_token_is_rejected() {
        // Well past the default 60s leeway.
        let jwt_service = JwtService::new(JwtConfig::new("test-secret", -2));
        let (token, _) = jwt_service.generate_access_token(&user()).unwrap();
        assert!(jwt_service.validate_token(&token).is_err());
    }
}

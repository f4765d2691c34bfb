//! Bearer token signing and validation.

use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use time::OffsetDateTime;

use crate::config::Config;
use crate::issues::UserId;

use super::roles::Role;

/// Claims stored in the token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// User id.
    pub sub: String,
    pub username: String,
    pub role: Role,
    /// Expiry, unix seconds.
    pub exp: i64,
    /// Issued at, unix seconds.
    pub iat: i64,
    pub iss: String,
}

/// Token errors.
#[derive(Error, Debug)]
pub enum JwtError {
    #[error("invalid token: {0}")]
    InvalidToken(String),

    #[error("token expired")]
    ExpiredToken,

    #[error("token generation failed: {0}")]
    GenerationFailed(String),
}

/// Authenticated caller, inserted into request extensions by
/// [`require_auth`](super::require_auth).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentUser {
    pub id: UserId,
    pub username: String,
    pub role: Role,
}

impl TryFrom<Claims> for CurrentUser {
    type Error = JwtError;

    fn try_from(claims: Claims) -> Result<Self, Self::Error> {
        let id = claims
            .sub
            .parse()
            .map_err(|_| JwtError::InvalidToken(format!("non-numeric subject {:?}", claims.sub)))?;

        Ok(Self {
            id,
            username: claims.username,
            role: claims.role,
        })
    }
}

/// Signs and validates HS256 tokens.
#[derive(Clone)]
pub struct JwtService {
    issuer: String,
    ttl_seconds: i64,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl std::fmt::Debug for JwtService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtService")
            .field("issuer", &self.issuer)
            .field("ttl_seconds", &self.ttl_seconds)
            .finish_non_exhaustive()
    }
}

impl JwtService {
    /// Create a service from a secret, issuer and token lifetime.
    pub fn new(secret: &str, issuer: impl Into<String>, ttl_minutes: u64) -> Self {
        Self {
            issuer: issuer.into(),
            ttl_seconds: i64::try_from(ttl_minutes.saturating_mul(60)).unwrap_or(i64::MAX),
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
        }
    }

    /// Create a service from application config.
    pub fn from_config(config: &Config) -> Self {
        Self::new(&config.jwt_secret, config.jwt_issuer.clone(), config.token_ttl_minutes)
    }

    /// Issue a token for a user.
    pub fn issue_token(
        &self,
        user_id: UserId,
        username: &str,
        role: Role,
    ) -> Result<String, JwtError> {
        let now = OffsetDateTime::now_utc().unix_timestamp();
        let claims = Claims {
            sub: user_id.to_string(),
            username: username.to_string(),
            role,
            exp: now.saturating_add(self.ttl_seconds),
            iat: now,
            iss: self.issuer.clone(),
        };
        self.sign(&claims)
    }

    /// Sign arbitrary claims.
    pub fn sign(&self, claims: &Claims) -> Result<String, JwtError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key)
            .map_err(|e| JwtError::GenerationFailed(e.to_string()))
    }

    /// Validate a token and return its claims.
    pub fn validate_token(&self, token: &str) -> Result<Claims, JwtError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[&self.issuer]);
        validation.set_required_spec_claims(&["exp", "iss", "sub"]);

        decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => JwtError::ExpiredToken,
                _ => JwtError::InvalidToken(e.to_string()),
            })
    }

    /// Extract the token from an `Authorization` header value.
    pub fn extract_from_header(header: &str) -> Option<&str> {
        header
            .strip_prefix("Bearer ")
            .map(str::trim)
            .filter(|token| !token.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "0123456789abcdef0123456789abcdef";

    fn service() -> JwtService {
        JwtService::new(SECRET, "lab-issues", 60)
    }

    #[test]
    fn issued_token_validates() {
        let jwt = service();
        let token = jwt.issue_token(7, "anna", Role::Laborants).unwrap();

        let claims = jwt.validate_token(&token).unwrap();
        assert_eq!(claims.sub, "7");
        assert_eq!(claims.role, Role::Laborants);

        let user = CurrentUser::try_from(claims).unwrap();
        assert_eq!(user.id, 7);
        assert_eq!(user.username, "anna");
    }

    #[test]
    fn rejects_wrong_secret() {
        let token = service().issue_token(1, "a", Role::Lietotajs).unwrap();
        let other = JwtService::new("ffffffffffffffffffffffffffffffff", "lab-issues", 60);

        assert!(matches!(other.validate_token(&token), Err(JwtError::InvalidToken(_))));
    }

    #[test]
    fn rejects_wrong_issuer() {
        let token = service().issue_token(1, "a", Role::Lietotajs).unwrap();
        let other = JwtService::new(SECRET, "someone-else", 60);

        assert!(other.validate_token(&token).is_err());
    }

    #[test]
    fn reports_expiry() {
        let jwt = service();
        let now = OffsetDateTime::now_utc().unix_timestamp();
        let token = jwt
            .sign(&Claims {
                sub: "1".to_string(),
                username: "a".to_string(),
                role: Role::Lietotajs,
                exp: now - 3600,
                iat: now - 7200,
                iss: "lab-issues".to_string(),
            })
            .unwrap();

        assert!(matches!(jwt.validate_token(&token), Err(JwtError::ExpiredToken)));
    }

    #[test]
    fn non_numeric_subject_is_rejected() {
        let claims = Claims {
            sub: "anna".to_string(),
            username: "anna".to_string(),
            role: Role::Lietotajs,
            exp: 0,
            iat: 0,
            iss: "lab-issues".to_string(),
        };
        assert!(CurrentUser::try_from(claims).is_err());
    }

    #[test]
    fn extracts_bearer_token() {
        assert_eq!(JwtService::extract_from_header("Bearer abc.def"), Some("abc.def"));
        assert_eq!(JwtService::extract_from_header("Basic abc"), None);
        assert_eq!(JwtService::extract_from_header("Bearer "), None);
    }
}

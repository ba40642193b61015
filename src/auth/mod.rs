pub mod password;
pub mod policy;

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::SecurityConfig;
use crate::database::models::{AccessToken, User};
use crate::types::Scope;

pub use policy::{authorize, Actor, Decision, Identity, PolicyError};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User id
    pub sub: i64,
    pub email: String,
    pub scopes: Vec<Scope>,
    /// Token id, matches the stored `AccessToken`
    pub jti: Uuid,
    pub exp: i64,
    pub iat: i64,
}

impl Claims {
    pub fn new(user: &User, scopes: Vec<Scope>, issued_at: DateTime<Utc>, expiry_hours: u64) -> Self {
        let exp = (issued_at + Duration::hours(expiry_hours as i64)).timestamp();

        Self {
            sub: user.id,
            email: user.email.clone(),
            scopes,
            jti: Uuid::new_v4(),
            exp,
            iat: issued_at.timestamp(),
        }
    }

    pub fn has_scope(&self, scope: Scope) -> bool {
        self.scopes.contains(&scope)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("JWT generation error: {0}")]
    TokenGeneration(String),
    #[error("Invalid JWT secret")]
    InvalidSecret,
    #[error("Invalid token: {0}")]
    Invalid(String),
}

/// Freshly signed token together with the record that must be persisted for revocation.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub record: AccessToken,
}

pub fn issue_token(security: &SecurityConfig, user: &User, scopes: Vec<Scope>) -> Result<IssuedToken, TokenError> {
    let now = Utc::now();
    let claims = Claims::new(user, scopes, now, security.jwt_expiry_hours);
    let record = AccessToken {
        id: claims.jti,
        user_id: user.id,
        scopes: claims.scopes.clone(),
        revoked: false,
        created_at: now,
        expires_at: DateTime::<Utc>::from_timestamp(claims.exp, 0).unwrap_or(now),
    };

    let token = generate_jwt(&security.jwt_secret, &claims)?;
    Ok(IssuedToken { token, record })
}

pub fn generate_jwt(secret: &str, claims: &Claims) -> Result<String, TokenError> {
    if secret.is_empty() {
        return Err(TokenError::InvalidSecret);
    }

    let encoding_key = EncodingKey::from_secret(secret.as_bytes());
    let header = Header::default();

    encode(&header, claims, &encoding_key).map_err(|e| TokenError::TokenGeneration(e.to_string()))
}

/// Validate signature and expiry, returning the claims
pub fn validate_jwt(secret: &str, token: &str) -> Result<Claims, TokenError> {
    if secret.is_empty() {
        return Err(TokenError::InvalidSecret);
    }

    let decoding_key = DecodingKey::from_secret(secret.as_bytes());
    let validation = Validation::default();

    let token_data =
        decode::<Claims>(token, &decoding_key, &validation).map_err(|e| TokenError::Invalid(e.to_string()))?;

    Ok(token_data.claims)
}

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::auth::{AuthError, Identity};
use crate::database::models::{Role, User};

/// Signed access-token payload
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    pub sub: String,
    pub username: String,
    pub role: String,
    pub iat: i64,
    pub exp: i64,
}

/// What is accepted on the way in; missing identity claims are rejected after decoding
#[derive(Debug, Deserialize)]
struct IncomingClaims {
    sub: Option<String>,
    username: Option<String>,
    role: Option<String>,
}

/// HS256 issuing and verification with a single shared secret
#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    expiry_secs: i64,
}

impl TokenService {
    pub fn new(secret: &str, expiry_secs: i64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            expiry_secs,
        }
    }

    pub fn issue(&self, user: &User) -> Result<String, AuthError> {
        let now = Utc::now();
        let claims = Claims {
            sub: user.id.clone(),
            username: user.username.clone(),
            role: user.role.clone(),
            iat: now.timestamp(),
            exp: (now + Duration::seconds(self.expiry_secs)).timestamp(),
        };
        self.sign(&claims)
    }

    pub(crate) fn sign(&self, claims: &Claims) -> Result<String, AuthError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key)
            .map_err(|e| AuthError::TokenGeneration(e.to_string()))
    }

    /// Signature, algorithm and expiry are all checked; the identity claims must be non-empty
    pub fn verify(&self, token: &str) -> Result<Identity, AuthError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        let data = decode::<IncomingClaims>(token, &self.decoding_key, &validation).map_err(|e| {
            tracing::debug!("Rejected token: {}", e);
            AuthError::InvalidToken
        })?;

        let claims = data.claims;
        match (claims.sub, claims.username) {
            (Some(id), Some(username)) if !id.is_empty() && !username.is_empty() => Ok(Identity {
                id,
                username,
                role: claims.role.as_deref().map(Role::parse).unwrap_or(Role::User),
            }),
            _ => Err(AuthError::InvalidToken),
        }
    }
}

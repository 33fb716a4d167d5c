use axum::{extract::FromRequestParts, http::request::Parts};
use serde::Serialize;
use thiserror::Error;

use crate::database::models::{Role, User};
use crate::database::DatabaseError;
use crate::error::ApiError;

pub mod dto;
pub mod password;
pub mod service;
pub mod token;

pub use dto::{AccessToken, LoginDto, SignupDto};
pub use password::PasswordHasher;
pub use service::AuthService;
pub use token::{Claims, TokenService};

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Password hashing failed: {0}")]
    Hashing(String),

    #[error("Token generation failed: {0}")]
    TokenGeneration(String),

    #[error(transparent)]
    Database(#[from] DatabaseError),
}

/// The verified caller of a request
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Identity {
    pub id: String,
    pub username: String,
    pub role: Role,
}

impl From<&User> for Identity {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.clone(),
            username: user.username.clone(),
            role: user.role(),
        }
    }
}

/// Pulls the identity attached by the auth middleware; a route reached without one is 401
#[axum::async_trait]
impl<S> FromRequestParts<S> for Identity
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Identity>()
            .cloned()
            .ok_or_else(ApiError::unauthorized)
    }
}

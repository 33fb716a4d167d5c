// HTTP API Error Types
use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};

use crate::auth::AuthError;
use crate::database::DatabaseError;

const UNAUTHORIZED: &str = "Unauthorized";
const INTERNAL: &str = "Internal server error";

/// HTTP API error with appropriate status codes and client-safe messages
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    // 400 Bad Request
    BadRequest(String),
    /// Every violated field rule, not just the first
    ValidationError(Vec<String>),

    // 401 Unauthorized
    Unauthorized,

    // 404 Not Found
    NotFound(String),

    // 409 Conflict
    Conflict(String),

    // 500 Internal Server Error
    InternalServerError,

    // 503 Service Unavailable
    ServiceUnavailable(String),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) | ApiError::ValidationError(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::InternalServerError => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    /// Client-safe message; validation errors carry a list instead
    pub fn message(&self) -> Value {
        match self {
            ApiError::ValidationError(violations) => json!(violations),
            ApiError::BadRequest(msg)
            | ApiError::NotFound(msg)
            | ApiError::Conflict(msg)
            | ApiError::ServiceUnavailable(msg) => json!(msg),
            ApiError::Unauthorized => json!(UNAUTHORIZED),
            ApiError::InternalServerError => json!(INTERNAL),
        }
    }

    /// `{ statusCode, message, error }`, where `error` is the reason phrase
    /// and is left out when it would only repeat the message.
    pub fn to_json(&self) -> Value {
        let status = self.status_code();
        let reason = status.canonical_reason().unwrap_or("Error");
        let message = self.message();

        let mut body = json!({
            "statusCode": status.as_u16(),
            "message": message,
        });
        if message.as_str() != Some(reason) {
            body["error"] = json!(reason);
        }
        body
    }
}

// Static constructor methods
impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest(message.into())
    }

    pub fn validation(violations: Vec<String>) -> Self {
        ApiError::ValidationError(violations)
    }

    pub fn unauthorized() -> Self {
        ApiError::Unauthorized
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        ApiError::Conflict(message.into())
    }

    pub fn internal_server_error() -> Self {
        ApiError::InternalServerError
    }

    pub fn service_unavailable(message: impl Into<String>) -> Self {
        ApiError::ServiceUnavailable(message.into())
    }
}

impl From<DatabaseError> for ApiError {
    fn from(err: DatabaseError) -> Self {
        match err {
            DatabaseError::NotFound(msg) => ApiError::not_found(msg),
            DatabaseError::Conflict(msg) => ApiError::conflict(msg),
            DatabaseError::InvalidDatabaseUrl(_) | DatabaseError::QueryError(_) => {
                // Don't expose internal SQL errors to clients
                tracing::error!("Database query error: {}", err);
                ApiError::internal_server_error()
            }
            DatabaseError::Sqlx(sqlx_err) => {
                tracing::error!("SQLx error: {}", sqlx_err);
                ApiError::internal_server_error()
            }
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidCredentials | AuthError::InvalidToken => ApiError::unauthorized(),
            AuthError::Database(db_err) => db_err.into(),
            other => {
                tracing::error!("Authentication failure: {}", other);
                ApiError::internal_server_error()
            }
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApiError::ValidationError(violations) => write!(f, "{}", violations.join(", ")),
            ApiError::BadRequest(msg)
            | ApiError::NotFound(msg)
            | ApiError::Conflict(msg)
            | ApiError::ServiceUnavailable(msg) => write!(f, "{}", msg),
            ApiError::Unauthorized => write!(f, "{}", UNAUTHORIZED),
            ApiError::InternalServerError => write!(f, "{}", INTERNAL),
        }
    }
}

impl std::error::Error for ApiError {}

// Automatic HTTP response conversion for Axum
impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        (self.status_code(), Json(self.to_json())).into_response()
    }
}

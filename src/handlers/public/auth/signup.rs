// handlers/public/auth/signup.rs - POST /auth/signup handler

use axum::{extract::State, http::StatusCode};

use crate::app::AppState;
use crate::auth::SignupDto;
use crate::crud::validate::parse;
use crate::middleware::{ApiResponse, ApiResult, JsonBody, StatusResponse};

/// Register a new account with role USER.
///
/// Responds 201 `{ status, message }`; the stored user is never echoed back.
/// A taken username is 409 and an invalid body is 400 with every violation.
pub async fn signup_post(
    State(state): State<AppState>,
    JsonBody(body): JsonBody,
) -> ApiResult<StatusResponse> {
    let dto = parse::<SignupDto>(body)?;
    state.auth.signup(dto).await?;

    Ok(ApiResponse::created(StatusResponse {
        status: StatusCode::CREATED.as_u16(),
        message: "User created successfully".to_string(),
    }))
}

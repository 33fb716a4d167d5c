// handlers/public/auth/login.rs - POST /auth/login handler

use axum::extract::State;
use tracing::debug;

use crate::app::AppState;
use crate::auth::{AccessToken, AuthError, LoginDto};
use crate::middleware::{ApiResponse, ApiResult, JsonBody};

/// Exchange credentials for `{ accessToken }`.
///
/// Unknown user, wrong password and an unusable body all produce the same 401.
pub async fn login_post(
    State(state): State<AppState>,
    JsonBody(body): JsonBody,
) -> ApiResult<AccessToken> {
    let dto = LoginDto::from_value(&body).ok_or_else(|| {
        debug!("Login body without string credentials");
        AuthError::InvalidCredentials
    })?;

    let token = state.auth.login(dto).await?;
    Ok(ApiResponse::success(token))
}

// handlers/protected/auth/whoami.rs - GET /auth/whoami handler

use crate::auth::Identity;
use crate::middleware::{ApiResponse, ApiResult};

/// The identity the bearer token resolved to
pub async fn whoami_get(identity: Identity) -> ApiResult<Identity> {
    Ok(ApiResponse::success(identity))
}

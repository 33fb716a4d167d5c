pub mod auth;
pub mod json;
pub mod response;

pub use auth::{extract_bearer_token, require_auth};
pub use json::JsonBody;
pub use response::{ApiResponse, ApiResult, GenericResponse, StatusResponse};

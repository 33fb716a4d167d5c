use axum::{
    body::Bytes,
    extract::{FromRequest, Request},
};
use serde_json::Value;

use crate::error::ApiError;

/// Lenient JSON body: an empty body reads as `{}` so field validation can
/// report what is missing, and malformed JSON is a 400 in the API error shape.
#[derive(Debug, Clone, PartialEq)]
pub struct JsonBody(pub Value);

#[axum::async_trait]
impl<S> FromRequest<S> for JsonBody
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state).await.map_err(|e| {
            tracing::warn!("Failed to read request body: {}", e);
            ApiError::bad_request(e.body_text())
        })?;
        parse_body(&bytes).map(JsonBody)
    }
}

fn parse_body(bytes: &[u8]) -> Result<Value, ApiError> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Object(Default::default()));
    }
    serde_json::from_slice(bytes).map_err(|e| ApiError::bad_request(format!("Invalid JSON body: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use serde_json::json;

    #[test]
    fn empty_body_is_an_empty_object() {
        assert_eq!(parse_body(b"").unwrap(), json!({}));
        assert_eq!(parse_body(b"  \n").unwrap(), json!({}));
    }

    #[test]
    fn malformed_json_is_bad_request() {
        let err = parse_body(b"{ not json").unwrap_err();
        assert!(matches!(err, ApiError::BadRequest(_)));
    }

    #[tokio::test]
    async fn extracts_from_request() {
        let req = axum::http::Request::builder()
            .body(Body::from(r#"{"title":"a"}"#))
            .unwrap();
        let JsonBody(value) = JsonBody::from_request(req, &()).await.unwrap();
        assert_eq!(value, json!({ "title": "a" }));
    }
}

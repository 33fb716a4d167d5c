use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::ApiError;

/// A request body with declared field rules.
///
/// `violations` inspects the raw JSON and reports every broken rule, so a
/// client sees all problems with a body at once.
pub trait Validate: DeserializeOwned {
    fn violations(raw: &Value) -> Vec<String>;
}

/// Validate, then deserialize; violations become a 400 listing each of them
pub fn parse<T: Validate>(raw: Value) -> Result<T, ApiError> {
    let violations = T::violations(&raw);
    if !violations.is_empty() {
        return Err(ApiError::validation(violations));
    }
    serde_json::from_value(raw).map_err(|e| ApiError::bad_request(e.to_string()))
}

/// A required, non-empty string field
pub fn required_string(raw: &Value, field: &str, violations: &mut Vec<String>) {
    match raw.get(field) {
        None | Some(Value::Null) => {
            violations.push(format!("{} should not be empty", field));
            violations.push(format!("{} must be a string", field));
        }
        Some(Value::String(s)) if s.is_empty() => {
            violations.push(format!("{} should not be empty", field));
        }
        Some(Value::String(_)) => {}
        Some(_) => violations.push(format!("{} must be a string", field)),
    }
}

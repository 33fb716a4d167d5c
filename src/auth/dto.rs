use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::crud::validate::{required_string, Validate};

#[derive(Debug, Clone, Deserialize)]
pub struct SignupDto {
    pub username: String,
    pub password: String,
}

impl Validate for SignupDto {
    fn violations(raw: &Value) -> Vec<String> {
        let mut violations = Vec::new();
        required_string(raw, "username", &mut violations);
        required_string(raw, "password", &mut violations);
        violations
    }
}

/// Login is not validated; anything unusable is simply bad credentials
#[derive(Debug, Clone)]
pub struct LoginDto {
    pub username: String,
    pub password: String,
}

impl LoginDto {
    pub fn from_value(raw: &Value) -> Option<Self> {
        let username = raw.get("username")?.as_str()?;
        let password = raw.get("password")?.as_str()?;
        Some(Self {
            username: username.to_string(),
            password: password.to_string(),
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AccessToken {
    pub access_token: String,
}

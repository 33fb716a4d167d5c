use serde::Deserialize;
use serde_json::Value;

use crate::crud::validate::{required_string, Validate};

fn todo_violations(raw: &Value) -> Vec<String> {
    let mut violations = Vec::new();
    required_string(raw, "title", &mut violations);
    required_string(raw, "description", &mut violations);
    violations
}

/// Any `id` or `user_id` in the body is ignored
#[derive(Debug, Clone, Deserialize)]
pub struct CreateTodoDto {
    pub title: String,
    pub description: String,
}

impl Validate for CreateTodoDto {
    fn violations(raw: &Value) -> Vec<String> {
        todo_violations(raw)
    }
}

/// Updates replace both fields
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateTodoDto {
    pub title: String,
    pub description: String,
}

impl Validate for UpdateTodoDto {
    fn violations(raw: &Value) -> Vec<String> {
        todo_violations(raw)
    }
}

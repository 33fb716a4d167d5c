use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use sqlx::FromRow;

use super::{new_id, timestamp, Entity, Owned};

/// Only id, title and description reach clients
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Todo {
    pub id: String,
    pub title: String,
    pub description: String,
    #[serde(skip)]
    pub user_id: String,
    #[serde(skip)]
    pub created_at: String,
    #[serde(skip)]
    pub updated_at: String,
}

impl Todo {
    pub fn new(
        owner_id: impl Into<String>,
        title: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        let now = timestamp();
        Self {
            id: new_id(),
            title: title.into(),
            description: description.into(),
            user_id: owner_id.into(),
            created_at: now.clone(),
            updated_at: now,
        }
    }

    pub fn touch(&mut self) {
        self.updated_at = timestamp();
    }
}

impl Entity for Todo {
    const TABLE: &'static str = "todos";
    const NAME: &'static str = "Todo";
    const DEFAULT_ORDER: &'static str = "created_at DESC, rowid DESC";
    // The owner is fixed at creation
    const IMMUTABLE_COLUMNS: &'static [&'static str] = &["id", "created_at", "user_id"];

    fn id(&self) -> &str {
        &self.id
    }

    fn columns(&self) -> Vec<(&'static str, Value)> {
        vec![
            ("id", json!(self.id)),
            ("user_id", json!(self.user_id)),
            ("title", json!(self.title)),
            ("description", json!(self.description)),
            ("created_at", json!(self.created_at)),
            ("updated_at", json!(self.updated_at)),
        ]
    }
}

impl Owned for Todo {
    fn owner_id(&self) -> &str {
        &self.user_id
    }
}

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use sqlx::FromRow;

use super::{new_id, timestamp, Entity};
use crate::database::{Criteria, DatabaseError, Repository};

/// User persistence; username uniqueness is enforced by the table
pub type UserStore = Repository<User>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    User,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "USER",
            Role::Admin => "ADMIN",
        }
    }

    /// Unknown values fall back to the least privileged role
    pub fn parse(value: &str) -> Self {
        match value {
            "ADMIN" => Role::Admin,
            _ => Role::User,
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: String,
    pub username: String,
    /// Argon2 PHC string, never the plaintext
    #[serde(skip_serializing)]
    pub password: String,
    pub role: String,
    pub created_at: String,
    pub updated_at: String,
}

impl User {
    pub fn new(username: impl Into<String>, password_hash: impl Into<String>, role: Role) -> Self {
        let now = timestamp();
        Self {
            id: new_id(),
            username: username.into(),
            password: password_hash.into(),
            role: role.as_str().to_string(),
            created_at: now.clone(),
            updated_at: now,
        }
    }

    pub fn role(&self) -> Role {
        Role::parse(&self.role)
    }
}

impl Entity for User {
    const TABLE: &'static str = "users";
    const NAME: &'static str = "User";
    const DEFAULT_ORDER: &'static str = "created_at ASC, rowid ASC";

    fn id(&self) -> &str {
        &self.id
    }

    fn columns(&self) -> Vec<(&'static str, Value)> {
        vec![
            ("id", json!(self.id)),
            ("username", json!(self.username)),
            ("password", json!(self.password)),
            ("role", json!(self.role)),
            ("created_at", json!(self.created_at)),
            ("updated_at", json!(self.updated_at)),
        ]
    }
}

impl Repository<User> {
    pub async fn find_by_username(&self, username: &str) -> Result<Option<User>, DatabaseError> {
        self.find_optional(Criteria::new().eq("username", username))
            .await
    }

    /// Both halves of the token identity must still match a stored user
    pub async fn find_by_identity(
        &self,
        id: &str,
        username: &str,
    ) -> Result<Option<User>, DatabaseError> {
        self.find_optional(Criteria::new().eq("id", id).eq("username", username))
            .await
    }
}

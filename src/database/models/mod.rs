use chrono::{SecondsFormat, Utc};
use serde_json::Value;
use sqlx::{sqlite::SqliteRow, FromRow};

pub mod todo;
pub mod user;

pub use todo::Todo;
pub use user::{Role, User, UserStore};

/// A row type persisted in its own table
pub trait Entity: for<'r> FromRow<'r, SqliteRow> + Send + Sync + Unpin + 'static {
    const TABLE: &'static str;
    /// Human name used in "<NAME> not found" messages
    const NAME: &'static str;
    const DEFAULT_ORDER: &'static str = "";
    /// Columns an upsert or update never overwrites
    const IMMUTABLE_COLUMNS: &'static [&'static str] = &["id", "created_at"];

    fn id(&self) -> &str;

    /// Every persisted column with its value, in insert order
    fn columns(&self) -> Vec<(&'static str, Value)>;
}

/// An entity that belongs to exactly one user
pub trait Owned: Entity {
    const OWNER_COLUMN: &'static str = "user_id";

    fn owner_id(&self) -> &str;
}

pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Fixed-width UTC timestamp, so lexical order matches chronological order
pub fn timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timestamps_sort_lexically() {
        let a = timestamp();
        std::thread::sleep(std::time::Duration::from_millis(2));
        let b = timestamp();
        assert!(a < b);
        assert!(a.ends_with('Z'));
        assert_eq!(a.len(), b.len());
    }

    #[test]
    fn ids_are_unique_uuids() {
        let a = new_id();
        assert_ne!(a, new_id());
        assert!(uuid::Uuid::parse_str(&a).is_ok());
    }
}

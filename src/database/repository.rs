use serde_json::Value;
use sqlx::sqlite::SqlitePool;

use crate::database::criteria::Criteria;
use crate::database::manager::DatabaseError;
use crate::database::models::Entity;
use crate::database::query_builder::{
    bind_param_query, bind_param_query_as, delete_sql, update_sql, upsert_sql, QueryBuilder,
};

/// Table-bound access for one entity type
pub struct Repository<T> {
    pool: SqlitePool,
    _phantom: std::marker::PhantomData<T>,
}

impl<T> Clone for Repository<T> {
    fn clone(&self) -> Self {
        Self {
            pool: self.pool.clone(),
            _phantom: std::marker::PhantomData,
        }
    }
}

impl<T: Entity> Repository<T> {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            pool,
            _phantom: std::marker::PhantomData,
        }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// All rows matching the criteria, in the entity's default order
    pub async fn find(&self, criteria: Criteria) -> Result<Vec<T>, DatabaseError> {
        QueryBuilder::<T>::new(T::TABLE)?
            .filter(criteria)?
            .order_by(T::DEFAULT_ORDER)
            .select_all(&self.pool)
            .await
    }

    pub async fn find_optional(&self, criteria: Criteria) -> Result<Option<T>, DatabaseError> {
        QueryBuilder::<T>::new(T::TABLE)?
            .filter(criteria)?
            .order_by(T::DEFAULT_ORDER)
            .select_optional(&self.pool)
            .await
    }

    pub async fn find_one(&self, criteria: Criteria) -> Result<T, DatabaseError> {
        self.find_optional(criteria)
            .await?
            .ok_or_else(|| not_found::<T>())
    }

    /// Insert, or overwrite the mutable columns of an existing row with the same id
    pub async fn upsert(&self, entity: &T) -> Result<T, DatabaseError> {
        let sql = upsert_sql(T::TABLE, entity.columns(), T::IMMUTABLE_COLUMNS)?;
        let mut q = sqlx::query_as::<_, T>(&sql.query);
        for p in sql.params.iter() {
            q = bind_param_query_as(q, p);
        }
        q.fetch_optional(&self.pool)
            .await
            .map_err(|e| translate_write_error(e, entity))?
            .ok_or_else(|| {
                DatabaseError::QueryError(format!("Upsert on {} returned no row", T::TABLE))
            })
    }

    /// Update an existing row; a missing id is NotFound, never an insert
    pub async fn update(&self, entity: &T) -> Result<T, DatabaseError> {
        let sql = update_sql(T::TABLE, entity.id(), entity.columns(), T::IMMUTABLE_COLUMNS)?;
        let mut q = sqlx::query_as::<_, T>(&sql.query);
        for p in sql.params.iter() {
            q = bind_param_query_as(q, p);
        }
        q.fetch_optional(&self.pool)
            .await
            .map_err(|e| translate_write_error(e, entity))?
            .ok_or_else(|| not_found::<T>())
    }

    pub async fn remove(&self, id: &str) -> Result<(), DatabaseError> {
        let sql = delete_sql(T::TABLE, id)?;
        let mut q = sqlx::query(&sql.query);
        for p in sql.params.iter() {
            q = bind_param_query(q, p);
        }
        let result = q.execute(&self.pool).await?;
        if result.rows_affected() == 0 {
            return Err(not_found::<T>());
        }
        Ok(())
    }
}

fn not_found<T: Entity>() -> DatabaseError {
    DatabaseError::NotFound(format!("{} not found", T::NAME))
}

fn translate_write_error<T: Entity>(err: sqlx::Error, entity: &T) -> DatabaseError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_unique_violation() {
            return DatabaseError::Conflict(unique_violation_message(
                T::NAME,
                db_err.message(),
                &entity.columns(),
            ));
        }
    }
    DatabaseError::Sqlx(err)
}

/// Turn a driver's unique-constraint message into "<field> <value> already exists".
///
/// Postgres reports column and value ("Key (username)=(bob) already exists."),
/// SQLite only the column ("UNIQUE constraint failed: users.username"), in which
/// case the value is taken from the row being written.
pub fn unique_violation_message(
    entity: &str,
    driver_message: &str,
    columns: &[(&'static str, Value)],
) -> String {
    if let Some(rest) = driver_message.split("Key (").nth(1) {
        if let Some((field, tail)) = rest.split_once(")=(") {
            if let Some((value, _)) = tail.split_once(')') {
                return format!("{} {} already exists", field, value);
            }
        }
    }

    if let Some(failed) = driver_message.strip_prefix("UNIQUE constraint failed: ") {
        let parts: Vec<String> = failed
            .split(',')
            .filter_map(|c| c.trim().rsplit('.').next())
            .map(|field| {
                let value = columns
                    .iter()
                    .find(|(name, _)| *name == field)
                    .map(|(_, v)| match v {
                        Value::String(s) => s.clone(),
                        other => other.to_string(),
                    });
                match value {
                    Some(value) => format!("{} {}", field, value),
                    None => field.to_string(),
                }
            })
            .collect();
        if !parts.is_empty() {
            return format!("{} already exists", parts.join(", "));
        }
    }

    format!("{} already exists", entity)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::manager::migrate;
    use crate::database::models::{Role, Todo, User};
    use sqlx::sqlite::SqlitePoolOptions;

    async fn pool() -> SqlitePool {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        sqlx::query("PRAGMA foreign_keys = ON").execute(&pool).await.unwrap();
        migrate(&pool).await.unwrap();
        pool
    }

    #[test]
    fn unique_violation_messages() {
        let columns = User::new("test123", "h", Role::User).columns();
        assert_eq!(
            unique_violation_message("User", "Key (username)=(test123) already exists.", &[]),
            "username test123 already exists"
        );
        assert_eq!(
            unique_violation_message("User", "UNIQUE constraint failed: users.username", &columns),
            "username test123 already exists"
        );
        assert_eq!(
            unique_violation_message("User", "UNIQUE constraint failed: users.email", &columns),
            "email already exists"
        );
        assert_eq!(unique_violation_message("User", "boom", &columns), "User already exists");
    }

    #[tokio::test]
    async fn upsert_then_find_and_conflict() {
        let users = Repository::<User>::new(pool().await);
        let alice = users.upsert(&User::new("alice", "h", Role::User)).await.unwrap();
        assert_eq!(alice.username, "alice");

        let found = users
            .find_one(Criteria::new().eq("username", "alice"))
            .await
            .unwrap();
        assert_eq!(found.id, alice.id);

        let err = users
            .upsert(&User::new("alice", "other", Role::User))
            .await
            .unwrap_err();
        match err {
            DatabaseError::Conflict(msg) => assert_eq!(msg, "username alice already exists"),
            other => panic!("expected conflict, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn update_and_remove_missing_rows_are_not_found() {
        let pool = pool().await;
        let users = Repository::<User>::new(pool.clone());
        let todos = Repository::<Todo>::new(pool);
        let owner = users.upsert(&User::new("bob", "h", Role::User)).await.unwrap();

        let ghost = Todo::new(&owner.id, "t", "d");
        let err = todos.update(&ghost).await.unwrap_err();
        assert!(matches!(err, DatabaseError::NotFound(ref m) if m == "Todo not found"));
        let err = todos.remove(&ghost.id).await.unwrap_err();
        assert!(matches!(err, DatabaseError::NotFound(_)));

        let mut saved = todos.upsert(&ghost).await.unwrap();
        saved.title = "changed".to_string();
        let updated = todos.update(&saved).await.unwrap();
        assert_eq!(updated.title, "changed");
        assert_eq!(updated.created_at, ghost.created_at);

        todos.remove(&saved.id).await.unwrap();
        assert!(todos
            .find_optional(Criteria::new().eq("id", saved.id.as_str()))
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn todos_require_an_existing_owner() {
        let todos = Repository::<Todo>::new(pool().await);
        let err = todos.upsert(&Todo::new("nobody", "t", "d")).await.unwrap_err();
        assert!(matches!(err, DatabaseError::Sqlx(_)));
    }
}

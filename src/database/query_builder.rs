use serde_json::Value;
use sqlx::sqlite::{SqliteArguments, SqlitePool, SqliteRow};
use sqlx::{self, FromRow, Sqlite};

use crate::database::criteria::{is_identifier, Criteria};
use crate::database::manager::DatabaseError;

/// Rendered statement plus its positional parameters
#[derive(Debug, Clone, PartialEq)]
pub struct SqlResult {
    pub query: String,
    pub params: Vec<Value>,
}

pub struct QueryBuilder<T> {
    table_name: String,
    criteria: Criteria,
    order_by: Option<String>,
    _phantom: std::marker::PhantomData<T>,
}

impl<T> QueryBuilder<T>
where
    T: for<'r> FromRow<'r, SqliteRow> + Send + Unpin,
{
    pub fn new(table_name: impl Into<String>) -> Result<Self, DatabaseError> {
        let name = table_name.into();
        check_identifier(&name)?;
        Ok(Self {
            table_name: name,
            criteria: Criteria::new(),
            order_by: None,
            _phantom: std::marker::PhantomData,
        })
    }

    pub fn filter(mut self, criteria: Criteria) -> Result<Self, DatabaseError> {
        for (column, _) in criteria.conditions() {
            check_identifier(column)?;
        }
        self.criteria = criteria;
        Ok(self)
    }

    /// Raw ORDER BY clause; only ever fed from entity constants
    pub fn order_by(mut self, clause: &str) -> Self {
        if !clause.is_empty() {
            self.order_by = Some(clause.to_string());
        }
        self
    }

    pub fn to_sql(&self) -> SqlResult {
        let mut query = format!("SELECT * FROM \"{}\"", self.table_name);
        let mut params = Vec::with_capacity(self.criteria.conditions().len());

        if !self.criteria.is_empty() {
            let clauses: Vec<String> = self
                .criteria
                .conditions()
                .iter()
                .map(|(column, value)| {
                    params.push(value.clone());
                    format!("\"{}\" = ?", column)
                })
                .collect();
            query.push_str(" WHERE ");
            query.push_str(&clauses.join(" AND "));
        }

        if let Some(order) = &self.order_by {
            query.push_str(" ORDER BY ");
            query.push_str(order);
        }

        SqlResult { query, params }
    }

    pub async fn select_all(self, pool: &SqlitePool) -> Result<Vec<T>, DatabaseError> {
        let sql_result = self.to_sql();
        let mut q = sqlx::query_as::<_, T>(&sql_result.query);
        for p in sql_result.params.iter() {
            q = bind_param_query_as(q, p);
        }
        let rows = q.fetch_all(pool).await?;
        Ok(rows)
    }

    pub async fn select_optional(self, pool: &SqlitePool) -> Result<Option<T>, DatabaseError> {
        let sql_result = self.to_sql();
        let mut q = sqlx::query_as::<_, T>(&sql_result.query);
        for p in sql_result.params.iter() {
            q = bind_param_query_as(q, p);
        }
        let row = q.fetch_optional(pool).await?;
        Ok(row)
    }
}

/// `INSERT ... ON CONFLICT("id") DO UPDATE ... RETURNING *` over the given columns.
/// Columns listed in `immutable` keep their stored value on conflict.
pub fn upsert_sql(
    table: &str,
    columns: Vec<(&'static str, Value)>,
    immutable: &[&str],
) -> Result<SqlResult, DatabaseError> {
    check_identifier(table)?;
    let mut names = Vec::with_capacity(columns.len());
    let mut params = Vec::with_capacity(columns.len());
    for (name, value) in columns {
        check_identifier(name)?;
        names.push(name);
        params.push(value);
    }

    let quoted: Vec<String> = names.iter().map(|n| format!("\"{}\"", n)).collect();
    let placeholders = vec!["?"; names.len()].join(", ");
    let assignments: Vec<String> = names
        .iter()
        .filter(|n| !immutable.contains(n))
        .map(|n| format!("\"{0}\" = excluded.\"{0}\"", n))
        .collect();

    let conflict = if assignments.is_empty() {
        "DO NOTHING".to_string()
    } else {
        format!("DO UPDATE SET {}", assignments.join(", "))
    };

    Ok(SqlResult {
        query: format!(
            "INSERT INTO \"{}\" ({}) VALUES ({}) ON CONFLICT(\"id\") {} RETURNING *",
            table,
            quoted.join(", "),
            placeholders,
            conflict
        ),
        params,
    })
}

/// `UPDATE ... SET ... WHERE "id" = ? RETURNING *`, skipping immutable columns
pub fn update_sql(
    table: &str,
    id: &str,
    columns: Vec<(&'static str, Value)>,
    immutable: &[&str],
) -> Result<SqlResult, DatabaseError> {
    check_identifier(table)?;
    let mut assignments = Vec::new();
    let mut params = Vec::new();
    for (name, value) in columns {
        check_identifier(name)?;
        if immutable.contains(&name) {
            continue;
        }
        assignments.push(format!("\"{}\" = ?", name));
        params.push(value);
    }
    if assignments.is_empty() {
        return Err(DatabaseError::QueryError(format!(
            "No mutable columns to update on {}",
            table
        )));
    }
    params.push(Value::String(id.to_string()));

    Ok(SqlResult {
        query: format!(
            "UPDATE \"{}\" SET {} WHERE \"id\" = ? RETURNING *",
            table,
            assignments.join(", ")
        ),
        params,
    })
}

pub fn delete_sql(table: &str, id: &str) -> Result<SqlResult, DatabaseError> {
    check_identifier(table)?;
    Ok(SqlResult {
        query: format!("DELETE FROM \"{}\" WHERE \"id\" = ?", table),
        params: vec![Value::String(id.to_string())],
    })
}

fn check_identifier(name: &str) -> Result<(), DatabaseError> {
    if is_identifier(name) {
        Ok(())
    } else {
        Err(DatabaseError::QueryError(format!("Invalid identifier: {}", name)))
    }
}

pub(crate) fn bind_param_query<'q>(
    q: sqlx::query::Query<'q, Sqlite, SqliteArguments<'q>>,
    v: &'q Value,
) -> sqlx::query::Query<'q, Sqlite, SqliteArguments<'q>> {
    match v {
        Value::Null => {
            let none: Option<String> = None;
            q.bind(none)
        }
        Value::Bool(b) => q.bind(*b),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                q.bind(i)
            } else if let Some(f) = n.as_f64() {
                q.bind(f)
            } else {
                q.bind(n.to_string())
            }
        }
        Value::String(s) => q.bind(s.as_str()),
        // Composite values are stored as JSON text
        Value::Array(_) | Value::Object(_) => q.bind(v.to_string()),
    }
}

pub(crate) fn bind_param_query_as<'q, O>(
    q: sqlx::query::QueryAs<'q, Sqlite, O, SqliteArguments<'q>>,
    v: &'q Value,
) -> sqlx::query::QueryAs<'q, Sqlite, O, SqliteArguments<'q>>
where
    O: for<'r> FromRow<'r, SqliteRow>,
{
    match v {
        Value::Null => {
            let none: Option<String> = None;
            q.bind(none)
        }
        Value::Bool(b) => q.bind(*b),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                q.bind(i)
            } else if let Some(f) = n.as_f64() {
                q.bind(f)
            } else {
                q.bind(n.to_string())
            }
        }
        Value::String(s) => q.bind(s.as_str()),
        Value::Array(_) | Value::Object(_) => q.bind(v.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(sqlx::FromRow)]
    #[allow(dead_code)]
    struct Row {
        id: String,
    }

    #[test]
    fn select_with_criteria_and_order() {
        let sql = QueryBuilder::<Row>::new("todos")
            .unwrap()
            .filter(Criteria::new().eq("id", "t1").eq("user_id", "u1"))
            .unwrap()
            .order_by("created_at DESC")
            .to_sql();
        assert_eq!(
            sql.query,
            "SELECT * FROM \"todos\" WHERE \"id\" = ? AND \"user_id\" = ? ORDER BY created_at DESC"
        );
        assert_eq!(sql.params, vec![json!("t1"), json!("u1")]);
    }

    #[test]
    fn rejects_bad_identifiers() {
        assert!(QueryBuilder::<Row>::new("todos; --").is_err());
        let err = QueryBuilder::<Row>::new("todos")
            .unwrap()
            .filter(Criteria::new().eq("id = id OR 1", 1))
            .err()
            .unwrap();
        assert!(matches!(err, DatabaseError::QueryError(_)));
    }

    #[test]
    fn upsert_keeps_immutable_columns() {
        let sql = upsert_sql(
            "todos",
            vec![
                ("id", json!("t1")),
                ("title", json!("a")),
                ("created_at", json!("now")),
            ],
            &["id", "created_at"],
        )
        .unwrap();
        assert_eq!(
            sql.query,
            "INSERT INTO \"todos\" (\"id\", \"title\", \"created_at\") VALUES (?, ?, ?) \
             ON CONFLICT(\"id\") DO UPDATE SET \"title\" = excluded.\"title\" RETURNING *"
        );
        assert_eq!(sql.params.len(), 3);
    }

    #[test]
    fn update_binds_id_last() {
        let sql = update_sql(
            "todos",
            "t1",
            vec![("id", json!("t1")), ("title", json!("b"))],
            &["id", "created_at"],
        )
        .unwrap();
        assert_eq!(
            sql.query,
            "UPDATE \"todos\" SET \"title\" = ? WHERE \"id\" = ? RETURNING *"
        );
        assert_eq!(sql.params, vec![json!("b"), json!("t1")]);
    }

    #[test]
    fn update_without_mutable_columns_fails() {
        let err = update_sql("todos", "t1", vec![("id", json!("t1"))], &["id"]).unwrap_err();
        assert!(matches!(err, DatabaseError::QueryError(_)));
    }
}

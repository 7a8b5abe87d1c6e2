//! Core storage boundary traits
//!
//! Defines the contract between the ORM core and a concrete storage engine:
//! a `Database` executes a storage-agnostic [`DatabaseQuery`] and delivers
//! decodable rows back, one callback invocation per row, in storage-return
//! order. Everything dialect-specific lives behind this boundary.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value as JsonValue;

use crate::error::{ModelError, OrmResult};
use crate::query::DatabaseQuery;
use crate::schema::DatabaseSchema;

/// Reserved output key under which a create action reports the generated
/// identifier of each created row.
pub const GENERATED_ID_KEY: &str = "fluentID";

/// Reserved output key under which an aggregate read reports its result.
pub const AGGREGATE_KEY: &str = "fluentAggregate";

/// Callback invoked once per result row, in storage-return order.
pub type RowCallback<'a> = &'a mut (dyn FnMut(Arc<dyn DatabaseRow>) -> OrmResult<()> + Send);

/// Abstract storage engine executing query and schema representations.
///
/// Contract for create actions: the engine must deliver exactly one output
/// row per input row, in submission order, each containing the generated
/// identifier under [`GENERATED_ID_KEY`]. Bulk-create identifier
/// back-assignment relies on this ordering. Aggregate reads must answer under
/// [`AGGREGATE_KEY`].
#[async_trait]
pub trait Database: Send + Sync {
    /// Execute a query, invoking `on_row` for each result row and returning
    /// once all rows have been delivered or the operation failed.
    async fn execute(&self, query: &DatabaseQuery, on_row: RowCallback<'_>) -> OrmResult<()>;

    /// Execute a schema (DDL) description.
    async fn execute_schema(&self, schema: &DatabaseSchema) -> OrmResult<()>;
}

/// Abstract result row returned by a storage engine
pub trait DatabaseRow: fmt::Debug + Send + Sync {
    /// Check whether the row contains a column
    fn contains(&self, column: &str) -> bool;

    /// Get a column value by name
    fn get_by_name(&self, column: &str) -> OrmResult<DatabaseValue>;

    /// Get column names
    fn column_names(&self) -> Vec<String>;
}

/// Extension trait for `DatabaseRow` to support typed column access
pub trait DatabaseRowExt {
    /// Get a typed value from a column
    fn get<T>(&self, column: &str) -> OrmResult<T>
    where
        T: for<'de> serde::Deserialize<'de>;

    /// Try to get an optional typed value from a column; a missing column or
    /// a null value yields `None`
    fn try_get<T>(&self, column: &str) -> OrmResult<Option<T>>
    where
        T: for<'de> serde::Deserialize<'de>;
}

impl<R: DatabaseRow + ?Sized> DatabaseRowExt for R {
    fn get<T>(&self, column: &str) -> OrmResult<T>
    where
        T: for<'de> serde::Deserialize<'de>,
    {
        let db_value = self.get_by_name(column)?;

        let json_value = db_value.to_json();
        serde_json::from_value(json_value).map_err(|e| {
            ModelError::Serialization(format!("Failed to deserialize column '{}': {}", column, e))
        })
    }

    fn try_get<T>(&self, column: &str) -> OrmResult<Option<T>>
    where
        T: for<'de> serde::Deserialize<'de>,
    {
        match self.get_by_name(column) {
            Ok(db_value) => {
                if db_value.is_null() {
                    Ok(None)
                } else {
                    let json_value = db_value.to_json();
                    let parsed: T = serde_json::from_value(json_value).map_err(|e| {
                        ModelError::Serialization(format!(
                            "Failed to deserialize column '{}': {}",
                            column, e
                        ))
                    })?;
                    Ok(Some(parsed))
                }
            }
            Err(ModelError::ColumnNotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }
}

/// Database value enumeration for type-safe value binding
#[derive(Debug, Clone, PartialEq)]
pub enum DatabaseValue {
    Null,
    Bool(bool),
    Int32(i32),
    Int64(i64),
    Float64(f64),
    String(String),
    Bytes(Vec<u8>),
    Uuid(uuid::Uuid),
    DateTime(chrono::DateTime<chrono::Utc>),
    Json(JsonValue),
    Array(Vec<DatabaseValue>),
}

impl DatabaseValue {
    /// Check if the value is null
    pub fn is_null(&self) -> bool {
        matches!(self, DatabaseValue::Null)
    }

    /// Convert to JSON value
    pub fn to_json(&self) -> JsonValue {
        match self {
            DatabaseValue::Null => JsonValue::Null,
            DatabaseValue::Bool(b) => JsonValue::Bool(*b),
            DatabaseValue::Int32(i) => JsonValue::Number(serde_json::Number::from(*i)),
            DatabaseValue::Int64(i) => JsonValue::Number(serde_json::Number::from(*i)),
            DatabaseValue::Float64(f) => serde_json::Number::from_f64(*f)
                .map(JsonValue::Number)
                .unwrap_or(JsonValue::Null),
            DatabaseValue::String(s) => JsonValue::String(s.clone()),
            DatabaseValue::Bytes(b) => JsonValue::Array(
                b.iter()
                    .map(|&x| JsonValue::Number(serde_json::Number::from(x)))
                    .collect(),
            ),
            DatabaseValue::Uuid(u) => JsonValue::String(u.to_string()),
            DatabaseValue::DateTime(dt) => JsonValue::String(dt.to_rfc3339()),
            DatabaseValue::Json(j) => j.clone(),
            DatabaseValue::Array(arr) => JsonValue::Array(arr.iter().map(|v| v.to_json()).collect()),
        }
    }
}

impl From<bool> for DatabaseValue {
    fn from(value: bool) -> Self {
        DatabaseValue::Bool(value)
    }
}

impl From<i32> for DatabaseValue {
    fn from(value: i32) -> Self {
        DatabaseValue::Int32(value)
    }
}

impl From<i64> for DatabaseValue {
    fn from(value: i64) -> Self {
        DatabaseValue::Int64(value)
    }
}

impl From<f64> for DatabaseValue {
    fn from(value: f64) -> Self {
        DatabaseValue::Float64(value)
    }
}

impl From<String> for DatabaseValue {
    fn from(value: String) -> Self {
        DatabaseValue::String(value)
    }
}

impl From<&str> for DatabaseValue {
    fn from(value: &str) -> Self {
        DatabaseValue::String(value.to_string())
    }
}

impl From<Vec<u8>> for DatabaseValue {
    fn from(value: Vec<u8>) -> Self {
        DatabaseValue::Bytes(value)
    }
}

impl From<uuid::Uuid> for DatabaseValue {
    fn from(value: uuid::Uuid) -> Self {
        DatabaseValue::Uuid(value)
    }
}

impl From<chrono::DateTime<chrono::Utc>> for DatabaseValue {
    fn from(value: chrono::DateTime<chrono::Utc>) -> Self {
        DatabaseValue::DateTime(value)
    }
}

impl From<JsonValue> for DatabaseValue {
    fn from(value: JsonValue) -> Self {
        DatabaseValue::Json(value)
    }
}

impl<T> From<Option<T>> for DatabaseValue
where
    T: Into<DatabaseValue>,
{
    fn from(value: Option<T>) -> Self {
        match value {
            Some(v) => v.into(),
            None => DatabaseValue::Null,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_to_json() {
        assert_eq!(DatabaseValue::Int64(7).to_json(), serde_json::json!(7));
        assert_eq!(
            DatabaseValue::String("x".into()).to_json(),
            serde_json::json!("x")
        );
        assert_eq!(DatabaseValue::Null.to_json(), JsonValue::Null);
    }

    #[test]
    fn test_option_conversion() {
        assert_eq!(DatabaseValue::from(None::<i64>), DatabaseValue::Null);
        assert_eq!(DatabaseValue::from(Some(3i64)), DatabaseValue::Int64(3));
    }
}

//! In-memory storage backend
//!
//! A reference implementation of the storage boundary backed by in-process
//! tables. It honors the full contract — filter evaluation including groups,
//! inner/left joins with aliased projection, aggregates, auto-increment
//! identifiers, and submission-order create output — and keeps a log of every
//! executed query so tests can assert round-trip counts. It is the test
//! vehicle for the core, not a production driver.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use dashmap::DashMap;
use tracing::debug;

use crate::backends::core::{
    Database, DatabaseRow, DatabaseValue, RowCallback, AGGREGATE_KEY, GENERATED_ID_KEY,
};
use crate::error::{ModelError, OrmResult};
use crate::query::{
    AggregateMethod, DatabaseQuery, Filter, GroupOperator, JoinMethod, QueryAction, QueryField,
    QueryOperator,
};
use crate::schema::{DatabaseSchema, SchemaAction};

/// Backend-local error types
#[derive(Debug, thiserror::Error)]
pub enum MemoryError {
    #[error("Unsupported join method: {0}")]
    UnsupportedJoin(JoinMethod),

    #[error("Input row has {got} values for {expected} columns")]
    InputArity { expected: usize, got: usize },

    #[error("Write column lists must contain plain columns")]
    InvalidWriteColumn,
}

impl From<MemoryError> for ModelError {
    fn from(err: MemoryError) -> Self {
        ModelError::Query(err.to_string())
    }
}

/// Configuration for the in-memory backend
#[derive(Debug, Clone)]
pub struct MemoryConfig {
    /// First value handed out by the auto-increment identifier generator
    pub auto_increment_start: i64,
    /// Emit a debug log line per executed query
    pub log_queries: bool,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            auto_increment_start: 1,
            log_queries: true,
        }
    }
}

/// Entity name -> row map for one joined result tuple
type Tuple = HashMap<String, HashMap<String, DatabaseValue>>;

#[derive(Debug)]
struct Table {
    rows: Vec<HashMap<String, DatabaseValue>>,
    id_column: String,
    next_id: i64,
}

impl Table {
    fn new(id_column: String, next_id: i64) -> Self {
        Self {
            rows: Vec::new(),
            id_column,
            next_id,
        }
    }
}

/// In-process storage engine
pub struct MemoryDatabase {
    tables: DashMap<String, Table>,
    log: Mutex<Vec<DatabaseQuery>>,
    config: MemoryConfig,
}

impl MemoryDatabase {
    pub fn new() -> Self {
        Self::with_config(MemoryConfig::default())
    }

    pub fn with_config(config: MemoryConfig) -> Self {
        Self {
            tables: DashMap::new(),
            log: Mutex::new(Vec::new()),
            config,
        }
    }

    /// Every executed query, in execution order
    pub fn executed(&self) -> Vec<DatabaseQuery> {
        self.log.lock().unwrap().clone()
    }

    /// Number of read actions executed against an entity
    pub fn reads_for(&self, entity: &str) -> usize {
        self.log
            .lock()
            .unwrap()
            .iter()
            .filter(|q| q.action == QueryAction::Read && q.entity == entity)
            .count()
    }

    fn matching_tuples(&self, query: &DatabaseQuery) -> OrmResult<Vec<Tuple>> {
        let base_rows = self
            .tables
            .get(&query.entity)
            .map(|t| t.rows.clone())
            .unwrap_or_default();
        let mut tuples: Vec<Tuple> = base_rows
            .into_iter()
            .map(|row| {
                let mut tuple = Tuple::new();
                tuple.insert(query.entity.clone(), row);
                tuple
            })
            .collect();

        for join in &query.joins {
            let (foreign_entity, foreign_name) = column_parts(&join.foreign, &query.entity)?;
            let (local_entity, local_name) = column_parts(&join.local, &query.entity)?;
            let foreign_rows = self
                .tables
                .get(&foreign_entity)
                .map(|t| t.rows.clone())
                .unwrap_or_default();

            let mut next = Vec::new();
            for tuple in tuples {
                let local_value = tuple
                    .get(&local_entity)
                    .and_then(|row| row.get(&local_name))
                    .cloned()
                    .unwrap_or(DatabaseValue::Null);
                let matches: Vec<_> = foreign_rows
                    .iter()
                    .filter(|row| row.get(&foreign_name) == Some(&local_value))
                    .collect();
                match join.method {
                    JoinMethod::Inner => {
                        for matched in matches {
                            let mut joined = tuple.clone();
                            joined.insert(foreign_entity.clone(), matched.clone());
                            next.push(joined);
                        }
                    }
                    JoinMethod::Left => {
                        if matches.is_empty() {
                            next.push(tuple);
                        } else {
                            for matched in matches {
                                let mut joined = tuple.clone();
                                joined.insert(foreign_entity.clone(), matched.clone());
                                next.push(joined);
                            }
                        }
                    }
                    other => return Err(MemoryError::UnsupportedJoin(other).into()),
                }
            }
            tuples = next;
        }

        tuples.retain(|tuple| {
            query
                .filters
                .iter()
                .all(|filter| eval_filter(filter, tuple, &query.entity))
        });
        Ok(tuples)
    }

    fn read(&self, query: &DatabaseQuery) -> OrmResult<Vec<HashMap<String, DatabaseValue>>> {
        let tuples = self.matching_tuples(query)?;

        if let Some(QueryField::Aggregate { method, field }) = query.fields.first() {
            let value = compute_aggregate(*method, field, &tuples, &query.entity)?;
            let mut row = HashMap::new();
            row.insert(AGGREGATE_KEY.to_string(), value);
            return Ok(vec![row]);
        }

        let mut out = Vec::new();
        for tuple in &tuples {
            let mut row = HashMap::new();
            for field in &query.fields {
                if let QueryField::Column {
                    name,
                    entity,
                    alias,
                } = field
                {
                    let entity = entity.as_deref().unwrap_or(&query.entity);
                    let value = tuple
                        .get(entity)
                        .and_then(|r| r.get(name))
                        .cloned()
                        .unwrap_or(DatabaseValue::Null);
                    row.insert(alias.clone().unwrap_or_else(|| name.clone()), value);
                }
            }
            out.push(row);
        }
        Ok(out)
    }

    fn create(&self, query: &DatabaseQuery) -> OrmResult<Vec<HashMap<String, DatabaseValue>>> {
        let names = write_columns(&query.fields)?;
        let mut table = self
            .tables
            .entry(query.entity.clone())
            .or_insert_with(|| Table::new("id".to_string(), self.config.auto_increment_start));

        let mut outputs = Vec::new();
        for values in &query.input {
            if values.len() != names.len() {
                return Err(MemoryError::InputArity {
                    expected: names.len(),
                    got: values.len(),
                }
                .into());
            }
            let mut row: HashMap<String, DatabaseValue> =
                names.iter().cloned().zip(values.iter().cloned()).collect();
            let id_value = match row.get(&table.id_column) {
                Some(value) if !value.is_null() => value.clone(),
                _ => {
                    let id = DatabaseValue::Int64(table.next_id);
                    table.next_id += 1;
                    row.insert(table.id_column.clone(), id.clone());
                    id
                }
            };
            table.rows.push(row.clone());

            let mut output = row;
            output.insert(GENERATED_ID_KEY.to_string(), id_value);
            outputs.push(output);
        }
        // output rows keep submission order per the Database contract
        Ok(outputs)
    }

    fn update(&self, query: &DatabaseQuery) -> OrmResult<()> {
        let names = write_columns(&query.fields)?;
        let values = match query.input.first() {
            Some(values) => values,
            None => return Ok(()),
        };
        if values.len() != names.len() {
            return Err(MemoryError::InputArity {
                expected: names.len(),
                got: values.len(),
            }
            .into());
        }
        let assignments: Vec<(String, DatabaseValue)> =
            names.into_iter().zip(values.iter().cloned()).collect();

        if let Some(mut table) = self.tables.get_mut(&query.entity) {
            for row in table.rows.iter_mut() {
                let mut tuple = Tuple::new();
                tuple.insert(query.entity.clone(), row.clone());
                if query
                    .filters
                    .iter()
                    .all(|filter| eval_filter(filter, &tuple, &query.entity))
                {
                    for (name, value) in &assignments {
                        row.insert(name.clone(), value.clone());
                    }
                }
            }
        }
        Ok(())
    }

    fn delete(&self, query: &DatabaseQuery) -> OrmResult<()> {
        if let Some(mut table) = self.tables.get_mut(&query.entity) {
            let entity = query.entity.clone();
            table.rows.retain(|row| {
                let mut tuple = Tuple::new();
                tuple.insert(entity.clone(), row.clone());
                !query
                    .filters
                    .iter()
                    .all(|filter| eval_filter(filter, &tuple, &entity))
            });
        }
        Ok(())
    }
}

impl Default for MemoryDatabase {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Database for MemoryDatabase {
    async fn execute(&self, query: &DatabaseQuery, on_row: RowCallback<'_>) -> OrmResult<()> {
        if self.config.log_queries {
            debug!(entity = %query.entity, action = ?query.action, "memory backend executing");
        }
        self.log.lock().unwrap().push(query.clone());

        let rows = match query.action {
            QueryAction::Read => self.read(query)?,
            QueryAction::Create => self.create(query)?,
            QueryAction::Update => {
                self.update(query)?;
                Vec::new()
            }
            QueryAction::Delete => {
                self.delete(query)?;
                Vec::new()
            }
        };
        for columns in rows {
            on_row(Arc::new(MemoryRow { columns }))?;
        }
        Ok(())
    }

    async fn execute_schema(&self, schema: &DatabaseSchema) -> OrmResult<()> {
        match schema.action {
            SchemaAction::Create => {
                let id_column = schema.identifier().unwrap_or("id").to_string();
                self.tables.insert(
                    schema.entity.clone(),
                    Table::new(id_column, self.config.auto_increment_start),
                );
            }
            SchemaAction::Drop => {
                self.tables.remove(&schema.entity);
            }
        }
        Ok(())
    }
}

/// One materialized result row
#[derive(Debug, Clone)]
struct MemoryRow {
    columns: HashMap<String, DatabaseValue>,
}

impl DatabaseRow for MemoryRow {
    fn contains(&self, column: &str) -> bool {
        self.columns.contains_key(column)
    }

    fn get_by_name(&self, column: &str) -> OrmResult<DatabaseValue> {
        self.columns
            .get(column)
            .cloned()
            .ok_or_else(|| ModelError::ColumnNotFound(column.to_string()))
    }

    fn column_names(&self) -> Vec<String> {
        self.columns.keys().cloned().collect()
    }
}

fn column_parts(field: &QueryField, default_entity: &str) -> OrmResult<(String, String)> {
    match field {
        QueryField::Column { name, entity, .. } => Ok((
            entity.clone().unwrap_or_else(|| default_entity.to_string()),
            name.clone(),
        )),
        QueryField::Aggregate { .. } => Err(ModelError::Query(
            "aggregate fields cannot address a join".to_string(),
        )),
    }
}

fn write_columns(fields: &[QueryField]) -> OrmResult<Vec<String>> {
    fields
        .iter()
        .map(|field| match field {
            QueryField::Column { name, .. } => Ok(name.clone()),
            QueryField::Aggregate { .. } => Err(MemoryError::InvalidWriteColumn.into()),
        })
        .collect()
}

fn eval_filter(filter: &Filter, tuple: &Tuple, default_entity: &str) -> bool {
    match filter {
        Filter::Basic {
            field,
            operator,
            value,
        } => {
            let (entity, name) = match field {
                QueryField::Column { name, entity, .. } => {
                    (entity.as_deref().unwrap_or(default_entity), name.as_str())
                }
                QueryField::Aggregate { .. } => return false,
            };
            let current = tuple
                .get(entity)
                .and_then(|row| row.get(name))
                .cloned()
                .unwrap_or(DatabaseValue::Null);
            eval_operator(&current, operator, value)
        }
        Filter::Group { filters, operator } => match operator {
            GroupOperator::And => filters.iter().all(|f| eval_filter(f, tuple, default_entity)),
            GroupOperator::Or => filters.iter().any(|f| eval_filter(f, tuple, default_entity)),
        },
    }
}

fn eval_operator(current: &DatabaseValue, operator: &QueryOperator, value: &DatabaseValue) -> bool {
    match operator {
        QueryOperator::Equal => current == value,
        QueryOperator::NotEqual => current != value,
        QueryOperator::GreaterThan => compare(current, value) == Some(Ordering::Greater),
        QueryOperator::GreaterThanOrEqual => matches!(
            compare(current, value),
            Some(Ordering::Greater | Ordering::Equal)
        ),
        QueryOperator::LessThan => compare(current, value) == Some(Ordering::Less),
        QueryOperator::LessThanOrEqual => {
            matches!(compare(current, value), Some(Ordering::Less | Ordering::Equal))
        }
        QueryOperator::Like => match (current, value) {
            (DatabaseValue::String(s), DatabaseValue::String(pattern)) => like_match(s, pattern),
            _ => false,
        },
        QueryOperator::In => match value {
            DatabaseValue::Array(values) => values.contains(current),
            _ => false,
        },
        QueryOperator::NotIn => match value {
            DatabaseValue::Array(values) => !values.contains(current),
            _ => false,
        },
        QueryOperator::IsNull => current.is_null(),
        QueryOperator::IsNotNull => !current.is_null(),
    }
}

fn compare(a: &DatabaseValue, b: &DatabaseValue) -> Option<Ordering> {
    use DatabaseValue::*;
    match (a, b) {
        (Null, _) | (_, Null) => None,
        (Int32(_) | Int64(_) | Float64(_), Int32(_) | Int64(_) | Float64(_)) => {
            numeric(a).partial_cmp(&numeric(b))
        }
        (String(x), String(y)) => Some(x.cmp(y)),
        (DateTime(x), DateTime(y)) => Some(x.cmp(y)),
        (Bool(x), Bool(y)) => Some(x.cmp(y)),
        _ => None,
    }
}

fn numeric(value: &DatabaseValue) -> f64 {
    match value {
        DatabaseValue::Int32(i) => *i as f64,
        DatabaseValue::Int64(i) => *i as f64,
        DatabaseValue::Float64(f) => *f,
        _ => 0.0,
    }
}

/// SQL LIKE matching with `%` wildcards
fn like_match(value: &str, pattern: &str) -> bool {
    if !pattern.contains('%') {
        return value == pattern;
    }
    let segments: Vec<&str> = pattern.split('%').collect();
    let mut rest = value;

    let first = segments[0];
    if !first.is_empty() {
        match rest.strip_prefix(first) {
            Some(stripped) => rest = stripped,
            None => return false,
        }
    }
    for segment in &segments[1..segments.len() - 1] {
        if segment.is_empty() {
            continue;
        }
        match rest.find(segment) {
            Some(pos) => rest = &rest[pos + segment.len()..],
            None => return false,
        }
    }
    let last = segments[segments.len() - 1];
    last.is_empty() || rest.ends_with(last)
}

fn compute_aggregate(
    method: AggregateMethod,
    field: &QueryField,
    tuples: &[Tuple],
    default_entity: &str,
) -> OrmResult<DatabaseValue> {
    let (entity, name) = match field {
        QueryField::Column { name, entity, .. } => {
            (entity.as_deref().unwrap_or(default_entity), name.as_str())
        }
        QueryField::Aggregate { .. } => {
            return Err(ModelError::Query(
                "nested aggregate fields are not supported".to_string(),
            ))
        }
    };

    if method == AggregateMethod::Count {
        return Ok(DatabaseValue::Int64(tuples.len() as i64));
    }

    let values: Vec<DatabaseValue> = tuples
        .iter()
        .filter_map(|tuple| tuple.get(entity).and_then(|row| row.get(name)))
        .filter(|value| !value.is_null())
        .cloned()
        .collect();
    // SQL NULL propagation: an empty aggregated set yields NULL
    if values.is_empty() {
        return Ok(DatabaseValue::Null);
    }

    match method {
        AggregateMethod::Sum => {
            if values
                .iter()
                .any(|v| matches!(v, DatabaseValue::Float64(_)))
            {
                Ok(DatabaseValue::Float64(values.iter().map(numeric).sum()))
            } else {
                Ok(DatabaseValue::Int64(
                    values.iter().map(|v| numeric(v) as i64).sum(),
                ))
            }
        }
        AggregateMethod::Average => {
            let total: f64 = values.iter().map(numeric).sum();
            Ok(DatabaseValue::Float64(total / values.len() as f64))
        }
        AggregateMethod::Minimum | AggregateMethod::Maximum => {
            let mut best = values[0].clone();
            for value in &values[1..] {
                let replace = match compare(value, &best) {
                    Some(Ordering::Less) => method == AggregateMethod::Minimum,
                    Some(Ordering::Greater) => method == AggregateMethod::Maximum,
                    _ => false,
                };
                if replace {
                    best = value.clone();
                }
            }
            Ok(best)
        }
        AggregateMethod::Count => unreachable!("count handled above"),
    }
}

//! Query representation - storage-agnostic description of one operation
//!
//! `DatabaseQuery` is inert data: target entity, field projection, filters,
//! joins, input rows, and the action. The action determines which parts are
//! meaningful — a delete ignores `input`, a create ignores `filters`. For
//! write actions `fields` is the column list and every `input` row aligns
//! with it positionally.

use std::fmt;

use crate::backends::DatabaseValue;

/// Comparison operators for filter nodes
#[derive(Debug, Clone, PartialEq)]
pub enum QueryOperator {
    Equal,
    NotEqual,
    GreaterThan,
    GreaterThanOrEqual,
    LessThan,
    LessThanOrEqual,
    Like,
    In,
    NotIn,
    IsNull,
    IsNotNull,
}

impl fmt::Display for QueryOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryOperator::Equal => write!(f, "="),
            QueryOperator::NotEqual => write!(f, "!="),
            QueryOperator::GreaterThan => write!(f, ">"),
            QueryOperator::GreaterThanOrEqual => write!(f, ">="),
            QueryOperator::LessThan => write!(f, "<"),
            QueryOperator::LessThanOrEqual => write!(f, "<="),
            QueryOperator::Like => write!(f, "LIKE"),
            QueryOperator::In => write!(f, "IN"),
            QueryOperator::NotIn => write!(f, "NOT IN"),
            QueryOperator::IsNull => write!(f, "IS NULL"),
            QueryOperator::IsNotNull => write!(f, "IS NOT NULL"),
        }
    }
}

/// Join methods
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinMethod {
    Inner,
    Left,
    Right,
    Full,
}

impl fmt::Display for JoinMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JoinMethod::Inner => write!(f, "INNER JOIN"),
            JoinMethod::Left => write!(f, "LEFT JOIN"),
            JoinMethod::Right => write!(f, "RIGHT JOIN"),
            JoinMethod::Full => write!(f, "FULL JOIN"),
        }
    }
}

/// Aggregate functions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggregateMethod {
    Count,
    Sum,
    Average,
    Minimum,
    Maximum,
}

impl fmt::Display for AggregateMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AggregateMethod::Count => write!(f, "COUNT"),
            AggregateMethod::Sum => write!(f, "SUM"),
            AggregateMethod::Average => write!(f, "AVG"),
            AggregateMethod::Minimum => write!(f, "MIN"),
            AggregateMethod::Maximum => write!(f, "MAX"),
        }
    }
}

/// Actions a query can perform
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryAction {
    Read,
    Create,
    Update,
    Delete,
}

/// One projected field, tagged with its owning entity and an optional alias.
///
/// An alias is required when the same field name is projected from multiple
/// joined entities.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryField {
    Column {
        name: String,
        entity: Option<String>,
        alias: Option<String>,
    },
    Aggregate {
        method: AggregateMethod,
        field: Box<QueryField>,
    },
}

impl QueryField {
    /// Entity-qualified column without an alias
    pub fn column(name: impl Into<String>, entity: impl Into<String>) -> Self {
        QueryField::Column {
            name: name.into(),
            entity: Some(entity.into()),
            alias: None,
        }
    }

    /// Unqualified column, used for write column lists
    pub fn unqualified(name: impl Into<String>) -> Self {
        QueryField::Column {
            name: name.into(),
            entity: None,
            alias: None,
        }
    }

    /// Entity-qualified column with an alias
    pub fn aliased(
        name: impl Into<String>,
        entity: impl Into<String>,
        alias: impl Into<String>,
    ) -> Self {
        QueryField::Column {
            name: name.into(),
            entity: Some(entity.into()),
            alias: Some(alias.into()),
        }
    }

    /// The key this field appears under in result rows
    pub fn output_name(&self) -> Option<&str> {
        match self {
            QueryField::Column { name, alias, .. } => Some(alias.as_deref().unwrap_or(name)),
            QueryField::Aggregate { .. } => None,
        }
    }
}

/// Boolean connective for filter groups
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupOperator {
    And,
    Or,
}

/// One filter node: a basic comparison or a boolean group
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    Basic {
        field: QueryField,
        operator: QueryOperator,
        value: DatabaseValue,
    },
    Group {
        filters: Vec<Filter>,
        operator: GroupOperator,
    },
}

/// One join node
#[derive(Debug, Clone, PartialEq)]
pub struct Join {
    pub foreign: QueryField,
    pub local: QueryField,
    pub method: JoinMethod,
}

/// Storage-agnostic description of one query
#[derive(Debug, Clone, PartialEq)]
pub struct DatabaseQuery {
    pub entity: String,
    pub fields: Vec<QueryField>,
    pub filters: Vec<Filter>,
    pub joins: Vec<Join>,
    pub input: Vec<Vec<DatabaseValue>>,
    pub action: QueryAction,
}

impl DatabaseQuery {
    pub fn new(entity: impl Into<String>) -> Self {
        Self {
            entity: entity.into(),
            fields: Vec::new(),
            filters: Vec::new(),
            joins: Vec::new(),
            input: Vec::new(),
            action: QueryAction::Read,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operator_display() {
        assert_eq!(QueryOperator::Equal.to_string(), "=");
        assert_eq!(QueryOperator::In.to_string(), "IN");
        assert_eq!(JoinMethod::Left.to_string(), "LEFT JOIN");
        assert_eq!(AggregateMethod::Average.to_string(), "AVG");
    }

    #[test]
    fn test_output_name_prefers_alias() {
        let plain = QueryField::column("name", "galaxies");
        assert_eq!(plain.output_name(), Some("name"));

        let aliased = QueryField::aliased("name", "galaxies", "galaxies_name");
        assert_eq!(aliased.output_name(), Some("galaxies_name"));
    }

    #[test]
    fn test_new_query_defaults_to_read() {
        let query = DatabaseQuery::new("planets");
        assert_eq!(query.action, QueryAction::Read);
        assert!(query.fields.is_empty());
        assert!(query.filters.is_empty());
    }
}

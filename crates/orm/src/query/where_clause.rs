//! Query builder filter operations
//!
//! Filters are conjunctive in call order; groups express boolean OR/AND
//! nesting. Typed variants resolve field tags against the descriptor table,
//! string variants are the untyped escape hatch used by the core itself.

use crate::backends::DatabaseValue;
use crate::model::{Field, FieldValue, Model};
use crate::query::builder::QueryBuilder;
use crate::query::types::{Filter, QueryField, QueryOperator};

impl<'a, M: Model> QueryBuilder<'a, M> {
    /// Filter on one of the model's own fields
    pub fn filter<V: FieldValue>(
        self,
        field: Field<M, V>,
        operator: QueryOperator,
        value: impl Into<V>,
    ) -> Self {
        let name = field.storage_name();
        let value: V = value.into();
        self.filter_name(name, operator, value.into())
    }

    /// Filter on one of the model's own fields with an IN value set
    pub fn filter_in<V: FieldValue>(self, field: Field<M, V>, values: Vec<V>) -> Self {
        let name = field.storage_name();
        self.filter_name(
            name,
            QueryOperator::In,
            DatabaseValue::Array(values.into_iter().map(Into::into).collect()),
        )
    }

    /// Filter on a joined entity's field
    pub fn filter_foreign<F: Model, V: FieldValue>(
        mut self,
        field: Field<F, V>,
        operator: QueryOperator,
        value: impl Into<V>,
    ) -> Self {
        let value: V = value.into();
        self.query.filters.push(Filter::Basic {
            field: QueryField::column(field.storage_name(), F::entity()),
            operator,
            value: value.into(),
        });
        self
    }

    /// Filter by storage name on the model's own entity
    pub fn filter_name(
        mut self,
        name: &str,
        operator: QueryOperator,
        value: DatabaseValue,
    ) -> Self {
        self.query.filters.push(Filter::Basic {
            field: QueryField::column(name, M::entity()),
            operator,
            value,
        });
        self
    }
}

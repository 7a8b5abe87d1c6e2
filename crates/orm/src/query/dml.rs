//! Query builder write staging and write actions
//!
//! `set` stages single field values into one input row; `set_row` replaces
//! the column list and appends a whole row (bulk create calls it once per
//! staged instance). The terminal write actions set the query action and
//! execute — identity and existence bookkeeping belongs to the model-level
//! lifecycle operations, not here.

use crate::backends::DatabaseValue;
use crate::model::{Field, FieldValue, Model};
use crate::query::builder::QueryBuilder;
use crate::query::types::{QueryAction, QueryField};

impl<'a, M: Model> QueryBuilder<'a, M> {
    /// Stage one field value for a write.
    ///
    /// The first call initializes a one-row input set; subsequent calls
    /// append to that same row.
    pub fn set<V: FieldValue>(mut self, field: Field<M, V>, value: impl Into<V>) -> Self {
        let name = field.storage_name();
        let value: V = value.into();
        if self.query.input.is_empty() {
            self.query.fields = vec![QueryField::unqualified(name)];
            self.query.input = vec![vec![value.into()]];
        } else {
            self.query.fields.push(QueryField::unqualified(name));
            self.query.input[0].push(value.into());
        }
        self
    }

    /// Replace the column list and append one whole input row
    pub fn set_row(mut self, values: Vec<(String, DatabaseValue)>) -> Self {
        self.query.fields = values
            .iter()
            .map(|(name, _)| QueryField::unqualified(name.clone()))
            .collect();
        self.query
            .input
            .push(values.into_iter().map(|(_, value)| value).collect());
        self
    }

    /// Execute as a create action
    pub async fn create(self) -> crate::error::OrmResult<()> {
        self.action(QueryAction::Create).run(|_| Ok(())).await?;
        Ok(())
    }

    /// Execute as an update action
    pub async fn update(self) -> crate::error::OrmResult<()> {
        self.action(QueryAction::Update).run(|_| Ok(())).await?;
        Ok(())
    }

    /// Execute as a delete action
    pub async fn delete(self) -> crate::error::OrmResult<()> {
        self.action(QueryAction::Delete).run(|_| Ok(())).await?;
        Ok(())
    }
}

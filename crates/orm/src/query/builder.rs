//! Query builder - stateful assembler over the query representation
//!
//! A builder is bound to one model type and one storage boundary. It starts
//! with a projection of all the model's own fields, entity-qualified and
//! alias-free; filter/join/set/aggregate operations refine the underlying
//! `DatabaseQuery` before execution. A builder is single-flow: independent
//! builders share nothing but the immutable descriptor tables.

use std::marker::PhantomData;

use crate::backends::Database;
use crate::model::Model;
use crate::query::types::{DatabaseQuery, QueryAction, QueryField};
use crate::relationships::EagerLoad;

/// Decorator-relevant facts about a joined model
#[derive(Debug, Clone)]
pub(crate) struct JoinedModel {
    pub(crate) entity: &'static str,
    pub(crate) deleted_at: Option<&'static str>,
}

/// Typed query builder for one model
pub struct QueryBuilder<'a, M: Model> {
    pub(crate) query: DatabaseQuery,
    pub(crate) database: &'a dyn Database,
    pub(crate) eager_loads: Vec<Box<dyn EagerLoad<M>>>,
    pub(crate) joined: Vec<JoinedModel>,
    pub(crate) include_deleted: bool,
    _model: PhantomData<M>,
}

impl<'a, M: Model> QueryBuilder<'a, M> {
    /// New builder projecting all of the model's own fields
    pub fn new(database: &'a dyn Database) -> Self {
        let mut query = DatabaseQuery::new(M::entity());
        query.fields = M::fields()
            .iter()
            .map(|f| QueryField::column(f.storage_name(), M::entity()))
            .collect();
        Self {
            query,
            database,
            eager_loads: Vec::new(),
            joined: Vec::new(),
            include_deleted: false,
            _model: PhantomData,
        }
    }

    /// Include soft-deleted rows in reads
    pub fn with_deleted(mut self) -> Self {
        self.include_deleted = true;
        self
    }

    /// The query assembled so far
    pub fn query(&self) -> &DatabaseQuery {
        &self.query
    }

    pub(crate) fn action(mut self, action: QueryAction) -> Self {
        self.query.action = action;
        self
    }
}

//! Query builder eager-load declarations
//!
//! Declaring a relation schedules its one-shot resolution for every `run` of
//! this builder: the relation's data is fetched once per top-level query and
//! distributed by key to every owning model in the batch.

use crate::model::Model;
use crate::query::builder::QueryBuilder;
use crate::query::types::JoinMethod;
use crate::relationships::{
    BelongsToDef, HasManyDef, JoinedBelongsTo, SubqueryBelongsTo, SubqueryHasMany,
};

/// Resolution strategy for a declared relation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EagerLoadMethod {
    /// One follow-up query filtered by the deduplicated key set
    Subquery,
    /// Read from the already-joined, alias-prefixed columns (parent
    /// relations only)
    Join,
}

impl<'a, M: Model> QueryBuilder<'a, M> {
    /// Eagerly resolve a parent relation for every fetched model
    pub fn with_belongs_to<P: Model>(
        mut self,
        def: BelongsToDef<M, P>,
        method: EagerLoadMethod,
    ) -> Self {
        match method {
            EagerLoadMethod::Subquery => {
                self.eager_loads.push(Box::new(SubqueryBelongsTo::new(def)));
                self
            }
            EagerLoadMethod::Join => {
                self.eager_loads.push(Box::new(JoinedBelongsTo::new(def)));
                self.join_parent_key::<P>(def.foreign_key(), JoinMethod::Inner)
            }
        }
    }

    /// Eagerly resolve a children relation for every fetched model, via one
    /// follow-up query
    pub fn with_has_many<C: Model>(mut self, def: HasManyDef<M, C>) -> Self {
        self.eager_loads.push(Box::new(SubqueryHasMany::new(def)));
        self
    }
}

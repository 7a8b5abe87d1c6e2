//! Query builder join operations
//!
//! Joining a foreign model appends a join node and projects the foreign
//! entity's full field list under a `"<entity>_<field>"` alias prefix, so
//! shared field names never collide in result rows. Joining the same foreign
//! entity twice would make those aliases ambiguous and is rejected at build
//! time.

use crate::model::{deleted_at_field, Field, FieldValue, Model};
use crate::query::builder::{JoinedModel, QueryBuilder};
use crate::query::types::{Join, JoinMethod, QueryField};

impl<'a, M: Model> QueryBuilder<'a, M> {
    /// Join a foreign model on `foreign = local`
    #[track_caller]
    pub fn join<F: Model, V: FieldValue>(
        self,
        foreign: Field<F, V>,
        local: Field<M, V>,
        method: JoinMethod,
    ) -> Self {
        let foreign_name = foreign.storage_name();
        let local_name = local.storage_name();
        self.join_named::<F>(foreign_name, local_name, method)
    }

    /// Join a foreign model on its identifier against a local foreign-key
    /// column
    #[track_caller]
    pub(crate) fn join_parent_key<F: Model>(
        self,
        foreign_key: &'static str,
        method: JoinMethod,
    ) -> Self {
        self.join_named::<F>(F::id_field_name(), foreign_key, method)
    }

    #[track_caller]
    pub(crate) fn join_named<F: Model>(
        mut self,
        foreign_name: &str,
        local_name: &str,
        method: JoinMethod,
    ) -> Self {
        assert!(
            self.joined.iter().all(|j| j.entity != F::entity()),
            "entity `{}` is already joined; a second join would make its column aliases ambiguous",
            F::entity()
        );

        self.query.fields.extend(F::fields().iter().map(|f| {
            QueryField::aliased(
                f.storage_name(),
                F::entity(),
                format!("{}_{}", F::entity(), f.storage_name()),
            )
        }));
        self.joined.push(JoinedModel {
            entity: F::entity(),
            deleted_at: deleted_at_field(F::fields()).map(|f| f.storage_name()),
        });
        self.query.joins.push(Join {
            foreign: QueryField::column(foreign_name, F::entity()),
            local: QueryField::column(local_name, M::entity()),
            method,
        });
        self
    }
}

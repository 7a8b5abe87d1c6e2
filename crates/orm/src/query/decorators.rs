//! Query decorators driven by descriptor-table roles
//!
//! Models opt into behavior declaratively: a field with the `DeletedAt` role
//! makes every read exclude soft-deleted rows unless the builder opted out
//! via `with_deleted`. Decorators are applied uniformly at execution time, to
//! the base entity and to every joined model that carries the role.

use chrono::Utc;

use crate::backends::DatabaseValue;
use crate::model::{deleted_at_field, Model};
use crate::query::builder::JoinedModel;
use crate::query::types::{
    DatabaseQuery, Filter, GroupOperator, QueryAction, QueryField, QueryOperator,
};

/// Append the soft-delete exclusion for one entity: the row is live when its
/// deletion stamp is null or still in the future.
fn exclude_soft_deleted(query: &mut DatabaseQuery, entity: &str, field_name: &str) {
    let field = QueryField::column(field_name, entity);
    query.filters.push(Filter::Group {
        filters: vec![
            Filter::Basic {
                field: field.clone(),
                operator: QueryOperator::IsNull,
                value: DatabaseValue::Null,
            },
            Filter::Basic {
                field,
                operator: QueryOperator::GreaterThan,
                value: DatabaseValue::DateTime(Utc::now()),
            },
        ],
        operator: GroupOperator::Or,
    });
}

/// Apply read decorators to a query snapshot before submission
pub(crate) fn apply_read_decorators<M: Model>(
    query: &mut DatabaseQuery,
    include_deleted: bool,
    joined: &[JoinedModel],
) {
    if query.action != QueryAction::Read || include_deleted {
        return;
    }
    if let Some(field) = deleted_at_field(M::fields()) {
        exclude_soft_deleted(query, M::entity(), field.storage_name());
    }
    for join in joined {
        if let Some(field_name) = join.deleted_at {
            exclude_soft_deleted(query, join.entity, field_name);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exclusion_filter_shape() {
        let mut query = DatabaseQuery::new("users");
        exclude_soft_deleted(&mut query, "users", "deleted_at");

        assert_eq!(query.filters.len(), 1);
        match &query.filters[0] {
            Filter::Group { filters, operator } => {
                assert_eq!(*operator, GroupOperator::Or);
                assert_eq!(filters.len(), 2);
                assert!(matches!(
                    &filters[0],
                    Filter::Basic {
                        operator: QueryOperator::IsNull,
                        ..
                    }
                ));
                assert!(matches!(
                    &filters[1],
                    Filter::Basic {
                        operator: QueryOperator::GreaterThan,
                        ..
                    }
                ));
            }
            other => panic!("expected a group filter, got {:?}", other),
        }
    }
}

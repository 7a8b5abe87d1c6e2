//! Core Model trait - base definition for persisted entities
//!
//! A model names its entity, registers its descriptor table, exposes its
//! identifier and per-instance storage, and knows how to decode itself from a
//! result row and stage itself for a write. Lifecycle hooks default to
//! no-ops.

use std::fmt::Debug;
use std::hash::Hash;

use async_trait::async_trait;
use serde::de::DeserializeOwned;

use crate::backends::{Database, DatabaseRow, DatabaseValue};
use crate::error::OrmResult;
use crate::model::{FieldDescriptor, ModelStorage};
use crate::query::QueryBuilder;

/// Bound alias for model identifier values.
///
/// Identifiers are compared and hashed during eager-load distribution, so
/// they double as map keys.
pub trait IdValue:
    Clone + Default + Eq + Hash + Debug + Send + Sync + DeserializeOwned + Into<DatabaseValue> + 'static
{
}

impl<T> IdValue for T where
    T: Clone
        + Default
        + Eq
        + Hash
        + Debug
        + Send
        + Sync
        + DeserializeOwned
        + Into<DatabaseValue>
        + 'static
{
}

/// Core trait for persisted entities
#[async_trait]
pub trait Model: Clone + Debug + Default + Send + Sync + 'static {
    /// The type of this model's identifier
    type Id: IdValue;

    /// Entity (table/collection) name for this model
    fn entity() -> &'static str;

    /// Ordered descriptor table of this model's persisted fields.
    ///
    /// Must contain exactly one field carrying the `Identifier` constraint.
    fn fields() -> &'static [FieldDescriptor];

    /// Current identifier value, if assigned
    fn id(&self) -> Option<Self::Id>;

    /// Assign the identifier value
    fn set_id(&mut self, id: Self::Id);

    /// Per-instance storage
    fn storage(&self) -> &ModelStorage;

    /// Per-instance storage, mutable
    fn storage_mut(&mut self) -> &mut ModelStorage;

    /// Decode an instance from a result row
    fn from_row(row: &dyn DatabaseRow) -> OrmResult<Self>
    where
        Self: Sized;

    /// Current field values as (storage name, value) pairs, in
    /// descriptor-table order
    fn to_fields(&self) -> OrmResult<Vec<(&'static str, DatabaseValue)>>;

    /// Whether this instance corresponds to a persisted row
    fn exists(&self) -> bool {
        self.storage().exists
    }

    /// The identifier field's descriptor.
    ///
    /// Panics when the descriptor table declares no identifier; that is a
    /// registration error, not a runtime condition.
    fn id_field() -> &'static FieldDescriptor {
        Self::fields()
            .iter()
            .find(|f| f.is_identifier())
            .unwrap_or_else(|| panic!("model `{}` declares no identifier field", Self::entity()))
    }

    /// Storage name of the identifier field
    fn id_field_name() -> &'static str {
        Self::id_field().storage_name()
    }

    /// Start a query for this model on the given database
    fn query(database: &dyn Database) -> QueryBuilder<'_, Self>
    where
        Self: Sized,
    {
        QueryBuilder::new(database)
    }

    async fn will_create(&mut self, _database: &dyn Database) -> OrmResult<()> {
        Ok(())
    }

    async fn did_create(&mut self, _database: &dyn Database) -> OrmResult<()> {
        Ok(())
    }

    async fn will_update(&mut self, _database: &dyn Database) -> OrmResult<()> {
        Ok(())
    }

    async fn did_update(&mut self, _database: &dyn Database) -> OrmResult<()> {
        Ok(())
    }

    async fn will_delete(&mut self, _database: &dyn Database) -> OrmResult<()> {
        Ok(())
    }

    async fn did_delete(&mut self, _database: &dyn Database) -> OrmResult<()> {
        Ok(())
    }
}

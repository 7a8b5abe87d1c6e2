//! Lifecycle operations - create, read, update, delete for model instances
//!
//! Layers identity bookkeeping and hook dispatch on top of the query builder:
//! `save` dispatches on the existence flag, `create` decodes the generated
//! identifier back into the instance, `delete` reroutes to a soft delete when
//! the model declares one. Lifecycle preconditions are hard invariants —
//! violating them panics rather than returning an error.

use async_trait::async_trait;
use chrono::Utc;
use tracing::debug;

use crate::backends::{Database, DatabaseRowExt, DatabaseValue, GENERATED_ID_KEY};
use crate::error::{ModelError, OrmResult};
use crate::model::field::{deleted_at_field, FieldRole};
use crate::model::Model;
use crate::query::{QueryAction, QueryOperator};

/// Trait providing lifecycle operations for models
#[async_trait]
pub trait CrudOperations: Model {
    /// Find a model by its identifier
    async fn find(database: &dyn Database, id: Self::Id) -> OrmResult<Option<Self>>
    where
        Self: Sized,
    {
        Self::query(database)
            .filter_name(Self::id_field_name(), QueryOperator::Equal, id.into())
            .first()
            .await
    }

    /// Find a model by its identifier or fail with `NotFound`
    async fn find_or_fail(database: &dyn Database, id: Self::Id) -> OrmResult<Self>
    where
        Self: Sized,
    {
        let description = format!("{}({:?})", Self::entity(), id);
        Self::find(database, id)
            .await?
            .ok_or(ModelError::NotFound(description))
    }

    /// Create if the instance is not persisted yet, update otherwise
    async fn save(&mut self, database: &dyn Database) -> OrmResult<()> {
        if self.exists() {
            self.update(database).await
        } else {
            self.create(database).await
        }
    }

    /// Persist a new instance and decode its generated identifier.
    ///
    /// Panics when the instance is already persisted.
    async fn create(&mut self, database: &dyn Database) -> OrmResult<()> {
        assert!(
            !self.exists(),
            "create called on an already persisted `{}` row",
            Self::entity()
        );

        self.will_create(database).await?;

        let input = stage_input(self, QueryAction::Create)?;
        self.storage_mut().input = input.clone();

        debug!(entity = Self::entity(), "creating row");
        let created = Self::query(database)
            .set_row(input)
            .action(QueryAction::Create)
            .run(|_| Ok(()))
            .await?;
        let first = created.into_iter().next().ok_or_else(|| {
            ModelError::Database(format!(
                "create on `{}` returned no output row",
                Self::entity()
            ))
        })?;
        let output = first.storage().output().cloned().ok_or_else(|| {
            ModelError::Database(format!(
                "create on `{}` returned a row without output",
                Self::entity()
            ))
        })?;

        let id: Self::Id = output.get(GENERATED_ID_KEY)?;
        self.set_id(id);
        let storage = self.storage_mut();
        storage.output = Some(output);
        storage.exists = true;

        self.did_create(database).await?;
        Ok(())
    }

    /// Write the instance's current field values to its persisted row.
    ///
    /// Panics when the instance is not persisted.
    async fn update(&mut self, database: &dyn Database) -> OrmResult<()> {
        assert!(
            self.exists(),
            "update called on a `{}` row that does not exist",
            Self::entity()
        );

        self.will_update(database).await?;

        let id = self
            .id()
            .unwrap_or_else(|| panic!("persisted `{}` row has no identifier", Self::entity()));
        let input = stage_input(self, QueryAction::Update)?;
        self.storage_mut().input = input.clone();

        debug!(entity = Self::entity(), "updating row");
        Self::query(database)
            .filter_name(Self::id_field_name(), QueryOperator::Equal, id.into())
            .set_row(input)
            .action(QueryAction::Update)
            .run(|_| Ok(()))
            .await?;

        self.did_update(database).await?;
        Ok(())
    }

    /// Delete the instance's persisted row.
    ///
    /// A model with a soft-delete field gets its deletion timestamp stamped
    /// instead; the row stays persisted and reads exclude it. Panics when the
    /// instance is not persisted.
    async fn delete(&mut self, database: &dyn Database) -> OrmResult<()> {
        assert!(
            self.exists(),
            "delete called on a `{}` row that does not exist",
            Self::entity()
        );

        self.will_delete(database).await?;

        let id = self
            .id()
            .unwrap_or_else(|| panic!("persisted `{}` row has no identifier", Self::entity()));

        if let Some(field) = deleted_at_field(Self::fields()) {
            debug!(entity = Self::entity(), "soft deleting row");
            let input = vec![(
                field.storage_name().to_string(),
                DatabaseValue::DateTime(Utc::now()),
            )];
            Self::query(database)
                .filter_name(Self::id_field_name(), QueryOperator::Equal, id.into())
                .set_row(input)
                .action(QueryAction::Update)
                .run(|_| Ok(()))
                .await?;
        } else {
            debug!(entity = Self::entity(), "deleting row");
            Self::query(database)
                .filter_name(Self::id_field_name(), QueryOperator::Equal, id.into())
                .action(QueryAction::Delete)
                .run(|_| Ok(()))
                .await?;
            self.storage_mut().exists = false;
        }

        self.did_delete(database).await?;
        Ok(())
    }

    /// Clear the instance's soft-delete stamp.
    ///
    /// Panics when the model declares no soft-delete field or the instance is
    /// not persisted.
    async fn restore(&mut self, database: &dyn Database) -> OrmResult<()> {
        let field = deleted_at_field(Self::fields()).unwrap_or_else(|| {
            panic!(
                "restore called on `{}`, which has no soft-delete field",
                Self::entity()
            )
        });
        assert!(
            self.exists(),
            "restore called on a `{}` row that does not exist",
            Self::entity()
        );

        let id = self
            .id()
            .unwrap_or_else(|| panic!("persisted `{}` row has no identifier", Self::entity()));
        let input = vec![(field.storage_name().to_string(), DatabaseValue::Null)];
        Self::query(database)
            .filter_name(Self::id_field_name(), QueryOperator::Equal, id.into())
            .set_row(input)
            .action(QueryAction::Update)
            .run(|_| Ok(()))
            .await?;
        Ok(())
    }

    /// Remove the persisted row even when the model is soft-deletable.
    ///
    /// Panics when the instance is not persisted.
    async fn force_delete(&mut self, database: &dyn Database) -> OrmResult<()> {
        assert!(
            self.exists(),
            "force_delete called on a `{}` row that does not exist",
            Self::entity()
        );

        self.will_delete(database).await?;

        let id = self
            .id()
            .unwrap_or_else(|| panic!("persisted `{}` row has no identifier", Self::entity()));
        Self::query(database)
            .filter_name(Self::id_field_name(), QueryOperator::Equal, id.into())
            .action(QueryAction::Delete)
            .run(|_| Ok(()))
            .await?;
        self.storage_mut().exists = false;

        self.did_delete(database).await?;
        Ok(())
    }

    /// Persist a batch of new instances as one multi-row create action.
    ///
    /// Identifier back-assignment is positional: instance *i* receives the
    /// identifier of output row *i*, relying on the `Database` contract that
    /// create output arrives in submission order. Panics when any instance is
    /// already persisted.
    async fn create_many(database: &dyn Database, models: &mut [Self]) -> OrmResult<()>
    where
        Self: Sized,
    {
        if models.is_empty() {
            return Ok(());
        }
        for model in models.iter() {
            assert!(
                !model.exists(),
                "create_many includes an already persisted `{}` row",
                Self::entity()
            );
        }

        let mut builder = Self::query(database);
        for model in models.iter_mut() {
            let input = stage_input(model, QueryAction::Create)?;
            model.storage_mut().input = input.clone();
            builder = builder.set_row(input);
        }

        debug!(entity = Self::entity(), rows = models.len(), "bulk creating rows");
        let created = builder
            .action(QueryAction::Create)
            .run(|_| Ok(()))
            .await?;
        if created.len() != models.len() {
            return Err(ModelError::Database(format!(
                "bulk create on `{}` returned {} rows for {} inputs",
                Self::entity(),
                created.len(),
                models.len()
            )));
        }

        for (model, row) in models.iter_mut().zip(created) {
            let output = row.storage().output().cloned().ok_or_else(|| {
                ModelError::Database(format!(
                    "bulk create on `{}` returned a row without output",
                    Self::entity()
                ))
            })?;
            let id: Self::Id = output.get(GENERATED_ID_KEY)?;
            model.set_id(id);
            let storage = model.storage_mut();
            storage.output = Some(output);
            storage.exists = true;
        }
        Ok(())
    }
}

// Lifecycle operations are available on every model
impl<T: Model> CrudOperations for T {}

/// Build the staged input for a write: the instance's field values in
/// descriptor-table order, with role-driven stamping applied and an unset
/// identifier left for storage to generate.
fn stage_input<M: Model>(model: &M, action: QueryAction) -> OrmResult<Vec<(String, DatabaseValue)>> {
    let now = Utc::now();
    let id_name = M::id_field_name();
    let mut staged = Vec::new();

    for (name, value) in model.to_fields()? {
        let role = M::fields()
            .iter()
            .find(|f| f.storage_name() == name)
            .map(|f| f.role)
            .unwrap_or(FieldRole::Data);
        let staged_value = match (role, action) {
            (FieldRole::CreatedAt, QueryAction::Create) => DatabaseValue::DateTime(now),
            // creation stamps are write-once
            (FieldRole::CreatedAt, _) => continue,
            (FieldRole::UpdatedAt, _) => DatabaseValue::DateTime(now),
            _ => value,
        };
        if name == id_name && staged_value.is_null() {
            continue;
        }
        staged.push((name.to_string(), staged_value));
    }
    Ok(staged)
}
